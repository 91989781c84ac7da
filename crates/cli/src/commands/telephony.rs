use crate::commands::{load_config, runtime, CommandResult};
use geoinsight_integrations::TwilioProvisioner;

/// Re-points an already purchased number at the voice webhook.
pub fn rebind(number_sid: &str) -> CommandResult {
    const COMMAND: &str = "telephony rebind";

    let number_sid = number_sid.trim();
    if !number_sid.starts_with("PN") {
        return CommandResult::failure(
            COMMAND,
            "invalid_argument",
            format!("`{number_sid}` is not a phone number sid (expected PN...)"),
            2,
        );
    }

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    if !config.telephony.is_configured() {
        return CommandResult::failure(
            COMMAND,
            "config_validation",
            "telephony provider is not configured",
            2,
        );
    }
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let provisioner = TwilioProvisioner::from_config(&config.telephony)?;
        provisioner.bind_voice_url(number_sid).await
    });

    match result {
        Ok(()) => CommandResult::success(
            COMMAND,
            format!("{number_sid} now routes to {}", config.telephony.voice_webhook_url),
        ),
        Err(error) => CommandResult::failure(COMMAND, "provider", error.to_string(), 6),
    }
}
