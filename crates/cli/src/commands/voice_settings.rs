use crate::commands::{load_config, runtime, CommandResult};
use geoinsight_core::{OrganizationId, OrganizationVoiceSettings};
use geoinsight_db::{connect, migrations, OrganizationRepository, SqlOrganizationRepository};
use serde_json::Value;

const COMMAND: &str = "voice-settings";

/// Reads an organization's voice settings, or replaces them when `set` holds a JSON document.
/// A read prints `{"organization_id", "voice_settings"}` as the message.
pub fn run(organization_id: &str, set: Option<&str>) -> CommandResult {
    let organization_id = organization_id.trim();
    if organization_id.is_empty() {
        return CommandResult::failure(
            COMMAND,
            "invalid_argument",
            "organization id must not be empty",
            2,
        );
    }

    let new_settings = match set.map(serde_json::from_str::<Value>).transpose() {
        Ok(settings) => settings,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "invalid_argument",
                format!("voice settings must be valid JSON: {error}"),
                2,
            );
        }
    };

    let config = match load_config(COMMAND) {
        Ok(config) => config,
        Err(result) => return result,
    };
    let runtime = match runtime(COMMAND) {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let id = OrganizationId(organization_id.to_string());
    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;
        let repository = SqlOrganizationRepository::new(pool.clone());

        let message = match new_settings {
            Some(settings) => {
                repository
                    .save_voice_settings(&id, settings)
                    .await
                    .map_err(|error| ("persistence", error.to_string(), 7u8))?;
                format!("voice settings saved for organization `{}`", id.0)
            }
            None => match repository
                .voice_settings(&id)
                .await
                .map_err(|error| ("persistence", error.to_string(), 7u8))?
            {
                Some(voice_settings) => {
                    let record =
                        OrganizationVoiceSettings { organization_id: id.clone(), voice_settings };
                    serde_json::to_string(&record)
                        .map_err(|error| ("serialization", error.to_string(), 8u8))?
                }
                None => format!("organization `{}` has no voice settings", id.0),
            },
        };

        pool.close().await;
        Ok::<String, (&'static str, String, u8)>(message)
    });

    match result {
        Ok(message) => CommandResult::success(COMMAND, message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure(COMMAND, error_class, message, exit_code)
        }
    }
}
