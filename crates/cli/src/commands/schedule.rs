use std::sync::Arc;
use std::time::Duration;

use crate::commands::{load_config, runtime, CommandResult};
use crate::scheduler::ProspectingJob;
use geoinsight_db::{connect, migrations, SqlLeadRepository};
use geoinsight_integrations::StaticLeadHunter;

pub fn run(once: bool) -> CommandResult {
    let config = match load_config("schedule") {
        Ok(config) => config,
        Err(result) => return result,
    };
    crate::init_logging(&config);
    let runtime = match runtime("schedule") {
        Ok(runtime) => runtime,
        Err(result) => return result,
    };

    let result = runtime.block_on(async {
        let pool = connect(&config.database)
            .await
            .map_err(|error| ("db_connectivity", error.to_string(), 4u8))?;
        migrations::run_pending(&pool)
            .await
            .map_err(|error| ("migration", error.to_string(), 5u8))?;

        let job = ProspectingJob::new(
            Arc::new(StaticLeadHunter::new(&config.prospecting)),
            Arc::new(SqlLeadRepository::new(pool.clone())),
            config.scheduler.target.clone(),
            Duration::from_secs(config.scheduler.interval_secs),
        );

        let message = if once {
            let stored = job
                .run_once()
                .await
                .map_err(|error| ("prospecting", format!("{error:#}"), 6u8))?;
            format!("stored {stored} lead(s) for `{}`", config.scheduler.target.keyword)
        } else {
            let cycles = job
                .run_until(async {
                    let _ = tokio::signal::ctrl_c().await;
                })
                .await;
            format!("schedule stopped after {cycles} cycle(s)")
        };

        pool.close().await;
        Ok::<String, (&'static str, String, u8)>(message)
    });

    match result {
        Ok(message) => CommandResult::success("schedule", message),
        Err((error_class, message, exit_code)) => {
            CommandResult::failure("schedule", error_class, message, exit_code)
        }
    }
}
