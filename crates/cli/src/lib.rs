pub mod commands;
pub mod pdf;
pub mod scheduler;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use geoinsight_core::config::{AppConfig, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "geoinsight",
    about = "Geo-Insight operator CLI",
    long_about = "Operate Geo-Insight readiness checks, migrations, scheduled prospecting, quotes and telephony maintenance.",
    after_help = "Examples:\n  geoinsight doctor --json\n  geoinsight schedule --once\n  geoinsight telephony rebind --sid PN0123456789abcdef"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Validate config, database connectivity and provider credentials")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Inspect effective configuration values with source attribution and redaction")]
    Config,
    #[command(about = "Apply pending database migrations and return structured status output")]
    Migrate,
    #[command(about = "Run the recurring grid search and store the leads it finds")]
    Schedule {
        #[arg(long, help = "Run a single cycle and exit")]
        once: bool,
    },
    #[command(about = "Render a quote document for a lead")]
    Quote {
        #[arg(long = "business", help = "Business name shown on the quote")]
        business_name: String,
        #[arg(long)]
        lead_id: String,
        #[arg(long, help = "JSON file with [{\"name\", \"qty\", \"price\"}] items")]
        items: PathBuf,
    },
    #[command(about = "Read or replace an organization's voice settings")]
    VoiceSettings {
        #[arg(long = "org")]
        organization_id: String,
        #[arg(long, help = "JSON document that replaces the stored settings")]
        set: Option<String>,
    },
    #[command(subcommand, about = "Telephony maintenance")]
    Telephony(TelephonyCommand),
}

#[derive(Debug, Subcommand)]
enum TelephonyCommand {
    #[command(about = "Point a purchased number's voice webhook at the voice platform again")]
    Rebind {
        #[arg(long)]
        sid: String,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Doctor { json } => commands::doctor::run(json),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Migrate => commands::migrate::run(),
        Command::Schedule { once } => commands::schedule::run(once),
        Command::Quote { business_name, lead_id, items } => {
            commands::quote::run(&business_name, &lead_id, &items)
        }
        Command::VoiceSettings { organization_id, set } => {
            commands::voice_settings::run(&organization_id, set.as_deref())
        }
        Command::Telephony(TelephonyCommand::Rebind { sid }) => {
            commands::telephony::rebind(&sid)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Installs the global subscriber; later calls are no-ops.
pub(crate) fn init_logging(config: &AppConfig) {
    let log_level = config.logging.level.parse::<tracing::Level>().unwrap_or(tracing::Level::INFO);
    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(log_level)
        .with_writer(std::io::stderr);

    let _ = match config.logging.format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
