use std::process::ExitCode;

fn main() -> ExitCode {
    geoinsight_cli::run()
}
