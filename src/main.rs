//! Time-cam binary: preview and/or record with a timestamp overlay.

use std::process::ExitCode;

use pi_time_cam::{Cli, RpicamCamera, Session, SessionConfig, SystemClock};

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse_args();

    let config = match SessionConfig::from_cli(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::from(2);
        }
    };

    let camera = RpicamCamera::new(&cli.camera_bin, cli.device_index);
    let mut session = Session::new(config, camera, SystemClock);

    match session.run() {
        Ok(summary) => {
            log::info!(
                "Session complete: {} interval(s), {} file(s)",
                summary.intervals,
                summary.files_recorded
            );
            if let Some(path) = &summary.last_file {
                log::debug!("Last file: {}", path.display());
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}
