//! Command-line entry point of the calibration viewer.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use ledcal::{AppError, DataDirSource, HostPage, Viewer, ViewerConfig, ViewerOptions};

/// Shows the result of one LED calibration run in 3D.
#[derive(Parser, Debug)]
#[command(name = "ledcal", version, about)]
struct Args {
    /// Data directory of the calibration server
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Id of the calibration run to show
    #[arg(short, long)]
    calibration: String,

    /// JSON file overriding appearance and interaction options
    #[arg(short, long)]
    options: Option<PathBuf>,
}

fn start(args: Args) -> Result<(), AppError> {
    let options = match &args.options {
        Some(path) => ViewerOptions::from_json_file(path)?,
        None => ViewerOptions::default(),
    };
    let config = ViewerConfig::new(args.calibration, args.data_dir).with_options(options);
    let page = HostPage::standard(&config.options);
    let source = Arc::new(DataDirSource::new(config.data_dir()));

    let mut viewer = Viewer::new(config, page, source)?;
    viewer.begin_fetch();
    ledcal::run(viewer)
}

fn main() -> ExitCode {
    env_logger::init();

    match start(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("{err}");
            ExitCode::FAILURE
        }
    }
}
