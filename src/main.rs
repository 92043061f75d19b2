//! Entry point for the feedback server.

use std::path::PathBuf;

use feedbox::config::{ServerSettings, TrackerConfig};
use feedbox::logging;
use feedbox::server::{FeedbackServer, FeedbackService};
use tracing::{error, info};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

struct Options {
    config_path: Option<PathBuf>,
    bind: Option<String>,
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    if let Err(err) = logging::init("feedbox") {
        eprintln!("Logging disabled: {err}");
    }

    let mut settings =
        ServerSettings::load(options.config_path.as_deref()).map_err(|err| err.to_string())?;
    settings.apply_env_overrides(|name| std::env::var(name).ok());
    if let Some(bind) = options.bind {
        settings.bind_addr = bind;
    }

    let tracker = TrackerConfig::from_env();
    match &tracker {
        Ok(config) => info!("Filing feedback issues in {}", config.slug()),
        Err(err) => error!("{err}; submissions will fail until it is set"),
    }

    let server =
        FeedbackServer::bind(FeedbackService::with_github(settings, tracker)).map_err(|err| err.to_string())?;
    server.run().map_err(|err| err.to_string())
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(None);
    }
    let mut options = Options {
        config_path: None,
        bind: None,
    };
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        match arg.as_str() {
            "--config" => {
                let value = it
                    .next()
                    .ok_or_else(|| "Missing value for --config".to_string())?;
                options.config_path = Some(PathBuf::from(value));
            }
            "--bind" => {
                let value = it
                    .next()
                    .ok_or_else(|| "Missing value for --bind".to_string())?;
                options.bind = Some(value);
            }
            _ => return Err(format!("Unknown argument: {arg}")),
        }
    }
    Ok(Some(options))
}

fn print_help() {
    println!("Usage: feedbox [--config <path>] [--bind <addr>]");
    println!();
    println!("Options:");
    println!("  --config <path>  Settings file (defaults to .feedbox/feedbox.toml in the config dir)");
    println!("  --bind <addr>    Listen address, overrides FEEDBOX_BIND and the settings file");
    println!();
    println!("Environment:");
    println!("  GITHUB_TOKEN, GITHUB_REPO_OWNER, GITHUB_REPO_NAME  Target repository and credential");
}
