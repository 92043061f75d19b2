//! Send one feedback entry to a running server, using the widget's client.

use feedbox::widget::{prepare_submission, resolve_endpoint, submit_feedback};

fn main() {
    if let Err(err) = run() {
        eprintln!("{err}");
        std::process::exit(1);
    }
}

#[derive(Default)]
struct Options {
    endpoint: Option<String>,
    name: String,
    email: String,
    message: String,
}

fn run() -> Result<(), String> {
    let Some(options) = parse_args(std::env::args().skip(1).collect())? else {
        return Ok(());
    };
    let endpoint = resolve_endpoint(options.endpoint, |name| std::env::var(name).ok());
    let submission = prepare_submission(&options.name, &options.email, &options.message)
        .map_err(|err| err.to_string())?;
    let receipt = submit_feedback(&endpoint, &submission).map_err(|err| err.to_string())?;
    println!("{}", receipt.message);
    if let Some(url) = receipt.issue_url {
        println!("{url}");
    }
    Ok(())
}

fn parse_args(args: Vec<String>) -> Result<Option<Options>, String> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_help();
        return Ok(None);
    }
    let mut options = Options::default();
    let mut it = args.into_iter();
    while let Some(arg) = it.next() {
        let slot = match arg.as_str() {
            "--endpoint" => {
                let value = it
                    .next()
                    .ok_or_else(|| "Missing value for --endpoint".to_string())?;
                options.endpoint = Some(value);
                continue;
            }
            "--name" => &mut options.name,
            "--email" => &mut options.email,
            "--message" => &mut options.message,
            _ => return Err(format!("Unknown argument: {arg}")),
        };
        *slot = it
            .next()
            .ok_or_else(|| format!("Missing value for {arg}"))?;
    }
    Ok(Some(options))
}

fn print_help() {
    println!("Usage: feedbox-submit --name <name> --email <email> --message <text> [--endpoint <url>]");
    println!();
    println!("Options:");
    println!("  --endpoint <url>  Submit endpoint (defaults to FEEDBOX_ENDPOINT, then http://127.0.0.1:8787/submit-feedback)");
}
