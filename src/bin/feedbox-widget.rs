//! Native feedback widget talking to a feedbox server.

use egui::ViewportBuilder;
use feedbox::logging;
use feedbox::widget::{FeedbackWidgetApp, WidgetController, resolve_endpoint};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(err) = logging::init("feedbox-widget") {
        eprintln!("Logging disabled: {err}");
    }

    let mut explicit = None;
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--endpoint" => explicit = args.next(),
            "--help" | "-h" => {
                println!("Usage: feedbox-widget [--endpoint <url>]");
                return Ok(());
            }
            other => return Err(format!("Unknown argument: {other}").into()),
        }
    }
    let endpoint = resolve_endpoint(explicit, |name| std::env::var(name).ok());
    tracing::info!(%endpoint, "Starting feedback widget");

    let native_options = eframe::NativeOptions {
        viewport: ViewportBuilder::default()
            .with_inner_size([720.0, 520.0])
            .with_min_inner_size([480.0, 420.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Feedbox",
        native_options,
        Box::new(move |cc| {
            Ok(Box::new(FeedbackWidgetApp::new(
                cc,
                WidgetController::with_endpoint(endpoint),
            )))
        }),
    )?;
    Ok(())
}
