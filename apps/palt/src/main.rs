use palt_core::Settings;
use std::backtrace::Backtrace;
use std::panic::{self, AssertUnwindSafe};
use std::process::ExitCode;
use tracing::{error, info, warn};

mod app;
mod backend;

use app::PaltApp;

pub fn main() -> ExitCode {
    // Initialize tracing subscriber for logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    panic::set_hook(Box::new(|info| {
        error!("Uncaught panic: {}\n{}", info, Backtrace::force_capture());
    }));

    guarded(run)
}

/// Single fault boundary: errors and panics from `body` both end up here as a
/// logged failure exit.
fn guarded(body: impl FnOnce() -> anyhow::Result<()>) -> ExitCode {
    match panic::catch_unwind(AssertUnwindSafe(body)) {
        Ok(Ok(())) => ExitCode::SUCCESS,
        Ok(Err(e)) => {
            error!("PulseAudio Loopback Tool stopped: {:#}", e);
            ExitCode::FAILURE
        }
        Err(_) => {
            error!("PulseAudio Loopback Tool stopped after a panic");
            ExitCode::FAILURE
        }
    }
}

fn run() -> anyhow::Result<()> {
    info!("PulseAudio Loopback Tool starting");

    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            warn!("Failed to load settings, using defaults: {}", e);
            Settings::default()
        }
    };

    iced::application(
        move || PaltApp::new(settings.clone()),
        PaltApp::update,
        PaltApp::view,
    )
    .title(PaltApp::title)
    .theme(PaltApp::theme)
    .window_size(iced::Size::new(640.0, 400.0))
    .run()
    .map_err(|e| anyhow::anyhow!("GUI event loop failed: {}", e))
}
