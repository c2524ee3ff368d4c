//! Button monitor command implementation

use crate::encode;
use rsane_core::monitor::{ButtonMonitor, MonitorConfig, StopFlag};
use rsane_core::{Error, Session};
use std::path::Path;

/// Load the monitor configuration from a file or fall back to the defaults
fn load_config(
    path: Option<&Path>,
    max_cycles: Option<u64>,
) -> Result<MonitorConfig, Box<dyn std::error::Error>> {
    let mut config = match path {
        Some(path) => {
            log::info!("Loading monitor configuration from {}", path.display());
            MonitorConfig::from_toml_file(path)?
        }
        None => MonitorConfig::default(),
    };
    if max_cycles.is_some() {
        config.max_cycles = max_cycles;
    }
    Ok(config)
}

/// Poll buttons until interrupted, saving one image per triggered scan
pub fn cmd_monitor(
    session: &mut Session<'_>,
    config_path: Option<&Path>,
    max_cycles: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(config_path, max_cycles)?;

    // Buttons the device does not have would fail on the first poll
    for button in &config.buttons {
        if session.option(button).is_none() {
            return Err(format!(
                "device '{}' has no button option '{}'",
                session.device_name(),
                button
            )
            .into());
        }
    }

    let stop = StopFlag::new();
    let handler_stop = stop.clone();
    ctrlc::set_handler(move || {
        log::info!("Interrupted, stopping after this cycle");
        handler_stop.stop();
    })?;

    println!(
        "Watching buttons {} (Ctrl-C to stop)",
        config.buttons.join(", ")
    );

    let mut monitor = ButtonMonitor::new(config);
    let summary = monitor.run(session, &stop, |preset, image| {
        encode::save(&image, &preset.output).map_err(|e| {
            Error::Io(format!("saving {}: {}", preset.output.display(), e))
        })?;
        println!(
            "'{}' pressed: saved {}x{} image to {}",
            preset.button,
            image.width(),
            image.height(),
            preset.output.display()
        );
        Ok(())
    })?;

    println!(
        "{} poll cycle(s), {} press(es), {} scan(s)",
        summary.cycles, summary.presses, summary.scans
    );
    Ok(())
}
