//! Scan command implementation

use super::parse_option_value;
use crate::encode;
use indicatif::{ProgressBar, ProgressStyle};
use rsane_core::frame::FrameParameters;
use rsane_core::option::SetInfo;
use rsane_core::raster::RasterImage;
use rsane_core::{ScanProgress, Session};
use std::path::Path;
use std::time::Duration;

/// Create a standard progress bar style
fn create_progress_bar_style() -> Result<ProgressStyle, Box<dyn std::error::Error>> {
    Ok(ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) Scanning")?
        .progress_chars("#>-"))
}

/// Create a standard spinner style
fn create_spinner_style() -> Result<ProgressStyle, Box<dyn std::error::Error>> {
    Ok(ProgressStyle::default_spinner().template("{spinner:.green} {msg} {bytes}")?)
}

/// Progress reporter using indicatif progress bars
///
/// Shows a bar when the frame size is known up front and a spinner for
/// frames of unknown height.
#[derive(Default)]
pub struct IndicatifProgress {
    bar: Option<ProgressBar>,
}

impl IndicatifProgress {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ScanProgress for IndicatifProgress {
    fn started(&mut self, params: &FrameParameters) {
        let pb = match params.frame_len() {
            Some(total) => {
                let pb = ProgressBar::new(total as u64);
                pb.set_style(
                    create_progress_bar_style().unwrap_or_else(|_| ProgressStyle::default_bar()),
                );
                pb
            }
            None => {
                let pb = ProgressBar::new_spinner();
                pb.set_style(
                    create_spinner_style().unwrap_or_else(|_| ProgressStyle::default_spinner()),
                );
                pb.set_message("Scanning (height unknown)");
                pb.enable_steady_tick(Duration::from_millis(100));
                pb
            }
        };
        self.bar = Some(pb);
    }

    fn advanced(&mut self, bytes: usize) {
        if let Some(pb) = &self.bar {
            pb.inc(bytes as u64);
        }
    }

    fn finished(&mut self, image: &RasterImage) {
        if let Some(pb) = self.bar.take() {
            pb.finish_with_message(format!("{}x{} pixels", image.width(), image.height()));
        }
    }
}

impl Drop for IndicatifProgress {
    fn drop(&mut self) {
        if let Some(pb) = self.bar.take() {
            pb.abandon();
        }
    }
}

/// Apply `name=value` assignments in order
pub fn apply_assignments(
    session: &mut Session<'_>,
    assignments: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    for (name, text) in assignments {
        let value = parse_option_value(session, name, text)?;
        let info = session.set_value(name, value)?;
        log::debug!("Set {} = {} ({:?})", name, text, info);
        if info.contains(SetInfo::RELOAD_OPTIONS) {
            session.refresh_options()?;
        }
    }
    Ok(())
}

/// Scan one image and save it
pub fn cmd_scan(
    session: &mut Session<'_>,
    output: &Path,
    assignments: &[(String, String)],
) -> Result<(), Box<dyn std::error::Error>> {
    // Fail on a bad extension before moving the scan head
    encode::OutputFormat::from_path(output)?;
    apply_assignments(session, assignments)?;

    let mut progress = IndicatifProgress::new();
    let image = session.scan(&mut progress)?;
    encode::save(&image, output)?;

    println!(
        "Saved {}x{} image to {}",
        image.width(),
        image.height(),
        output.display()
    );
    Ok(())
}
