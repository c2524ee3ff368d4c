//! List commands implementation

use rsane_core::Context;

/// List all backends compiled into this build
pub fn list_backends() {
    println!("Available backends:");
    println!();
    for backend in rsane_backends::available_backends() {
        println!("  {:<8} - {}", backend.name, backend.description);
    }
}

/// List devices reported by the backend
pub fn list_devices(ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
    let devices = ctx.devices()?;
    if devices.is_empty() {
        println!("No devices found on backend '{}'", ctx.backend_name());
        return Ok(());
    }

    println!("{:<24} {:<12} {:<20} Type", "Device", "Vendor", "Model");
    println!("{}", "-".repeat(72));
    for dev in devices {
        println!(
            "{:<24} {:<12} {:<20} {}",
            dev.name, dev.vendor, dev.model, dev.kind
        );
    }
    Ok(())
}
