//! rsane - A scanner session tool
//!
//! Lists scanner devices, inspects and changes their options, scans single
//! images to PNG/JPEG/TIFF files and watches front-panel buttons to scan on
//! demand.
//!
//! # Architecture
//!
//! The CLI only talks to two crates:
//! - **rsane-backends** turns a backend string such as `test:picture=white`
//!   into an uninitialized backend
//! - **rsane-core** owns the initialized backend (`Context`), open devices
//!   (`Session`), the option registry, acquisition, image assembly and the
//!   button monitor
//!
//! Image file encoding lives in this crate (`encode`).

mod cli;
mod commands;
mod encode;

use clap::Parser;
use cli::{Cli, Commands};
use rsane_backends::open_backend;
use rsane_core::Context;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    run(cli)
}

/// Initialize the backend named on the command line
fn open_context(backend: &str) -> Result<Context, Box<dyn std::error::Error>> {
    Ok(Context::new(open_backend(backend)?)?)
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::ListBackends => {
            commands::list_backends();
            Ok(())
        }
        Commands::Devices => commands::list_devices(&open_context(&cli.backend)?),
        Commands::Options { device, all } => {
            let ctx = open_context(&cli.backend)?;
            let mut session = ctx.open(&device.device)?;
            commands::options::cmd_options(&mut session, all)
        }
        Commands::Get { device, name } => {
            let ctx = open_context(&cli.backend)?;
            let mut session = ctx.open(&device.device)?;
            commands::options::cmd_get(&mut session, &name)
        }
        Commands::Set {
            device,
            name,
            value,
        } => {
            let ctx = open_context(&cli.backend)?;
            let mut session = ctx.open(&device.device)?;
            commands::options::cmd_set(&mut session, &name, &value)
        }
        Commands::Scan {
            device,
            output,
            set,
        } => {
            let ctx = open_context(&cli.backend)?;
            let mut session = ctx.open(&device.device)?;
            commands::scan::cmd_scan(&mut session, &output, &set)
        }
        Commands::Monitor {
            device,
            config,
            max_cycles,
        } => {
            let ctx = open_context(&cli.backend)?;
            let mut session = ctx.open(&device.device)?;
            commands::monitor::cmd_monitor(&mut session, config.as_deref(), max_cycles)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_list_backends_opens_nothing() {
        let cli = parse(&["rsane", "--backend", "nonexistent", "list-backends"]);
        assert!(run(cli).is_ok());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let cli = parse(&["rsane", "--backend", "nonexistent", "devices"]);
        assert!(run(cli).is_err());
    }

    #[cfg(feature = "test-backend")]
    #[test]
    fn test_get_from_test_backend() {
        let cli = parse(&["rsane", "get", "resolution"]);
        assert!(run(cli).is_ok());
    }
}
