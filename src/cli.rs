//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Parse a `name=value` option assignment
fn parse_assignment(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .ok_or_else(|| format!("Invalid option assignment '{}' (expected name=value)", s))
}

/// Generate dynamic help text for the backend argument
fn backend_help() -> String {
    format!(
        "Backend to use, with optional parameters as name:key=value,... [available: {}]",
        rsane_backends::backend_names_short()
    )
}

#[derive(Parser)]
#[command(name = "rsane")]
#[command(author, version, about = "Scanner session tool", long_about = None)]
pub struct Cli {
    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[arg(short, long, global = true, default_value = "test", help = backend_help())]
    pub backend: String,

    #[command(subcommand)]
    pub command: Commands,
}

/// Device selection shared across commands
#[derive(clap::Args, Debug, Clone, Default)]
pub struct DeviceArgs {
    /// Device name (defaults to the first device found)
    #[arg(short, long, default_value = "")]
    pub device: String,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List backends compiled into this build
    ListBackends,

    /// List devices found by the backend
    Devices,

    /// Show the option descriptors of a device
    Options {
        #[command(flatten)]
        device: DeviceArgs,

        /// Also show inactive options
        #[arg(short, long)]
        all: bool,
    },

    /// Read one option value
    Get {
        #[command(flatten)]
        device: DeviceArgs,

        /// Option name
        name: String,
    },

    /// Set one option value and print the side effects
    Set {
        #[command(flatten)]
        device: DeviceArgs,

        /// Option name
        name: String,

        /// New value
        value: String,
    },

    /// Scan one image to a file
    Scan {
        #[command(flatten)]
        device: DeviceArgs,

        /// Output file (.png, .jpg, .jpeg, .tif or .tiff)
        #[arg(short, long)]
        output: PathBuf,

        /// Option to set before scanning (repeatable)
        #[arg(short = 's', long = "set", value_name = "NAME=VALUE", value_parser = parse_assignment)]
        set: Vec<(String, String)>,
    },

    /// Poll device buttons and scan when one is pressed
    Monitor {
        #[command(flatten)]
        device: DeviceArgs,

        /// Monitor configuration file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Stop after this many poll cycles
        #[arg(long)]
        max_cycles: Option<u64>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_scan() {
        let cli = Cli::try_parse_from([
            "rsane",
            "-vv",
            "scan",
            "-o",
            "out.png",
            "--set",
            "mode=Color",
            "-s",
            "resolution=300",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.backend, "test");
        match cli.command {
            Commands::Scan {
                device,
                output,
                set,
            } => {
                assert_eq!(device.device, "");
                assert_eq!(output, PathBuf::from("out.png"));
                assert_eq!(
                    set,
                    vec![
                        ("mode".to_string(), "Color".to_string()),
                        ("resolution".to_string(), "300".to_string()),
                    ]
                );
            }
            _ => panic!("expected scan command"),
        }
    }

    #[test]
    fn test_bad_assignment() {
        assert!(parse_assignment("mode").is_err());
        assert_eq!(
            parse_assignment("br-x=10.5").unwrap(),
            ("br-x".to_string(), "10.5".to_string())
        );
    }
}
