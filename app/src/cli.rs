//! Command line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use label_engine::{CheckDigitPolicy, OutputFormat, TitlePlacement};

use crate::config::AppConfig;
use crate::config::validation::validate_setting;

/// Employee badge barcode studio
#[derive(Parser, Debug)]
#[command(
    name = "badge-studio",
    version,
    about = "Turn employee IDs into UPC-A barcodes and printable badge labels",
    long_about = "Turn employee IDs into UPC-A barcodes and printable badge labels.

Settings come from built-in defaults, an optional JSON file (--config),
a .env file and BADGE_* environment variables, in that order.

Usage:
  badge-studio generate 00123 --svg preview.svg
  badge-studio export 00123 --out labels --format png
  badge-studio interactive"
)]
pub struct Cli {
    /// JSON settings file
    #[arg(short, long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Encode an identifier and preview the barcode
    Generate {
        /// Employee identifier; non-digits are ignored
        id: String,

        /// Also write an SVG preview
        #[arg(long, value_name = "PATH")]
        svg: Option<PathBuf>,
    },
    /// Encode an identifier and write the badge label image
    Export {
        /// Employee identifier; non-digits are ignored
        id: String,

        #[command(flatten)]
        overrides: ExportOverrides,
    },
    /// Prompt for identifiers and export on request
    Interactive {
        #[command(flatten)]
        overrides: ExportOverrides,
    },
    /// Render the badge-sheet QR code
    Qr {
        /// PNG output path; prints to the terminal when omitted
        #[arg(short, long, value_name = "PATH")]
        out: Option<PathBuf>,
    },
    /// Show a live clock in the configured time zone
    Clock {
        /// Stop after this many seconds
        #[arg(long)]
        ticks: Option<u64>,
    },
    /// Print the effective settings as JSON
    Settings,
}

/// Per-invocation overrides of the export settings.
#[derive(Args, Debug, Default, Clone)]
pub struct ExportOverrides {
    /// Output directory
    #[arg(short, long, value_name = "DIR")]
    pub out: Option<PathBuf>,

    /// jpeg or png
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// split (title above, id below) or stacked
    #[arg(long)]
    pub layout: Option<TitlePlacement>,

    /// File name prefix, e.g. upc_
    #[arg(long)]
    pub prefix: Option<String>,

    /// Recompute the check digit of 12-digit input instead of trusting it
    #[arg(long)]
    pub recompute_check_digit: bool,
}

impl ExportOverrides {
    /// Apply the overrides on top of the loaded configuration.
    pub fn apply(&self, config: &mut AppConfig) -> Result<(), String> {
        if let Some(dir) = &self.out {
            config.output_dir = dir.clone();
        }
        if let Some(format) = self.format {
            config.output_format = format;
        }
        if let Some(layout) = self.layout {
            config.label.layout.placement = layout;
        }
        if let Some(prefix) = &self.prefix {
            validate_setting("BADGE_FILENAME_PREFIX", prefix).map_err(|e| format!("--prefix: {e}"))?;
            config.filename_prefix = prefix.clone();
        }
        if self.recompute_check_digit {
            config.check_digit_policy = CheckDigitPolicy::AlwaysRecompute;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_export_with_overrides() {
        let cli = Cli::parse_from([
            "badge-studio",
            "-v",
            "export",
            "00-123",
            "--format",
            "png",
            "--layout",
            "stacked",
            "--prefix",
            "upc_",
            "--recompute-check-digit",
            "--config",
            "settings.json",
        ]);
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("settings.json")));
        let Command::Export { id, overrides } = cli.command else {
            panic!("expected export");
        };
        assert_eq!(id, "00-123");

        let mut config = AppConfig::default();
        overrides.apply(&mut config).unwrap();
        assert_eq!(config.output_format, OutputFormat::Png);
        assert_eq!(config.label.layout.placement, TitlePlacement::Stacked);
        assert_eq!(config.filename_prefix, "upc_");
        assert_eq!(config.check_digit_policy, CheckDigitPolicy::AlwaysRecompute);
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["badge-studio", "export", "1", "--format", "gif"]).is_err());
    }

    #[test]
    fn rejects_path_like_prefix() {
        let overrides = ExportOverrides {
            prefix: Some("../x".into()),
            ..ExportOverrides::default()
        };
        assert!(overrides.apply(&mut AppConfig::default()).is_err());
    }

    #[test]
    fn empty_overrides_change_nothing() {
        let mut config = AppConfig::default();
        ExportOverrides::default().apply(&mut config).unwrap();
        assert_eq!(config.output_format, OutputFormat::Jpeg);
        assert_eq!(config.check_digit_policy, CheckDigitPolicy::TrustTwelve);
    }
}
