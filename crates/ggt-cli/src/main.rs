//! gnome-gamma-tool - display calibration through colord
//!
//! Generates a video card gamma table from gamma, white point, contrast and
//! brightness settings, wraps it in an ICC profile and makes that profile the
//! display default.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use ggt_color::{Calibration, Channels, NEUTRAL_TEMPERATURE};
use ggt_colord::ManagerConfig;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;
mod confirm;
mod lock;

use lock::InstanceLock;

/// Crates whose logs are shown at the verbosity selected with `-v`.
const OWN_CRATES: [&str; 4] = ["gnome_gamma_tool", "ggt_color", "ggt_icc", "ggt_colord"];

#[derive(Parser)]
#[command(name = "gnome-gamma-tool")]
#[command(author, version, about = "Adjust display gamma, white point, contrast and brightness")]
#[command(arg_required_else_help = true)]
#[command(long_about = "
Generates an ICC profile carrying a video card gamma table and makes it the
default profile of a display through colord. Every value may be given once
for all channels or as R:G:B.

Examples:
  gnome-gamma-tool -g 0.8                 # Darken midtones on display 0
  gnome-gamma-tool -t 5000 -a             # Warmer white point on all displays
  gnome-gamma-tool -g 1:1.1:1.2 -d 1      # Per-channel gamma on display 1
  gnome-gamma-tool -c -1                  # Invert colors
  gnome-gamma-tool -m 0.05 -b 0.9 -y      # Limit output range, no prompt
  gnome-gamma-tool -r                     # Remove the generated profile
  gnome-gamma-tool -g 2.2 -o out.icc      # Write a profile, do not apply
")]
struct Cli {
    /// Display index
    #[arg(short, long, default_value_t = 0)]
    display: usize,

    /// Apply to all displays
    #[arg(short, long, conflicts_with = "display")]
    all_displays: bool,

    /// Gamma exponent (value or R:G:B)
    #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
    gamma: Channels,

    /// White point temperature in kelvin
    #[arg(short, long, default_value_t = NEUTRAL_TEMPERATURE)]
    temperature: u32,

    /// Contrast factor around mid-gray, negative inverts (value or R:G:B)
    #[arg(short, long, default_value = "1", allow_hyphen_values = true)]
    contrast: Channels,

    /// Maximum brightness (value or R:G:B)
    #[arg(short, long, default_value = "1")]
    brightness: Channels,

    /// Minimum brightness (value or R:G:B)
    #[arg(short = 'm', long, alias = "bm", default_value = "0")]
    min_brightness: Channels,

    /// Remove the profile generated by this tool
    #[arg(short, long, conflicts_with = "output_file")]
    remove: bool,

    /// Do not ask for confirmation
    #[arg(short, long)]
    yes: bool,

    /// Write the profile to a file instead of applying it
    #[arg(short, long)]
    output_file: Option<PathBuf>,

    /// Base profile for --output-file (default: built-in sRGB)
    #[arg(short, long, requires = "output_file")]
    input_file: Option<PathBuf>,

    /// List display devices
    #[arg(short, long, conflicts_with_all = ["remove", "output_file"])]
    list: bool,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    fn calibration(&self) -> Result<Calibration> {
        Calibration::new(
            self.gamma,
            self.temperature,
            self.contrast,
            self.min_brightness,
            self.brightness,
        )
        .context("Invalid calibration parameters")
    }
}

/// Default filter directives: our crates at the selected level, others at warn.
fn default_directives(verbose: u8) -> String {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let mut directives = String::from("warn");
    for name in OWN_CRATES {
        directives.push_str(&format!(",{name}={level}"));
    }
    directives
}

fn init_logging(verbose: u8) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)));
    let stderr_log = fmt::layer()
        .compact()
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr);
    tracing_subscriber::registry()
        .with(stderr_log.with_filter(filter))
        .init();
}

/// Only runs that change display settings take the instance lock.
fn needs_instance_lock(cli: &Cli) -> bool {
    cli.yes && !cli.list && cli.output_file.is_none()
}

fn acquire_lock() -> Result<InstanceLock> {
    let path = InstanceLock::default_path();
    let lock = InstanceLock::try_acquire(&path)
        .with_context(|| format!("Failed to open lock file {}", path.display()))?;
    lock.context("gnome-gamma-tool is already running")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if cli.list {
        let manager = commands::connect(ManagerConfig::user_default()?)?;
        return commands::list::run(&manager, &mut io::stdout().lock());
    }

    if let Some(output) = &cli.output_file {
        let calibration = cli.calibration()?;
        return commands::generate::run(cli.input_file.as_deref(), output, &calibration);
    }

    // Held until main returns.
    let _lock = needs_instance_lock(&cli).then(acquire_lock).transpose()?;

    if cli.remove {
        let manager = commands::connect(ManagerConfig::user_default()?)?;
        let displays = commands::select_displays(&manager, cli.display, cli.all_displays)?;
        return commands::remove::run(&manager, &displays);
    }

    let calibration = cli.calibration()?;
    let manager = commands::connect(ManagerConfig::user_default()?)?;
    let displays = commands::select_displays(&manager, cli.display, cli.all_displays)?;
    let interactive = commands::apply::needs_confirmation(cli.yes, io::stdout().is_terminal());
    commands::apply::run(&manager, &displays, &calibration, || {
        !interactive || confirm::confirm_interactively()
    })
}
