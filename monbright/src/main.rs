mod error;
mod settings;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{info, warn};
use monbright_core::{ControllerError, MonitorChannel, MonitorControl, MonitorRecord};

use crate::error::CliError;
use crate::settings::Settings;

/// Adjust brightness and contrast of all attached monitors at once
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file, defaults to `monbright/settings.toml` in the user config directory
    #[arg(long, value_name = "path")]
    settings: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
enum Command {
    /// Show every monitor and what it supports.
    List,

    /// Print the current brightness and contrast as percentages.
    Get,

    /// Set the brightness of all monitors.
    Brightness {
        #[arg(value_name = "percent")]
        percent: f64,
    },

    /// Set the contrast of all monitors, 100 being each monitor's neutral contrast.
    Contrast {
        #[arg(value_name = "percent")]
        percent: f64,
    },

    /// Save the neutral contrast of a monitor, in hardware units.
    Neutral {
        /// Monitor name as shown by `list`.
        name: String,

        #[arg(required_unless_present = "reset")]
        value: Option<u32>,

        /// Forget the saved value and use the monitor's maximum again.
        #[arg(long, conflicts_with = "value")]
        reset: bool,
    },

    /// Store each monitor's current contrast as its neutral contrast.
    ///
    /// Dial in the desired contrast with the monitor's own buttons first.
    Calibrate,
}

fn main() -> Result<(), CliError> {
    env_logger::init();
    let args = Args::parse();

    let path = match args.settings {
        Some(path) => path,
        None => settings::default_path().ok_or(CliError::NoConfigDir)?,
    };
    let settings = Settings::load(&path)?;

    let mut control = MonitorControl::new(open_channel()?, settings.neutral_contrast.clone())?;
    run(&mut control, args.command, settings, &path)
}

#[cfg(windows)]
fn open_channel() -> Result<monbright_core::Win32Channel, CliError> {
    Ok(monbright_core::Win32Channel::new())
}

#[cfg(not(windows))]
fn open_channel() -> Result<monbright_core::MockChannel, CliError> {
    Err(CliError::Unsupported)
}

fn run<C: MonitorChannel>(
    control: &mut MonitorControl<C>,
    command: Command,
    mut settings: Settings,
    path: &Path,
) -> Result<(), CliError> {
    match command {
        Command::List => {
            let monitors = control.monitor_list();
            if monitors.is_empty() {
                return Err(CliError::NoMonitors);
            }
            for (i, monitor) in monitors.iter().enumerate() {
                if i > 0 {
                    println!();
                }
                print!("{}", describe(monitor));
            }
        }

        Command::Get => {
            require_monitors(control)?;
            println!("brightness: {}", percent_text(control.brightness()));
            println!(
                "contrast: {} (max {})",
                percent_text(control.contrast()),
                percent_text(control.max_contrast())
            );
        }

        Command::Brightness { percent } => {
            require_monitors(control)?;
            best_effort(control.set_brightness(percent / 100.0))?;
        }

        Command::Contrast { percent } => {
            require_monitors(control)?;
            // `f64::min` would turn NaN into the maximum.
            let level = percent / 100.0;
            let level = if level > control.max_contrast() {
                control.max_contrast()
            } else {
                level
            };
            best_effort(control.set_contrast(level))?;
        }

        Command::Neutral { name, value, reset } => {
            if !control.monitor_list().iter().any(|m| m.name == name) {
                warn!("no connected monitor is called '{}'", name);
            }
            match value {
                Some(value) if !reset => {
                    settings.neutral_contrast.insert(name, value);
                }
                _ => {
                    settings.neutral_contrast.remove(&name);
                }
            }
            settings.save(path)?;
            best_effort(control.update_settings(settings.neutral_contrast))?;
        }

        Command::Calibrate => {
            let result = control.calibrate_neutral_contrast();
            settings.neutral_contrast = control.settings().clone();
            settings.save(path)?;
            best_effort(result)?;
            for monitor in control.monitor_list() {
                if let Some(range) = monitor.contrast {
                    println!("{}: neutral contrast {}", monitor.name, range.neutral);
                }
            }
        }
    }

    Ok(())
}

fn require_monitors<C: MonitorChannel>(control: &MonitorControl<C>) -> Result<(), CliError> {
    if control.has_any_supported_monitors() {
        Ok(())
    } else {
        Err(CliError::NoMonitors)
    }
}

/// One unreachable monitor must not make the whole command fail.
fn best_effort(result: Result<(), ControllerError>) -> Result<(), CliError> {
    match result {
        Err(ControllerError::WriteFailed(failures) | ControllerError::ReadFailed(failures)) => {
            for failure in failures {
                warn!("{}", failure);
            }
            Ok(())
        }
        other => {
            other?;
            info!("all monitors updated");
            Ok(())
        }
    }
}

fn percent_text(level: f64) -> String {
    format!("{:.0}%", level * 100.0)
}

fn describe(monitor: &MonitorRecord) -> String {
    let version = if monitor.protocol_version.is_empty() {
        "—"
    } else {
        monitor.protocol_version.as_str()
    };

    let brightness = match monitor.brightness {
        Some(range) => format!("Yes (0 - {})", range.max),
        None => "No".to_string(),
    };

    let contrast = match monitor.contrast {
        Some(range) => format!("Yes (0 - {}) / {}", range.max, range.neutral),
        None => "No".to_string(),
    };

    format!(
        "{}\n • MCCS version: {}\n • Brightness supported: {}\n • Contrast supported: {}\n",
        monitor.name, version, brightness, contrast
    )
}
