//! Example: List monitors and their DDC/CI ranges.
//!
//! Run with: `cargo run --example list_monitors`

#[cfg(windows)]
fn main() -> Result<(), monbright_core::ControllerError> {
    use monbright_core::{MonitorControl, NeutralContrastSettings, Win32Channel};

    // Initialize logging (optional)
    env_logger::init();

    let control = MonitorControl::new(Win32Channel::new(), NeutralContrastSettings::new())?;

    for monitor in control.monitor_list() {
        println!("{} (MCCS {:?})", monitor.name, monitor.protocol_version);
        match monitor.brightness {
            Some(range) => println!("  brightness: {} of {}", range.current, range.max),
            None => println!("  brightness: unsupported"),
        }
        match monitor.contrast {
            Some(range) => println!(
                "  contrast:   {} of {} (neutral {})",
                range.current, range.max, range.neutral
            ),
            None => println!("  contrast:   unsupported"),
        }
    }

    println!(
        "Logical levels: brightness={:.2}, contrast={:.2} (max {:.2})",
        control.brightness(),
        control.contrast(),
        control.max_contrast()
    );

    Ok(())
}

#[cfg(not(windows))]
fn main() {
    eprintln!("DDC/CI monitor control is only available on Windows");
}
