mod backend;
mod device;
mod error;
mod host;
mod renderer;

#[cfg(test)]
mod mock;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use log::info;

use device::DeviceOptions;
use host::{WindowConfig, WinitHost};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum WindowKind {
    /// Let the windowing library place the window.
    Library,
    /// Place the window at (100, 100).
    Native,
}

/// Opens a window and draws a colored triangle until it is closed.
#[derive(Debug, Parser)]
#[command(name = "gfx-triangle")]
struct Args {
    #[arg(long, value_enum, default_value = "library")]
    window: WindowKind,

    /// Present without waiting for vertical blank.
    #[arg(long)]
    no_vsync: bool,
}

impl Args {
    fn window_config(&self) -> WindowConfig {
        match self.window {
            WindowKind::Library => WindowConfig::library(),
            WindowKind::Native => WindowConfig::native(),
        }
    }

    fn device_options(&self) -> DeviceOptions {
        DeviceOptions {
            sync_to_vertical_blank: !self.no_vsync,
            ..DeviceOptions::default()
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let mut host = WinitHost::new(&args.window_config()).context("failed to open window")?;
    let frames = host::run(&mut host, &args.device_options()).context("triangle renderer stopped")?;
    info!("closed after {} frames", frames);
    Ok(())
}
