use log::{info, trace};

mod desktop;

pub use desktop::{WindowConfig, WinitHost};

use crate::device::{DeviceOptions, GraphicsDevice};
use crate::error::Error;
use crate::renderer::RenderContext;

/// Window and device acquisition for one window.
pub trait WindowHost {
    type Device: GraphicsDevice;

    /// Creates the graphics device backed by the window's presentation surface.
    fn create_device(&mut self, options: &DeviceOptions) -> Result<Self::Device, Error>;

    /// Processes pending platform events. Returns false once the window no longer exists.
    fn pump_events(&mut self) -> bool;
}

pub enum HostState<D: GraphicsDevice> {
    Uninitialized,
    Running(RenderContext<D>),
}

/// Loads once, then renders until the window closes. Returns the number of frames presented.
pub fn run<H: WindowHost>(host: &mut H, options: &DeviceOptions) -> Result<u64, Error> {
    let mut fps = fps_counter::FPSCounter::new();
    let mut state = HostState::Uninitialized;

    loop {
        state = match state {
            HostState::Uninitialized => {
                let device = host.create_device(options)?;
                HostState::Running(RenderContext::load(device)?)
            }
            HostState::Running(mut context) => {
                if !host.pump_events() {
                    info!("window closed after {} frames", context.frames_rendered());
                    return Ok(context.frames_rendered());
                }
                context.render_frame()?;
                trace!("fps: {}", fps.tick());
                HostState::Running(context)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockHost;

    #[test]
    fn renders_until_the_window_closes() {
        let mut host = MockHost::new(4);
        let frames = run(&mut host, &DeviceOptions::default()).unwrap();

        assert_eq!(frames, 4);
        assert_eq!(host.pumps, 5);
    }

    #[test]
    fn closed_window_renders_nothing() {
        let mut host = MockHost::new(0);
        let frames = run(&mut host, &DeviceOptions::default()).unwrap();

        assert_eq!(frames, 0);
        // The load still happens before the first pump.
        assert_eq!(host.allocations.get(), 4);
    }

    #[test]
    fn unsupported_platform_fails_before_any_allocation() {
        let mut host = MockHost::unsupported();
        let result = run(&mut host, &DeviceOptions::default());

        assert!(matches!(result, Err(Error::PlatformUnsupported)));
        assert_eq!(host.allocations.get(), 0);
        assert_eq!(host.pumps, 0);
    }

    #[test]
    fn device_is_requested_with_vsync_and_no_debug() {
        let mut host = MockHost::new(1);
        run(&mut host, &DeviceOptions::default()).unwrap();

        let options = host.options.unwrap();
        assert!(options.sync_to_vertical_blank);
        assert!(!options.debug);
        assert!(options.prefer_standard_clip_space_y_direction);
        assert!(options.prefer_depth_range_zero_to_one);
    }
}
