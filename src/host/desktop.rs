use gfx_hal::window::Extent2D;
use log::info;
use winit::dpi::{PhysicalPosition, PhysicalSize, Position, Size};
use winit::event::{Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::platform::desktop::EventLoopExtDesktop;
use winit::window::{Window, WindowBuilder};

use super::WindowHost;
use crate::backend::{back, HalDevice};
use crate::device::DeviceOptions;
use crate::error::Error;

pub const TITLE: &str = "Hello gfx - first triangle";
pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Outer position in physical pixels; `None` lets the platform decide.
    pub position: Option<(i32, i32)>,
}

impl WindowConfig {
    /// Placement left to the windowing library.
    pub fn library() -> Self {
        WindowConfig {
            title: TITLE.to_owned(),
            width: WIDTH,
            height: HEIGHT,
            position: None,
        }
    }

    /// Fixed placement at (100, 100).
    pub fn native() -> Self {
        WindowConfig {
            position: Some((100, 100)),
            ..Self::library()
        }
    }
}

/// A winit window whose events are pumped on demand from the frame loop.
pub struct WinitHost {
    event_loop: EventLoop<()>,
    window: Window,
    dims: Extent2D,
    exists: bool,
}

impl WinitHost {
    pub fn new(config: &WindowConfig) -> Result<Self, Error> {
        let event_loop = EventLoop::new();
        let window = WindowBuilder::new()
            .with_title(config.title.as_str())
            .with_inner_size(Size::Physical(PhysicalSize::new(
                config.width,
                config.height,
            )))
            .with_resizable(false)
            .build(&event_loop)
            .map_err(|err| Error::Window(err.to_string()))?;
        if let Some((x, y)) = config.position {
            window.set_outer_position(Position::Physical(PhysicalPosition::new(x, y)));
        }
        info!(
            "opened {}x{} window at {:?}",
            config.width, config.height, config.position
        );

        Ok(WinitHost {
            event_loop,
            window,
            dims: Extent2D {
                width: config.width,
                height: config.height,
            },
            exists: true,
        })
    }
}

impl WindowHost for WinitHost {
    type Device = HalDevice<back::Backend>;

    fn create_device(&mut self, options: &DeviceOptions) -> Result<Self::Device, Error> {
        HalDevice::new(&self.window, self.dims, options)
    }

    fn pump_events(&mut self) -> bool {
        if !self.exists {
            return false;
        }
        let window_id = self.window.id();
        let exists = &mut self.exists;

        // Drains what is queued, then hands control back to the frame loop.
        self.event_loop.run_return(|event, _, control_flow| {
            *control_flow = ControlFlow::Poll;
            match event {
                Event::WindowEvent {
                    event: WindowEvent::CloseRequested,
                    window_id: id,
                } if id == window_id => {
                    *exists = false;
                    *control_flow = ControlFlow::Exit;
                }
                Event::MainEventsCleared => *control_flow = ControlFlow::Exit,
                _ => {}
            }
        });

        self.exists
    }
}
