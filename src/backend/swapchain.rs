use gfx_hal::{adapter::Adapter, format as f, image as i, pass, prelude::*, pso, window, Backend};
use log::{info, warn};

use crate::device::DeviceOptions;
use crate::error::Error;

pub struct Swapchain<B: Backend> {
    pub surface: B::Surface,
    pub viewport: pso::Viewport,
    pub extent: window::Extent2D,
    pub format: f::Format,
}

impl<B: Backend> Swapchain<B> {
    pub fn new(
        device: &B::Device,
        mut surface: B::Surface,
        adapter: &Adapter<B>,
        dims: window::Extent2D,
        options: &DeviceOptions,
    ) -> Result<Self, Error> {
        let caps = surface.capabilities(&adapter.physical_device);
        let formats = surface.supported_formats(&adapter.physical_device);
        let format = choose_format(formats);

        let mut swap_config = window::SwapchainConfig::from_caps(&caps, format, dims);
        swap_config.present_mode = if options.sync_to_vertical_blank {
            window::PresentMode::FIFO
        } else if caps.present_modes.contains(window::PresentMode::IMMEDIATE) {
            window::PresentMode::IMMEDIATE
        } else {
            warn!("surface has no immediate present mode, keeping vsync");
            window::PresentMode::FIFO
        };
        let extent = swap_config.extent;

        unsafe {
            surface
                .configure_swapchain(device, swap_config)
                .map_err(|err| Error::resource_failed("swapchain", err))?;
        }
        info!(
            "swapchain {}x{} {:?}",
            extent.width, extent.height, format
        );

        if !options.prefer_depth_range_zero_to_one {
            warn!("only the 0..1 depth range is supported");
        }
        let viewport = pso::Viewport {
            rect: pso::Rect {
                x: 0,
                y: 0,
                w: extent.width as _,
                h: extent.height as _,
            },
            depth: 0.0..1.0,
        };

        Ok(Swapchain {
            surface,
            viewport,
            extent,
            format,
        })
    }

    pub fn image_extent(&self) -> i::Extent {
        i::Extent {
            width: self.extent.width,
            height: self.extent.height,
            depth: 1,
        }
    }
}

/// Linear 8-bit color first, so clear and vertex colors are written without
/// gamma encoding. `None` means the surface accepts any format.
fn choose_format(formats: Option<Vec<f::Format>>) -> f::Format {
    let formats = match formats {
        Some(formats) => formats,
        None => return f::Format::Bgra8Unorm,
    };
    formats
        .iter()
        .find(|format| matches!(format, f::Format::Bgra8Unorm | f::Format::Rgba8Unorm))
        .or_else(|| {
            formats
                .iter()
                .find(|format| format.base_format().1 == f::ChannelType::Unorm)
        })
        .or_else(|| formats.first())
        .copied()
        .unwrap_or(f::Format::Bgra8Unorm)
}

/// Single color attachment in the swapchain format. Clearing happens through
/// recorded clear commands, so the load op leaves the contents undefined.
pub fn create_render_pass<B: Backend>(
    device: &B::Device,
    format: f::Format,
) -> Result<B::RenderPass, Error> {
    let attachment = pass::Attachment {
        format: Some(format),
        samples: 1,
        ops: pass::AttachmentOps::new(
            pass::AttachmentLoadOp::DontCare,
            pass::AttachmentStoreOp::Store,
        ),
        stencil_ops: pass::AttachmentOps::DONT_CARE,
        layouts: i::Layout::Undefined..i::Layout::Present,
    };

    let subpass = pass::SubpassDesc {
        colors: &[(0, i::Layout::ColorAttachmentOptimal)],
        depth_stencil: None,
        inputs: &[],
        resolves: &[],
        preserves: &[],
    };

    unsafe { device.create_render_pass(&[attachment], &[subpass], &[]) }
        .map_err(|err| Error::resource_failed("render pass", err))
}
