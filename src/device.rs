use gfx_hal::{buffer, format as f};

use crate::error::{Error, Stage};

mod commands;

pub use commands::{Command, CommandList};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BufferId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ShaderId(pub(crate) usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(pub(crate) usize);

/// The presentation target is the only framebuffer a device exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FramebufferId(pub(crate) usize);

impl FramebufferId {
    pub const SWAPCHAIN: FramebufferId = FramebufferId(0);
}

/// Options requested when the device is created from the window surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceOptions {
    pub debug: bool,
    pub sync_to_vertical_blank: bool,
    pub prefer_standard_clip_space_y_direction: bool,
    pub prefer_depth_range_zero_to_one: bool,
}

impl Default for DeviceOptions {
    fn default() -> Self {
        DeviceOptions {
            debug: false,
            sync_to_vertical_blank: true,
            prefer_standard_clip_space_y_direction: true,
            prefer_depth_range_zero_to_one: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferDescription {
    pub size: u64,
    pub usage: buffer::Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderDescription {
    pub stage: Stage,
    pub source: &'static str,
    pub entry_point: &'static str,
}

/// A linked vertex + fragment pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShaderSet {
    pub vertex: ShaderId,
    pub fragment: ShaderId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VertexElement {
    pub name: &'static str,
    pub location: u32,
    pub format: f::Format,
    pub offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexLayoutDescription {
    pub stride: u32,
    pub elements: Vec<VertexElement>,
}

/// Blending disabled; the fragment output replaces the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlendState {
    SingleOverride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepthStencilState {
    Disabled,
}

/// Solid fill with back-face culling; clockwise faces are front faces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterizerState {
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveTopology {
    TriangleList,
}

/// Pixel format and sample count of a render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutputDescription {
    pub color_format: f::Format,
    pub samples: u8,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineDescription {
    pub blend: BlendState,
    pub depth_stencil: DepthStencilState,
    pub rasterizer: RasterizerState,
    pub topology: PrimitiveTopology,
    pub vertex_layouts: Vec<VertexLayoutDescription>,
    pub shaders: ShaderSet,
    /// Number of resource sets the shaders bind.
    pub resource_layouts: usize,
    pub outputs: OutputDescription,
}

/// Resource factory and submission queue for one presentation surface.
///
/// Devices own every native object they create and hand out `Copy` ids.
/// Objects live until the device itself is dropped.
pub trait GraphicsDevice {
    fn create_buffer(&mut self, desc: &BufferDescription) -> Result<BufferId, Error>;

    fn update_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), Error>;

    /// Compiles GLSL source into a shader module for `desc.stage`.
    fn create_shader(&mut self, desc: &ShaderDescription) -> Result<ShaderId, Error>;

    /// Fails when `desc.outputs` does not match the swapchain output.
    fn create_graphics_pipeline(&mut self, desc: &PipelineDescription)
        -> Result<PipelineId, Error>;

    fn create_command_list(&mut self) -> Result<CommandList, Error> {
        Ok(CommandList::new())
    }

    fn swapchain_framebuffer(&self) -> FramebufferId {
        FramebufferId::SWAPCHAIN
    }

    fn swapchain_output(&self) -> OutputDescription;

    fn submit_commands(&mut self, commands: &CommandList) -> Result<(), Error>;

    /// Presents the image rendered by the last submission.
    fn swap_buffers(&mut self) -> Result<(), Error>;
}
