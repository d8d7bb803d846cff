use log::{debug, info};

mod buffer;
mod pipeline;
mod shaders;
mod vertex;

pub use buffer::{create_triangle_buffer, GeometryBuffer};
pub use pipeline::build_pipeline;
pub use shaders::compile_triangle_shaders;
pub use vertex::Vertex;

use crate::device::{CommandList, FramebufferId, GraphicsDevice, PipelineId};
use crate::error::Error;

pub const CLEAR_COLOR: [f32; 4] = [0.1, 0.1, 0.1, 1.0];

/// Everything the frame loop needs, created once before the first frame.
pub struct RenderContext<D: GraphicsDevice> {
    device: D,
    geometry: GeometryBuffer,
    pipeline: PipelineId,
    commands: CommandList,
    frame: u64,
}

impl<D: GraphicsDevice> RenderContext<D> {
    /// Creates the buffer, shaders, layout, pipeline and command list, in that order.
    pub fn load(mut device: D) -> Result<Self, Error> {
        let geometry = create_triangle_buffer(&mut device)?;
        let shaders = compile_triangle_shaders(&mut device)?;
        let outputs = device.swapchain_output();
        let pipeline = build_pipeline(&mut device, shaders, outputs)?;
        let commands = device.create_command_list()?;
        info!(
            "triangle resources loaded ({} byte vertex buffer)",
            geometry.size
        );

        Ok(RenderContext {
            device,
            geometry,
            pipeline,
            commands,
            frame: 0,
        })
    }

    pub fn render_frame(&mut self) -> Result<(), Error> {
        record_frame(
            &mut self.commands,
            self.device.swapchain_framebuffer(),
            self.pipeline,
            &self.geometry,
        );
        self.device.submit_commands(&self.commands)?;
        self.device.swap_buffers()?;

        self.frame += 1;
        if self.frame == 1 {
            debug!("first frame presented");
        }
        Ok(())
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frame
    }
}

/// Records one frame: clear the target, then draw the triangle once.
pub fn record_frame(
    commands: &mut CommandList,
    target: FramebufferId,
    pipeline: PipelineId,
    geometry: &GeometryBuffer,
) {
    commands.begin();
    commands.set_framebuffer(target);
    commands.clear_color_target(0, CLEAR_COLOR);
    commands.set_pipeline(pipeline);
    commands.set_vertex_buffer(0, geometry.buffer);
    commands.draw(geometry.vertex_count, 1, 0, 0);
    commands.end();
}
