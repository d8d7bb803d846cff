//! In-memory device and host used by the unit tests.

use std::cell::Cell;
use std::rc::Rc;

use gfx_hal::format as f;

use crate::device::{
    BufferDescription, BufferId, CommandList, DeviceOptions, GraphicsDevice, OutputDescription,
    PipelineDescription, PipelineId, ShaderDescription, ShaderId,
};
use crate::error::{Error, Stage};
use crate::host::WindowHost;
use crate::renderer::Vertex;

/// Records every allocation, upload and submission it receives.
pub struct MockDevice {
    allocations: Rc<Cell<usize>>,
    buffers: Vec<(BufferDescription, Vec<u8>)>,
    shaders: Vec<ShaderDescription>,
    pipelines: Vec<PipelineDescription>,
    submissions: Vec<CommandList>,
    pending_present: bool,
    presents: usize,
    fail_buffers: bool,
    fail_stage: Option<Stage>,
    fail_submit: bool,
}

impl MockDevice {
    pub fn new() -> Self {
        Self::with_counter(Rc::new(Cell::new(0)))
    }

    pub fn with_counter(allocations: Rc<Cell<usize>>) -> Self {
        MockDevice {
            allocations,
            buffers: Vec::new(),
            shaders: Vec::new(),
            pipelines: Vec::new(),
            submissions: Vec::new(),
            pending_present: false,
            presents: 0,
            fail_buffers: false,
            fail_stage: None,
            fail_submit: false,
        }
    }

    pub fn fail_buffer_creation(&mut self) {
        self.fail_buffers = true;
    }

    pub fn fail_shader_compilation(&mut self, stage: Stage) {
        self.fail_stage = Some(stage);
    }

    pub fn fail_submission(&mut self) {
        self.fail_submit = true;
    }

    pub fn buffer_count(&self) -> usize {
        self.buffers.len()
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn pipeline_count(&self) -> usize {
        self.pipelines.len()
    }

    pub fn buffer_description(&self, id: BufferId) -> BufferDescription {
        self.buffers[id.0].0
    }

    pub fn buffer_bytes(&self, id: BufferId) -> &[u8] {
        &self.buffers[id.0].1
    }

    pub fn buffer_vertices(&self, id: BufferId) -> Vec<Vertex> {
        self.buffer_bytes(id)
            .chunks_exact(Vertex::STRIDE as usize)
            .map(bytemuck::pod_read_unaligned)
            .collect()
    }

    pub fn shader_description(&self, id: ShaderId) -> ShaderDescription {
        self.shaders[id.0]
    }

    pub fn pipeline_description(&self, id: PipelineId) -> &PipelineDescription {
        &self.pipelines[id.0]
    }

    pub fn submissions(&self) -> &[CommandList] {
        &self.submissions
    }

    pub fn presents(&self) -> usize {
        self.presents
    }

    fn allocate(&self) {
        self.allocations.set(self.allocations.get() + 1);
    }
}

impl GraphicsDevice for MockDevice {
    fn create_buffer(&mut self, desc: &BufferDescription) -> Result<BufferId, Error> {
        if self.fail_buffers {
            return Err(Error::resource("buffer", "out of device memory"));
        }
        self.allocate();
        self.buffers.push((*desc, vec![0; desc.size as usize]));
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn update_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), Error> {
        let bytes = &mut self.buffers[buffer.0].1;
        let start = offset as usize;
        let end = start + data.len();
        if end > bytes.len() {
            return Err(Error::resource("buffer", "upload past end of buffer"));
        }
        bytes[start..end].copy_from_slice(data);
        Ok(())
    }

    fn create_shader(&mut self, desc: &ShaderDescription) -> Result<ShaderId, Error> {
        if self.fail_stage == Some(desc.stage) {
            return Err(Error::ShaderCompilation {
                stage: desc.stage,
                log: "ERROR: 0:1: '' : syntax error".into(),
            });
        }
        self.allocate();
        self.shaders.push(*desc);
        Ok(ShaderId(self.shaders.len() - 1))
    }

    fn create_graphics_pipeline(
        &mut self,
        desc: &PipelineDescription,
    ) -> Result<PipelineId, Error> {
        if desc.outputs != self.swapchain_output() {
            return Err(Error::resource("pipeline", "output description mismatch"));
        }
        self.allocate();
        self.pipelines.push(desc.clone());
        Ok(PipelineId(self.pipelines.len() - 1))
    }

    fn swapchain_output(&self) -> OutputDescription {
        OutputDescription {
            color_format: f::Format::Bgra8Unorm,
            samples: 1,
        }
    }

    fn submit_commands(&mut self, commands: &CommandList) -> Result<(), Error> {
        if self.fail_submit {
            return Err(Error::submission("device lost"));
        }
        if !commands.is_finished() {
            return Err(Error::submission("command list was not ended"));
        }
        self.submissions.push(commands.clone());
        self.pending_present = true;
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), Error> {
        if !self.pending_present {
            return Err(Error::submission("nothing to present"));
        }
        self.pending_present = false;
        self.presents += 1;
        Ok(())
    }
}

/// Stays open for a fixed number of event pumps.
pub struct MockHost {
    pub allocations: Rc<Cell<usize>>,
    pub unsupported: bool,
    pub open_for: usize,
    pub pumps: usize,
    pub options: Option<DeviceOptions>,
}

impl MockHost {
    pub fn new(open_for: usize) -> Self {
        MockHost {
            allocations: Rc::new(Cell::new(0)),
            unsupported: false,
            open_for,
            pumps: 0,
            options: None,
        }
    }

    pub fn unsupported() -> Self {
        MockHost {
            unsupported: true,
            ..MockHost::new(0)
        }
    }
}

impl WindowHost for MockHost {
    type Device = MockDevice;

    fn create_device(&mut self, options: &DeviceOptions) -> Result<MockDevice, Error> {
        self.options = Some(options.clone());
        if self.unsupported {
            return Err(Error::PlatformUnsupported);
        }
        Ok(MockDevice::with_counter(Rc::clone(&self.allocations)))
    }

    fn pump_events(&mut self) -> bool {
        self.pumps += 1;
        self.pumps <= self.open_for
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::CommandList;

    #[test]
    fn unfinished_list_is_rejected() {
        let mut device = MockDevice::new();
        let mut list = CommandList::new();
        list.begin();

        assert!(matches!(
            device.submit_commands(&list),
            Err(Error::Submission(_))
        ));
        assert!(device.swap_buffers().is_err());
    }
}
