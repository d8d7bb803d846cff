#[cfg(feature = "metal")]
pub use gfx_backend_metal as back;

#[cfg(feature = "vulkan")]
pub use gfx_backend_vulkan as back;

use gfx_hal::{
    adapter::{Adapter, MemoryType},
    buffer as b, command, pool,
    prelude::*,
    pso,
    queue::{QueueGroup, Submission},
    window::{self, PresentationSurface},
    Backend, Features, Instance, Limits,
};
use log::{debug, info, warn};

use std::borrow::Borrow;
use std::iter;
use std::mem::ManuallyDrop;
use std::ptr;

mod memory;
mod pipeline;
mod swapchain;

use memory::Allocation;
use pipeline::{Pipeline, ShaderModule};
use swapchain::Swapchain;

use crate::device::{
    BufferDescription, BufferId, Command, CommandList, DeviceOptions, GraphicsDevice,
    OutputDescription, PipelineDescription, PipelineId, ShaderDescription, ShaderId,
};
use crate::error::Error;

type SwapchainImage<B> = <<B as Backend>::Surface as PresentationSurface<B>>::SwapchainImage;

/// `GraphicsDevice` on top of a gfx-hal backend, presenting to one window surface.
pub struct HalDevice<B: Backend> {
    device: B::Device,
    queue_group: QueueGroup<B>,
    memory_types: Vec<MemoryType>,
    limits: Limits,
    swapchain: ManuallyDrop<Swapchain<B>>,
    render_pass: ManuallyDrop<B::RenderPass>,
    command_pool: ManuallyDrop<B::CommandPool>,
    command_buffer: B::CommandBuffer,
    submission_complete_semaphore: ManuallyDrop<B::Semaphore>,
    submission_complete_fence: ManuallyDrop<B::Fence>,
    framebuffer: Option<B::Framebuffer>,
    acquired: Option<SwapchainImage<B>>,
    buffers: Vec<Allocation<B>>,
    shaders: Vec<ShaderModule<B>>,
    pipelines: Vec<Pipeline<B>>,
    instance: B::Instance,
}

impl<B: Backend> HalDevice<B> {
    /// Creates the surface for `native_window` first; an unrecognized window handle
    /// fails before any adapter is opened.
    pub fn new(
        native_window: &winit::window::Window,
        dims: window::Extent2D,
        options: &DeviceOptions,
    ) -> Result<Self, Error> {
        let instance =
            B::Instance::create("gfx-triangle", 1).map_err(|_| Error::BackendUnavailable)?;
        // `InitError` has a single variant: the window handle is not supported.
        let surface =
            unsafe { instance.create_surface(native_window) }.map_err(|_| Error::PlatformUnsupported)?;

        let mut adapters = instance.enumerate_adapters();
        let (adapter_index, family_index) = adapters
            .iter()
            .enumerate()
            .find_map(|(adapter_index, adapter)| {
                adapter
                    .queue_families
                    .iter()
                    .position(|family| {
                        surface.supports_queue_family(family)
                            && family.queue_type().supports_graphics()
                    })
                    .map(|family_index| (adapter_index, family_index))
            })
            .ok_or(Error::NoSuitableAdapter)?;
        let adapter = adapters.swap_remove(adapter_index);
        info!("using adapter {}", adapter.info.name);

        let features = Self::requested_features(&adapter, options);
        let mut gpu = unsafe {
            adapter
                .physical_device
                .open(&[(&adapter.queue_families[family_index], &[1.0])], features)
        }
        .map_err(|err| Error::resource_failed("logical device", err))?;
        let queue_group = gpu
            .queue_groups
            .pop()
            .ok_or_else(|| Error::resource("logical device", "no queue group"))?;
        let device = gpu.device;

        let memory_types = adapter.physical_device.memory_properties().memory_types;
        let limits = adapter.physical_device.limits();

        let swapchain = Swapchain::new(&device, surface, &adapter, dims, options)?;
        let render_pass = swapchain::create_render_pass::<B>(&device, swapchain.format)?;

        let mut command_pool = unsafe {
            device.create_command_pool(queue_group.family, pool::CommandPoolCreateFlags::empty())
        }
        .map_err(|err| Error::resource_failed("command pool", err))?;
        let command_buffer = unsafe { command_pool.allocate_one(command::Level::Primary) };
        let submission_complete_semaphore = device
            .create_semaphore()
            .map_err(|err| Error::resource_failed("semaphore", err))?;
        let submission_complete_fence = device
            .create_fence(true)
            .map_err(|err| Error::resource_failed("fence", err))?;

        Ok(HalDevice {
            device,
            queue_group,
            memory_types,
            limits,
            swapchain: ManuallyDrop::new(swapchain),
            render_pass: ManuallyDrop::new(render_pass),
            command_pool: ManuallyDrop::new(command_pool),
            command_buffer,
            submission_complete_semaphore: ManuallyDrop::new(submission_complete_semaphore),
            submission_complete_fence: ManuallyDrop::new(submission_complete_fence),
            framebuffer: None,
            acquired: None,
            buffers: Vec::new(),
            shaders: Vec::new(),
            pipelines: Vec::new(),
            instance,
        })
    }

    fn requested_features(adapter: &Adapter<B>, options: &DeviceOptions) -> Features {
        let mut features = Features::empty();
        if options.prefer_standard_clip_space_y_direction {
            if adapter.physical_device.features().contains(Features::NDC_Y_UP) {
                features |= Features::NDC_Y_UP;
            } else {
                warn!("adapter cannot flip clip space Y, using the backend's native direction");
            }
        }
        if options.debug {
            warn!("debug layers are selected by the loader environment, not by this device");
        }
        features
    }

    /// Replays a finished command list into the backend command buffer.
    unsafe fn record(
        &mut self,
        commands: &CommandList,
        framebuffer: &B::Framebuffer,
    ) -> Result<(), Error> {
        let viewport = self.swapchain.viewport.clone();
        let cmd_buffer = &mut self.command_buffer;
        let mut in_render_pass = false;

        for recorded in commands.commands() {
            match *recorded {
                Command::Begin => {
                    cmd_buffer.begin_primary(command::CommandBufferFlags::ONE_TIME_SUBMIT);
                    cmd_buffer.set_viewports(0, &[viewport.clone()]);
                    cmd_buffer.set_scissors(0, &[viewport.rect]);
                }
                Command::SetFramebuffer(_) => {
                    cmd_buffer.begin_render_pass(
                        &self.render_pass,
                        framebuffer,
                        viewport.rect,
                        iter::empty::<command::ClearValue>(),
                        command::SubpassContents::Inline,
                    );
                    in_render_pass = true;
                }
                Command::ClearColorTarget { index, color } => {
                    cmd_buffer.clear_attachments(
                        iter::once(command::AttachmentClear::Color {
                            index: index as usize,
                            value: command::ClearColor { float32: color },
                        }),
                        iter::once(pso::ClearRect {
                            rect: viewport.rect,
                            layers: 0..1,
                        }),
                    );
                }
                Command::SetPipeline(id) => {
                    let pipeline = self
                        .pipelines
                        .get(id.0)
                        .ok_or_else(|| Error::submission("unknown pipeline"))?;
                    cmd_buffer.bind_graphics_pipeline(&pipeline.pipeline);
                }
                Command::SetVertexBuffer { slot, buffer } => {
                    let allocation = self
                        .buffers
                        .get(buffer.0)
                        .ok_or_else(|| Error::submission("unknown vertex buffer"))?;
                    cmd_buffer.bind_vertex_buffers(
                        slot,
                        iter::once((&allocation.buffer, b::SubRange::WHOLE)),
                    );
                }
                Command::Draw {
                    vertex_count,
                    instance_count,
                    first_vertex,
                    first_instance,
                } => {
                    cmd_buffer.draw(
                        first_vertex..first_vertex + vertex_count,
                        first_instance..first_instance + instance_count,
                    );
                }
                Command::End => {
                    if in_render_pass {
                        cmd_buffer.end_render_pass();
                        in_render_pass = false;
                    }
                    cmd_buffer.finish();
                }
            }
        }
        Ok(())
    }
}

impl<B: Backend> GraphicsDevice for HalDevice<B> {
    fn create_buffer(&mut self, desc: &BufferDescription) -> Result<BufferId, Error> {
        let allocation = Allocation::new(
            &self.device,
            desc.size,
            desc.usage,
            &self.memory_types,
            &self.limits,
        )?;
        self.buffers.push(allocation);
        debug!("created {} byte buffer", desc.size);
        Ok(BufferId(self.buffers.len() - 1))
    }

    fn update_buffer(&mut self, buffer: BufferId, offset: u64, data: &[u8]) -> Result<(), Error> {
        self.buffers
            .get(buffer.0)
            .ok_or_else(|| Error::resource("buffer", "unknown buffer"))?
            .write(&self.device, offset, data)
    }

    fn create_shader(&mut self, desc: &ShaderDescription) -> Result<ShaderId, Error> {
        let shader = pipeline::compile_shader::<B>(&self.device, desc)?;
        self.shaders.push(shader);
        debug!("created {} shader module", desc.stage);
        Ok(ShaderId(self.shaders.len() - 1))
    }

    fn create_graphics_pipeline(
        &mut self,
        desc: &PipelineDescription,
    ) -> Result<PipelineId, Error> {
        let output = self.swapchain_output();
        if desc.outputs != output {
            return Err(Error::resource(
                "pipeline",
                format!("outputs {:?} do not match swapchain {:?}", desc.outputs, output),
            ));
        }
        let pipeline = Pipeline::new(&self.device, desc, &self.shaders, &self.render_pass)?;
        self.pipelines.push(pipeline);
        Ok(PipelineId(self.pipelines.len() - 1))
    }

    fn swapchain_output(&self) -> OutputDescription {
        OutputDescription {
            color_format: self.swapchain.format,
            samples: 1,
        }
    }

    fn submit_commands(&mut self, commands: &CommandList) -> Result<(), Error> {
        if !commands.is_finished() {
            return Err(Error::submission("command list was not ended"));
        }

        unsafe {
            let fence = &*self.submission_complete_fence;
            self.device
                .wait_for_fence(fence, !0)
                .map_err(Error::submission_failed)?;
            self.device.reset_fence(fence).map_err(Error::submission_failed)?;
            if let Some(framebuffer) = self.framebuffer.take() {
                self.device.destroy_framebuffer(framebuffer);
            }
            self.command_pool.reset(false);
        }

        let surface_image = unsafe { self.swapchain.surface.acquire_image(!0) }
            .map(|(image, _suboptimal)| image)
            .map_err(Error::submission_failed)?;
        let framebuffer = {
            let view: &B::ImageView = surface_image.borrow();
            unsafe {
                self.device.create_framebuffer(
                    &self.render_pass,
                    iter::once(view),
                    self.swapchain.image_extent(),
                )
            }
            .map_err(Error::submission_failed)?
        };

        unsafe {
            self.record(commands, &framebuffer)?;

            let submission = Submission {
                command_buffers: iter::once(&self.command_buffer),
                wait_semaphores: None,
                signal_semaphores: iter::once(&*self.submission_complete_semaphore),
            };
            self.queue_group.queues[0].submit(submission, Some(&*self.submission_complete_fence));
        }

        self.framebuffer = Some(framebuffer);
        self.acquired = Some(surface_image);
        Ok(())
    }

    fn swap_buffers(&mut self) -> Result<(), Error> {
        let surface_image = self
            .acquired
            .take()
            .ok_or_else(|| Error::submission("no rendered image to present"))?;
        unsafe {
            self.queue_group.queues[0].present_surface(
                &mut self.swapchain.surface,
                surface_image,
                Some(&*self.submission_complete_semaphore),
            )
        }
        .map(|_suboptimal| ())
        .map_err(Error::submission_failed)
    }
}

impl<B: Backend> Drop for HalDevice<B> {
    fn drop(&mut self) {
        if let Err(err) = self.device.wait_idle() {
            warn!("device did not go idle before teardown: {:?}", err);
        }
        unsafe {
            self.acquired.take();
            if let Some(framebuffer) = self.framebuffer.take() {
                self.device.destroy_framebuffer(framebuffer);
            }
            for pipeline in self.pipelines.drain(..) {
                pipeline.destroy(&self.device);
            }
            for shader in self.shaders.drain(..) {
                self.device.destroy_shader_module(shader.module);
            }
            for allocation in self.buffers.drain(..) {
                allocation.destroy(&self.device);
            }
            self.device
                .destroy_semaphore(ManuallyDrop::into_inner(ptr::read(
                    &self.submission_complete_semaphore,
                )));
            self.device
                .destroy_fence(ManuallyDrop::into_inner(ptr::read(
                    &self.submission_complete_fence,
                )));
            self.device
                .destroy_command_pool(ManuallyDrop::into_inner(ptr::read(&self.command_pool)));
            self.device
                .destroy_render_pass(ManuallyDrop::into_inner(ptr::read(&self.render_pass)));

            let mut swapchain = ManuallyDrop::into_inner(ptr::read(&self.swapchain));
            swapchain.surface.unconfigure_swapchain(&self.device);
            self.instance.destroy_surface(swapchain.surface);
        }
    }
}
