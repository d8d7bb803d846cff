use gfx_hal::{pass::Subpass, prelude::*, pso, Backend};
use std::iter;
use std::ops::Range;

use crate::device::{
    BlendState, DepthStencilState, PipelineDescription, PrimitiveTopology, RasterizerState,
    ShaderDescription,
};
use crate::error::{Error, Stage};

pub struct ShaderModule<B: Backend> {
    pub module: B::ShaderModule,
    pub entry: &'static str,
    pub stage: Stage,
}

/// GLSL -> SPIR-V -> backend shader module.
pub fn compile_shader<B: Backend>(
    device: &B::Device,
    desc: &ShaderDescription,
) -> Result<ShaderModule<B>, Error> {
    let ty = match desc.stage {
        Stage::Vertex => glsl_to_spirv::ShaderType::Vertex,
        Stage::Fragment => glsl_to_spirv::ShaderType::Fragment,
    };
    let file = glsl_to_spirv::compile(desc.source, ty).map_err(|log| Error::ShaderCompilation {
        stage: desc.stage,
        log,
    })?;
    let spirv =
        pso::read_spirv(file).map_err(|err| Error::resource_failed("shader module", err))?;
    let module = unsafe { device.create_shader_module(&spirv) }
        .map_err(|err| Error::resource_failed("shader module", err))?;

    Ok(ShaderModule {
        module,
        entry: desc.entry_point,
        stage: desc.stage,
    })
}

/// Solid fill, back faces culled, clockwise front faces, depth clipping on.
fn rasterizer(state: RasterizerState) -> pso::Rasterizer {
    match state {
        RasterizerState::Default => pso::Rasterizer {
            cull_face: pso::Face::BACK,
            front_face: pso::FrontFace::Clockwise,
            depth_clamping: false,
            ..pso::Rasterizer::FILL
        },
    }
}

pub struct Pipeline<B: Backend> {
    pub pipeline: B::GraphicsPipeline,
    pub pipeline_layout: B::PipelineLayout,
}

impl<B: Backend> Pipeline<B> {
    pub fn new(
        device: &B::Device,
        desc: &PipelineDescription,
        shaders: &[ShaderModule<B>],
        render_pass: &B::RenderPass,
    ) -> Result<Self, Error> {
        let vs = Self::shader(shaders, desc.shaders.vertex.0, Stage::Vertex)?;
        let fs = Self::shader(shaders, desc.shaders.fragment.0, Stage::Fragment)?;
        if desc.resource_layouts != 0 {
            return Err(Error::resource("pipeline layout", "resource layouts are not supported"));
        }

        let pipeline_layout = unsafe {
            device.create_pipeline_layout(
                iter::empty::<B::DescriptorSetLayout>(),
                iter::empty::<(pso::ShaderStageFlags, Range<u32>)>(),
            )
        }
        .map_err(|err| Error::resource_failed("pipeline layout", err))?;

        let result = {
            let shader_entries = pso::GraphicsShaderSet {
                vertex: pso::EntryPoint {
                    entry: vs.entry,
                    module: &vs.module,
                    specialization: pso::Specialization::default(),
                },
                hull: None,
                domain: None,
                geometry: None,
                fragment: Some(pso::EntryPoint {
                    entry: fs.entry,
                    module: &fs.module,
                    specialization: pso::Specialization::default(),
                }),
            };

            let subpass = Subpass {
                index: 0,
                main_pass: render_pass,
            };

            let primitive = match desc.topology {
                PrimitiveTopology::TriangleList => pso::Primitive::TriangleList,
            };
            let rasterizer = rasterizer(desc.rasterizer);

            let mut pipeline_desc = pso::GraphicsPipelineDesc::new(
                shader_entries,
                primitive,
                rasterizer,
                &pipeline_layout,
                subpass,
            );

            match desc.blend {
                BlendState::SingleOverride => {
                    pipeline_desc.blender.targets.push(pso::ColorBlendDesc {
                        mask: pso::ColorMask::ALL,
                        blend: None,
                    })
                }
            }
            // The default description has depth and stencil tests off.
            match desc.depth_stencil {
                DepthStencilState::Disabled => {}
            }

            for (binding, layout) in desc.vertex_layouts.iter().enumerate() {
                let binding = binding as u32;
                pipeline_desc.vertex_buffers.push(pso::VertexBufferDesc {
                    binding,
                    stride: layout.stride,
                    rate: pso::VertexInputRate::Vertex,
                });
                for element in &layout.elements {
                    pipeline_desc.attributes.push(pso::AttributeDesc {
                        location: element.location,
                        binding,
                        element: pso::Element {
                            format: element.format,
                            offset: element.offset,
                        },
                    });
                }
            }

            unsafe { device.create_graphics_pipeline(&pipeline_desc, None) }
        };

        match result {
            Ok(pipeline) => Ok(Pipeline {
                pipeline,
                pipeline_layout,
            }),
            Err(err) => {
                unsafe { device.destroy_pipeline_layout(pipeline_layout) };
                Err(Error::resource_failed("pipeline", err))
            }
        }
    }

    pub unsafe fn destroy(self, device: &B::Device) {
        device.destroy_graphics_pipeline(self.pipeline);
        device.destroy_pipeline_layout(self.pipeline_layout);
    }

    fn shader(
        shaders: &[ShaderModule<B>],
        index: usize,
        stage: Stage,
    ) -> Result<&ShaderModule<B>, Error> {
        match shaders.get(index) {
            Some(shader) if shader.stage == stage => Ok(shader),
            Some(shader) => Err(Error::resource(
                "pipeline",
                format!("{} shader bound to the {} stage", shader.stage, stage),
            )),
            None => Err(Error::resource("pipeline", "unknown shader")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rasterizer_culls_counter_clockwise_faces() {
        let state = rasterizer(RasterizerState::Default);
        assert!(matches!(state.polygon_mode, pso::PolygonMode::Fill));
        assert_eq!(state.cull_face, pso::Face::BACK);
        assert_eq!(state.front_face, pso::FrontFace::Clockwise);
        assert!(!state.depth_clamping);
    }
}
