use gfx_hal::format as f;
use log::debug;

use super::vertex::Vertex;
use crate::device::{
    BlendState, DepthStencilState, GraphicsDevice, OutputDescription, PipelineDescription,
    PipelineId, PrimitiveTopology, RasterizerState, ShaderSet, VertexElement,
    VertexLayoutDescription,
};
use crate::error::Error;

pub fn triangle_vertex_layout() -> VertexLayoutDescription {
    VertexLayoutDescription {
        stride: Vertex::STRIDE,
        elements: vec![
            VertexElement {
                name: "Position",
                location: 0,
                format: f::Format::Rg32Sfloat,
                offset: 0,
            },
            VertexElement {
                name: "Color",
                location: 1,
                format: f::Format::Rgba32Sfloat,
                offset: 8,
            },
        ],
    }
}

pub fn build_pipeline<D: GraphicsDevice>(
    device: &mut D,
    shaders: ShaderSet,
    outputs: OutputDescription,
) -> Result<PipelineId, Error> {
    let desc = PipelineDescription {
        blend: BlendState::SingleOverride,
        depth_stencil: DepthStencilState::Disabled,
        rasterizer: RasterizerState::Default,
        topology: PrimitiveTopology::TriangleList,
        vertex_layouts: vec![triangle_vertex_layout()],
        shaders,
        resource_layouts: 0,
        outputs,
    };
    let pipeline = device.create_graphics_pipeline(&desc)?;
    debug!("created pipeline for {:?}", outputs.color_format);
    Ok(pipeline)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDevice;
    use crate::renderer::shaders::compile_triangle_shaders;

    #[test]
    fn layout_packs_position_then_color() {
        let layout = triangle_vertex_layout();
        assert_eq!(layout.stride, 24);
        assert_eq!(layout.elements.len(), 2);
        assert_eq!(
            (layout.elements[0].location, layout.elements[0].offset),
            (0, 0)
        );
        assert_eq!(layout.elements[0].format, f::Format::Rg32Sfloat);
        assert_eq!(
            (layout.elements[1].location, layout.elements[1].offset),
            (1, 8)
        );
        assert_eq!(layout.elements[1].format, f::Format::Rgba32Sfloat);
    }

    #[test]
    fn pipeline_uses_the_fixed_state() {
        let mut device = MockDevice::new();
        let shaders = compile_triangle_shaders(&mut device).unwrap();
        let outputs = device.swapchain_output();
        let pipeline = build_pipeline(&mut device, shaders, outputs).unwrap();

        let desc = device.pipeline_description(pipeline);
        assert_eq!(desc.blend, BlendState::SingleOverride);
        assert_eq!(desc.depth_stencil, DepthStencilState::Disabled);
        assert_eq!(desc.rasterizer, RasterizerState::Default);
        assert_eq!(desc.topology, PrimitiveTopology::TriangleList);
        assert_eq!(desc.shaders, shaders);
        assert_eq!(desc.resource_layouts, 0);
        assert_eq!(desc.vertex_layouts, vec![triangle_vertex_layout()]);
    }

    #[test]
    fn mismatched_output_format_is_rejected() {
        let mut device = MockDevice::new();
        let shaders = compile_triangle_shaders(&mut device).unwrap();
        let outputs = OutputDescription {
            color_format: f::Format::Rgba16Sfloat,
            ..device.swapchain_output()
        };

        match build_pipeline(&mut device, shaders, outputs) {
            Err(Error::ResourceCreation { resource, .. }) => assert_eq!(resource, "pipeline"),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn mismatched_sample_count_is_rejected() {
        let mut device = MockDevice::new();
        let shaders = compile_triangle_shaders(&mut device).unwrap();
        let outputs = OutputDescription {
            samples: 4,
            ..device.swapchain_output()
        };

        assert!(build_pipeline(&mut device, shaders, outputs).is_err());
        assert_eq!(device.pipeline_count(), 0);
    }
}
