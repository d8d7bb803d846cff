use log::debug;

use crate::device::{GraphicsDevice, ShaderDescription, ShaderSet};
use crate::error::{Error, Stage};

pub const ENTRY_NAME: &str = "main";

pub const VERTEX_SHADER: &str = r#"
#version 450
layout(location = 0) in vec2 Position;
layout(location = 1) in vec4 Color;
layout(location = 0) out vec4 fsin_Color;
void main()
{
    gl_Position = vec4(Position, 0, 1);
    fsin_Color = Color;
}
"#;

pub const FRAGMENT_SHADER: &str = r#"
#version 450
layout(location = 0) in vec4 fsin_Color;
layout(location = 0) out vec4 fsout_Color;
void main()
{
    fsout_Color = fsin_Color;
}
"#;

pub fn compile_triangle_shaders<D: GraphicsDevice>(device: &mut D) -> Result<ShaderSet, Error> {
    let vertex = device.create_shader(&ShaderDescription {
        stage: Stage::Vertex,
        source: VERTEX_SHADER,
        entry_point: ENTRY_NAME,
    })?;
    let fragment = device.create_shader(&ShaderDescription {
        stage: Stage::Fragment,
        source: FRAGMENT_SHADER,
        entry_point: ENTRY_NAME,
    })?;
    debug!("compiled triangle shaders");

    Ok(ShaderSet { vertex, fragment })
}
