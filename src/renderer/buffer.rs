use gfx_hal::buffer;
use log::debug;

use super::vertex::{Vertex, TRIANGLE};
use crate::device::{BufferDescription, BufferId, GraphicsDevice};
use crate::error::Error;

/// GPU-resident copy of the triangle, sized for exactly its three vertices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryBuffer {
    pub buffer: BufferId,
    pub size: u64,
    pub vertex_count: u32,
}

pub fn create_triangle_buffer<D: GraphicsDevice>(device: &mut D) -> Result<GeometryBuffer, Error> {
    let size = u64::from(Vertex::STRIDE) * TRIANGLE.len() as u64;
    let buffer = device.create_buffer(&BufferDescription {
        size,
        usage: buffer::Usage::VERTEX,
    })?;
    device.update_buffer(buffer, 0, bytemuck::cast_slice(&TRIANGLE))?;
    debug!("uploaded {} vertices ({} bytes)", TRIANGLE.len(), size);

    Ok(GeometryBuffer {
        buffer,
        size,
        vertex_count: TRIANGLE.len() as u32,
    })
}
