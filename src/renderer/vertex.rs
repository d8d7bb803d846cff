use bytemuck::{Pod, Zeroable};

pub const R: [f32; 4] = [1.0, 0.0, 0.0, 1.0];
pub const G: [f32; 4] = [0.0, 1.0, 0.0, 1.0];
pub const B: [f32; 4] = [0.0, 0.0, 1.0, 1.0];

/// 2D position followed by RGBA color; 24 bytes, no padding.
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const STRIDE: u32 = std::mem::size_of::<Vertex>() as u32;
}

/// Top, bottom-right, bottom-left in normalized device coordinates.
pub const TRIANGLE: [Vertex; 3] = [
    Vertex {
        position: [0.0, 0.5],
        color: R,
    },
    Vertex {
        position: [0.5, -0.5],
        color: G,
    },
    Vertex {
        position: [-0.5, -0.5],
        color: B,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stride_is_position_plus_color() {
        assert_eq!(Vertex::STRIDE, 24);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&TRIANGLE).len(), 72);
    }
}
