//! Vertex and instance data layouts for cube rendering.
//!
//! This module defines the two vertex streams fed to the instanced cube
//! pipeline: the shared cube mesh (stepped per vertex) and the per-cube model
//! matrices (stepped per instance).

use cgmath::Matrix4;

/// A vertex of the shared cube mesh.
///
/// # Memory Layout
/// - Position: [f32; 3] (12 bytes)
/// - Texture Coordinates: [f32; 2] (8 bytes)
///
/// Total size: 20 bytes
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    /// Object-space position
    pub position: [f32; 3],
    /// UV texture coordinates (normalized 0.0-1.0)
    pub tex_coords: [f32; 2],
}

/// Location of the mesh position attribute
pub const POSITION_LOCATION: u32 = 0;
/// Location of the mesh texture coordinate attribute
pub const TEX_COORDS_LOCATION: u32 = 1;
/// First of the four consecutive locations holding an instance matrix
pub const INSTANCE_FIRST_LOCATION: u32 = 2;

const VERTEX_ATTRIBUTES: [wgpu::VertexAttribute; 2] = wgpu::vertex_attr_array![
    0 => Float32x3,
    1 => Float32x2
];

const INSTANCE_ATTRIBUTES: [wgpu::VertexAttribute; 4] = wgpu::vertex_attr_array![
    2 => Float32x4,
    3 => Float32x4,
    4 => Float32x4,
    5 => Float32x4
];

impl Vertex {
    const fn new(x: f32, y: f32, z: f32, u: f32, v: f32) -> Self {
        Self {
            position: [x, y, z],
            tex_coords: [u, v],
        }
    }

    /// Returns the vertex buffer layout description for the shader pipeline.
    ///
    /// # Shader Attributes
    /// - `location = 0`: position (vec3<f32>), offset 0
    /// - `location = 1`: tex_coords (vec2<f32>), offset 12
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &VERTEX_ATTRIBUTES,
        }
    }
}

/// One cube's model matrix as laid out in the instance buffer.
///
/// Stored column-major, which is both cgmath's and WGSL's convention, so
/// each column occupies one `vec4<f32>` attribute.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct InstanceRaw {
    /// Model matrix columns
    pub model: [[f32; 4]; 4],
}

impl InstanceRaw {
    /// Packs a model matrix for upload.
    pub fn from_matrix(model: Matrix4<f32>) -> Self {
        Self {
            model: model.into(),
        }
    }

    /// Returns the instance buffer layout description.
    ///
    /// The matrix spans `location = 2..=5`, one column per location at
    /// offsets 0, 16, 32 and 48, advancing once per instance.
    pub fn desc<'a>() -> wgpu::VertexBufferLayout<'a> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<InstanceRaw>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &INSTANCE_ATTRIBUTES,
        }
    }
}

/// Unit cube centered at the origin as a non-indexed triangle list.
///
/// Faces are wound clockwise when seen from outside.
#[rustfmt::skip]
pub const CUBE_VERTICES: [Vertex; 36] = [
    // +y
    Vertex::new(-0.5,  0.5, -0.5, 0.0, 1.0),
    Vertex::new( 0.5,  0.5, -0.5, 1.0, 1.0),
    Vertex::new( 0.5,  0.5,  0.5, 1.0, 0.0),
    Vertex::new( 0.5,  0.5,  0.5, 1.0, 0.0),
    Vertex::new(-0.5,  0.5,  0.5, 0.0, 0.0),
    Vertex::new(-0.5,  0.5, -0.5, 0.0, 1.0),
    // -y
    Vertex::new( 0.5, -0.5, -0.5, 0.0, 1.0),
    Vertex::new(-0.5, -0.5, -0.5, 1.0, 1.0),
    Vertex::new(-0.5, -0.5,  0.5, 1.0, 0.0),
    Vertex::new(-0.5, -0.5,  0.5, 1.0, 0.0),
    Vertex::new( 0.5, -0.5,  0.5, 0.0, 0.0),
    Vertex::new( 0.5, -0.5, -0.5, 0.0, 1.0),
    // -x
    Vertex::new(-0.5, -0.5, -0.5, 0.0, 1.0),
    Vertex::new(-0.5,  0.5, -0.5, 1.0, 1.0),
    Vertex::new(-0.5,  0.5,  0.5, 1.0, 0.0),
    Vertex::new(-0.5,  0.5,  0.5, 1.0, 0.0),
    Vertex::new(-0.5, -0.5,  0.5, 0.0, 0.0),
    Vertex::new(-0.5, -0.5, -0.5, 0.0, 1.0),
    // +x
    Vertex::new( 0.5,  0.5, -0.5, 0.0, 1.0),
    Vertex::new( 0.5, -0.5, -0.5, 1.0, 1.0),
    Vertex::new( 0.5, -0.5,  0.5, 1.0, 0.0),
    Vertex::new( 0.5, -0.5,  0.5, 1.0, 0.0),
    Vertex::new( 0.5,  0.5,  0.5, 0.0, 0.0),
    Vertex::new( 0.5,  0.5, -0.5, 0.0, 1.0),
    // -z
    Vertex::new(-0.5, -0.5, -0.5, 0.0, 1.0),
    Vertex::new( 0.5, -0.5, -0.5, 1.0, 1.0),
    Vertex::new( 0.5,  0.5, -0.5, 1.0, 0.0),
    Vertex::new( 0.5,  0.5, -0.5, 1.0, 0.0),
    Vertex::new(-0.5,  0.5, -0.5, 0.0, 0.0),
    Vertex::new(-0.5, -0.5, -0.5, 0.0, 1.0),
    // +z
    Vertex::new(-0.5,  0.5,  0.5, 0.0, 1.0),
    Vertex::new( 0.5,  0.5,  0.5, 1.0, 1.0),
    Vertex::new( 0.5, -0.5,  0.5, 1.0, 0.0),
    Vertex::new( 0.5, -0.5,  0.5, 1.0, 0.0),
    Vertex::new(-0.5, -0.5,  0.5, 0.0, 0.0),
    Vertex::new(-0.5,  0.5,  0.5, 0.0, 1.0),
];

#[cfg(test)]
mod tests {
    use super::*;
    use cgmath::{SquareMatrix, Vector3};

    #[test]
    fn vertex_layout_is_bit_exact() {
        let layout = Vertex::desc();
        assert_eq!(layout.array_stride, 20);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layout.attributes.len(), 2);

        assert_eq!(layout.attributes[0].shader_location, POSITION_LOCATION);
        assert_eq!(layout.attributes[0].offset, 0);
        assert_eq!(layout.attributes[0].format, wgpu::VertexFormat::Float32x3);

        assert_eq!(layout.attributes[1].shader_location, TEX_COORDS_LOCATION);
        assert_eq!(layout.attributes[1].offset, 12);
        assert_eq!(layout.attributes[1].format, wgpu::VertexFormat::Float32x2);
    }

    #[test]
    fn instance_layout_spans_four_consecutive_slots() {
        let layout = InstanceRaw::desc();
        assert_eq!(layout.array_stride, 64);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Instance);
        assert_eq!(layout.attributes.len(), 4);

        for (column, attribute) in layout.attributes.iter().enumerate() {
            assert_eq!(attribute.shader_location, INSTANCE_FIRST_LOCATION + column as u32);
            assert_eq!(attribute.offset, 16 * column as u64);
            assert_eq!(attribute.format, wgpu::VertexFormat::Float32x4);
        }
    }

    #[test]
    fn instance_translation_lands_in_last_column() {
        let raw = InstanceRaw::from_matrix(Matrix4::from_translation(Vector3::new(1.0, 2.0, 3.0)));
        assert_eq!(raw.model[3], [1.0, 2.0, 3.0, 1.0]);
        assert_eq!(raw.model[0], [1.0, 0.0, 0.0, 0.0]);

        let identity = InstanceRaw::from_matrix(Matrix4::identity());
        let bytes: &[u8] = bytemuck::bytes_of(&identity);
        assert_eq!(bytes.len(), 64);
    }

    #[test]
    fn cube_mesh_is_a_centered_unit_cube() {
        assert_eq!(CUBE_VERTICES.len() % 3, 0);
        assert_eq!(bytemuck::cast_slice::<Vertex, u8>(&CUBE_VERTICES).len(), 36 * 20);

        for vertex in CUBE_VERTICES.iter() {
            for coordinate in vertex.position {
                assert!(coordinate == 0.5 || coordinate == -0.5);
            }
            for uv in vertex.tex_coords {
                assert!((0.0..=1.0).contains(&uv));
            }
        }

        // each face lies on one plane
        for face in CUBE_VERTICES.chunks(6) {
            let shared_axis = (0..3).find(|&axis| {
                face.iter().all(|vertex| vertex.position[axis] == face[0].position[axis])
            });
            assert!(shared_axis.is_some());
        }
    }
}
