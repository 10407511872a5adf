//! Manages WebGPU bind groups and their layouts.
//!
//! Two groups are bound for the cube pipeline:
//! - group 0: the camera uniform (projection and view matrices)
//! - group 1: the material texture and its sampler

use std::collections::HashMap;

use cgmath::{Matrix4, SquareMatrix};
use wgpu::{BindGroup, BindGroupLayout, Device};

use super::texture::Texture;
use crate::{core::StSystem, engine_state::buffer_state::BufferState};

/// Name of the camera uniform buffer
pub const CAMERA_BUFFER_NAME: &str = "camera_buffer";
/// Name of the camera bind group
pub const CAMERA_BIND_GROUP: &str = "camera_bind_group";
/// Name of the camera bind group layout
pub const CAMERA_BIND_GROUP_LAYOUT: &str = "camera_bind_group_layout";
/// Name of the texture bind group
pub const TEXTURE_BIND_GROUP: &str = "texture_bind_group";
/// Name of the texture bind group layout
pub const TEXTURE_BIND_GROUP_LAYOUT: &str = "texture_bind_group_layout";

/// The camera uniform as laid out in the shader.
///
/// The projection is written at startup and on resize, the view every frame.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    /// Perspective projection in WGPU clip space
    pub projection: [[f32; 4]; 4],
    /// Camera look-at matrix
    pub view: [[f32; 4]; 4],
}

impl CameraUniform {
    /// Byte offset of `projection` inside the uniform
    pub const PROJECTION_OFFSET: wgpu::BufferAddress = 0;
    /// Byte offset of `view` inside the uniform
    pub const VIEW_OFFSET: wgpu::BufferAddress = std::mem::size_of::<[[f32; 4]; 4]>() as wgpu::BufferAddress;

    /// Starts with the given projection and an identity view.
    pub fn new(projection: Matrix4<f32>) -> Self {
        Self {
            projection: projection.into(),
            view: Matrix4::identity().into(),
        }
    }
}

/// Manages WebGPU bind groups and their layouts.
pub struct BindGroupState {
    /// Map of bind group names to their WebGPU bind group objects
    bind_groups: HashMap<&'static str, BindGroup>,
    /// Map of bind group layout names to their WebGPU bind group layout objects
    bind_group_layouts: HashMap<&'static str, BindGroupLayout>,
}

impl BindGroupState {
    /// Creates the camera and texture bind groups.
    ///
    /// The camera buffer must already exist in `buffer_state`.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `buffer_state` - Shared state for buffer management
    /// * `material` - The texture sampled by the fragment shader
    pub fn new(
        device: StSystem<Device>,
        buffer_state: StSystem<BufferState>,
        material: &Texture,
    ) -> Self {
        let mut bind_groups = HashMap::new();
        let mut bind_group_layouts = HashMap::new();

        let device = device.get();

        let camera_bind_group_layout = Self::camera_bind_group_layout(&device);
        if let Some(camera_buffer) = buffer_state.get().get_entire_binding(CAMERA_BUFFER_NAME) {
            let camera_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
                layout: &camera_bind_group_layout,
                entries: &[wgpu::BindGroupEntry {
                    binding: 0,
                    resource: camera_buffer,
                }],
                label: Some(CAMERA_BIND_GROUP),
            });
            bind_groups.insert(CAMERA_BIND_GROUP, camera_bind_group);
        } else {
            log::error!("Camera buffer missing, camera bind group not created");
        }
        bind_group_layouts.insert(CAMERA_BIND_GROUP_LAYOUT, camera_bind_group_layout);

        let (texture_bind_group, texture_bind_group_layout) =
            Self::generate_texture_bindgroups(&device, material);
        bind_groups.insert(TEXTURE_BIND_GROUP, texture_bind_group);
        bind_group_layouts.insert(TEXTURE_BIND_GROUP_LAYOUT, texture_bind_group_layout);

        Self {
            bind_groups,
            bind_group_layouts,
        }
    }

    /// Retrieves a bind group by name.
    pub fn get_bind_group(&self, name: &'static str) -> Option<&BindGroup> {
        self.bind_groups.get(name)
    }

    /// Retrieves a bind group layout by name.
    pub fn get_bind_group_layout(&self, name: &'static str) -> Option<&BindGroupLayout> {
        self.bind_group_layouts.get(name)
    }

    fn camera_bind_group_layout(device: &Device) -> BindGroupLayout {
        device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            entries: &[wgpu::BindGroupLayoutEntry {
                binding: 0,
                visibility: wgpu::ShaderStages::VERTEX,
                ty: wgpu::BindingType::Buffer {
                    ty: wgpu::BufferBindingType::Uniform,
                    has_dynamic_offset: false,
                    min_binding_size: wgpu::BufferSize::new(
                        std::mem::size_of::<CameraUniform>() as u64,
                    ),
                },
                count: None,
            }],
            label: Some(CAMERA_BIND_GROUP_LAYOUT),
        })
    }

    /// Creates the material texture bind group.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `material` - Texture view and sampler to bind
    ///
    /// # Returns
    /// A tuple containing the bind group and its layout
    fn generate_texture_bindgroups(
        device: &Device,
        material: &Texture,
    ) -> (BindGroup, BindGroupLayout) {
        let texture_bind_group_layout =
            device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                entries: &[
                    wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Texture {
                            multisampled: false,
                            view_dimension: wgpu::TextureViewDimension::D2,
                            sample_type: wgpu::TextureSampleType::Float { filterable: true },
                        },
                        count: None,
                    },
                    wgpu::BindGroupLayoutEntry {
                        binding: 1,
                        visibility: wgpu::ShaderStages::FRAGMENT,
                        // Must match the filterable flag of the texture entry
                        ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                        count: None,
                    },
                ],
                label: Some(TEXTURE_BIND_GROUP_LAYOUT),
            });

        let texture_bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            layout: &texture_bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&material.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&material.sampler),
                },
            ],
            label: Some(TEXTURE_BIND_GROUP),
        });

        (texture_bind_group, texture_bind_group_layout)
    }
}
