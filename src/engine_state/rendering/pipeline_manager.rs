//! Manages the WebGPU render pipeline and associated rendering resources.
//!
//! # Architecture
//!
//! - `PipelineManager`: owns the cube pipeline, its bind groups and the depth
//!   texture, and encodes the frame's single render pass
//! - `WgpuFrameTarget`: the GPU side of `FrameTarget`; writes the view matrix
//!   and the instance stream through the buffer registry and remembers the
//!   requested draw for the pass
//!
//! # Frame Order
//!
//! 1. The instance pipeline records into a `WgpuFrameTarget`
//! 2. The queued buffer writes land before the pass is submitted
//! 3. The pass clears color and depth, then issues the instanced draw if
//!    there is anything to draw

use std::cell::RefMut;

use cgmath::Matrix4;
use log::{debug, info};
use wgpu::{Device, Queue, RenderPipeline, Surface, SurfaceConfiguration, TextureFormat};

use super::{
    bind_group_state::{
        BindGroupState, CameraUniform, CAMERA_BIND_GROUP, CAMERA_BIND_GROUP_LAYOUT,
        CAMERA_BUFFER_NAME, TEXTURE_BIND_GROUP, TEXTURE_BIND_GROUP_LAYOUT,
    },
    instancing::FrameTarget,
    texture::{self, MipChain},
    vertex::{InstanceRaw, Vertex},
    INSTANCE_BUFFER_NAME, MESH_BUFFER_NAME,
};
use crate::{core::StSystem, engine_state::buffer_state::BufferState, error::ViewerError};

/// A draw requested by the instance pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCall {
    /// Mesh vertices per instance
    pub vertex_count: u32,
    /// Instances to draw
    pub instance_count: u32,
}

impl DrawCall {
    /// Whether the draw covers at least one vertex of one instance.
    ///
    /// Empty draws are skipped by the pass instead of binding an empty
    /// instance slice.
    pub fn is_drawable(&self) -> bool {
        self.instance_count > 0 && self.vertex_count > 0
    }
}

/// GPU implementation of `FrameTarget`.
///
/// Holds the buffer registry mutably for the duration of the frame's
/// recording. Drop it (via `finish`) before encoding the pass.
pub struct WgpuFrameTarget<'a> {
    buffer_state: RefMut<'a, BufferState>,
    draw_call: Option<DrawCall>,
}

impl<'a> WgpuFrameTarget<'a> {
    /// Starts recording a frame into the given buffer registry.
    pub fn new(buffer_state: RefMut<'a, BufferState>) -> Self {
        Self {
            buffer_state,
            draw_call: None,
        }
    }

    /// Releases the buffer registry and returns the recorded draw.
    pub fn finish(self) -> Option<DrawCall> {
        self.draw_call
    }
}

impl FrameTarget for WgpuFrameTarget<'_> {
    fn set_view(&mut self, view: &Matrix4<f32>) {
        let view: [[f32; 4]; 4] = (*view).into();
        self.buffer_state.write_buffer(
            CAMERA_BUFFER_NAME,
            CameraUniform::VIEW_OFFSET,
            bytemuck::bytes_of(&view),
        );
    }

    fn stream_instances(&mut self, bytes: &[u8]) {
        self.buffer_state.stream_buffer(INSTANCE_BUFFER_NAME, bytes);
    }

    fn draw_instanced(&mut self, vertex_count: u32, instance_count: u32) {
        self.draw_call = Some(DrawCall {
            vertex_count,
            instance_count,
        });
    }
}

/// Owns the cube render pipeline and encodes each frame.
pub struct PipelineManager {
    /// Manages all bind groups used in the pipeline
    bind_group_state: BindGroupState,
    /// Shared state for buffer management
    buffer_state: StSystem<BufferState>,
    /// Depth texture used for depth testing
    depth_texture: texture::DepthTexture,
    /// Kept alive for the texture bind group
    #[allow(dead_code)]
    material: texture::Texture,
    /// Instanced cube pipeline
    render_pipeline: RenderPipeline,
    /// Background color
    clear_color: wgpu::Color,
}

impl PipelineManager {
    /// Creates the pipeline and every resource it binds.
    ///
    /// The mesh, instance and camera buffers must already be registered in
    /// `buffer_state`.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue for texture upload
    /// * `config` - Surface configuration containing size and format
    /// * `buffer_state` - Shared state for buffer management
    /// * `shader_string` - The WGSL shader source code
    /// * `material` - Decoded cube texture with its mip chain
    /// * `clear_color` - Background RGBA
    ///
    /// # Errors
    /// Returns a texture error if the material does not fit the device, and
    /// `ViewerError::ShaderCompile` if the shader or the pipeline fails
    /// validation.
    pub fn new(
        device: StSystem<Device>,
        queue: StSystem<Queue>,
        config: &SurfaceConfiguration,
        buffer_state: StSystem<BufferState>,
        shader_string: &str,
        material: &MipChain,
        clear_color: [f64; 4],
    ) -> Result<Self, ViewerError> {
        let material = {
            let device_ref = device.get();
            let queue_ref = queue.get();
            texture::Texture::create_material_texture(&device_ref, &queue_ref, material, "Cube Texture")?
        };
        info!("Uploaded cube texture");

        let bind_group_state = BindGroupState::new(device.clone(), buffer_state.clone(), &material);

        let device_ref = device.get();
        let depth_texture = texture::DepthTexture::new(&device_ref, config, "DEPTH TEXTURE");
        let render_pipeline =
            Self::create_render_pipeline(&device_ref, &bind_group_state, shader_string, config.format)?;
        info!("Created instanced cube pipeline");

        let [r, g, b, a] = clear_color;
        Ok(Self {
            bind_group_state,
            buffer_state,
            depth_texture,
            material,
            render_pipeline,
            clear_color: wgpu::Color { r, g, b, a },
        })
    }

    /// Compiles the shader and builds the pipeline inside a validation error
    /// scope so compile errors come back as a value instead of a panic.
    fn create_render_pipeline(
        device: &Device,
        bind_group_state: &BindGroupState,
        shader_string: &str,
        texture_format: TextureFormat,
    ) -> Result<RenderPipeline, ViewerError> {
        let (Some(camera_layout), Some(texture_layout)) = (
            bind_group_state.get_bind_group_layout(CAMERA_BIND_GROUP_LAYOUT),
            bind_group_state.get_bind_group_layout(TEXTURE_BIND_GROUP_LAYOUT),
        ) else {
            return Err(ViewerError::ShaderCompile(String::from(
                "bind group layouts are missing",
            )));
        };

        device.push_error_scope(wgpu::ErrorFilter::Validation);

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("Cube Render Pipeline Layout"),
            bind_group_layouts: &[camera_layout, texture_layout],
            push_constant_ranges: &[],
        });

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("Cube Shader"),
            source: wgpu::ShaderSource::Wgsl(shader_string.into()),
        });

        let render_pipeline = device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some("Cube Render Pipeline"),
            layout: Some(&pipeline_layout),
            vertex: wgpu::VertexState {
                module: &shader,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[Vertex::desc(), InstanceRaw::desc()],
            },
            fragment: Some(wgpu::FragmentState {
                module: &shader,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: texture_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),
            primitive: wgpu::PrimitiveState {
                topology: wgpu::PrimitiveTopology::TriangleList,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Cw,
                cull_mode: Some(wgpu::Face::Back),
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: texture::DepthTexture::FORMAT,
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: Default::default(),
            multiview: None,
            cache: None,
        });

        match pollster::block_on(device.pop_error_scope()) {
            Some(error) => Err(ViewerError::ShaderCompile(error.to_string())),
            None => Ok(render_pipeline),
        }
    }

    /// Encodes and presents one frame.
    ///
    /// The pass always clears. The draw is skipped when there is nothing to
    /// draw, which keeps empty instance streams from binding an empty slice.
    ///
    /// # Errors
    /// Returns the surface error if the next frame cannot be acquired; the
    /// caller decides whether to reconfigure, skip or exit.
    pub fn render(
        &mut self,
        surface: &Surface,
        device: &Device,
        queue: &Queue,
        draw_call: Option<DrawCall>,
    ) -> Result<(), wgpu::SurfaceError> {
        let frame = surface.get_current_texture()?;
        let view = frame.texture.create_view(&Default::default());
        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("Cube Render Encoder"),
        });

        let buffer_state = self.buffer_state.get();
        {
            let mut rpass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Cube Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(self.clear_color),
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                ..Default::default()
            });

            let draw = draw_call.filter(DrawCall::is_drawable);
            let resources = (
                self.bind_group_state.get_bind_group(CAMERA_BIND_GROUP),
                self.bind_group_state.get_bind_group(TEXTURE_BIND_GROUP),
                buffer_state.get_buffer(MESH_BUFFER_NAME),
                buffer_state.get_buffer(INSTANCE_BUFFER_NAME),
            );

            match (draw, resources) {
                (
                    Some(draw),
                    (Some(camera_group), Some(texture_group), Some(mesh), Some(instances)),
                ) => {
                    let instance_bytes =
                        draw.instance_count as u64 * std::mem::size_of::<InstanceRaw>() as u64;
                    rpass.set_pipeline(&self.render_pipeline);
                    rpass.set_bind_group(0, camera_group, &[]);
                    rpass.set_bind_group(1, texture_group, &[]);
                    rpass.set_vertex_buffer(0, mesh.slice(..));
                    rpass.set_vertex_buffer(1, instances.slice(..instance_bytes));
                    rpass.draw(0..draw.vertex_count, 0..draw.instance_count);
                }
                (Some(_), _) => debug!("Skipping draw, a pipeline resource is missing"),
                (None, _) => {}
            }
        }
        drop(buffer_state);

        queue.submit([encoder.finish()]);
        frame.present();
        Ok(())
    }

    /// Handles window resize events by recreating the depth texture.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The new surface configuration containing the updated size
    pub fn resize(&mut self, device: &Device, config: &SurfaceConfiguration) {
        self.depth_texture = texture::DepthTexture::new(device, config, "DEPTH TEXTURE");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_grid_draw_is_issued() {
        let draw = DrawCall {
            vertex_count: 36,
            instance_count: 27,
        };
        assert!(draw.is_drawable());
    }

    #[test]
    fn zero_instance_draw_is_a_no_op() {
        let draw = DrawCall {
            vertex_count: 36,
            instance_count: 0,
        };
        assert!(!draw.is_drawable());
        assert_eq!(Some(draw).filter(DrawCall::is_drawable), None);
    }

    #[test]
    fn zero_vertex_draw_is_a_no_op() {
        let draw = DrawCall {
            vertex_count: 0,
            instance_count: 27,
        };
        assert!(!draw.is_drawable());
    }
}
