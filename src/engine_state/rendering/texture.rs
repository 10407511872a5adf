//! Texture handling for the rendering pipeline.
//!
//! This module creates the depth buffer and the cube material. The material
//! is decoded on the CPU, given a full mip chain and uploaded in one call.

use image::{imageops::FilterType, RgbaImage};
use wgpu::util::DeviceExt;

use crate::error::ViewerError;

/// Represents a GPU texture with associated view and sampler.
pub struct Texture {
    /// The underlying WebGPU texture resource.
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    /// The texture view used for binding the texture to the pipeline.
    pub view: wgpu::TextureView,
    /// The sampler used for texture filtering and addressing.
    pub sampler: wgpu::Sampler,
}

/// A decoded image with every mip level packed back to back, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct MipChain {
    /// Width of the base level in pixels
    pub width: u32,
    /// Height of the base level in pixels
    pub height: u32,
    /// Number of levels, down to 1×1
    pub level_count: u32,
    /// RGBA8 texels for all levels
    pub rgba: Vec<u8>,
}

/// Number of mip levels needed to reach 1×1 from `width × height`.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    u32::BITS - width.max(height).max(1).leading_zeros()
}

/// Decodes PNG or JPEG bytes into RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage, ViewerError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

impl MipChain {
    /// Fails unless both base dimensions lie in `1..=max_dimension`.
    pub fn check_fits(&self, max_dimension: u32) -> Result<(), ViewerError> {
        let fits = |side: u32| (1..=max_dimension).contains(&side);
        if fits(self.width) && fits(self.height) {
            Ok(())
        } else {
            Err(ViewerError::TextureSize {
                width: self.width,
                height: self.height,
                max: max_dimension,
            })
        }
    }

    /// Builds every mip level of `base` with a box-like triangle filter.
    pub fn generate(base: &RgbaImage) -> Self {
        let (width, height) = base.dimensions();
        let level_count = mip_level_count(width, height);

        let mut rgba = base.as_raw().clone();
        for level in 1..level_count {
            let level_width = (width >> level).max(1);
            let level_height = (height >> level).max(1);
            let resized = image::imageops::resize(base, level_width, level_height, FilterType::Triangle);
            rgba.extend_from_slice(resized.as_raw());
        }

        Self {
            width,
            height,
            level_count,
            rgba,
        }
    }
}

/// Depth attachment for the cube pass. Never sampled.
pub struct DepthTexture {
    /// The underlying WebGPU texture resource.
    #[allow(dead_code)]
    pub texture: wgpu::Texture,
    /// View attached to the render pass.
    pub view: wgpu::TextureView,
}

impl DepthTexture {
    /// The texture format used for depth buffers.
    pub const FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

    /// Creates a depth texture matching the surface size.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `config` - The surface configuration containing dimensions
    /// * `label` - Debug label for the texture
    pub fn new(device: &wgpu::Device, config: &wgpu::SurfaceConfiguration, label: &str) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: config.width.max(1),
                height: config.height.max(1),
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: Self::FORMAT,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self { texture, view }
    }
}

impl Texture {
    /// Uploads a material texture with its full mip chain.
    ///
    /// Sampling repeats in both directions, magnifies with nearest filtering
    /// and minifies with nearest texels blended linearly between mip levels.
    ///
    /// # Arguments
    /// * `device` - The WebGPU device
    /// * `queue` - The WebGPU queue used for the upload
    /// * `mips` - Texels for every level
    /// * `label` - Debug label for the texture
    pub fn create_material_texture(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        mips: &MipChain,
        label: &str,
    ) -> Result<Self, ViewerError> {
        mips.check_fits(device.limits().max_texture_dimension_2d)?;

        device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = device.create_texture_with_data(
            queue,
            &wgpu::TextureDescriptor {
                label: Some(label),
                size: wgpu::Extent3d {
                    width: mips.width,
                    height: mips.height,
                    depth_or_array_layers: 1,
                },
                mip_level_count: mips.level_count,
                sample_count: 1,
                dimension: wgpu::TextureDimension::D2,
                format: wgpu::TextureFormat::Rgba8UnormSrgb,
                usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
                view_formats: &[],
            },
            wgpu::util::TextureDataOrder::LayerMajor,
            &mips.rgba,
        );
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Linear,
            ..Default::default()
        });

        if let Some(error) = pollster::block_on(device.pop_error_scope()) {
            return Err(ViewerError::TextureUpload(error.to_string()));
        }

        Ok(Self {
            texture,
            view,
            sampler,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba};
    use std::io::Cursor;

    fn encoded_png(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_fn(width, height, |x, y| {
            Rgba([(x * 16) as u8, (y * 16) as u8, 0, 255])
        });
        let mut bytes = Cursor::new(Vec::new());
        image
            .write_to(&mut bytes, ImageFormat::Png)
            .expect("png encoding");
        bytes.into_inner()
    }

    #[test]
    fn level_count_reaches_one_texel() {
        assert_eq!(mip_level_count(16, 16), 5);
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(64, 8), 7);
        assert_eq!(mip_level_count(17, 3), 5);
    }

    #[test]
    fn decode_round_trips_png_dimensions() {
        let decoded = decode_rgba(&encoded_png(16, 8)).expect("decodes");
        assert_eq!(decoded.dimensions(), (16, 8));
        assert_eq!(decoded.get_pixel(1, 2), &Rgba([16, 32, 0, 255]));
    }

    #[test]
    fn garbage_bytes_are_a_decode_error() {
        let result = decode_rgba(b"definitely not an image");
        assert!(matches!(result, Err(ViewerError::TextureDecode(_))));
    }

    #[test]
    fn mip_chain_packs_every_level() {
        let base = decode_rgba(&encoded_png(16, 16)).expect("decodes");
        let mips = MipChain::generate(&base);

        assert_eq!(mips.level_count, 5);
        // 16² + 8² + 4² + 2² + 1² texels
        assert_eq!(mips.rgba.len(), (256 + 64 + 16 + 4 + 1) * 4);
        assert_eq!(&mips.rgba[..16 * 16 * 4], base.as_raw().as_slice());
    }

    #[test]
    fn oversized_texture_is_rejected_before_upload() {
        let max = wgpu::Limits::default().max_texture_dimension_2d;
        let mips = MipChain {
            width: max + 1,
            height: 16,
            level_count: mip_level_count(max + 1, 16),
            rgba: Vec::new(),
        };
        match mips.check_fits(max) {
            Err(ViewerError::TextureSize { width, height, max: limit }) => {
                assert_eq!((width, height, limit), (max + 1, 16, max));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn texture_at_the_limit_fits() {
        let mips = MipChain::generate(&RgbaImage::new(16, 4));
        assert!(mips.check_fits(16).is_ok());
        assert!(mips.check_fits(15).is_err());
    }

    #[test]
    fn empty_texture_never_fits() {
        let mips = MipChain {
            width: 0,
            height: 0,
            level_count: 1,
            rgba: Vec::new(),
        };
        assert!(matches!(mips.check_fits(8192), Err(ViewerError::TextureSize { .. })));
    }

    #[test]
    fn non_square_chain_clamps_short_side() {
        let mips = MipChain::generate(&RgbaImage::new(8, 2));
        assert_eq!(mips.level_count, 4);
        // 8×2, 4×1, 2×1, 1×1
        assert_eq!(mips.rgba.len(), (16 + 4 + 2 + 1) * 4);
    }
}
