use std::collections::HashMap;

use glam::{Vec2, Vec4};
use log::trace;

use crate::backend::{DepthCompare, SssBackend, TextureDescriptor};
use crate::kernel::KernelSample;

/// Follow-surface: samples whose depth differs from the center pixel are
/// pulled back towards the center color before accumulation. Matches the
/// reference shader's rejection term.
const FOLLOW_SURFACE_REJECTION_SCALE: f32 = 300.0;

/// RGBA f32 image with clamp-to-edge sampling. Depth textures store the
/// depth value in `.x`.
pub struct CpuTexture {
  pub descriptor: TextureDescriptor,
  pub data: Vec<Vec4>,
}

impl CpuTexture {
  pub fn new(descriptor: TextureDescriptor) -> Self {
    let len = (descriptor.width * descriptor.height) as usize;
    Self {
      descriptor,
      data: vec![Vec4::ZERO; len],
    }
  }

  pub fn fill(&mut self, value: Vec4) {
    for texel in &mut self.data {
      *texel = value;
    }
  }

  pub fn texel(&self, x: u32, y: u32) -> Vec4 {
    self.data[(y * self.descriptor.width + x) as usize]
  }

  pub fn set_texel(&mut self, x: u32, y: u32, value: Vec4) {
    self.data[(y * self.descriptor.width + x) as usize] = value;
  }

  /// clamp-to-edge
  fn texel_clamped(&self, x: i64, y: i64) -> Vec4 {
    let xc = x.clamp(0, self.descriptor.width as i64 - 1);
    let yc = y.clamp(0, self.descriptor.height as i64 - 1);
    self.texel(xc as u32, yc as u32)
  }
}

/// Software implementation of the blur executor. Reference behavior for
/// tests and for hosts without a GPU path - a GPU backend goes through
/// the exact same [`SssBackend`] seam.
pub struct CpuBackend {
  kernel: Vec<KernelSample>,
  /// Stand-ins for scene geometry: image blitted when the specular-only
  /// pass requests the matching tag.
  specular_sources: HashMap<String, CpuTexture>,
}

impl CpuBackend {
  pub fn new() -> Self {
    Self {
      kernel: Vec::new(),
      specular_sources: HashMap::new(),
    }
  }

  /// Register the image 'drawn' when geometry tagged `tag` is requested.
  pub fn register_tagged_geometry(&mut self, tag: &str, image: CpuTexture) {
    self.specular_sources.insert(tag.to_string(), image);
  }
}

impl SssBackend for CpuBackend {
  type Texture = CpuTexture;

  fn allocate_or_resize(
    &mut self,
    existing: Option<CpuTexture>,
    descriptor: &TextureDescriptor,
    name: &str,
  ) -> Option<CpuTexture> {
    match existing {
      Some(tex) if tex.descriptor == *descriptor => Some(tex),
      _ => {
        trace!("Allocating CPU texture '{}' ({:?})", name, descriptor);
        Some(CpuTexture::new(*descriptor))
      }
    }
  }

  fn release(&mut self, _texture: CpuTexture) {
    // nothing to do, the pixel data frees itself
  }

  fn set_kernel(&mut self, kernel: &[KernelSample]) {
    self.kernel = kernel.to_vec();
  }

  fn blur_pass(
    &mut self,
    src: &CpuTexture,
    dst: &mut CpuTexture,
    depth: &CpuTexture,
    blur_direction: Vec2,
    sss_width: f32,
    follow_surface: bool,
    specular: Option<&CpuTexture>,
  ) {
    debug_assert!(!self.kernel.is_empty(), "blur_pass before set_kernel");
    let width = src.descriptor.width;
    let height = src.descriptor.height;
    // kernel offsets span [-RANGE, RANGE] in profile units, sss_width
    // maps them to a fraction of the resolution along the blur axis
    let axis_len = if blur_direction.x != 0.0 {
      width as f32
    } else {
      height as f32
    };

    for y in 0..height {
      for x in 0..width {
        let center = src.texel(x, y);
        let center_depth = depth.texel(x, y).x;

        // center sample is the directly visible light
        let mut color = self.kernel[0].weight * center.truncate();

        for sample in &self.kernel[1..] {
          let step_px = sample.offset * sss_width * axis_len;
          let sx = (x as f32 + blur_direction.x * step_px).round() as i64;
          let sy = (y as f32 + blur_direction.y * step_px).round() as i64;
          let mut fetched = src.texel_clamped(sx, sy);

          if follow_surface {
            let sample_depth = depth.texel_clamped(sx, sy).x;
            let delta = (sample_depth - center_depth).abs();
            let s = (FOLLOW_SURFACE_REJECTION_SCALE * sss_width * delta).min(1.0);
            fetched = fetched.lerp(center, s);
          }

          color += sample.weight * fetched.truncate();
        }

        if let Some(specular_tex) = specular {
          color += specular_tex.texel(x, y).truncate();
        }

        dst.set_texel(x, y, color.extend(center.w));
      }
    }
  }

  fn draw_tagged_geometry(
    &mut self,
    color: &mut CpuTexture,
    _depth: &CpuTexture,
    tag: &str,
    _depth_compare: DepthCompare,
  ) {
    // Geometry stand-in: blit the registered source. The depth test is
    // moot here, a registered image already contains only visible texels.
    match self.specular_sources.get(tag) {
      Some(source) if source.descriptor == color.descriptor => {
        color.data.copy_from_slice(&source.data);
      }
      _ => {
        // nothing registered = no tagged geometry on screen
        color.fill(Vec4::ZERO);
      }
    }
  }
}
