use glam::Vec2;

use crate::kernel::KernelSample;

/// Pixel format of the camera output and the scratch targets.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TextureFormat {
  Rgba8Unorm,
  Rgba16Float,
  Rgba32Float,
}

/// Size + format of a render target. Scratch targets are re-created
/// whenever the camera's descriptor stops matching.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct TextureDescriptor {
  pub width: u32,
  pub height: u32,
  pub format: TextureFormat,
}

/// Depth test used when drawing the specular-only geometry.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum DepthCompare {
  Less,
  LessEqual,
  Always,
}

/// Everything the compositor needs from the rendering host: buffer
/// lifetime, the actual per-pixel blur, and a way to draw the geometry
/// tagged for the specular-only pass. A GPU implementation binds
/// shaders and framebuffers here; [`crate::cpu_backend::CpuBackend`]
/// runs the convolution in software.
pub trait SssBackend {
  type Texture;

  /// `false` = some dependency (shader, material, device) is missing.
  /// The compositor treats that as 'feature disabled' and skips the
  /// frame, it is not an error.
  fn is_ready(&self) -> bool {
    true
  }

  /// Create the texture if `existing` is `None`, re-create it if the
  /// descriptor changed, otherwise hand it back untouched. A `None`
  /// result means the allocation was refused and the frame is skipped.
  fn allocate_or_resize(
    &mut self,
    existing: Option<Self::Texture>,
    descriptor: &TextureDescriptor,
    name: &str,
  ) -> Option<Self::Texture>;

  fn release(&mut self, texture: Self::Texture);

  /// Receive the finished convolution coefficients. Only called when the
  /// kernel actually changed.
  fn set_kernel(&mut self, kernel: &[KernelSample]);

  /// One 1D blur pass along `blur_direction` ((1,0) or (0,1)).
  /// `specular` - texture added on top of the blurred result, used by
  /// the final vertical pass so highlights stay sharp.
  ///
  /// The per-pixel `follow_surface` depth adjustment lives entirely
  /// here - the compositor only forwards the flag and the scaled width.
  fn blur_pass(
    &mut self,
    src: &Self::Texture,
    dst: &mut Self::Texture,
    depth: &Self::Texture,
    blur_direction: Vec2,
    sss_width: f32,
    follow_surface: bool,
    specular: Option<&Self::Texture>,
  );

  /// Draw scene geometry tagged `tag` into `color`, depth-tested against
  /// the already-rendered scene depth. Existing depth is loaded, not
  /// cleared.
  fn draw_tagged_geometry(
    &mut self,
    color: &mut Self::Texture,
    depth: &Self::Texture,
    tag: &str,
    depth_compare: DepthCompare,
  );
}
