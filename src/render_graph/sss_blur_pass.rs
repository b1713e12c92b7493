use glam::{vec2, Vec2, Vec3};
use log::{info, trace};

use crate::backend::{DepthCompare, SssBackend, TextureDescriptor};
use crate::config::SeparableSSSCfg;
use crate::kernel::{calculate_kernel, KernelSample, SSSS_N_SAMPLES};

/// Geometry rendered by the specular-only pass tags itself with this.
pub const SPECULAR_GEOMETRY_TAG: &str = "SeparableSSSSkinSpecular";

/// Screen-space width handed to the blur executor is
/// `SSS_WIDTH_SCALE * cfg.sss_width`.
const SSS_WIDTH_SCALE: f32 = 0.025;

/// Blur SSS, so a blur, but with a special per-channel profile.
/// `SSSSBlurPS` from Jimenez, Gutierrez. Two passes - 1st horizontal into
/// a ping-pong target, 2nd vertical back into the camera color. Specular
/// is rendered aside before the blur and re-added by the 2nd pass, so the
/// highlights stay sharp.
pub struct SSSBlurPass<B: SssBackend> {
  kernel: Vec<KernelSample>,
  /// (strength, falloff) the cached kernel was built from
  kernel_params: Option<(Vec3, Vec3)>,
  /// descriptor the scratch textures were allocated for
  scratch_descriptor: Option<TextureDescriptor>,
  specular_tex: Option<B::Texture>,
  tmp_ping_pong_tex: Option<B::Texture>,
}

impl<B: SssBackend> SSSBlurPass<B> {
  pub const BLUR_DIRECTION_PASS0: Vec2 = vec2(1.0, 0.0);
  pub const BLUR_DIRECTION_PASS1: Vec2 = vec2(0.0, 1.0);

  pub fn new() -> Self {
    info!("Creating SSSBlurPass");
    Self {
      kernel: Vec::new(),
      kernel_params: None,
      scratch_descriptor: None,
      specular_tex: None,
      tmp_ping_pong_tex: None,
    }
  }

  /// Release the scratch textures. The host guarantees no implicit
  /// cleanup, so call this before the backend goes away.
  pub fn destroy(&mut self, backend: &mut B) {
    if let Some(tex) = self.specular_tex.take() {
      backend.release(tex);
    }
    if let Some(tex) = self.tmp_ping_pong_tex.take() {
      backend.release(tex);
    }
    self.scratch_descriptor = None;
  }

  /// The finished kernel, exactly as handed to the backend.
  pub fn kernel(&self) -> &[KernelSample] {
    &self.kernel
  }

  /// ### Params:
  /// * `color_tex` - camera color, 1st read, 2nd write
  /// * `depth_tex` - scene depth, read only
  /// * `descriptor` - current camera output descriptor
  pub fn execute(
    &mut self,
    backend: &mut B,
    cfg: &SeparableSSSCfg,
    color_tex: &mut B::Texture,
    depth_tex: &B::Texture,
    descriptor: &TextureDescriptor,
  ) -> () {
    if !cfg.is_active() {
      return;
    }
    if !backend.is_ready() {
      // missing shader/material/device. Not an error, the effect is just off
      return;
    }
    if !self.ensure_scratch_textures(backend, descriptor) {
      return;
    }

    // specular-only geometry, depth-tested against the scene depth
    // (loaded, not cleared). Blurring would smear the highlights, so
    // they are rendered aside and re-added after the final pass.
    match self.specular_tex.as_mut() {
      Some(specular_tex) => backend.draw_tagged_geometry(
        specular_tex,
        depth_tex,
        SPECULAR_GEOMETRY_TAG,
        DepthCompare::LessEqual,
      ),
      None => return,
    };

    self.refresh_kernel(backend, cfg);

    let sss_width = SSS_WIDTH_SCALE * cfg.sss_width;

    // horizontal
    match self.tmp_ping_pong_tex.as_mut() {
      Some(tmp_ping_pong_tex) => backend.blur_pass(
        color_tex,        // read
        tmp_ping_pong_tex, // write
        depth_tex,
        Self::BLUR_DIRECTION_PASS0,
        sss_width,
        cfg.follow_surface,
        None,
      ),
      None => return,
    };

    // vertical, re-adds specular on top
    match (self.tmp_ping_pong_tex.as_ref(), self.specular_tex.as_ref()) {
      (Some(tmp_ping_pong_tex), Some(specular_tex)) => backend.blur_pass(
        tmp_ping_pong_tex, // read
        color_tex,         // write
        depth_tex,
        Self::BLUR_DIRECTION_PASS1,
        sss_width,
        cfg.follow_surface,
        Some(specular_tex),
      ),
      _ => return,
    };
  }

  /// (Re)create the scratch textures when the camera output descriptor
  /// changes. Returns false when the backend refused an allocation -
  /// skip the frame.
  fn ensure_scratch_textures(&mut self, backend: &mut B, descriptor: &TextureDescriptor) -> bool {
    let unchanged = self.scratch_descriptor.as_ref() == Some(descriptor);
    if unchanged && self.specular_tex.is_some() && self.tmp_ping_pong_tex.is_some() {
      return true;
    }

    trace!("Recreating SSSBlurPass scratch textures ({:?})", descriptor);
    self.specular_tex =
      backend.allocate_or_resize(self.specular_tex.take(), descriptor, "SSSBlurPass.specular");
    self.tmp_ping_pong_tex = backend.allocate_or_resize(
      self.tmp_ping_pong_tex.take(),
      descriptor,
      "SSSBlurPass.pingResult",
    );
    self.scratch_descriptor = Some(*descriptor);

    self.specular_tex.is_some() && self.tmp_ping_pong_tex.is_some()
  }

  /// Recompute + hand over the convolution coefficients, only when the
  /// profile parameters changed since the last frame.
  fn refresh_kernel(&mut self, backend: &mut B, cfg: &SeparableSSSCfg) {
    let params = (cfg.strength, cfg.falloff);
    if self.kernel_params == Some(params) {
      return;
    }

    trace!(
      "Recalculating SSS kernel (strength={}, falloff={})",
      cfg.strength,
      cfg.falloff
    );
    self.kernel = calculate_kernel(cfg.strength, cfg.falloff, SSSS_N_SAMPLES);
    self.kernel_params = Some(params);
    backend.set_kernel(&self.kernel);
  }
}
