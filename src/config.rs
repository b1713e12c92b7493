use glam::{vec3, Vec3};

/// Per-frame configuration of the separable SSS effect. The host resolves
/// the final values however it wants (volume stack, UI, config file) and
/// hands them over once per frame - the compositor never queries global
/// state.
pub struct SeparableSSSCfg {
  /// Blur width in screen space, [0, 1]. 0 disables the whole effect.
  pub sss_width: f32,
  /// Adjust sample radius per-pixel based on the local depth gradient.
  /// Prevents bleeding across silhouette edges.
  pub follow_surface: bool,
  /// Per-channel scatter amount, [0, 1] each
  pub strength: Vec3,
  /// Per-channel profile spread. Bigger = wider
  pub falloff: Vec3,
}

impl SeparableSSSCfg {
  pub const SSS_WIDTH_MIN: f32 = 0.0;
  pub const SSS_WIDTH_MAX: f32 = 1.0;

  pub fn is_active(&self) -> bool {
    self.sss_width > 0.0
  }
}

impl Default for SeparableSSSCfg {
  fn default() -> Self {
    Self {
      sss_width: 0.0,
      follow_surface: false,
      strength: vec3(0.48, 0.41, 0.28),
      falloff: vec3(1.0, 0.37, 0.3),
    }
  }
}
