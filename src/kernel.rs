use glam::{vec4, Vec3, Vec4};

/// Number of samples in the 1D kernel. More = smoother profile, but every
/// sample is a texture fetch per pixel per pass.
pub const SSSS_N_SAMPLES: usize = 17;

/// Sample spacing warp. Quadratic concentrates samples near the center,
/// where the profile's curvature is steepest.
const EXPONENT: f32 = 2.0;

/// Single tap of the 1D separable blur.
#[derive(Copy, Clone, Debug)]
pub struct KernelSample {
  /// Distance from the kernel center, in profile units (`[-RANGE, RANGE]`)
  pub offset: f32,
  /// Per-channel contribution. R/G/B weights differ, which is what gives
  /// the reddish bleed around shadow edges on skin.
  pub weight: Vec3,
}

/// GPU-ready kernel sample. Layout matches the shader's `vec4 kernel[]`:
/// `.xyz` weight, `.w` offset.
#[derive(Copy, Clone, Debug)]
#[repr(C)]
pub struct KernelSamplePacked {
  pub weight_offset: Vec4,
}

unsafe impl bytemuck::Zeroable for KernelSamplePacked {}
unsafe impl bytemuck::Pod for KernelSamplePacked {}

pub fn pack_kernel(kernel: &[KernelSample]) -> Vec<KernelSamplePacked> {
  kernel
    .iter()
    .map(|s| KernelSamplePacked {
      weight_offset: vec4(s.weight.x, s.weight.y, s.weight.z, s.offset),
    })
    .collect()
}

fn gaussian(variance: f32, r: f32, falloff: Vec3) -> Vec3 {
  // Falloff modulates the shape of the profile. Big falloff spreads it
  // making it wider, small falloff makes it narrower. The +0.001 keeps
  // a zero falloff from dividing by zero.
  let mut g = Vec3::ZERO;
  for i in 0..3 {
    let rr = r / (0.001 + falloff[i]);
    g[i] = f32::exp(-(rr * rr) / (2.0 * variance)) / (2.0 * 3.14 * variance);
  }
  g
}

/// Red channel of the skin profile from [d'Eon07], reused for all three
/// channels and rescaled per-channel with `falloff`.
fn profile(r: f32, falloff: Vec3) -> Vec3 {
  // The 0.233 * gaussian(0.0064, r) lobe is skipped - that is directly
  // bounced light, accounted for by the strength parameter instead.
  0.100 * gaussian(0.0484, r, falloff)
    + 0.118 * gaussian(0.187, r, falloff)
    + 0.113 * gaussian(0.567, r, falloff)
    + 0.358 * gaussian(1.99, r, falloff)
    + 0.078 * gaussian(7.41, r, falloff)
}

/// Build the 1D convolution kernel for the given scatter strength/falloff.
/// Pure function of its inputs - recompute only when they change.
///
/// Index 0 of the result is the center sample (offset 0.0, the directly
/// visible unscattered light); the rest spans `[-RANGE, RANGE]`.
pub fn calculate_kernel(strength: Vec3, falloff: Vec3, n_samples: usize) -> Vec<KernelSample> {
  assert!(n_samples >= 3, "SSS kernel needs at least 3 samples");

  // higher sample densities cover a wider range to keep tail coverage
  let range: f32 = if n_samples > 20 { 3.0 } else { 2.0 };

  // calculate the offsets
  let step = 2.0 * range / (n_samples - 1) as f32;
  let mut kernel: Vec<KernelSample> = (0..n_samples)
    .map(|i| {
      let o = -range + (i as f32) * step;
      let sign = if o < 0.0 { -1.0 } else { 1.0 };
      KernelSample {
        offset: range * sign * f32::abs(f32::powf(o, EXPONENT)) / f32::powf(range, EXPONENT),
        weight: Vec3::ZERO,
      }
    })
    .collect();

  // calculate the weights: area around the sample (average of the deltas
  // to both neighbors) times the profile value at the sample
  for i in 0..n_samples {
    let w0 = if i > 0 {
      f32::abs(kernel[i].offset - kernel[i - 1].offset)
    } else {
      0.0
    };
    let w1 = if i < n_samples - 1 {
      f32::abs(kernel[i].offset - kernel[i + 1].offset)
    } else {
      0.0
    };
    let area = (w0 + w1) / 2.0;
    kernel[i].weight = area * profile(kernel[i].offset, falloff);
  }

  // we want the offset 0.0 to come first
  let mid = n_samples / 2;
  let t_mid = kernel[mid];
  for i in (1..=mid).rev() {
    kernel[i] = kernel[i - 1];
  }
  kernel[0] = t_mid;

  // normalize so each channel sums to 1 - no energy gained or lost,
  // independent of falloff
  let mut sum = Vec3::ZERO;
  for s in &kernel {
    sum += s.weight;
  }
  for s in &mut kernel {
    s.weight /= sum;
  }

  // tweak using the desired strength. Center: lerp(1.0, weight, strength),
  // so at strength 0 all light stays unscattered. Others scale linearly.
  kernel[0].weight = (Vec3::ONE - strength) + strength * kernel[0].weight;
  for s in &mut kernel[1..] {
    s.weight *= strength;
  }

  kernel
}

#[cfg(test)]
mod tests {
  use super::*;
  use glam::vec3;

  const EPS: f32 = 1e-5;

  fn default_strength() -> Vec3 {
    vec3(0.48, 0.41, 0.28)
  }

  fn default_falloff() -> Vec3 {
    vec3(1.0, 0.37, 0.3)
  }

  #[test]
  fn center_sample_has_offset_zero() {
    for &n in &[3, 9, 17, 21, 25] {
      let kernel = calculate_kernel(default_strength(), default_falloff(), n);
      assert_eq!(kernel.len(), n);
      assert_eq!(kernel[0].offset, 0.0, "n_samples={}", n);
    }
  }

  #[test]
  fn offsets_are_antisymmetric() {
    for &n in &[9, 17, 25] {
      let kernel = calculate_kernel(default_strength(), default_falloff(), n);
      let mut offsets: Vec<f32> = kernel.iter().map(|s| s.offset).collect();
      offsets.sort_by(|a, b| a.partial_cmp(b).unwrap());
      for i in 0..n {
        assert!(
          (offsets[i] + offsets[n - 1 - i]).abs() < EPS,
          "offset[{}]={} vs offset[{}]={}",
          i,
          offsets[i],
          n - 1 - i,
          offsets[n - 1 - i]
        );
      }
    }
  }

  #[test]
  fn weights_sum_to_one_per_channel() {
    // at strength 1 the blend is the identity, exposing the normalized
    // weights directly
    let kernel = calculate_kernel(Vec3::ONE, default_falloff(), SSSS_N_SAMPLES);
    let sum: Vec3 = kernel.iter().map(|s| s.weight).sum();
    assert!((sum.x - 1.0).abs() < EPS, "sum.r={}", sum.x);
    assert!((sum.y - 1.0).abs() < EPS, "sum.g={}", sum.y);
    assert!((sum.z - 1.0).abs() < EPS, "sum.b={}", sum.z);
  }

  #[test]
  fn weights_sum_to_one_after_strength_blend() {
    // lerp(1, w0, s) + s * (1 - w0) == 1, for any strength
    let kernel = calculate_kernel(default_strength(), default_falloff(), SSSS_N_SAMPLES);
    let sum: Vec3 = kernel.iter().map(|s| s.weight).sum();
    assert!((sum.x - 1.0).abs() < EPS);
    assert!((sum.y - 1.0).abs() < EPS);
    assert!((sum.z - 1.0).abs() < EPS);
  }

  #[test]
  fn zero_strength_is_pure_passthrough() {
    let kernel = calculate_kernel(Vec3::ZERO, default_falloff(), SSSS_N_SAMPLES);
    assert!((kernel[0].weight - Vec3::ONE).length() < EPS);
    for s in &kernel[1..] {
      assert!(s.weight.length() < EPS, "expected zero weight, got {:?}", s.weight);
    }
  }

  #[test]
  fn strength_lerps_towards_full_scatter_weight() {
    let full = calculate_kernel(Vec3::ONE, default_falloff(), SSSS_N_SAMPLES);
    let half = calculate_kernel(Vec3::splat(0.5), default_falloff(), SSSS_N_SAMPLES);
    // center: lerp(1.0, w, 0.5)
    let expected = 0.5 * Vec3::ONE + 0.5 * full[0].weight;
    assert!((half[0].weight - expected).length() < EPS);
    // others: w * 0.5
    for i in 1..SSSS_N_SAMPLES {
      assert!((half[i].weight - 0.5 * full[i].weight).length() < EPS);
    }
  }

  #[test]
  fn default_skin_params_give_partial_scatter() {
    let kernel = calculate_kernel(default_strength(), default_falloff(), SSSS_N_SAMPLES);
    let w0 = kernel[0].weight;
    for ch in 0..3 {
      assert!(w0[ch] > 0.0 && w0[ch] < 1.0, "center weight {:?}", w0);
    }
    for s in &kernel {
      assert!(s.offset.is_finite());
      assert!(s.weight.is_finite(), "non-finite weight {:?}", s.weight);
    }
  }

  #[test]
  fn zero_falloff_stays_finite() {
    let kernel = calculate_kernel(default_strength(), Vec3::ZERO, SSSS_N_SAMPLES);
    for s in &kernel {
      assert!(s.weight.is_finite(), "non-finite weight {:?}", s.weight);
    }
    let sum: Vec3 = kernel.iter().map(|s| s.weight).sum();
    assert!((sum.x - 1.0).abs() < EPS);
  }

  #[test]
  fn packed_layout_is_weight_then_offset() {
    let kernel = calculate_kernel(default_strength(), default_falloff(), SSSS_N_SAMPLES);
    let packed = pack_kernel(&kernel);
    let raw: &[f32] = bytemuck::cast_slice(&packed);
    assert_eq!(raw.len(), SSSS_N_SAMPLES * 4);
    for (i, s) in kernel.iter().enumerate() {
      assert_eq!(raw[i * 4], s.weight.x);
      assert_eq!(raw[i * 4 + 1], s.weight.y);
      assert_eq!(raw[i * 4 + 2], s.weight.z);
      assert_eq!(raw[i * 4 + 3], s.offset);
    }
  }
}
