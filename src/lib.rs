//! Separable subsurface scattering approximation for skin rendering.
//!
//! CPU side of the effect: builds the per-channel diffusion profile kernel
//! (`SSSSBlurPS` from Jimenez, Gutierrez) and sequences the horizontal and
//! vertical blur passes plus the specular re-add. The actual per-pixel work
//! is delegated to a host-provided [`SssBackend`].

pub mod backend;
pub mod config;
pub mod cpu_backend;
pub mod kernel;
pub mod render_graph;

pub use self::backend::{DepthCompare, SssBackend, TextureDescriptor, TextureFormat};
pub use self::config::SeparableSSSCfg;
pub use self::kernel::{
  calculate_kernel, pack_kernel, KernelSample, KernelSamplePacked, SSSS_N_SAMPLES,
};
pub use self::render_graph::SSSBlurPass;
