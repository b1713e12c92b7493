mod sss_blur_pass;

pub use self::sss_blur_pass::{SSSBlurPass, SPECULAR_GEOMETRY_TAG};
