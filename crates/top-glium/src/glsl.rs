//! GLSL capability detection.

use glium::{Api, CapabilitiesSource, Version};
use top_core::ShaderTier;

/// Pick the best shader tier from the GLSL versions a context supports.
pub fn detect_tier(ctx: &impl CapabilitiesSource) -> Option<ShaderTier> {
    best_tier(&ctx.get_capabilities().supported_glsl_versions)
}

/// `Gl3` needs GLSL 1.50, `Gl2` GLSL 1.20, `Es2` GLSL ES 1.00.
///
/// glium lists pre-3.30 GLSL versions by their first two digits, so 1.50 is
/// `Version(Gl, 1, 5)` and 1.20 is `Version(Gl, 1, 2)`. From 3.30 on the
/// GLSL version follows the GL version (`Version(Gl, 3, 3)`, `(4, 0)`, ...).
pub fn best_tier(glsl_versions: &[Version]) -> Option<ShaderTier> {
    let supports = |api: Api, major: u8, minor: u8| {
        glsl_versions
            .iter()
            .any(|v| v.0 == api && (v.1, v.2) >= (major, minor))
    };

    if supports(Api::Gl, 1, 5) {
        Some(ShaderTier::Gl3)
    } else if supports(Api::Gl, 1, 2) {
        Some(ShaderTier::Gl2)
    } else if supports(Api::GlEs, 1, 0) {
        Some(ShaderTier::Es2)
    } else {
        None
    }
}
