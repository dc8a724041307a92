//! Shader sources compiled into the library, one pair per tier.

use top_core::ShaderTier;

/// Base file name of the program under each tier directory.
pub const SHADER_NAME: &str = "shader";

/// Uniform carrying the `Red` parameter.
pub const RED_UNIFORM: &str = "red";

pub fn embedded(tier: ShaderTier) -> (&'static str, &'static str) {
    match tier {
        ShaderTier::Gl3 => (
            include_str!("../shaders/shadersGL3/shader.vert"),
            include_str!("../shaders/shadersGL3/shader.frag"),
        ),
        ShaderTier::Gl2 => (
            include_str!("../shaders/shadersGL2/shader.vert"),
            include_str!("../shaders/shadersGL2/shader.frag"),
        ),
        ShaderTier::Es2 => (
            include_str!("../shaders/shadersES2/shader.vert"),
            include_str!("../shaders/shadersES2/shader.frag"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tier_declares_the_red_uniform() {
        for tier in ShaderTier::ALL {
            let (vertex, fragment) = embedded(tier);
            assert!(vertex.contains("modelViewProjectionMatrix"), "{tier}");
            assert!(fragment.contains("uniform float red;"), "{tier}");
        }
    }

    #[test]
    fn versions_match_tiers() {
        assert!(embedded(ShaderTier::Gl3).0.starts_with("#version 150"));
        assert!(embedded(ShaderTier::Gl2).1.starts_with("#version 120"));
        assert!(embedded(ShaderTier::Es2).1.starts_with("#version 100"));
    }
}
