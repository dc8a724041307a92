//! Where shader files come from.
//!
//! Setting `RED_TOP_DATA_PATH` to a directory makes setup read
//! `<root>/<tier dir>/shader.vert` and `shader.frag` from disk, e.g.
//! `<root>/shadersGL3/shader.frag`. Without it the embedded copies are used.

use std::borrow::Cow;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use top_core::{ShaderProgram, ShaderTier};
use tracing::debug;

use crate::shaders::{self, SHADER_NAME};

pub const DATA_PATH_ENV: &str = "RED_TOP_DATA_PATH";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderLibrary {
    root: Option<PathBuf>,
}

impl ShaderLibrary {
    pub fn embedded() -> Self {
        Self { root: None }
    }

    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
        }
    }

    pub fn from_env() -> Self {
        Self::from_env_value(std::env::var_os(DATA_PATH_ENV))
    }

    /// An unset or empty value selects the embedded shaders.
    pub fn from_env_value(value: Option<OsString>) -> Self {
        match value {
            Some(root) if !root.is_empty() => Self::with_root(root),
            _ => Self::embedded(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn load(&self, tier: ShaderTier) -> Result<ShaderSources> {
        let Some(root) = &self.root else {
            let (vertex, fragment) = shaders::embedded(tier);
            return Ok(ShaderSources {
                tier,
                vertex: Cow::Borrowed(vertex),
                fragment: Cow::Borrowed(fragment),
            });
        };

        let dir = root.join(tier.dir_name());
        let read = |ext: &str| {
            let path = dir.join(format!("{SHADER_NAME}.{ext}"));
            fs::read_to_string(&path)
                .with_context(|| format!("reading shader {}", path.display()))
        };
        let sources = ShaderSources {
            tier,
            vertex: Cow::Owned(read("vert")?),
            fragment: Cow::Owned(read("frag")?),
        };
        debug!(dir = %dir.display(), "shader sources read from data path");
        Ok(sources)
    }
}

#[derive(Debug, Clone)]
pub struct ShaderSources {
    pub tier: ShaderTier,
    pub vertex: Cow<'static, str>,
    pub fragment: Cow<'static, str>,
}

impl ShaderSources {
    pub fn program(&self) -> ShaderProgram<'_> {
        ShaderProgram {
            name: SHADER_NAME,
            tier: self.tier,
            vertex: &self.vertex,
            fragment: &self.fragment,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_env_value_means_embedded() {
        assert_eq!(ShaderLibrary::from_env_value(None), ShaderLibrary::embedded());
        assert_eq!(
            ShaderLibrary::from_env_value(Some(OsString::new())),
            ShaderLibrary::embedded()
        );
        let lib = ShaderLibrary::from_env_value(Some("/opt/red".into()));
        assert_eq!(lib.root(), Some(Path::new("/opt/red")));
    }

    #[test]
    fn embedded_sources_per_tier() {
        let sources = ShaderLibrary::embedded().load(ShaderTier::Gl2).unwrap();
        let program = sources.program();
        assert_eq!(program.name, "shader");
        assert_eq!(program.tier, ShaderTier::Gl2);
        assert_eq!(program.fragment, shaders::embedded(ShaderTier::Gl2).1);
    }

    #[test]
    fn missing_file_names_the_path() {
        let lib = ShaderLibrary::with_root("/nonexistent/red-top");
        let err = lib.load(ShaderTier::Es2).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("shadersES2"), "{message}");
        assert!(message.contains("shader.vert"), "{message}");
    }
}
