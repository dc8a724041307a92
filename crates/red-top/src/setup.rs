//! Lazy renderer setup.

use anyhow::anyhow;
use top_core::{Result, ShaderTier, Toolkit, TopError};
use tracing::debug;

use crate::config::ShaderLibrary;

/// Whether the renderer has been set up inside the host's context.
///
/// The shader only exists in `Initialized`, so nothing can draw with it
/// before it is loaded.
#[derive(Debug)]
pub enum SetupState<S> {
    Uninitialized,
    Initialized { shader: S, tier: ShaderTier },
}

impl<S> Default for SetupState<S> {
    fn default() -> Self {
        SetupState::Uninitialized
    }
}

impl<S> SetupState<S> {
    pub fn is_initialized(&self) -> bool {
        matches!(self, SetupState::Initialized { .. })
    }

    pub fn tier(&self) -> Option<ShaderTier> {
        match self {
            SetupState::Initialized { tier, .. } => Some(*tier),
            SetupState::Uninitialized => None,
        }
    }

    /// Set up on first use and hand out the shader.
    ///
    /// A failure leaves the state `Uninitialized`, so the next frame tries
    /// again.
    pub fn ensure<T>(&mut self, toolkit: &mut T, library: &ShaderLibrary) -> Result<&S>
    where
        T: Toolkit<Shader = S>,
    {
        if !self.is_initialized() {
            let tier = toolkit.setup().map_err(TopError::RenderSetup)?;
            let sources = library.load(tier).map_err(TopError::RenderSetup)?;
            let shader = toolkit
                .load_shader(&sources.program())
                .map_err(TopError::RenderSetup)?;
            debug!(%tier, "renderer set up");
            *self = SetupState::Initialized { shader, tier };
        }

        match self {
            SetupState::Initialized { shader, .. } => Ok(shader),
            SetupState::Uninitialized => Err(TopError::RenderSetup(anyhow!(
                "renderer setup did not complete"
            ))),
        }
    }
}
