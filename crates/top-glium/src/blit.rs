//! Copying the rendered texture into the host's framebuffer.

use anyhow::{bail, Result};
use gl::types::{GLint, GLuint};
use glium::{GlObject, Texture2d};

/// A framebuffer object kept around only as the read side of blits.
///
/// Created lazily on first use so it lives in the host's context.
#[derive(Debug, Default)]
pub(crate) struct BlitFramebuffer {
    fbo: GLuint,
}

impl BlitFramebuffer {
    /// Copy all of `texture` into `host_fbo` at the same size.
    ///
    /// # Safety
    ///
    /// Requires the host's context current and GL loaded. Leaves the draw
    /// and read framebuffer bindings changed; the caller restores them.
    pub(crate) unsafe fn copy_to(&mut self, texture: &Texture2d, host_fbo: GLuint) -> Result<()> {
        if self.fbo == 0 || gl::IsFramebuffer(self.fbo) == gl::FALSE {
            gl::GenFramebuffers(1, &mut self.fbo);
        }
        if self.fbo == 0 {
            bail!("blit framebuffer could not be created");
        }

        let (width, height) = texture.dimensions();

        gl::BindFramebuffer(gl::READ_FRAMEBUFFER, self.fbo);
        gl::FramebufferTexture2D(
            gl::READ_FRAMEBUFFER,
            gl::COLOR_ATTACHMENT0,
            gl::TEXTURE_2D,
            texture.get_id(),
            0,
        );
        gl::ReadBuffer(gl::COLOR_ATTACHMENT0);
        let status = gl::CheckFramebufferStatus(gl::READ_FRAMEBUFFER);
        if status != gl::FRAMEBUFFER_COMPLETE {
            bail!("blit framebuffer incomplete: {status:#x}");
        }

        gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, host_fbo);
        gl::BlitFramebuffer(
            0,
            0,
            width as GLint,
            height as GLint,
            0,
            0,
            width as GLint,
            height as GLint,
            gl::COLOR_BUFFER_BIT,
            gl::NEAREST,
        );
        Ok(())
    }
}

impl Drop for BlitFramebuffer {
    fn drop(&mut self) {
        if self.fbo != 0 {
            unsafe { gl::DeleteFramebuffers(1, &self.fbo) };
        }
    }
}
