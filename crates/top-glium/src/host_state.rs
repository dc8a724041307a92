//! Save and restore the host's OpenGL state around our drawing.

use gl::types::{GLboolean, GLenum, GLint, GLuint};
use glium::{Api, Version};

/// Whether a context has the entry points save, restore and the blit use:
/// vertex array objects, separate draw/read framebuffers and
/// `glBlitFramebuffer`. Those arrive with GL 3.0 and GLES 3.0.
pub(crate) fn context_supported(gl_version: &Version) -> bool {
    matches!(gl_version, Version(Api::Gl | Api::GlEs, major, _) if *major >= 3)
}

/// The parts of the host's GL state glium is free to change.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HostGlState {
    program: GLint,
    draw_framebuffer: GLint,
    read_framebuffer: GLint,
    array_buffer: GLint,
    texture_2d: GLint,
    active_texture: GLint,
    vao: GLint,
    viewport: [GLint; 4],
    blend: GLboolean,
    depth_test: GLboolean,
    scissor_test: GLboolean,
}

impl HostGlState {
    /// # Safety
    ///
    /// Must be called with the host's context current and GL loaded.
    pub(crate) unsafe fn save() -> Self {
        let mut s = Self {
            program: 0,
            draw_framebuffer: 0,
            read_framebuffer: 0,
            array_buffer: 0,
            texture_2d: 0,
            active_texture: 0,
            vao: 0,
            viewport: [0; 4],
            blend: gl::FALSE,
            depth_test: gl::FALSE,
            scissor_test: gl::FALSE,
        };
        gl::GetIntegerv(gl::CURRENT_PROGRAM, &mut s.program);
        gl::GetIntegerv(gl::DRAW_FRAMEBUFFER_BINDING, &mut s.draw_framebuffer);
        gl::GetIntegerv(gl::READ_FRAMEBUFFER_BINDING, &mut s.read_framebuffer);
        gl::GetIntegerv(gl::ARRAY_BUFFER_BINDING, &mut s.array_buffer);
        gl::GetIntegerv(gl::TEXTURE_BINDING_2D, &mut s.texture_2d);
        gl::GetIntegerv(gl::ACTIVE_TEXTURE, &mut s.active_texture);
        gl::GetIntegerv(gl::VERTEX_ARRAY_BINDING, &mut s.vao);
        gl::GetIntegerv(gl::VIEWPORT, s.viewport.as_mut_ptr());
        s.blend = gl::IsEnabled(gl::BLEND);
        s.depth_test = gl::IsEnabled(gl::DEPTH_TEST);
        s.scissor_test = gl::IsEnabled(gl::SCISSOR_TEST);
        s
    }

    /// The framebuffer the host wants the frame in.
    pub(crate) fn host_framebuffer(&self) -> GLuint {
        self.draw_framebuffer as GLuint
    }

    /// # Safety
    ///
    /// Must be called with the same context current as [`HostGlState::save`].
    pub(crate) unsafe fn restore(&self) {
        gl::UseProgram(self.program as GLuint);
        gl::BindFramebuffer(gl::DRAW_FRAMEBUFFER, self.draw_framebuffer as GLuint);
        gl::BindFramebuffer(gl::READ_FRAMEBUFFER, self.read_framebuffer as GLuint);
        gl::BindBuffer(gl::ARRAY_BUFFER, self.array_buffer as GLuint);
        gl::ActiveTexture(self.active_texture as GLenum);
        gl::BindTexture(gl::TEXTURE_2D, self.texture_2d as GLuint);
        gl::BindVertexArray(self.vao as GLuint);
        gl::Viewport(
            self.viewport[0],
            self.viewport[1],
            self.viewport[2],
            self.viewport[3],
        );
        set_capability(gl::BLEND, self.blend);
        set_capability(gl::DEPTH_TEST, self.depth_test);
        set_capability(gl::SCISSOR_TEST, self.scissor_test);
    }
}

unsafe fn set_capability(cap: GLenum, enabled: GLboolean) {
    if enabled == gl::TRUE {
        gl::Enable(cap);
    } else {
        gl::Disable(cap);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn needs_gl3_or_gles3() {
        assert!(context_supported(&Version(Api::Gl, 3, 0)));
        assert!(context_supported(&Version(Api::Gl, 4, 6)));
        assert!(context_supported(&Version(Api::GlEs, 3, 0)));
        assert!(!context_supported(&Version(Api::Gl, 2, 1)));
        assert!(!context_supported(&Version(Api::GlEs, 2, 0)));
    }
}
