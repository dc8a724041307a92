//! Raw OpenGL backend for glium, wrapping the host-provided GL context.

use std::cell::Cell;
use std::sync::Once;

pub(crate) static GL_INIT_ONCE: Once = Once::new();

/// Load GL function pointers, exactly once per process, via `gl_loader`.
///
/// Must run with the host's context current.
pub(crate) fn load_gl() {
    GL_INIT_ONCE.call_once(|| {
        gl_loader::init_gl();
        gl::load_with(|s| gl_loader::get_proc_address(s).cast());
    });
}

/// Backend whose "window" is the toolkit's off-screen window: it never owns
/// a context and reports whatever size the window was last given.
#[derive(Debug)]
pub(crate) struct RawGlBackend {
    size: Cell<(u32, u32)>,
}

impl RawGlBackend {
    /// Makes no GL calls, so it is safe outside the host's GL scope.
    pub(crate) fn new(size: (u32, u32)) -> Self {
        Self {
            size: Cell::new(size),
        }
    }

    pub(crate) fn size(&self) -> (u32, u32) {
        self.size.get()
    }

    pub(crate) fn set_size(&self, size: (u32, u32)) {
        self.size.set(size);
    }
}

/// # Safety
///
/// This implementation assumes it is only used inside the host's
/// begin/end GL commands, where the host has made its context current.
/// Using it outside that scope is undefined behaviour.
unsafe impl glium::backend::Backend for RawGlBackend {
    fn swap_buffers(&self) -> Result<(), glium::SwapBuffersError> {
        Ok(())
    }

    unsafe fn get_proc_address(&self, symbol: &str) -> *const std::os::raw::c_void {
        gl_loader::get_proc_address(symbol).cast()
    }

    fn get_framebuffer_dimensions(&self) -> (u32, u32) {
        self.size.get()
    }

    fn is_current(&self) -> bool {
        true
    }

    unsafe fn make_current(&self) {}

    fn resize(&self, new_size: (u32, u32)) {
        self.size.set(new_size);
    }
}

#[cfg(test)]
mod tests {
    use glium::backend::Backend;

    use super::*;

    #[test]
    fn dimensions_follow_the_window() {
        let backend = RawGlBackend::new((0, 0));
        backend.set_size((320, 240));
        assert_eq!(backend.get_framebuffer_dimensions(), (320, 240));
        backend.resize((64, 64));
        assert_eq!(backend.size(), (64, 64));
        assert!(backend.is_current());
    }
}
