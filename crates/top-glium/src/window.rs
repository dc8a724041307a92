//! The toolkit's private window.

use std::rc::Rc;

use tracing::trace;

use crate::gl_backend::RawGlBackend;

/// A window that is never shown and never creates a GL context.
///
/// It only gives the toolkit a size to lay out the screen transform and the
/// render target; drawing happens in the host's context. Each toolkit owns
/// its own window.
#[derive(Debug)]
pub struct OffscreenWindow {
    backend: Rc<RawGlBackend>,
}

impl Default for OffscreenWindow {
    fn default() -> Self {
        Self::new()
    }
}

impl OffscreenWindow {
    pub fn new() -> Self {
        Self {
            backend: Rc::new(RawGlBackend::new((0, 0))),
        }
    }

    /// Resize to `width` × `height`. Returns `true` if the size changed.
    pub fn ensure_size(&self, width: u32, height: u32) -> bool {
        if self.backend.size() == (width, height) {
            return false;
        }
        trace!(width, height, "resizing off-screen window");
        self.backend.set_size((width, height));
        true
    }

    pub fn size(&self) -> (u32, u32) {
        self.backend.size()
    }

    pub(crate) fn backend(&self) -> Rc<RawGlBackend> {
        self.backend.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resizing_reports_changes_only() {
        let window = OffscreenWindow::new();
        assert_eq!(window.size(), (0, 0));
        assert!(window.ensure_size(256, 256));
        assert!(!window.ensure_size(256, 256));
        assert!(window.ensure_size(128, 256));
        assert_eq!(window.size(), (128, 256));
    }
}
