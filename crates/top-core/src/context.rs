//! The host's GL context and the scope GPU commands must stay inside.

use tracing::warn;

use crate::ffi::TOP_Context;

/// Brackets for GPU work inside the host's context.
pub trait GlCommandContext {
    /// Make the host's context current. Returns `false` if the host refused.
    fn begin_gl_commands(&mut self) -> bool;
    fn end_gl_commands(&mut self);
}

/// [`GlCommandContext`] backed by the host's `TOP_Context`.
#[derive(Debug)]
pub struct HostContext<'a> {
    raw: &'a mut TOP_Context,
}

impl<'a> HostContext<'a> {
    /// # Safety
    ///
    /// `raw` must be a live host object with a valid vtable for `'a`.
    pub unsafe fn new(raw: &'a mut TOP_Context) -> Self {
        Self { raw }
    }
}

impl GlCommandContext for HostContext<'_> {
    fn begin_gl_commands(&mut self) -> bool {
        unsafe { ((*self.raw.vtable).beginGLCommands)(&mut *self.raw) }
    }

    fn end_gl_commands(&mut self) {
        unsafe { ((*self.raw.vtable).endGLCommands)(&mut *self.raw) }
    }
}

/// Calls `end_gl_commands` when dropped, on every exit path.
pub struct GlCommandScope<'a> {
    context: &'a mut dyn GlCommandContext,
}

impl<'a> GlCommandScope<'a> {
    pub fn begin(context: &'a mut dyn GlCommandContext) -> Self {
        if !context.begin_gl_commands() {
            warn!("host did not accept beginGLCommands");
        }
        Self { context }
    }
}

impl Drop for GlCommandScope<'_> {
    fn drop(&mut self) {
        self.context.end_gl_commands();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        calls: Vec<&'static str>,
    }

    impl GlCommandContext for Recorder {
        fn begin_gl_commands(&mut self) -> bool {
            self.calls.push("begin");
            true
        }

        fn end_gl_commands(&mut self) {
            self.calls.push("end");
        }
    }

    fn fails_inside(context: &mut dyn GlCommandContext) -> Result<(), &'static str> {
        let _scope = GlCommandScope::begin(context);
        Err("draw failed")
    }

    #[test]
    fn scope_ends_on_error_path() {
        let mut recorder = Recorder::default();
        assert!(fails_inside(&mut recorder).is_err());
        assert_eq!(recorder.calls, ["begin", "end"]);
    }
}
