//! The rendering toolkit a node draws with, and the scope draws happen in.
//!
//! A [`Toolkit`] is a small immediate-mode state machine: set up once, load
//! shader programs, then per frame start a render, bind, push, draw, pop,
//! unbind and finish. [`RenderScope`] owns the second half of that sequence
//! so it runs even when a draw fails.

#[cfg(any(test, feature = "software"))]
pub mod software;

use std::fmt;

use anyhow::Result;

/// Shader language level a context supports, best first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShaderTier {
    /// Programmable pipeline, GLSL 1.50.
    Gl3,
    /// Fixed-function era desktop GL, GLSL 1.20.
    Gl2,
    /// OpenGL ES 2, GLSL ES 1.00.
    Es2,
}

impl ShaderTier {
    pub const ALL: [ShaderTier; 3] = [ShaderTier::Gl3, ShaderTier::Gl2, ShaderTier::Es2];

    /// Directory holding this tier's shader files under a data root.
    pub fn dir_name(self) -> &'static str {
        match self {
            ShaderTier::Gl3 => "shadersGL3",
            ShaderTier::Gl2 => "shadersGL2",
            ShaderTier::Es2 => "shadersES2",
        }
    }
}

impl fmt::Display for ShaderTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Vertex and fragment source for one program.
#[derive(Debug, Clone, Copy)]
pub struct ShaderProgram<'a> {
    pub name: &'a str,
    pub tier: ShaderTier,
    pub vertex: &'a str,
    pub fragment: &'a str,
}

/// Drawing primitives used by a node.
///
/// Methods returning `()` are bookkeeping that cannot fail; anything that
/// touches GPU objects returns a `Result`.
pub trait Toolkit {
    type Shader;

    /// Size the private off-screen window the toolkit keeps its state on.
    fn ensure_window(&mut self, width: u32, height: u32);

    /// Initialise the backend inside the current context. Returns the best
    /// shader tier the context supports.
    fn setup(&mut self) -> Result<ShaderTier>;

    fn load_shader(&mut self, program: &ShaderProgram<'_>) -> Result<Self::Shader>;

    /// Begin rendering into a target the size of the window.
    fn start_render(&mut self) -> Result<()>;

    /// Screen-space projection: origin top-left, one unit per pixel.
    fn setup_screen(&mut self);

    fn bind(&mut self, shader: &Self::Shader);

    fn push_matrix(&mut self);

    /// Set a float uniform on the bound shader.
    fn set_uniform_1f(&mut self, name: &str, value: f32) -> Result<()>;

    fn draw_rectangle(&mut self, x: f32, y: f32, z: f32, width: f32, height: f32) -> Result<()>;

    fn pop_matrix(&mut self);

    fn unbind(&mut self);

    /// Deliver the frame to the host.
    fn finish_render(&mut self);
}

/// A started render with `shader` bound and one transform frame pushed.
///
/// Dropping it pops the frame, unbinds and finishes the render.
pub struct RenderScope<'a, T: Toolkit> {
    toolkit: &'a mut T,
}

impl<'a, T: Toolkit> RenderScope<'a, T> {
    pub fn begin(toolkit: &'a mut T, shader: &T::Shader) -> Result<Self> {
        toolkit.start_render()?;
        toolkit.setup_screen();
        toolkit.bind(shader);
        toolkit.push_matrix();
        Ok(Self { toolkit })
    }

    pub fn set_uniform_1f(&mut self, name: &str, value: f32) -> Result<()> {
        self.toolkit.set_uniform_1f(name, value)
    }

    pub fn draw_rectangle(
        &mut self,
        x: f32,
        y: f32,
        z: f32,
        width: f32,
        height: f32,
    ) -> Result<()> {
        self.toolkit.draw_rectangle(x, y, z, width, height)
    }
}

impl<T: Toolkit> Drop for RenderScope<'_, T> {
    fn drop(&mut self) {
        self.toolkit.pop_matrix();
        self.toolkit.unbind();
        self.toolkit.finish_render();
    }
}
