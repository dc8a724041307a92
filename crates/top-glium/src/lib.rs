//! A [`Toolkit`] that draws with glium inside the host's OpenGL context.
//!
//! [`GliumToolkit`] keeps an [`OffscreenWindow`] for its size, renders into a
//! cached texture the size of that window, and blits the result into the
//! framebuffer the host had bound when the render started.
//!
//! ### Warning
//!
//! Every method that touches GL assumes the host has made its context
//! current, i.e. it runs between the host's begin/end GL commands. The
//! host's GL state is saved when a render starts and restored when it
//! finishes.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

use anyhow::{anyhow, bail, Context as _, Result};
use glium::backend::Context;
use glium::index::{NoIndices, PrimitiveType};
use glium::texture::{MipmapsOption, UncompressedFloatFormat};
use glium::uniforms::{UniformValue, Uniforms};
use glium::{implement_vertex, CapabilitiesSource, Program, Surface, Texture2d, VertexBuffer};
use top_core::{ShaderProgram, ShaderTier, Toolkit};
use tracing::{debug, error, trace};

mod blit;
mod gl_backend;
pub mod glsl;
mod host_state;
pub mod matrix;
pub mod window;

pub use window::OffscreenWindow;

use host_state::HostGlState;
use matrix::Mat4;

/// Name of the transform uniform every program receives.
pub const MVP_UNIFORM: &str = "modelViewProjectionMatrix";

#[derive(Copy, Clone)]
struct QuadVertex {
    position: [f32; 4],
}

implement_vertex!(QuadVertex, position);

const UNIT_QUAD: [QuadVertex; 4] = [
    QuadVertex {
        position: [0.0, 0.0, 0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 0.0, 0.0, 1.0],
    },
    QuadVertex {
        position: [0.0, 1.0, 0.0, 1.0],
    },
    QuadVertex {
        position: [1.0, 1.0, 0.0, 1.0],
    },
];

struct ShaderInner {
    name: String,
    program: Program,
    floats: RefCell<BTreeMap<String, f32>>,
}

/// A linked program and the uniform values last set on it.
#[derive(Clone)]
pub struct GliumShader(Rc<ShaderInner>);

impl GliumShader {
    pub fn name(&self) -> &str {
        &self.0.name
    }
}

impl Debug for GliumShader {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GliumShader")
            .field("name", &self.0.name)
            .field("floats", &self.0.floats.borrow())
            .finish()
    }
}

struct DrawUniforms<'a> {
    mvp: Mat4,
    floats: &'a BTreeMap<String, f32>,
}

impl Uniforms for DrawUniforms<'_> {
    fn visit_values<'a, F: FnMut(&str, UniformValue<'a>)>(&'a self, mut visit: F) {
        visit(MVP_UNIFORM, UniformValue::Mat4(self.mvp));
        for (name, value) in self.floats {
            visit(name, UniformValue::Float(*value));
        }
    }
}

/// Transform taking [`UNIT_QUAD`] to a `width` × `height` rectangle at
/// `origin`, then to clip space.
fn rectangle_mvp(
    projection: &Mat4,
    modelview: &Mat4,
    origin: [f32; 3],
    width: f32,
    height: f32,
) -> Mat4 {
    let [x, y, z] = origin;
    let model = matrix::mul(
        &matrix::translate(x, y, z),
        &matrix::scale(width, height, 1.0),
    );
    matrix::mul(&matrix::mul(projection, modelview), &model)
}

/// Cached render target to avoid per-frame GL allocations.
struct CachedTarget {
    texture: Texture2d,
    dims: (u32, u32),
}

/// GPU objects that exist once [`Toolkit::setup`] has succeeded.
struct Gpu {
    ctx: Rc<Context>,
    quad: VertexBuffer<QuadVertex>,
    target: Option<CachedTarget>,
    blit: blit::BlitFramebuffer,
}

/// Use this toolkit to draw with glium, making assumptions about the OpenGL
/// context inside a TOP host.
pub struct GliumToolkit {
    window: OffscreenWindow,
    gpu: Option<Gpu>,
    host_state: Option<HostGlState>,
    projection: Mat4,
    modelview: Mat4,
    matrix_stack: Vec<Mat4>,
    bound: Option<GliumShader>,
}

impl Debug for GliumToolkit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GliumToolkit")
            .field("window", &self.window.size())
            .field("ready", &self.gpu.is_some())
            .field("rendering", &self.host_state.is_some())
            .field("bound", &self.bound)
            .finish()
    }
}

impl Default for GliumToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl GliumToolkit {
    /// Makes no GL calls; GL work starts in [`Toolkit::setup`].
    pub fn new() -> Self {
        Self {
            window: OffscreenWindow::new(),
            gpu: None,
            host_state: None,
            projection: matrix::IDENTITY,
            modelview: matrix::IDENTITY,
            matrix_stack: Vec::new(),
            bound: None,
        }
    }

    pub fn window(&self) -> &OffscreenWindow {
        &self.window
    }

    fn gpu_mut(&mut self) -> Result<&mut Gpu> {
        self.gpu
            .as_mut()
            .ok_or_else(|| anyhow!("glium toolkit used before setup"))
    }
}

impl Toolkit for GliumToolkit {
    type Shader = GliumShader;

    fn ensure_window(&mut self, width: u32, height: u32) {
        self.window.ensure_size(width, height);
    }

    fn setup(&mut self) -> Result<ShaderTier> {
        gl_backend::load_gl();

        let ctx = unsafe {
            Context::new(
                self.window.backend(),
                false,
                glium::debug::DebugCallbackBehavior::Ignore,
            )
        }
        .map_err(|err| anyhow!("glium context could not be created: {err}"))?;

        debug!(
            version = %ctx.get_opengl_version_string(),
            glsl = ?ctx.get_capabilities().supported_glsl_versions,
            "glium context created"
        );

        let gl_version = ctx.get_opengl_version();
        if !host_state::context_supported(gl_version) {
            bail!("{gl_version:?} is too old: GL 3.0 or GLES 3.0 is required to share the host's framebuffer");
        }
        let tier = glsl::detect_tier(&*ctx)
            .ok_or_else(|| anyhow!("no supported GLSL version in this context"))?;

        let quad = VertexBuffer::new(&ctx, &UNIT_QUAD)
            .map_err(|err| anyhow!("quad vertex buffer could not be created: {err}"))?;

        self.gpu = Some(Gpu {
            ctx,
            quad,
            target: None,
            blit: blit::BlitFramebuffer::default(),
        });
        Ok(tier)
    }

    fn load_shader(&mut self, program: &ShaderProgram<'_>) -> Result<GliumShader> {
        let gpu = self.gpu_mut()?;
        let linked = Program::from_source(&gpu.ctx, program.vertex, program.fragment, None)
            .map_err(|err| anyhow!("shader '{}' ({}): {err}", program.name, program.tier))?;
        debug!(name = program.name, tier = %program.tier, "shader loaded");
        Ok(GliumShader(Rc::new(ShaderInner {
            name: program.name.to_owned(),
            program: linked,
            floats: RefCell::new(BTreeMap::new()),
        })))
    }

    fn start_render(&mut self) -> Result<()> {
        if self.host_state.is_some() {
            bail!("render already started");
        }
        let dims = self.window.size();
        if dims.0 == 0 || dims.1 == 0 {
            bail!("off-screen window has no size");
        }
        let backend = self.window.backend();
        let gpu = self.gpu_mut()?;

        // The host may have touched any GL state since our last frame.
        unsafe { gpu.ctx.rebuild(backend) }
            .map_err(|err| anyhow!("glium context could not be rebuilt: {err}"))?;
        let host_state = unsafe { HostGlState::save() };

        // Only recreate the target when dimensions change.
        if gpu.target.as_ref().map(|t| t.dims) != Some(dims) {
            let texture = Texture2d::empty_with_format(
                &gpu.ctx,
                UncompressedFloatFormat::U8U8U8U8,
                MipmapsOption::NoMipmap,
                dims.0,
                dims.1,
            )
            .with_context(|| format!("render target {}x{} could not be created", dims.0, dims.1));
            let texture = match texture {
                Ok(texture) => texture,
                Err(err) => {
                    unsafe { host_state.restore() };
                    return Err(err);
                }
            };
            gpu.target = Some(CachedTarget { texture, dims });
        }
        if let Some(target) = &gpu.target {
            target.texture.as_surface().clear_color(0.0, 0.0, 0.0, 0.0);
        }

        trace!(?dims, "render started");
        self.host_state = Some(host_state);
        self.modelview = matrix::IDENTITY;
        self.matrix_stack.clear();
        Ok(())
    }

    fn setup_screen(&mut self) {
        let (width, height) = self.window.size();
        self.projection = matrix::screen(width, height);
        self.modelview = matrix::IDENTITY;
    }

    fn bind(&mut self, shader: &GliumShader) {
        self.bound = Some(shader.clone());
    }

    fn push_matrix(&mut self) {
        self.matrix_stack.push(self.modelview);
    }

    fn set_uniform_1f(&mut self, name: &str, value: f32) -> Result<()> {
        let shader = self
            .bound
            .as_ref()
            .ok_or_else(|| anyhow!("uniform '{name}' set with no shader bound"))?;
        shader.0.floats.borrow_mut().insert(name.to_owned(), value);
        Ok(())
    }

    fn draw_rectangle(&mut self, x: f32, y: f32, z: f32, width: f32, height: f32) -> Result<()> {
        if self.host_state.is_none() {
            bail!("draw outside a render");
        }
        let shader = self
            .bound
            .clone()
            .ok_or_else(|| anyhow!("draw with no shader bound"))?;
        let mvp = rectangle_mvp(&self.projection, &self.modelview, [x, y, z], width, height);

        let gpu = self.gpu_mut()?;
        let target = gpu
            .target
            .as_ref()
            .ok_or_else(|| anyhow!("no render target"))?;
        let floats = shader.0.floats.borrow();
        let uniforms = DrawUniforms {
            mvp,
            floats: &floats,
        };
        target
            .texture
            .as_surface()
            .draw(
                &gpu.quad,
                NoIndices(PrimitiveType::TriangleStrip),
                &shader.0.program,
                &uniforms,
                &Default::default(),
            )
            .map_err(|err| anyhow!("drawing with '{}' failed: {err}", shader.name()))
    }

    fn pop_matrix(&mut self) {
        if let Some(top) = self.matrix_stack.pop() {
            self.modelview = top;
        }
    }

    fn unbind(&mut self) {
        self.bound = None;
    }

    fn finish_render(&mut self) {
        let Some(host_state) = self.host_state.take() else {
            return;
        };
        if let Some(gpu) = self.gpu.as_mut() {
            if let Some(target) = &gpu.target {
                let blitted =
                    unsafe { gpu.blit.copy_to(&target.texture, host_state.host_framebuffer()) };
                if let Err(err) = blitted {
                    error!("frame could not be delivered: {err:#}");
                }
            }
        }
        unsafe { host_state.restore() };
        trace!("render finished");
    }
}
