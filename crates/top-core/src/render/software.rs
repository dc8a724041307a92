//! CPU reference toolkit.
//!
//! Rasterises rectangles into an RGBA float image and shades them with plain
//! Rust functions registered per program name, standing in for the GLSL a
//! GPU toolkit would compile. Every call is recorded, which makes it the
//! toolkit of choice for headless rendering and for checking call order.

use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use anyhow::{anyhow, bail, ensure, Result};

use super::{ShaderProgram, ShaderTier, Toolkit};

/// Uniform values of a program. Unset uniforms read as zero, like GL.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Uniforms(BTreeMap<String, f32>);

impl Uniforms {
    pub fn get(&self, name: &str) -> f32 {
        self.0.get(name).copied().unwrap_or(0.0)
    }

    fn set(&mut self, name: &str, value: f32) {
        self.0.insert(name.to_owned(), value);
    }
}

/// CPU equivalent of a fragment shader.
pub type FragmentFn = fn(&Uniforms) -> [f32; 4];

/// RGBA image with rows stored top to bottom.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<[f32; 4]>,
}

impl Image {
    fn cleared(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![[0.0; 4]; width as usize * height as usize],
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn pixel(&self, x: u32, y: u32) -> [f32; 4] {
        self.pixels[y as usize * self.width as usize + x as usize]
    }

    pub fn pixels(&self) -> &[[f32; 4]] {
        &self.pixels
    }
}

/// A loaded program.
pub struct SoftwareShader {
    name: String,
    fragment: FragmentFn,
}

impl fmt::Debug for SoftwareShader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareShader")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// One recorded toolkit call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolkitCall {
    EnsureWindow { width: u32, height: u32 },
    Setup,
    LoadShader { name: String, tier: ShaderTier, fragment: String },
    StartRender,
    SetupScreen,
    Bind { name: String },
    PushMatrix,
    SetUniform { name: String, value: f32 },
    DrawRectangle { x: f32, y: f32, z: f32, width: f32, height: f32 },
    PopMatrix,
    Unbind,
    FinishRender,
}

pub struct SoftwareToolkit {
    tier: ShaderTier,
    programs: BTreeMap<String, FragmentFn>,
    window: (u32, u32),
    pending_setup_failures: u32,
    initialized: bool,
    bound: Option<Rc<SoftwareShader>>,
    uniforms: BTreeMap<String, Uniforms>,
    /// Translation stack; the last entry is current.
    transforms: Vec<(f32, f32)>,
    target: Option<Image>,
    last_frame: Option<Image>,
    calls: Vec<ToolkitCall>,
}

impl fmt::Debug for SoftwareToolkit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareToolkit")
            .field("tier", &self.tier)
            .field("programs", &self.programs.keys().collect::<Vec<_>>())
            .field("window", &self.window)
            .field("initialized", &self.initialized)
            .finish_non_exhaustive()
    }
}

impl Default for SoftwareToolkit {
    fn default() -> Self {
        Self::new()
    }
}

impl SoftwareToolkit {
    pub fn new() -> Self {
        Self {
            tier: ShaderTier::Gl3,
            programs: BTreeMap::new(),
            window: (0, 0),
            pending_setup_failures: 0,
            initialized: false,
            bound: None,
            uniforms: BTreeMap::new(),
            transforms: vec![(0.0, 0.0)],
            target: None,
            last_frame: None,
            calls: Vec::new(),
        }
    }

    /// Report `tier` as the context's capability.
    pub fn with_tier(mut self, tier: ShaderTier) -> Self {
        self.tier = tier;
        self
    }

    /// Shade programs called `name` with `fragment`.
    pub fn with_program(mut self, name: &str, fragment: FragmentFn) -> Self {
        self.programs.insert(name.to_owned(), fragment);
        self
    }

    /// Make the next `count` calls to [`Toolkit::setup`] fail.
    pub fn fail_next_setups(&mut self, count: u32) {
        self.pending_setup_failures = count;
    }

    /// The image delivered by the most recent finished render.
    pub fn last_frame(&self) -> Option<&Image> {
        self.last_frame.as_ref()
    }

    pub fn calls(&self) -> &[ToolkitCall] {
        &self.calls
    }

    pub fn count_calls(&self, matches: impl Fn(&ToolkitCall) -> bool) -> usize {
        self.calls.iter().filter(|call| matches(call)).count()
    }

    fn current_transform(&self) -> (f32, f32) {
        self.transforms.last().copied().unwrap_or((0.0, 0.0))
    }
}

impl Toolkit for SoftwareToolkit {
    type Shader = Rc<SoftwareShader>;

    fn ensure_window(&mut self, width: u32, height: u32) {
        self.calls.push(ToolkitCall::EnsureWindow { width, height });
        self.window = (width, height);
    }

    fn setup(&mut self) -> Result<ShaderTier> {
        self.calls.push(ToolkitCall::Setup);
        if self.pending_setup_failures > 0 {
            self.pending_setup_failures -= 1;
            bail!("software backend refused to initialise");
        }
        self.initialized = true;
        Ok(self.tier)
    }

    fn load_shader(&mut self, program: &ShaderProgram<'_>) -> Result<Self::Shader> {
        self.calls.push(ToolkitCall::LoadShader {
            name: program.name.to_owned(),
            tier: program.tier,
            fragment: program.fragment.to_owned(),
        });
        ensure!(self.initialized, "load_shader called before setup");
        let fragment = *self
            .programs
            .get(program.name)
            .ok_or_else(|| anyhow!("no CPU fragment registered for '{}'", program.name))?;
        Ok(Rc::new(SoftwareShader {
            name: program.name.to_owned(),
            fragment,
        }))
    }

    fn start_render(&mut self) -> Result<()> {
        self.calls.push(ToolkitCall::StartRender);
        let (width, height) = self.window;
        ensure!(width > 0 && height > 0, "window has no size");
        ensure!(self.target.is_none(), "render already started");
        self.target = Some(Image::cleared(width, height));
        Ok(())
    }

    fn setup_screen(&mut self) {
        self.calls.push(ToolkitCall::SetupScreen);
        self.transforms = vec![(0.0, 0.0)];
    }

    fn bind(&mut self, shader: &Self::Shader) {
        self.calls.push(ToolkitCall::Bind {
            name: shader.name.clone(),
        });
        self.bound = Some(shader.clone());
    }

    fn push_matrix(&mut self) {
        self.calls.push(ToolkitCall::PushMatrix);
        let current = self.current_transform();
        self.transforms.push(current);
    }

    fn set_uniform_1f(&mut self, name: &str, value: f32) -> Result<()> {
        self.calls.push(ToolkitCall::SetUniform {
            name: name.to_owned(),
            value,
        });
        let shader = self
            .bound
            .as_ref()
            .ok_or_else(|| anyhow!("set_uniform_1f('{name}') with no shader bound"))?;
        self.uniforms
            .entry(shader.name.clone())
            .or_default()
            .set(name, value);
        Ok(())
    }

    fn draw_rectangle(&mut self, x: f32, y: f32, z: f32, width: f32, height: f32) -> Result<()> {
        self.calls.push(ToolkitCall::DrawRectangle {
            x,
            y,
            z,
            width,
            height,
        });
        ensure!(
            width >= 0.0 && height >= 0.0,
            "negative rectangle size {width}x{height}"
        );
        let shader = self
            .bound
            .as_ref()
            .ok_or_else(|| anyhow!("draw_rectangle with no shader bound"))?;
        let color = match self.uniforms.get(&shader.name) {
            Some(uniforms) => (shader.fragment)(uniforms),
            None => (shader.fragment)(&Uniforms::default()),
        };
        let (tx, ty) = self.current_transform();
        let target = self
            .target
            .as_mut()
            .ok_or_else(|| anyhow!("draw_rectangle outside start_render/finish_render"))?;

        // A pixel is covered when its centre lies inside the rectangle.
        let (left, top) = (x + tx, y + ty);
        let (right, bottom) = (left + width, top + height);
        for row in 0..target.height {
            let cy = row as f32 + 0.5;
            if cy < top || cy >= bottom {
                continue;
            }
            for col in 0..target.width {
                let cx = col as f32 + 0.5;
                if cx >= left && cx < right {
                    target.pixels[row as usize * target.width as usize + col as usize] = color;
                }
            }
        }
        Ok(())
    }

    fn pop_matrix(&mut self) {
        self.calls.push(ToolkitCall::PopMatrix);
        if self.transforms.len() > 1 {
            self.transforms.pop();
        } else {
            tracing::warn!("pop_matrix without matching push_matrix");
        }
    }

    fn unbind(&mut self) {
        self.calls.push(ToolkitCall::Unbind);
        self.bound = None;
    }

    fn finish_render(&mut self) {
        self.calls.push(ToolkitCall::FinishRender);
        if let Some(image) = self.target.take() {
            self.last_frame = Some(image);
        }
    }
}
