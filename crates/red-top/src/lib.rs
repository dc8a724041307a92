//! A TOP that fills its output with one colour from a shader, with the red
//! channel driven by the `Red` parameter.
//!
//! The exported plugin draws with [`GliumToolkit`] inside the host's GL
//! context. [`RedTop`] is generic over the [`Toolkit`] so it also runs on the
//! CPU with the software toolkit `top-core` provides behind its `software`
//! feature.

pub mod config;
pub mod setup;
pub mod shaders;

use std::ffi::CStr;

use top_core::{
    FrameRequest, GeneralInfo, GlCommandContext, GlCommandScope, NodeInfo, NumericParameter,
    OutputFormat, ParameterInputs, ParameterManager, RenderScope, Result, Toolkit, TopError,
    TopInstance,
};
use top_glium::GliumToolkit;
use tracing::{debug, trace};

use config::ShaderLibrary;
use setup::SetupState;

/// Host name and label of the red parameter.
pub const RED_PAR: &str = "Red";
const RED_PAR_NAME: &CStr = c"Red";

pub struct RedTop<T: Toolkit> {
    node: NodeInfo,
    toolkit: T,
    setup: SetupState<T::Shader>,
    shaders: ShaderLibrary,
}

impl<T: Toolkit> RedTop<T> {
    pub fn with_toolkit(node: NodeInfo, toolkit: T, shaders: ShaderLibrary) -> Self {
        Self {
            node,
            toolkit,
            setup: SetupState::Uninitialized,
            shaders,
        }
    }

    pub fn node(&self) -> &NodeInfo {
        &self.node
    }

    pub fn toolkit(&self) -> &T {
        &self.toolkit
    }

    pub fn toolkit_mut(&mut self) -> &mut T {
        &mut self.toolkit
    }

    pub fn setup_state(&self) -> &SetupState<T::Shader> {
        &self.setup
    }

    /// Everything between begin and end GL commands.
    fn render(&mut self, width: u32, height: u32, red: f32) -> Result<()> {
        let shader = self.setup.ensure(&mut self.toolkit, &self.shaders)?;
        let mut scope = RenderScope::begin(&mut self.toolkit, shader).map_err(TopError::Render)?;
        scope
            .set_uniform_1f(shaders::RED_UNIFORM, red)
            .map_err(TopError::Render)?;
        scope
            .draw_rectangle(0.0, 0.0, 0.0, width as f32, height as f32)
            .map_err(TopError::Render)
    }
}

impl<T> TopInstance for RedTop<T>
where
    T: Toolkit + Default + 'static,
{
    fn new(info: NodeInfo) -> Result<Self> {
        let shaders = ShaderLibrary::from_env();
        debug!(data_path = ?shaders.root(), "new red TOP");
        Ok(Self::with_toolkit(info, T::default(), shaders))
    }

    fn general_info(&self) -> GeneralInfo {
        GeneralInfo {
            cook_every_frame: true,
        }
    }

    fn output_format(&self, _format: &mut OutputFormat) -> bool {
        false
    }

    fn setup_parameters(&mut self, manager: &mut dyn ParameterManager) -> Result<()> {
        let red = NumericParameter::new(RED_PAR, RED_PAR);
        manager.append_float(&red, 1)
    }

    fn execute(
        &mut self,
        request: &FrameRequest,
        inputs: &dyn ParameterInputs,
        context: &mut dyn GlCommandContext,
    ) -> Result<()> {
        let (width, height) = request.dimensions();
        let red = inputs.par_double(RED_PAR_NAME, 0) as f32;
        trace!(width, height, red, "frame");

        self.toolkit.ensure_window(width, height);
        let _gl = GlCommandScope::begin(context);
        self.render(width, height, red)
    }
}

top_core::top_main!(RedTop<GliumToolkit>);
