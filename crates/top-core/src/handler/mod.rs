//! The per-instance capability set a node implements, and the glue that
//! exposes it to the host.
//!
//! Implement [`TopInstance`] on your node and export it with
//! [`top_main!`](crate::top_main). The host then drives it through a
//! `#[repr(C)]` callback table built once per node type.

mod instance;

pub use instance::{
    api_version, create, create_top_instance, destroy, destroy_top_instance, destroy_within,
    is_live,
};

use crate::context::GlCommandContext;
use crate::error::Result;
use crate::info::{GeneralInfo, NodeInfo, OutputFormat};
use crate::inputs::{FrameRequest, ParameterInputs};
use crate::parameters::ParameterManager;

/// What the host can ask of one node instance.
///
/// The host dispatches by a fixed table layout, so this trait mirrors the
/// table exactly; do not add methods the host does not call.
pub trait TopInstance: Sized + 'static {
    /// Called once per host-side usage of the plugin.
    fn new(info: NodeInfo) -> Result<Self>;

    fn general_info(&self) -> GeneralInfo;

    /// Write a format into `format` and return `true` to override the host's
    /// output settings. Return `false` to keep them.
    fn output_format(&self, format: &mut OutputFormat) -> bool;

    fn setup_parameters(&mut self, manager: &mut dyn ParameterManager) -> Result<()>;

    /// Render one frame into the host's context.
    fn execute(
        &mut self,
        request: &FrameRequest,
        inputs: &dyn ParameterInputs,
        context: &mut dyn GlCommandContext,
    ) -> Result<()>;
}
