//! Building blocks for plugins loaded by a TOP host.
//!
//! Implement [`handler::TopInstance`] on your node, draw with a
//! [`render::Toolkit`], and export the three loader entry points with
//! [`top_main!`].

pub mod context;
pub mod error;
pub mod ffi;
pub mod handler;
pub mod info;
pub mod inputs;
pub mod log;
pub mod parameters;
pub mod render;

pub use context::{GlCommandContext, GlCommandScope};
pub use error::{Result, TopError};
pub use handler::TopInstance;
pub use info::{GeneralInfo, NodeInfo, OutputFormat};
pub use inputs::{FrameRequest, ParameterInputs};
pub use parameters::{NumericParameter, ParameterManager};
pub use render::{RenderScope, ShaderProgram, ShaderTier, Toolkit};

/// Export the loader entry points for a node type.
///
/// ```rust,ignore
/// top_core::top_main!(MyTop);
/// ```
#[macro_export]
macro_rules! top_main {
    ($node:ty) => {
        #[no_mangle]
        #[allow(non_snake_case)]
        pub extern "C" fn GetTOPAPIVersion() -> i32 {
            $crate::handler::api_version()
        }

        /// # Safety
        ///
        /// Called by the host with its own node info and context.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn CreateTOPInstance(
            info: *const $crate::ffi::OP_NodeInfo,
            context: *mut $crate::ffi::TOP_Context,
        ) -> *mut $crate::ffi::TOP_CPlusPlusBase {
            $crate::handler::create_top_instance::<$node>(info, context)
        }

        /// # Safety
        ///
        /// `instance` must come from `CreateTOPInstance`.
        #[no_mangle]
        #[allow(non_snake_case)]
        pub unsafe extern "C" fn DestroyTOPInstance(
            instance: *mut $crate::ffi::TOP_CPlusPlusBase,
            context: *mut $crate::ffi::TOP_Context,
        ) {
            $crate::handler::destroy_top_instance::<$node>(instance, context)
        }
    };
}
