//! Boxed instances, their callback table and the live-handle registry.

use std::any::Any;
use std::collections::HashSet;
use std::ffi::{c_char, CString};
use std::marker::PhantomData;
use std::panic::{self, AssertUnwindSafe};
use std::ptr;
use std::sync::{Mutex, MutexGuard};

use once_cell::sync::Lazy;
use tracing::{debug, error, info_span, trace, Span};

use super::TopInstance;
use crate::context::{GlCommandContext, GlCommandScope, HostContext};
use crate::error::{Result, TopError};
use crate::ffi::*;
use crate::info::NodeInfo;
use crate::inputs::{node_info_from_raw, FrameRequest, HostInputs};
use crate::parameters::HostParameterManager;

/// Addresses of every instance handed to the host and not yet destroyed.
static LIVE_INSTANCES: Lazy<Mutex<HashSet<usize>>> = Lazy::new(|| Mutex::new(HashSet::new()));

fn live_instances() -> MutexGuard<'static, HashSet<usize>> {
    LIVE_INSTANCES
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// `base` must stay the first field: the host only knows it.
#[repr(C)]
struct Instance<T> {
    base: TOP_CPlusPlusBase,
    node: T,
    span: Span,
    error: Option<CString>,
}

impl<T> Instance<T> {
    /// Store the outcome of a callback where `getErrorString` finds it.
    fn report(&mut self, callback: &str, result: Result<()>) {
        match result {
            Ok(()) => self.error = None,
            Err(err) => {
                error!(callback, "{err}");
                self.error = Some(host_cstring(&err.to_string()));
            }
        }
    }
}

struct VTableFor<T>(PhantomData<T>);

impl<T: TopInstance> VTableFor<T> {
    const VTABLE: TOP_CPlusPlusBaseVTable = TOP_CPlusPlusBaseVTable {
        #[cfg(target_env = "msvc")]
        destructor: [destructor::<T>],
        #[cfg(not(target_env = "msvc"))]
        destructor: [destructor::<T>, destructor::<T>],
        getGeneralInfo: get_general_info::<T>,
        getOutputFormat: get_output_format::<T>,
        execute: execute::<T>,
        getNumInfoCHOPChans: get_num_info_chop_chans,
        getInfoCHOPChan: get_info_chop_chan,
        getInfoDATSize: get_info_dat_size,
        getInfoDATEntries: get_info_dat_entries,
        getWarningString: no_string,
        getErrorString: get_error_string::<T>,
        getInfoPopupString: no_string,
        setupParameters: setup_parameters::<T>,
        pulsePressed: pulse_pressed,
    };
}

fn vtable<T: TopInstance>() -> &'static TOP_CPlusPlusBaseVTable {
    &VTableFor::<T>::VTABLE
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_owned()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_owned()
    }
}

/// Run a callback body without letting a panic unwind into the host.
fn guard<R>(callback: &'static str, body: impl FnOnce() -> Result<R>) -> Result<R> {
    panic::catch_unwind(AssertUnwindSafe(body)).unwrap_or_else(|payload| {
        Err(TopError::Panic {
            callback,
            message: panic_message(payload),
        })
    })
}

/// # Safety
///
/// `this` must be null or a pointer produced by [`create::<T>`].
unsafe fn instance_mut<'a, T: TopInstance>(this: *mut TOP_CPlusPlusBase) -> Option<&'a mut Instance<T>> {
    debug_assert!(
        this.is_null() || is_live(this),
        "callback on a destroyed instance {this:p}"
    );
    this.cast::<Instance<T>>().as_mut()
}

// =====================================================================
// Lifecycle
// =====================================================================

pub fn api_version() -> i32 {
    TOP_CPLUSPLUS_API_VERSION
}

/// Build a node and box it behind the host-visible base.
pub fn create<T: TopInstance>(info: NodeInfo) -> Result<*mut TOP_CPlusPlusBase> {
    let span = info_span!("top", path = %info.path, id = info.id);
    let node = span.in_scope(|| guard("CreateTOPInstance", || T::new(info)));
    let node = node.map_err(|err| match err {
        TopError::Allocation(_) => err,
        other => TopError::Allocation(other.to_string()),
    })?;

    let instance = Box::new(Instance {
        base: TOP_CPlusPlusBase {
            vtable: vtable::<T>(),
        },
        node,
        span,
        error: None,
    });
    let handle = Box::into_raw(instance).cast::<TOP_CPlusPlusBase>();
    live_instances().insert(handle as usize);
    debug!(?handle, "created instance");
    Ok(handle)
}

/// Release an instance made by [`create::<T>`].
///
/// Handles that are not live (null, foreign, already destroyed) are refused
/// and left untouched.
///
/// # Safety
///
/// A live `handle` must have been created for the same `T`.
pub unsafe fn destroy<T: TopInstance>(handle: *mut TOP_CPlusPlusBase) -> Result<()> {
    destroy_within::<T>(handle, None)
}

/// Like [`destroy`], but drops the node between begin and end GL commands
/// on `context`, so the GPU objects it owns are released in the host's
/// context.
///
/// # Safety
///
/// See [`destroy`].
pub unsafe fn destroy_within<T: TopInstance>(
    handle: *mut TOP_CPlusPlusBase,
    context: Option<&mut dyn GlCommandContext>,
) -> Result<()> {
    if !live_instances().remove(&(handle as usize)) {
        return Err(TopError::UnknownInstance(handle as usize));
    }
    let instance = Box::from_raw(handle.cast::<Instance<T>>());
    match context {
        Some(context) => {
            let _gl = GlCommandScope::begin(context);
            drop(instance);
        }
        None => drop(instance),
    }
    debug!(?handle, "destroyed instance");
    Ok(())
}

/// Whether `handle` is an instance the host may still call.
pub fn is_live(handle: *const TOP_CPlusPlusBase) -> bool {
    live_instances().contains(&(handle as usize))
}

/// Body of the exported `CreateTOPInstance`.
///
/// Returns null only after logging why construction failed.
///
/// # Safety
///
/// `info` must be null or a valid host `OP_NodeInfo`.
pub unsafe fn create_top_instance<T: TopInstance>(
    info: *const OP_NodeInfo,
    _context: *mut TOP_Context,
) -> *mut TOP_CPlusPlusBase {
    crate::log::init();
    let info = node_info_from_raw(info);
    match create::<T>(info) {
        Ok(handle) => handle,
        Err(err) => {
            error!("{err}");
            ptr::null_mut()
        }
    }
}

/// Body of the exported `DestroyTOPInstance`.
///
/// Destroying a handle that is not live is a host usage error and aborts.
///
/// # Safety
///
/// See [`destroy`].
pub unsafe fn destroy_top_instance<T: TopInstance>(
    instance: *mut TOP_CPlusPlusBase,
    context: *mut TOP_Context,
) {
    let result = match context.as_mut() {
        Some(context) => {
            let mut context = HostContext::new(context);
            destroy_within::<T>(instance, Some(&mut context as &mut dyn GlCommandContext))
        }
        None => destroy::<T>(instance),
    };
    if let Err(err) = result {
        error!("DestroyTOPInstance: {err}");
        std::process::abort();
    }
}

// =====================================================================
// Callback table
// =====================================================================

// Both Itanium destructor slots release the instance: it was allocated by
// `create`, never by the host, and `DestroyTOPInstance` is the host's way to
// free it.
#[cfg(not(target_env = "msvc"))]
unsafe extern "C" fn destructor<T: TopInstance>(this: *mut TOP_CPlusPlusBase) {
    destroy_top_instance::<T>(this, ptr::null_mut());
}

#[cfg(target_env = "msvc")]
unsafe extern "C" fn destructor<T: TopInstance>(
    this: *mut TOP_CPlusPlusBase,
    _flags: u32,
) -> *mut std::ffi::c_void {
    destroy_top_instance::<T>(this, ptr::null_mut());
    this.cast()
}

unsafe extern "C" fn get_general_info<T: TopInstance>(
    this: *mut TOP_CPlusPlusBase,
    ginfo: *mut TOP_GeneralInfo,
) {
    let Some(instance) = instance_mut::<T>(this) else {
        return;
    };
    let _enter = instance.span.clone().entered();
    let result = guard("getGeneralInfo", || {
        let ginfo = ginfo
            .as_mut()
            .ok_or(TopError::NullHostObject("TOP_GeneralInfo"))?;
        instance.node.general_info().write_to(ginfo);
        Ok(())
    });
    if let Err(err) = result {
        error!("{err}");
    }
}

unsafe extern "C" fn get_output_format<T: TopInstance>(
    this: *mut TOP_CPlusPlusBase,
    format: *mut TOP_OutputFormat,
) -> bool {
    let Some(instance) = instance_mut::<T>(this) else {
        return false;
    };
    let _enter = instance.span.clone().entered();
    let result = guard("getOutputFormat", || {
        let format = format
            .as_mut()
            .ok_or(TopError::NullHostObject("TOP_OutputFormat"))?;
        Ok(instance.node.output_format(format))
    });
    result.unwrap_or_else(|err| {
        error!("{err}");
        false
    })
}

unsafe extern "C" fn execute<T: TopInstance>(
    this: *mut TOP_CPlusPlusBase,
    output_format: *const TOP_OutputFormatSpecs,
    inputs: *const OP_Inputs,
    context: *mut TOP_Context,
) {
    let Some(instance) = instance_mut::<T>(this) else {
        return;
    };
    let _enter = instance.span.clone().entered();
    let result = guard("execute", || {
        let specs = output_format
            .as_ref()
            .ok_or(TopError::NullHostObject("TOP_OutputFormatSpecs"))?;
        let inputs = inputs
            .as_ref()
            .ok_or(TopError::NullHostObject("OP_Inputs"))?;
        let context = context
            .as_mut()
            .ok_or(TopError::NullHostObject("TOP_Context"))?;

        let request = FrameRequest::from_specs(specs)?;
        trace!(?request, "execute");
        let inputs = HostInputs::new(inputs);
        let mut context = HostContext::new(context);
        instance.node.execute(&request, &inputs, &mut context)
    });
    instance.report("execute", result);
}

unsafe extern "C" fn setup_parameters<T: TopInstance>(
    this: *mut TOP_CPlusPlusBase,
    manager: *mut OP_ParameterManager,
) {
    let Some(instance) = instance_mut::<T>(this) else {
        return;
    };
    let _enter = instance.span.clone().entered();
    let result = guard("setupParameters", || {
        let manager = manager
            .as_mut()
            .ok_or(TopError::NullHostObject("OP_ParameterManager"))?;
        let mut manager = HostParameterManager::new(manager);
        instance.node.setup_parameters(&mut manager)
    });
    instance.report("setupParameters", result);
}

unsafe extern "C" fn get_error_string<T: TopInstance>(this: *mut TOP_CPlusPlusBase) -> *const c_char {
    match instance_mut::<T>(this) {
        Some(instance) => instance
            .error
            .as_ref()
            .map_or(ptr::null(), |message| message.as_ptr()),
        None => ptr::null(),
    }
}

// Slots a TOP without Info CHOP/DAT output, warnings, popups or pulse
// parameters answers with nothing.

unsafe extern "C" fn get_num_info_chop_chans(_this: *mut TOP_CPlusPlusBase) -> i32 {
    0
}

unsafe extern "C" fn get_info_chop_chan(
    _this: *mut TOP_CPlusPlusBase,
    _index: i32,
    _chan: *mut OP_InfoCHOPChan,
) {
}

unsafe extern "C" fn get_info_dat_size(
    _this: *mut TOP_CPlusPlusBase,
    _info_size: *mut OP_InfoDATSize,
) -> bool {
    false
}

unsafe extern "C" fn get_info_dat_entries(
    _this: *mut TOP_CPlusPlusBase,
    _index: i32,
    _n_entries: i32,
    _entries: *mut OP_InfoDATEntries,
) {
}

unsafe extern "C" fn no_string(_this: *mut TOP_CPlusPlusBase) -> *const c_char {
    ptr::null()
}

unsafe extern "C" fn pulse_pressed(_this: *mut TOP_CPlusPlusBase, _name: *const c_char) {}
