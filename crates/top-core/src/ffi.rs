//! Hardcoded TOP C++ API constants and C-repr structs.
//!
//! The host talks to plugins through C++ objects whose first word is a
//! virtual table pointer. Each host object is mirrored here as a `#[repr(C)]`
//! struct holding a pointer to a `#[repr(C)]` table of `extern "C"` function
//! pointers, with slots in the order the host header declares them.

#![allow(non_upper_case_globals)]
#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
#![allow(dead_code)]

use std::ffi::{c_char, c_void, CString};

// =====================================================================
// Versioning
// =====================================================================

/// The host refuses to load a plugin reporting any other value.
pub const TOP_CPLUSPLUS_API_VERSION: i32 = 8;

// =====================================================================
// Parameter append results
// =====================================================================
pub const PARAMETER_APPEND_SUCCESS: i32 = 0;
pub const PARAMETER_APPEND_INVALID_NAME: i32 = 1;
pub const PARAMETER_APPEND_INVALID_LABEL: i32 = 2;
pub const PARAMETER_APPEND_INVALID_SIZE: i32 = 3;
pub const PARAMETER_APPEND_NAME_ALREADY_USED: i32 = 4;

// =====================================================================
// Plain data structs
// =====================================================================

/// Identity of the node using an instance.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OP_NodeInfo {
    /// Full path of the operator, null-terminated, owned by the host.
    pub opPath: *const c_char,
    pub opId: u32,
    pub reserved: [i32; 19],
}

/// General behaviour flags the host asks for once per cook.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default)]
pub struct TOP_GeneralInfo {
    pub cookEveryFrame: bool,
    pub clearBuffers: bool,
    pub mipmapAllTOPs: bool,
    pub cookEveryFrameIfAsked: bool,
    pub inputSizeIndex: i32,
    pub reserved: [i32; 20],
}

/// Output format a plugin may write when it overrides the host's settings.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default)]
pub struct TOP_OutputFormat {
    pub width: i32,
    pub height: i32,
    pub aspectX: f32,
    pub aspectY: f32,
    pub antiAlias: i32,
    pub redChannel: bool,
    pub greenChannel: bool,
    pub blueChannel: bool,
    pub alphaChannel: bool,
    pub bitsPerChannel: i32,
    pub floatPrecision: bool,
    pub numColorBuffers: i32,
    pub depthBits: i32,
    pub stencilBits: i32,
    pub reserved: [i32; 20],
}

/// Resolved output format for the frame being executed.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default)]
pub struct TOP_OutputFormatSpecs {
    pub width: i32,
    pub height: i32,
    pub aspectX: f32,
    pub aspectY: f32,
    pub antiAlias: i32,
    pub redChannel: bool,
    pub greenChannel: bool,
    pub blueChannel: bool,
    pub alphaChannel: bool,
    pub bitsPerChannel: i32,
    pub floatPrecision: bool,
    pub numColorBuffers: i32,
    pub depthBits: i32,
    pub stencilBits: i32,
    pub reserved: [i32; 20],
}

/// Description of a numeric parameter passed to `appendFloat`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OP_NumericParameter {
    pub name: *const c_char,
    pub label: *const c_char,
    pub page: *const c_char,
    pub defaultValues: [f64; 4],
    pub minValues: [f64; 4],
    pub maxValues: [f64; 4],
    pub clampMins: [bool; 4],
    pub clampMaxes: [bool; 4],
    pub minSliders: [f64; 4],
    pub maxSliders: [f64; 4],
    pub reserved: [i32; 20],
}

// =====================================================================
// Info CHOP / Info DAT / string records
// =====================================================================

/// One Info CHOP channel filled in by `getInfoCHOPChan`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OP_InfoCHOPChan {
    pub name: *const c_char,
    pub value: f32,
    pub reserved: [i32; 10],
}

/// Info DAT table size filled in by `getInfoDATSize`.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default)]
pub struct OP_InfoDATSize {
    pub rows: i32,
    pub cols: i32,
    pub byColumn: bool,
    pub reserved: [i32; 10],
}

/// One Info DAT row or column filled in by `getInfoDATEntries`.
#[repr(C)]
#[derive(Debug, Copy, Clone)]
pub struct OP_InfoDATEntries {
    pub values: *mut *mut c_char,
    pub reserved: [i32; 10],
}

/// Opaque input handles returned by `OP_Inputs` slots this crate never calls.
#[repr(C)]
pub struct OP_TOPInput {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OP_CHOPInput {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OP_DATInput {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OP_ObjectInput {
    _private: [u8; 0],
}

// =====================================================================
// Virtual destructors
// =====================================================================

/// Table slots a C++ virtual destructor takes.
///
/// MSVC emits one scalar deleting destructor; the Itanium ABI emits the
/// complete-object destructor followed by the deleting destructor.
#[cfg(target_env = "msvc")]
pub const DESTRUCTOR_SLOTS: usize = 1;
#[cfg(not(target_env = "msvc"))]
pub const DESTRUCTOR_SLOTS: usize = 2;

/// Signature of a destructor slot on the plugin base.
#[cfg(target_env = "msvc")]
pub type TOP_Destructor =
    unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase, flags: u32) -> *mut c_void;
#[cfg(not(target_env = "msvc"))]
pub type TOP_Destructor = unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase);

// =====================================================================
// Host objects
// =====================================================================
//
// The host owns these tables. Each mirror runs from slot 0 up to the last
// slot this crate calls; the host's tables continue past that point and the
// remaining slots are never read. Slots typed `Option` are never called.

/// Parameter and input accessor handed to `execute`.
#[repr(C)]
#[derive(Debug)]
pub struct OP_Inputs {
    pub vtable: *const OP_InputsVTable,
}

#[repr(C)]
pub struct OP_InputsVTable {
    pub getNumInputs: Option<unsafe extern "C" fn(this: *const OP_Inputs) -> i32>,
    pub getInputTOP:
        Option<unsafe extern "C" fn(this: *const OP_Inputs, index: i32) -> *const OP_TOPInput>,
    pub getInputCHOP:
        Option<unsafe extern "C" fn(this: *const OP_Inputs, index: i32) -> *const OP_CHOPInput>,
    pub getParDAT: Option<
        unsafe extern "C" fn(this: *const OP_Inputs, name: *const c_char) -> *const OP_DATInput,
    >,
    pub getParTOP: Option<
        unsafe extern "C" fn(this: *const OP_Inputs, name: *const c_char) -> *const OP_TOPInput,
    >,
    pub getParCHOP: Option<
        unsafe extern "C" fn(this: *const OP_Inputs, name: *const c_char) -> *const OP_CHOPInput,
    >,
    pub getParObject: Option<
        unsafe extern "C" fn(this: *const OP_Inputs, name: *const c_char) -> *const OP_ObjectInput,
    >,
    pub getParDouble:
        unsafe extern "C" fn(this: *const OP_Inputs, name: *const c_char, index: i32) -> f64,
}

impl OP_InputsVTable {
    /// Slot index of `getParDouble` in the host's table.
    pub const GET_PAR_DOUBLE_SLOT: usize = 7;
}

/// The host's GL context for the node.
#[repr(C)]
#[derive(Debug)]
pub struct TOP_Context {
    pub vtable: *const TOP_ContextVTable,
}

#[repr(C)]
pub struct TOP_ContextVTable {
    /// The context's virtual destructor; the plugin never deletes it.
    pub destructor: [Option<unsafe extern "C" fn(this: *mut TOP_Context)>; DESTRUCTOR_SLOTS],
    pub beginGLCommands: unsafe extern "C" fn(this: *mut TOP_Context) -> bool,
    pub endGLCommands: unsafe extern "C" fn(this: *mut TOP_Context),
}

/// Parameter registry handed to `setupParameters`.
#[repr(C)]
#[derive(Debug)]
pub struct OP_ParameterManager {
    pub vtable: *const OP_ParameterManagerVTable,
}

/// `appendFloat` is the first slot; the other `append*` slots follow it.
#[repr(C)]
pub struct OP_ParameterManagerVTable {
    pub appendFloat: unsafe extern "C" fn(
        this: *mut OP_ParameterManager,
        param: *const OP_NumericParameter,
        size: i32,
    ) -> i32,
}

// =====================================================================
// Plugin object
// =====================================================================

/// Base of every plugin instance handed to the host.
#[repr(C)]
#[derive(Debug)]
pub struct TOP_CPlusPlusBase {
    pub vtable: *const TOP_CPlusPlusBaseVTable,
}

/// Every virtual slot of the plugin base, in host order.
///
/// The host may call any of them, so each needs an implementation even when
/// the node has nothing to report.
#[repr(C)]
pub struct TOP_CPlusPlusBaseVTable {
    pub destructor: [TOP_Destructor; DESTRUCTOR_SLOTS],
    pub getGeneralInfo: unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase, ginfo: *mut TOP_GeneralInfo),
    pub getOutputFormat:
        unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase, format: *mut TOP_OutputFormat) -> bool,
    pub execute: unsafe extern "C" fn(
        this: *mut TOP_CPlusPlusBase,
        outputFormat: *const TOP_OutputFormatSpecs,
        inputs: *const OP_Inputs,
        context: *mut TOP_Context,
    ),
    pub getNumInfoCHOPChans: unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase) -> i32,
    pub getInfoCHOPChan:
        unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase, index: i32, chan: *mut OP_InfoCHOPChan),
    pub getInfoDATSize:
        unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase, infoSize: *mut OP_InfoDATSize) -> bool,
    pub getInfoDATEntries: unsafe extern "C" fn(
        this: *mut TOP_CPlusPlusBase,
        index: i32,
        nEntries: i32,
        entries: *mut OP_InfoDATEntries,
    ),
    pub getWarningString: unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase) -> *const c_char,
    pub getErrorString: unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase) -> *const c_char,
    pub getInfoPopupString: unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase) -> *const c_char,
    pub setupParameters:
        unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase, manager: *mut OP_ParameterManager),
    pub pulsePressed: unsafe extern "C" fn(this: *mut TOP_CPlusPlusBase, name: *const c_char),
}

// =====================================================================
// Utility
// =====================================================================

/// Build a C string for the host, dropping interior NULs instead of failing.
pub fn host_cstring(string: &str) -> CString {
    match CString::new(string) {
        Ok(s) => s,
        Err(err) => {
            let mut bytes = err.into_vec();
            bytes.retain(|b| *b != 0);
            // No NUL bytes are left after the retain above.
            CString::new(bytes).unwrap_or_default()
        }
    }
}
