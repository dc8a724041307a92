//! The node driven through the host callback table.

use std::cell::RefCell;
use std::ffi::{c_char, CStr};
use std::ptr;

use red_top::RedTop;
use top_core::ffi::*;
use top_core::handler::{create, destroy, is_live};
use top_core::render::software::SoftwareToolkit;
use top_core::{NodeInfo, TopError};

type Node = RedTop<SoftwareToolkit>;

thread_local! {
    static APPENDED: RefCell<Vec<(String, String, i32)>> = const { RefCell::new(Vec::new()) };
    static APPEND_RESULT: RefCell<i32> = const { RefCell::new(PARAMETER_APPEND_SUCCESS) };
}

unsafe extern "C" fn append_float(
    _: *mut OP_ParameterManager,
    param: *const OP_NumericParameter,
    size: i32,
) -> i32 {
    let param = &*param;
    let name = CStr::from_ptr(param.name).to_string_lossy().into_owned();
    let label = CStr::from_ptr(param.label).to_string_lossy().into_owned();
    APPENDED.with(|a| a.borrow_mut().push((name, label, size)));
    APPEND_RESULT.with(|r| *r.borrow())
}

unsafe extern "C" fn par_double(_: *const OP_Inputs, _: *const c_char, _: i32) -> f64 {
    0.5
}

unsafe extern "C" fn begin_gl(_: *mut TOP_Context) -> bool {
    true
}

unsafe extern "C" fn end_gl(_: *mut TOP_Context) {}

static MANAGER_VTABLE: OP_ParameterManagerVTable = OP_ParameterManagerVTable {
    appendFloat: append_float,
};
static INPUTS_VTABLE: OP_InputsVTable = OP_InputsVTable {
    getNumInputs: None,
    getInputTOP: None,
    getInputCHOP: None,
    getParDAT: None,
    getParTOP: None,
    getParCHOP: None,
    getParObject: None,
    getParDouble: par_double,
};
static CONTEXT_VTABLE: TOP_ContextVTable = TOP_ContextVTable {
    destructor: [None; DESTRUCTOR_SLOTS],
    beginGLCommands: begin_gl,
    endGLCommands: end_gl,
};

fn new_node(path: &str) -> *mut TOP_CPlusPlusBase {
    create::<Node>(NodeInfo {
        path: path.into(),
        id: 3,
    })
    .unwrap()
}

unsafe fn error_string(handle: *mut TOP_CPlusPlusBase) -> Option<String> {
    let message = ((*(*handle).vtable).getErrorString)(handle);
    message
        .as_ref()
        .map(|_| CStr::from_ptr(message).to_string_lossy().into_owned())
}

unsafe fn setup_parameters(handle: *mut TOP_CPlusPlusBase) {
    let mut manager = OP_ParameterManager {
        vtable: &MANAGER_VTABLE,
    };
    ((*(*handle).vtable).setupParameters)(handle, &mut manager);
}

unsafe fn execute(handle: *mut TOP_CPlusPlusBase, width: i32, height: i32) {
    let specs = TOP_OutputFormatSpecs {
        width,
        height,
        ..Default::default()
    };
    let inputs = OP_Inputs {
        vtable: &INPUTS_VTABLE,
    };
    let mut context = TOP_Context {
        vtable: &CONTEXT_VTABLE,
    };
    ((*(*handle).vtable).execute)(handle, &specs, &inputs, &mut context);
}

#[test]
fn registers_red_through_the_host_manager() {
    let handle = new_node("/params");
    APPENDED.with(|a| a.borrow_mut().clear());
    unsafe {
        setup_parameters(handle);
        assert_eq!(error_string(handle), None);
        destroy::<Node>(handle).unwrap();
    }
    APPENDED.with(|a| {
        assert_eq!(*a.borrow(), vec![("Red".to_owned(), "Red".to_owned(), 1)]);
    });
}

#[test]
fn refused_parameter_is_reported_not_asserted() {
    let handle = new_node("/refused");
    APPEND_RESULT.with(|r| *r.borrow_mut() = PARAMETER_APPEND_NAME_ALREADY_USED);
    unsafe {
        setup_parameters(handle);
        let message = error_string(handle).unwrap();
        assert_eq!(
            message,
            "parameter 'Red' could not be registered: parameter name already used"
        );
        destroy::<Node>(handle).unwrap();
    }
    APPEND_RESULT.with(|r| *r.borrow_mut() = PARAMETER_APPEND_SUCCESS);
}

#[test]
fn general_info_and_output_format_through_the_table() {
    let handle = new_node("/info");
    unsafe {
        let mut ginfo = TOP_GeneralInfo::default();
        ((*(*handle).vtable).getGeneralInfo)(handle, &mut ginfo);
        assert!(ginfo.cookEveryFrame);

        let mut format = TOP_OutputFormat::default();
        assert!(!((*(*handle).vtable).getOutputFormat)(handle, &mut format));
        destroy::<Node>(handle).unwrap();
    }
}

#[test]
fn frame_errors_surface_in_the_error_string() {
    let handle = new_node("/errors");
    unsafe {
        execute(handle, 0, 64);
        assert_eq!(
            error_string(handle).as_deref(),
            Some("invalid output size 0x64")
        );

        // No CPU fragment is registered for the default software toolkit.
        execute(handle, 64, 64);
        let message = error_string(handle).unwrap();
        assert!(message.starts_with("render setup failed"), "{message}");

        destroy::<Node>(handle).unwrap();
    }
}

#[test]
fn destroying_twice_is_a_usage_error() {
    let handle = new_node("/twice");
    unsafe {
        destroy::<Node>(handle).unwrap();
        assert!(!is_live(handle));
        let err = destroy::<Node>(handle).unwrap_err();
        assert!(matches!(err, TopError::UnknownInstance(addr) if addr == handle as usize));
        assert!(destroy::<Node>(ptr::null_mut()).is_err());
    }
}
