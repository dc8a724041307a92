//! Inputs from the host to your plugin

use std::ffi::CStr;

use tracing::warn;

use crate::error::{Result, TopError};
use crate::ffi::*;
use crate::info::NodeInfo;

/// What the host wants rendered this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub width: u32,
    pub height: u32,
}

impl FrameRequest {
    /// Validate the host's resolved output format.
    pub fn from_specs(specs: &TOP_OutputFormatSpecs) -> Result<Self> {
        match (u32::try_from(specs.width), u32::try_from(specs.height)) {
            (Ok(width), Ok(height)) if width > 0 && height > 0 => Ok(Self { width, height }),
            _ => Err(TopError::InvalidOutputSize {
                width: specs.width,
                height: specs.height,
            }),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// Read access to parameter values for the current frame.
pub trait ParameterInputs {
    /// Value of component `index` of the numeric parameter `name`.
    fn par_double(&self, name: &CStr, index: usize) -> f64;
}

/// [`ParameterInputs`] backed by the host's `OP_Inputs`.
#[derive(Debug)]
pub struct HostInputs<'a> {
    raw: &'a OP_Inputs,
}

impl<'a> HostInputs<'a> {
    /// # Safety
    ///
    /// `raw` must be a live host object with a valid vtable for `'a`.
    pub unsafe fn new(raw: &'a OP_Inputs) -> Self {
        Self { raw }
    }
}

impl ParameterInputs for HostInputs<'_> {
    fn par_double(&self, name: &CStr, index: usize) -> f64 {
        let index = i32::try_from(index).unwrap_or(i32::MAX);
        unsafe { ((*self.raw.vtable).getParDouble)(self.raw, name.as_ptr(), index) }
    }
}

/// Read the node identity the host passed to `CreateTOPInstance`.
///
/// # Safety
///
/// `info` must be null or point to a valid `OP_NodeInfo` whose `opPath` is
/// null or a valid C string.
pub unsafe fn node_info_from_raw(info: *const OP_NodeInfo) -> NodeInfo {
    let Some(info) = info.as_ref() else {
        warn!("host passed no node info");
        return NodeInfo::default();
    };
    let path = if info.opPath.is_null() {
        String::new()
    } else {
        CStr::from_ptr(info.opPath).to_string_lossy().into_owned()
    };
    NodeInfo {
        path,
        id: info.opId,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn specs(width: i32, height: i32) -> TOP_OutputFormatSpecs {
        TOP_OutputFormatSpecs {
            width,
            height,
            ..Default::default()
        }
    }

    #[test]
    fn positive_sizes_are_accepted() {
        let req = FrameRequest::from_specs(&specs(256, 128)).unwrap();
        assert_eq!(req.dimensions(), (256, 128));
    }

    #[test]
    fn zero_and_negative_sizes_are_rejected() {
        for (w, h) in [(0, 10), (10, 0), (-1, 10), (10, -5)] {
            assert!(matches!(
                FrameRequest::from_specs(&specs(w, h)),
                Err(TopError::InvalidOutputSize { width, height }) if width == w && height == h
            ));
        }
    }

    unsafe extern "C" fn par_double(
        _this: *const OP_Inputs,
        name: *const std::ffi::c_char,
        index: i32,
    ) -> f64 {
        let name = CStr::from_ptr(name);
        if name.to_bytes() == b"Red" {
            0.25 + index as f64
        } else {
            -1.0
        }
    }

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

    #[test]
    fn host_inputs_dispatch_through_vtable() {
        let raw = OP_Inputs {
            vtable: &INPUTS_VTABLE,
        };
        let inputs = unsafe { HostInputs::new(&raw) };
        assert_eq!(inputs.par_double(c"Red", 0), 0.25);
        assert_eq!(inputs.par_double(c"Red", 2), 2.25);
        assert_eq!(inputs.par_double(c"Green", 0), -1.0);
    }

    #[test]
    fn node_info_reads_path_and_id() {
        let raw = OP_NodeInfo {
            opPath: c"/project1/redTOP".as_ptr(),
            opId: 7,
            reserved: [0; 19],
        };
        let info = unsafe { node_info_from_raw(&raw) };
        assert_eq!(info.path, "/project1/redTOP");
        assert_eq!(info.id, 7);

        let missing = unsafe { node_info_from_raw(std::ptr::null()) };
        assert_eq!(missing, NodeInfo::default());
    }
}
