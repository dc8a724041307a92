use std::ffi::{CStr, CString};

use crate::ffi::{host_cstring, OP_NumericParameter};

/// A float parameter with up to four components.
#[derive(Debug, Clone, PartialEq)]
pub struct NumericParameter {
    pub name: CString,
    pub label: CString,
    pub default_values: [f64; 4],
    pub min_values: [f64; 4],
    pub max_values: [f64; 4],
    pub clamp_mins: [bool; 4],
    pub clamp_maxes: [bool; 4],
    pub min_sliders: [f64; 4],
    pub max_sliders: [f64; 4],
}

impl NumericParameter {
    /// A parameter carrying the host's numeric defaults: value 0, slider
    /// 0..1, no clamping.
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: host_cstring(name),
            label: host_cstring(label),
            default_values: [0.0; 4],
            min_values: [0.0; 4],
            max_values: [1.0; 4],
            clamp_mins: [false; 4],
            clamp_maxes: [false; 4],
            min_sliders: [0.0; 4],
            max_sliders: [1.0; 4],
        }
    }

    pub fn name(&self) -> &CStr {
        &self.name
    }

    /// The raw struct borrows the strings in `self`.
    pub(crate) fn as_raw(&self) -> OP_NumericParameter {
        OP_NumericParameter {
            name: self.name.as_ptr(),
            label: self.label.as_ptr(),
            // Null puts the parameter on the node's default "Custom" page.
            page: std::ptr::null(),
            defaultValues: self.default_values,
            minValues: self.min_values,
            maxValues: self.max_values,
            clampMins: self.clamp_mins,
            clampMaxes: self.clamp_maxes,
            minSliders: self.min_sliders,
            maxSliders: self.max_sliders,
            reserved: [0; 20],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_points_at_owned_strings() {
        let param = NumericParameter::new("Red", "Red");
        let raw = param.as_raw();
        assert_eq!(unsafe { CStr::from_ptr(raw.name) }, c"Red");
        assert_eq!(unsafe { CStr::from_ptr(raw.label) }, c"Red");
        assert!(raw.page.is_null());
        assert_eq!(raw.clampMins, [false; 4]);
    }
}
