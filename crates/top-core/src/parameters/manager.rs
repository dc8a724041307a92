use crate::error::{ParAppendError, Result, TopError};
use crate::ffi::OP_ParameterManager;

use super::NumericParameter;

/// Where a node declares its parameters.
pub trait ParameterManager {
    /// Append a float parameter using `size` of its components.
    fn append_float(&mut self, param: &NumericParameter, size: usize) -> Result<()>;
}

/// [`ParameterManager`] backed by the host's `OP_ParameterManager`.
#[derive(Debug)]
pub struct HostParameterManager<'a> {
    raw: &'a mut OP_ParameterManager,
}

impl<'a> HostParameterManager<'a> {
    /// # Safety
    ///
    /// `raw` must be a live host object with a valid vtable for `'a`.
    pub unsafe fn new(raw: &'a mut OP_ParameterManager) -> Self {
        Self { raw }
    }
}

impl ParameterManager for HostParameterManager<'_> {
    fn append_float(&mut self, param: &NumericParameter, size: usize) -> Result<()> {
        let raw_param = param.as_raw();
        let size = i32::try_from(size).unwrap_or(i32::MAX);
        let code = unsafe { ((*self.raw.vtable).appendFloat)(&mut *self.raw, &raw_param, size) };
        ParAppendError::check(code).map_err(|source| TopError::Configuration {
            name: param.name().to_string_lossy().into_owned(),
            source,
        })
    }
}
