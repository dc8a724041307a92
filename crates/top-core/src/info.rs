//! Node identity and the general-info answers a node gives the host.

use crate::ffi::TOP_GeneralInfo;

/// The format a node may write when overriding the host's output settings.
pub use crate::ffi::TOP_OutputFormat as OutputFormat;

/// Which operator in the host's network is using an instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NodeInfo {
    pub path: String,
    pub id: u32,
}

/// Cook behaviour requested from the host.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneralInfo {
    /// Cook every frame even when no inputs or parameters changed.
    pub cook_every_frame: bool,
}

impl GeneralInfo {
    /// Fields the node has no opinion on keep the host's values.
    pub(crate) fn write_to(&self, raw: &mut TOP_GeneralInfo) {
        raw.cookEveryFrame = self.cook_every_frame;
    }
}
