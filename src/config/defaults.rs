//! Built-in layer defaults
//!
//! Values every unset field of a layer falls back to at finalization.

use bindfs_options::OptionSet;
use serde::Serialize;

use super::version::ToolVersion;

/// Built-in default configuration values
#[derive(Debug, Clone, Serialize)]
pub struct LayerDefaults {
    /// Verbose logging (default: false)
    pub debug: bool,

    /// Build bindfs from source instead of using a package (default: false)
    pub install_from_source: bool,

    /// bindfs version to install (default: latest)
    pub tool_version: ToolVersion,

    /// Baseline options (default: force-user, force-group, perms)
    pub default_options: OptionSet,
}

impl LayerDefaults {
    pub const DEBUG: bool = false;
    pub const INSTALL_FROM_SOURCE: bool = false;

    /// Baseline options applied when a layer declares none
    pub fn options() -> OptionSet {
        bindfs_options::baseline()
    }
}

impl Default for LayerDefaults {
    fn default() -> Self {
        Self {
            debug: Self::DEBUG,
            install_from_source: Self::INSTALL_FROM_SOURCE,
            tool_version: ToolVersion::Latest,
            default_options: Self::options(),
        }
    }
}
