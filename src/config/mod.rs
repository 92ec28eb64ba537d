//! Layered bindfs configuration
//!
//! Layers merge in scope order, lowest precedence first:
//! 1. Global defaults (user-wide)
//! 2. Box layer (shipped with the base box)
//! 3. Project layer
//! 4. CLI overrides

mod defaults;
mod file;
mod folder;
mod layer;
mod merge;
mod state;
mod version;

pub use defaults::LayerDefaults;
pub use file::{load_layer, parse_layer, BindEntry, LayerFile, LayerSource, LoadError, LoadedLayer};
pub use folder::{BoundFolder, FolderError};
pub use layer::{ConfigLayer, LayerError, LayerOrigin};
pub use merge::{merge, merge_layers};
pub use state::{LayerState, TerminalState};
pub use version::{ToolVersion, VersionError, LATEST};
