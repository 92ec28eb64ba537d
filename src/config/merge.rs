//! Layer merge logic
//!
//! Implements the layer merge with:
//! - debug / install_from_source: OR (most verbose wins)
//! - tool_version: overlay wins if declared
//! - default_options: key union, overlay wins per key
//! - bound_folders: union by destination, overlay replaces whole folders
//! - skip_validations: set union

use log::debug;

use super::layer::{ConfigLayer, Declared};
use super::state::LayerState;

fn or_flags(base: Option<bool>, overlay: Option<bool>) -> Option<bool> {
    match (base, overlay) {
        (None, None) => None,
        (b, o) => Some(b.unwrap_or(false) || o.unwrap_or(false)),
    }
}

/// Merge `overlay` over `base`.
///
/// Neither input is modified. The result is a fresh DECLARED layer and
/// needs its own finalization.
pub fn merge(base: &ConfigLayer, overlay: &ConfigLayer) -> ConfigLayer {
    let default_options = match (
        base.declared_default_options(),
        overlay.declared_default_options(),
    ) {
        (Some(b), Some(o)) => Some(b.merge(o)),
        (b, o) => o.or(b).cloned(),
    };

    let mut bound_folders = base.bound_folders.clone();
    for (destination, folder) in &overlay.bound_folders {
        if bound_folders.insert(destination.clone(), folder.clone()).is_some() {
            debug!(
                "{} layer replaces bound folder {} from {} layer",
                overlay.origin, destination, base.origin
            );
        }
    }

    let skip_validations = base
        .skip_validations
        .union(&overlay.skip_validations)
        .copied()
        .collect();

    let debug = or_flags(base.declared_debug(), overlay.declared_debug());
    let install_from_source = or_flags(
        base.declared_install_from_source(),
        overlay.declared_install_from_source(),
    );
    let tool_version = overlay
        .declared_tool_version()
        .or(base.declared_tool_version())
        .cloned();

    ConfigLayer {
        origin: overlay.origin,
        declared: Declared {
            debug: debug.is_some(),
            install_from_source: install_from_source.is_some(),
            tool_version: tool_version.is_some(),
            default_options: default_options.is_some(),
        },
        debug,
        install_from_source,
        tool_version,
        default_options,
        bound_folders,
        skip_validations,
        state: LayerState::Declared,
    }
}

/// Merge multiple layers in order (first is base, last has highest precedence)
pub fn merge_layers<'a, I>(layers: I) -> ConfigLayer
where
    I: IntoIterator<Item = &'a ConfigLayer>,
{
    let mut layers = layers.into_iter();
    let Some(first) = layers.next() else {
        return ConfigLayer::new();
    };
    let seed = merge(&ConfigLayer::for_origin(first.origin), first);
    layers.fold(seed, |acc, layer| merge(&acc, layer))
}
