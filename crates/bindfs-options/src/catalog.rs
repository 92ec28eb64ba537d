//! Static catalog of the bindfs options this crate understands.

/// How an option is passed on the bindfs command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionKind {
    /// Bare switch (`--create-as-user`), takes a boolean.
    Flag,
    /// Option with an argument (`--force-user=vagrant`).
    Value,
}

impl OptionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            OptionKind::Flag => "flag",
            OptionKind::Value => "value",
        }
    }
}

/// A single catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionDefinition {
    /// Canonical bindfs name, without leading dashes.
    pub name: &'static str,
    pub kind: OptionKind,
    /// Alternative spellings accepted on input.
    pub aliases: &'static [&'static str],
}

const fn value(name: &'static str, aliases: &'static [&'static str]) -> OptionDefinition {
    OptionDefinition {
        name,
        kind: OptionKind::Value,
        aliases,
    }
}

const fn flag(name: &'static str) -> OptionDefinition {
    OptionDefinition {
        name,
        kind: OptionKind::Flag,
        aliases: &[],
    }
}

const DEFINITIONS: &[OptionDefinition] = &[
    // Ownership and permissions
    value("force-user", &["u", "user", "owner"]),
    value("force-group", &["g", "group"]),
    value("perms", &["p"]),
    value("mirror", &["m"]),
    value("mirror-only", &["M"]),
    value("map", &[]),
    value("map-passwd", &[]),
    value("map-group", &[]),
    value("uid-offset", &[]),
    value("gid-offset", &[]),
    // File creation policy
    flag("create-as-user"),
    flag("create-as-mounter"),
    value("create-for-user", &[]),
    value("create-for-group", &[]),
    value("create-with-perms", &[]),
    // Chown/chgrp/chmod policy
    flag("chown-normal"),
    flag("chown-ignore"),
    flag("chown-deny"),
    flag("chgrp-normal"),
    flag("chgrp-ignore"),
    flag("chgrp-deny"),
    flag("chmod-normal"),
    flag("chmod-ignore"),
    flag("chmod-deny"),
    value("chmod-filter", &[]),
    flag("chmod-allow-x"),
    // Extended attributes
    flag("xattr-none"),
    flag("xattr-ro"),
    flag("xattr-rw"),
    // Other file operations
    flag("delete-deny"),
    flag("rename-deny"),
    // Rate limits
    value("read-rate", &[]),
    value("write-rate", &[]),
    // Miscellaneous
    flag("hide-hard-links"),
    flag("resolve-symlinks"),
    value("resolve-symlink-policy", &[]),
    flag("realistic-permissions"),
    flag("ctime-from-mtime"),
    flag("enable-lock-forwarding"),
    flag("disable-lock-forwarding"),
    flag("enable-ioctl"),
    flag("block-devices-as-files"),
    flag("direct-io"),
    flag("no-direct-io"),
    value("forward-odirect", &[]),
    // FUSE
    flag("multithreaded"),
    flag("no-allow-other"),
];

/// All known option definitions, in catalog order.
pub fn definitions() -> &'static [OptionDefinition] {
    DEFINITIONS
}

/// Look up a definition by canonical name only.
pub fn lookup(canonical: &str) -> Option<&'static OptionDefinition> {
    DEFINITIONS.iter().find(|def| def.name == canonical)
}

/// Resolve a symbolic key to its definition.
///
/// Tries the key as a canonical name, then with underscores turned into
/// dashes, then the alias table (raw and normalized).
pub fn resolve(key: &str) -> Option<&'static OptionDefinition> {
    if let Some(def) = lookup(key) {
        return Some(def);
    }

    let normalized = key.replace('_', "-");
    if let Some(def) = lookup(&normalized) {
        return Some(def);
    }

    DEFINITIONS.iter().find(|def| {
        def.aliases
            .iter()
            .any(|alias| *alias == key || *alias == normalized)
    })
}
