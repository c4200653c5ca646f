#![deny(warnings, rust_2018_idioms)]
#![forbid(unsafe_code)]

pub mod image_ref;
pub mod mapping;
pub mod namespace;
pub mod patch;
pub mod policy;
pub mod rewrite;


pub use self::{
    image_ref::SourceImageRef,
    mapping::{ImageMapping, MappingTable},
    namespace::IgnoredNamespaces,
    patch::ImagePatch,
};

pub const DEFAULT_HOST: &str = "docker.io";

/// Namespaces skipped when the configuration doesn't name any. The webhook's
/// own namespace is included so that its pods never depend on it.
pub const DEFAULT_IGNORED_NAMESPACES: [&str; 3] =
    ["kube-system", "kube-public", "image-rewrite"];

/// An immutable snapshot of the rewrite configuration.
///
/// A single `Config` is shared by every in-flight admission request; nothing
/// in this crate mutates it after construction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    pub default_host: String,
    pub ignored_namespaces: IgnoredNamespaces,
    pub image_mappings: MappingTable,
}

// === impl Config ===

impl Config {
    pub fn new(
        default_host: impl Into<String>,
        ignored_namespaces: IgnoredNamespaces,
        image_mappings: MappingTable,
    ) -> Self {
        Self {
            default_host: default_host.into(),
            ignored_namespaces,
            image_mappings,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_host: DEFAULT_HOST.to_string(),
            ignored_namespaces: IgnoredNamespaces::default(),
            image_mappings: MappingTable::default(),
        }
    }
}
