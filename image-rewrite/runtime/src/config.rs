//! Loads the rewrite configuration document.
//!
//! ```yaml
//! defaultHost: docker.io
//! ignoredNamespaces: [kube-system, kube-public, image-rewrite]
//! imageMappings:
//!   - source: docker.io/library
//!     mirror: mirror.example.com/library
//! ```

use crate::core::{self, IgnoredNamespaces, ImageMapping, MappingTable};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("imageMappings[{0}]: source must not be empty")]
    EmptySource(usize),

    #[error("imageMappings[{0}]: mirror must not be empty")]
    EmptyMirror(usize),

    #[error("defaultHost must be a registry hostname: {0}")]
    InvalidDefaultHost(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct Document {
    #[serde(default)]
    default_host: Option<String>,

    #[serde(default)]
    ignored_namespaces: Option<Vec<String>>,

    #[serde(default)]
    image_mappings: Vec<Mapping>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Mapping {
    source: String,
    mirror: String,
}

/// Reads and validates the configuration file at `path`.
pub fn load(path: &Path) -> Result<core::Config, ConfigError> {
    let bytes = std::fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = parse(&bytes)?;
    let sha256 = format!("{:x}", Sha256::digest(&bytes));
    info!(
        path = %path.display(),
        %sha256,
        default_host = %config.default_host,
        mappings = config.image_mappings.len(),
        "Loaded configuration",
    );
    Ok(config)
}

/// Parses a YAML configuration document, applying defaults.
///
/// An empty document yields the default configuration, which mutates
/// nothing.
pub fn parse(bytes: &[u8]) -> Result<core::Config, ConfigError> {
    let doc = if bytes.iter().all(u8::is_ascii_whitespace) {
        Document::default()
    } else {
        serde_yaml::from_slice::<Document>(bytes)?
    };

    let default_host = match doc.default_host {
        Some(host) if !host.trim().is_empty() => host.trim().to_string(),
        _ => core::DEFAULT_HOST.to_string(),
    };
    if default_host.contains('/') {
        return Err(ConfigError::InvalidDefaultHost(default_host));
    }

    let ignored_namespaces = match doc.ignored_namespaces {
        Some(namespaces) => IgnoredNamespaces::new(namespaces),
        None => IgnoredNamespaces::default(),
    };

    let mut mappings = Vec::with_capacity(doc.image_mappings.len());
    for (i, Mapping { source, mirror }) in doc.image_mappings.into_iter().enumerate() {
        if source.is_empty() {
            return Err(ConfigError::EmptySource(i));
        }
        if mirror.is_empty() {
            return Err(ConfigError::EmptyMirror(i));
        }
        debug!(%source, %mirror, "Image mapping");
        mappings.push(ImageMapping::new(source, mirror));
    }

    Ok(core::Config::new(
        default_host,
        ignored_namespaces,
        MappingTable::new(mappings),
    ))
}
