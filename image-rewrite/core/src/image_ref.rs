use std::fmt;

/// An image reference qualified with an explicit registry host.
///
/// No validation is performed: any string parses, falling back to the
/// default host when the first path segment doesn't look like a hostname.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceImageRef {
    pub host: String,
    pub repo_path: String,
}

// === impl SourceImageRef ===

impl SourceImageRef {
    /// Splits `image` into a registry host and repository path.
    ///
    /// The first segment is only treated as a host when there is more than
    /// one segment and it contains a `.`; otherwise `default_host` is used
    /// and the whole string becomes the repository path.
    pub fn parse(image: &str, default_host: &str) -> Self {
        match image.split_once('/') {
            Some((host, repo_path)) if host.contains('.') => Self {
                host: host.to_string(),
                repo_path: repo_path.to_string(),
            },
            _ => Self {
                host: default_host.to_string(),
                repo_path: image.to_string(),
            },
        }
    }

    /// Returns the fully host-qualified reference, `host/repo_path`.
    pub fn qualified(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for SourceImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.host, self.repo_path)
    }
}
