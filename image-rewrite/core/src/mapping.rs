/// A source-prefix to mirror-prefix substitution rule.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImageMapping {
    pub source: String,
    pub mirror: String,
}

/// Image mappings in lookup order.
///
/// Mappings are sorted by `source` in descending lexicographic order when the
/// table is built, so that `docker.io/library/nginx` is consulted before
/// `docker.io/library`. Lookup takes the first mapping whose source is a
/// textual prefix of the image. This is not a true longest-prefix match: a
/// source such as `docker.io/a` also prefixes `docker.io/abc/x`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MappingTable(Vec<ImageMapping>);

// === impl ImageMapping ===

impl ImageMapping {
    pub fn new(source: impl Into<String>, mirror: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            mirror: mirror.into(),
        }
    }

    #[inline]
    fn matches(&self, qualified_image: &str) -> bool {
        qualified_image.starts_with(&self.source)
    }
}

// === impl MappingTable ===

impl MappingTable {
    pub fn new(mappings: impl IntoIterator<Item = ImageMapping>) -> Self {
        let mut mappings = mappings.into_iter().collect::<Vec<_>>();
        // `sort_by` is stable, so duplicate sources keep their configured order.
        mappings.sort_by(|a, b| b.source.cmp(&a.source));
        Self(mappings)
    }

    /// Returns the first mapping, in sorted order, whose source prefixes
    /// `qualified_image`.
    pub fn find(&self, qualified_image: &str) -> Option<&ImageMapping> {
        self.0.iter().find(|m| m.matches(qualified_image))
    }

    /// Returns true if any mapping uses `prefix` as its source.
    pub fn has_source(&self, prefix: &str) -> bool {
        self.0.iter().any(|m| m.source == prefix)
    }

    pub fn sorted(&self) -> &[ImageMapping] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = &ImageMapping> + '_ {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<ImageMapping> for MappingTable {
    fn from_iter<I: IntoIterator<Item = ImageMapping>>(iter: I) -> Self {
        Self::new(iter)
    }
}
