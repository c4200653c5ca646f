use std::collections::BTreeSet;

/// Namespaces whose pods are never mutated.
///
/// Membership is an exact string comparison; there are no wildcards.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IgnoredNamespaces(BTreeSet<String>);

// === impl IgnoredNamespaces ===

impl IgnoredNamespaces {
    pub fn new<S: Into<String>>(namespaces: impl IntoIterator<Item = S>) -> Self {
        Self(namespaces.into_iter().map(Into::into).collect())
    }

    pub fn is_ignored(&self, namespace: &str) -> bool {
        self.0.contains(namespace)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> + '_ {
        self.0.iter().map(String::as_str)
    }
}

impl Default for IgnoredNamespaces {
    fn default() -> Self {
        Self::new(crate::DEFAULT_IGNORED_NAMESPACES)
    }
}

impl<S: Into<String>> FromIterator<S> for IgnoredNamespaces {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_membership() {
        let ns = IgnoredNamespaces::new(["ns1", "kube-system"]);
        assert!(ns.is_ignored("ns1"));
        assert!(ns.is_ignored("kube-system"));
        assert!(!ns.is_ignored("ns"));
        assert!(!ns.is_ignored("ns10"));
        assert!(!ns.is_ignored("kube-*"));
        assert!(!ns.is_ignored(""));
    }

    #[test]
    fn defaults() {
        let ns = IgnoredNamespaces::default();
        assert_eq!(
            ns.iter().collect::<Vec<_>>(),
            ["image-rewrite", "kube-public", "kube-system"]
        );
    }

    #[test]
    fn empty() {
        let ns = IgnoredNamespaces::new(Vec::<String>::new());
        assert!(!ns.is_ignored("kube-system"));
    }
}
