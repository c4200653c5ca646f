use crate::{rewrite, Config};

/// Decides whether a pod's admission requires a patch.
///
/// Pods in ignored namespaces are never mutated. Otherwise a mutation is
/// required when at least one container image would change.
pub fn decide<'i>(
    namespace: &str,
    images: impl IntoIterator<Item = &'i str>,
    config: &Config,
) -> bool {
    if config.ignored_namespaces.is_ignored(namespace) {
        return false;
    }

    images
        .into_iter()
        .any(|image| rewrite::is_rewritten(image, config))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IgnoredNamespaces, ImageMapping, MappingTable};

    fn config() -> Config {
        Config::new(
            "docker.io",
            IgnoredNamespaces::new(["ns1", "ns2"]),
            MappingTable::new([ImageMapping::new("source.co", "mirror.co")]),
        )
    }

    #[test]
    fn ignored_namespace_skips_regardless_of_images() {
        let config = config();
        assert!(!decide("ns1", ["source.co/test"], &config));
        assert!(!decide("ns2", ["source.co/a", "source.co/b"], &config));
    }

    #[test]
    fn any_changed_image_requires_mutation() {
        let config = config();
        assert!(decide("test", ["source.co/test"], &config));
        assert!(decide("test", ["nginx", "source.co/test"], &config));
    }

    #[test]
    fn unchanged_images_do_not_require_mutation() {
        let config = config();
        assert!(!decide("test", ["nginx", "quay.io/app"], &config));
        assert!(!decide("test", std::iter::empty(), &config));
    }
}
