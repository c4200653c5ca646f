use crate::{Config, SourceImageRef};
use std::borrow::Cow;

/// Returns the mirrored form of `image`, or `image` itself when no mapping
/// applies.
///
/// Host qualification is only used for matching: an unmatched image is
/// returned exactly as written, while a matched image is returned in its
/// qualified form with the first occurrence of the mapping's source replaced
/// by its mirror. Tags and digests are carried through verbatim.
pub fn rewrite<'i>(image: &'i str, config: &Config) -> Cow<'i, str> {
    let qualified = SourceImageRef::parse(image, &config.default_host).qualified();
    match config.image_mappings.find(&qualified) {
        Some(mapping) => Cow::Owned(qualified.replacen(&mapping.source, &mapping.mirror, 1)),
        None => Cow::Borrowed(image),
    }
}

/// Returns true if rewriting `image` produces a different value.
pub fn is_rewritten(image: &str, config: &Config) -> bool {
    rewrite(image, config) != image
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IgnoredNamespaces, ImageMapping};

    fn config(mappings: &[(&str, &str)]) -> Config {
        Config::new(
            "docker.io",
            IgnoredNamespaces::default(),
            mappings
                .iter()
                .map(|(s, m)| ImageMapping::new(*s, *m))
                .collect(),
        )
    }

    #[test]
    fn unmatched_bare_image_passes_through() {
        let config = config(&[("source.co", "mirror.co")]);
        assert_eq!(rewrite("nginx", &config), "nginx");
        assert!(matches!(rewrite("nginx", &config), Cow::Borrowed(_)));
    }

    #[test]
    fn default_host_mapping_qualifies_output() {
        let config = config(&[("docker.io", "mirror.co/dockerhub")]);
        assert_eq!(
            rewrite("nginx:1.25", &config),
            "mirror.co/dockerhub/nginx:1.25"
        );
        assert_eq!(
            rewrite("library/redis", &config),
            "mirror.co/dockerhub/library/redis"
        );
    }

    #[test]
    fn explicit_host() {
        let config = config(&[("source.co", "mirror.co")]);
        assert_eq!(rewrite("source.co/test2", &config), "mirror.co/test2");
    }

    #[test]
    fn keeps_digest() {
        let config = config(&[("quay.io/org", "mirror.co/quay/org")]);
        assert_eq!(
            rewrite("quay.io/org/app@sha256:0123abcd", &config),
            "mirror.co/quay/org/app@sha256:0123abcd"
        );
    }

    #[test]
    fn replaces_only_the_first_occurrence() {
        let config = config(&[("a.io", "b.io")]);
        assert_eq!(rewrite("a.io/a.io/app:a.io", &config), "b.io/a.io/app:a.io");
    }

    #[test]
    fn empty_image_qualifies_to_default_host() {
        let dockerhub = config(&[("docker.io", "mirror.co")]);
        assert_eq!(rewrite("", &dockerhub), "mirror.co/");
        assert!(is_rewritten("", &dockerhub));

        let unmatched = config(&[("source.co", "mirror.co")]);
        assert_eq!(rewrite("", &unmatched), "");
    }

    #[test]
    fn identity_mapping_is_not_a_rewrite() {
        let config = config(&[("source.co", "source.co")]);
        assert!(!is_rewritten("source.co/app", &config));
    }

    #[test]
    fn rewriting_is_idempotent_when_mirror_is_not_a_source() {
        let config = config(&[("source.co", "mirror.co"), ("docker.io", "hub.mirror.co")]);
        for image in ["source.co/app:1", "nginx", "quay.io/x/y", "docker.io/library/busybox"] {
            let once = rewrite(image, &config).into_owned();
            let twice = rewrite(&once, &config).into_owned();
            assert_eq!(once, twice, "{image}");
        }
    }
}
