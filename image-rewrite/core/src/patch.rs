use crate::{rewrite, Config};
use std::borrow::Cow;

/// Replaces the image of the container at `container` in a pod's
/// `spec.containers`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImagePatch {
    pub container: usize,
    pub image: String,
}

// === impl ImagePatch ===

impl ImagePatch {
    pub const OP: &'static str = "replace";

    /// The JSON pointer to the patched container's image.
    pub fn path(&self) -> String {
        format!("/spec/containers/{}/image", self.container)
    }
}

/// Builds one patch for each container whose image is rewritten, in
/// container order. Containers whose image doesn't change are omitted.
pub fn build<'i>(images: impl IntoIterator<Item = &'i str>, config: &Config) -> Vec<ImagePatch> {
    images
        .into_iter()
        .enumerate()
        .filter_map(|(container, image)| match rewrite::rewrite(image, config) {
            Cow::Owned(rewritten) if rewritten != image => Some(ImagePatch {
                container,
                image: rewritten,
            }),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{IgnoredNamespaces, ImageMapping, MappingTable};

    fn config() -> Config {
        Config::new(
            "docker.io",
            IgnoredNamespaces::new(["ns1"]),
            MappingTable::new([
                ImageMapping::new("source.co", "mirror.co"),
                ImageMapping::new("docker.io/library", "mirror.co/library"),
            ]),
        )
    }

    #[test]
    fn only_changed_containers_are_patched() {
        let patches = build(["skip.co/test1", "source.co/test2"], &config());
        assert_eq!(
            patches,
            [ImagePatch {
                container: 1,
                image: "mirror.co/test2".to_string(),
            }]
        );
        assert_eq!(patches[0].path(), "/spec/containers/1/image");
        assert_eq!(ImagePatch::OP, "replace");
    }

    #[test]
    fn patches_follow_container_order() {
        let patches = build(
            [
                "library/nginx",
                "quay.io/app",
                "source.co/a:1",
                "registry.k8s.io/pause",
                "library/redis@sha256:ff",
            ],
            &config(),
        );
        let paths = patches.iter().map(ImagePatch::path).collect::<Vec<_>>();
        assert_eq!(
            paths,
            [
                "/spec/containers/0/image",
                "/spec/containers/2/image",
                "/spec/containers/4/image",
            ]
        );
        let images = patches.iter().map(|p| p.image.as_str()).collect::<Vec<_>>();
        assert_eq!(
            images,
            [
                "mirror.co/library/nginx",
                "mirror.co/a:1",
                "mirror.co/library/redis@sha256:ff",
            ]
        );
    }

    #[test]
    fn empty_image_follows_default_host() {
        let config = Config::new(
            "docker.io",
            IgnoredNamespaces::default(),
            MappingTable::new([ImageMapping::new("docker.io", "mirror.co")]),
        );
        let patches = build(["", "quay.io/app"], &config);
        assert_eq!(
            patches,
            [ImagePatch {
                container: 0,
                image: "mirror.co/".to_string(),
            }]
        );
    }

    #[test]
    fn no_changes_no_patches() {
        assert!(build(["nginx", "quay.io/app"], &config()).is_empty());
        assert!(build(std::iter::empty(), &config()).is_empty());
    }
}
