use prometheus_client::encoding::EncodeLabelSet;
use prometheus_client::{
    metrics::{counter::Counter, family::Family},
    registry::Registry,
};

#[derive(Clone, Debug)]
pub struct AdmissionMetrics {
    requests: Family<OutcomeLabels, Counter>,
    rewritten_images: Counter,
}

/// The result of handling a single admission request.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Outcome {
    Mutated,
    Skipped,
    IgnoredNamespace,
    UnsupportedKind,
    Denied,
    Invalid,
}

#[derive(Clone, Hash, PartialEq, Eq, EncodeLabelSet, Debug)]
struct OutcomeLabels {
    outcome: &'static str,
}

// === impl AdmissionMetrics ===

impl AdmissionMetrics {
    pub fn register(reg: &mut Registry) -> Self {
        let requests = Family::<OutcomeLabels, Counter>::default();
        reg.register(
            "admission_requests",
            "Total number of pod admission requests by outcome",
            requests.clone(),
        );

        let rewritten_images = Counter::default();
        reg.register(
            "rewritten_images",
            "Total number of container images rewritten to a mirror",
            rewritten_images.clone(),
        );

        Self {
            requests,
            rewritten_images,
        }
    }

    pub(crate) fn request(&self, outcome: Outcome) {
        self.requests
            .get_or_create(&OutcomeLabels {
                outcome: outcome.as_str(),
            })
            .inc();
    }

    pub(crate) fn rewritten(&self, images: usize) {
        self.rewritten_images.inc_by(images as u64);
    }

    #[cfg(test)]
    pub(crate) fn requests(&self, outcome: Outcome) -> u64 {
        self.requests
            .get_or_create(&OutcomeLabels {
                outcome: outcome.as_str(),
            })
            .get()
    }

    #[cfg(test)]
    pub(crate) fn rewritten_images(&self) -> u64 {
        self.rewritten_images.get()
    }
}

// === impl Outcome ===

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Mutated => "mutated",
            Self::Skipped => "skipped",
            Self::IgnoredNamespace => "ignored_namespace",
            Self::UnsupportedKind => "unsupported_kind",
            Self::Denied => "denied",
            Self::Invalid => "invalid",
        }
    }
}
