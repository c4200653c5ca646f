use crate::{
    core::{patch, policy, Config, ImagePatch},
    metrics::{AdmissionMetrics, Outcome},
};
use anyhow::{anyhow, Result};
use futures::future;
use http_body_util::BodyExt;
use hyper::{http, Request, Response};
use json_patch::{jsonptr::PointerBuf, PatchOperation, ReplaceOperation};
use k8s_openapi::api::core::v1::{Pod, PodSpec};
use kube::{core::DynamicObject, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Rewrites pod container images to their configured mirrors.
#[derive(Clone)]
pub struct Admission {
    config: Arc<Config>,
    metrics: AdmissionMetrics,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {0}")]
    Request(#[from] hyper::Error),

    #[error("failed to encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

type Review = kube::core::admission::AdmissionReview<DynamicObject>;
type AdmissionRequest = kube::core::admission::AdmissionRequest<DynamicObject>;
type AdmissionResponse = kube::core::admission::AdmissionResponse;
type AdmissionReview = kube::core::admission::AdmissionReview<DynamicObject>;

type Body = http_body_util::Full<bytes::Bytes>;

// === impl AdmissionService ===

impl tower::Service<Request<hyper::body::Incoming>> for Admission {
    type Response = Response<Body>;
    type Error = Error;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<hyper::body::Incoming>) -> Self::Future {
        trace!(?req);
        if req.method() != http::Method::POST || req.uri().path() != "/" {
            return Box::pin(future::ok(status_response(http::StatusCode::NOT_FOUND)));
        }

        if !is_json(req.headers()) {
            warn!(
                content_type = ?req.headers().get(http::header::CONTENT_TYPE),
                "Expected application/json"
            );
            return Box::pin(future::ok(status_response(
                http::StatusCode::UNSUPPORTED_MEDIA_TYPE,
            )));
        }

        let admission = self.clone();
        Box::pin(async move {
            let bytes = req.into_body().collect().await?.to_bytes();
            admission.handle(bytes)
        })
    }
}

impl Admission {
    pub fn new(config: Arc<Config>, metrics: AdmissionMetrics) -> Self {
        Self { config, metrics }
    }

    fn handle(&self, bytes: bytes::Bytes) -> Result<Response<Body>, Error> {
        use bytes::Buf;
        if bytes.is_empty() {
            warn!("Empty request body");
            return Ok(status_response(http::StatusCode::BAD_REQUEST));
        }

        let review: Review = match serde_json::from_reader(bytes.reader()) {
            Ok(review) => review,
            Err(error) => {
                warn!(%error, "Failed to parse request body");
                self.metrics.request(Outcome::Invalid);
                return json_response(AdmissionResponse::invalid(error).into_review());
            }
        };
        trace!(?review);

        let rsp = match review.try_into() {
            Ok(req) => {
                debug!(?req);
                self.admit(req)
            }
            Err(error) => {
                warn!(%error, "Invalid admission request");
                self.metrics.request(Outcome::Invalid);
                AdmissionResponse::invalid(error)
            }
        };
        debug!(?rsp);
        json_response(rsp.into_review())
    }

    fn admit(&self, req: AdmissionRequest) -> AdmissionResponse {
        let rsp = AdmissionResponse::from(&req);

        if !is_kind::<Pod>(&req) {
            debug!(
                group = %req.kind.group,
                kind = %req.kind.kind,
                "Allowing unsupported resource type"
            );
            self.metrics.request(Outcome::UnsupportedKind);
            return rsp;
        }

        let req_ns = req.namespace.clone();
        let (pod, spec) = match parse_spec::<PodSpec>(req) {
            Ok(spec) => spec,
            Err(error) => {
                info!(%error, "Failed to parse Pod spec");
                self.metrics.request(Outcome::Denied);
                return rsp.deny(error);
            }
        };

        let ns = req_ns
            .or_else(|| pod.namespace())
            .unwrap_or_else(|| "default".to_string());
        let name = pod.name_any();
        // Containers that set no image are neither counted nor patched.
        let images = spec
            .containers
            .iter()
            .map(|c| c.image.as_deref())
            .collect::<Vec<_>>();

        if !policy::decide(&ns, images.iter().flatten().copied(), &self.config) {
            if self.config.ignored_namespaces.is_ignored(&ns) {
                info!(%ns, %name, "Skipping pod in ignored namespace");
                self.metrics.request(Outcome::IgnoredNamespace);
            } else {
                debug!(%ns, %name, "No images to rewrite");
                self.metrics.request(Outcome::Skipped);
            }
            return rsp;
        }

        let mut patches = patch::build(
            images.iter().map(|image| image.unwrap_or_default()),
            &self.config,
        );
        patches.retain(|p| images[p.container].is_some());
        for p in &patches {
            info!(
                %ns,
                %name,
                container = %spec.containers[p.container].name,
                from = images[p.container].unwrap_or_default(),
                to = %p.image,
                "Rewriting image"
            );
        }

        match rsp.clone().with_patch(to_json_patch(&patches)) {
            Ok(rsp) => {
                self.metrics.request(Outcome::Mutated);
                self.metrics.rewritten(patches.len());
                rsp
            }
            Err(error) => {
                warn!(%error, %ns, %name, "Failed to encode patch");
                self.metrics.request(Outcome::Denied);
                rsp.deny(error)
            }
        }
    }
}

fn is_kind<T>(req: &AdmissionRequest) -> bool
where
    T: Resource,
    T::DynamicType: Default,
{
    let dt = Default::default();
    req.kind.group.eq_ignore_ascii_case(&T::group(&dt))
        && req.kind.kind.eq_ignore_ascii_case(&T::kind(&dt))
}

fn is_json(headers: &http::HeaderMap) -> bool {
    headers
        .get(http::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|mime| mime.trim().eq_ignore_ascii_case("application/json"))
}

fn to_json_patch(patches: &[ImagePatch]) -> json_patch::Patch {
    json_patch::Patch(
        patches
            .iter()
            .map(|p| {
                let container = p.container.to_string();
                PatchOperation::Replace(ReplaceOperation {
                    path: PointerBuf::from_tokens([
                        "spec",
                        "containers",
                        container.as_str(),
                        "image",
                    ]),
                    value: serde_json::Value::String(p.image.clone()),
                })
            })
            .collect(),
    )
}

fn status_response(status: http::StatusCode) -> Response<Body> {
    Response::builder()
        .status(status)
        .body(Body::default())
        .expect("status response must be valid")
}

fn json_response(rsp: AdmissionReview) -> Result<Response<Body>, Error> {
    let bytes = serde_json::to_vec(&rsp)?;
    Ok(Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("admission review response must be valid"))
}

fn parse_spec<T: DeserializeOwned>(req: AdmissionRequest) -> Result<(DynamicObject, T)> {
    let obj = req
        .object
        .ok_or_else(|| anyhow!("admission request missing 'object'"))?;

    let spec = {
        let data = obj
            .data
            .get("spec")
            .cloned()
            .ok_or_else(|| anyhow!("admission request missing 'spec'"))?;
        serde_json::from_value(data)?
    };

    Ok((obj, spec))
}
