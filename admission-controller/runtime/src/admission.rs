use crate::{
    core::{IngressAdmission, IngressRef, IngressResource, IngressValidator, Verdict},
    k8s,
    metrics::AdmissionMetrics,
};
use anyhow::{anyhow, bail, Result};
use futures::future;
use http_body_util::BodyExt;
use hyper::{http, Request, Response};
use kube::{
    core::{admission::Operation, DynamicObject},
    Resource, ResourceExt,
};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

/// Path registered in the ValidatingWebhookConfiguration.
const ADMISSION_PATH: &str = "/validate-networking-v1-ingress";

#[derive(Clone)]
pub struct Admission {
    validator: Arc<IngressValidator>,
    metrics: AdmissionMetrics,
    timeout: Duration,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read request body: {0}")]
    Request(Box<dyn std::error::Error + Send + Sync>),

    #[error("failed to encode json response: {0}")]
    Json(#[from] serde_json::Error),
}

type Review = kube::core::admission::AdmissionReview<DynamicObject>;
type AdmissionRequest = kube::core::admission::AdmissionRequest<DynamicObject>;
type AdmissionResponse = kube::core::admission::AdmissionResponse;

type Body = http_body_util::Full<bytes::Bytes>;

// === impl Admission ===

impl<B> tower::Service<Request<B>> for Admission
where
    B: hyper::body::Body + Send + 'static,
    B::Data: Send,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    type Response = Response<Body>;
    type Error = Error;
    type Future = future::BoxFuture<'static, Result<Response<Body>, Error>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<std::result::Result<(), Self::Error>> {
        std::task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<B>) -> Self::Future {
        if req.method() != http::Method::POST || req.uri().path() != ADMISSION_PATH {
            return Box::pin(future::ok(
                Response::builder()
                    .status(http::StatusCode::NOT_FOUND)
                    .body(Body::default())
                    .expect("not found response must be valid"),
            ));
        }

        let admission = self.clone();
        Box::pin(async move {
            use bytes::Buf;
            let bytes = req
                .into_body()
                .collect()
                .await
                .map_err(|error| Error::Request(error.into()))?
                .to_bytes();
            let review: Review = match serde_json::from_reader(bytes.reader()) {
                Ok(review) => review,
                Err(error) => {
                    warn!(%error, "Failed to parse request body");
                    return json_response(AdmissionResponse::invalid(error).into_review());
                }
            };
            trace!(?review);

            let rsp = match review.try_into() {
                Ok(req) => {
                    debug!(?req);
                    admission.admit(req).await
                }
                Err(error) => {
                    warn!(%error, "Invalid admission request");
                    AdmissionResponse::invalid(error)
                }
            };
            debug!(?rsp);
            json_response(rsp.into_review())
        })
    }
}

impl Admission {
    pub fn new(validator: Arc<IngressValidator>, metrics: AdmissionMetrics, timeout: Duration) -> Self {
        Self {
            validator,
            metrics,
            timeout,
        }
    }

    async fn admit(self, req: AdmissionRequest) -> AdmissionResponse {
        if !is_kind::<k8s::Ingress>(&req) {
            self.metrics.invalid.inc();
            return AdmissionResponse::invalid(format_args!(
                "unsupported resource type: {}.{}.{}",
                req.kind.group, req.kind.version, req.kind.kind
            ));
        }

        let rsp = AdmissionResponse::from(&req);
        let admission = match parse_admission(&req) {
            Ok(admission) => admission,
            Err(error) => {
                warn!(%error, "Failed to parse ingress from admission request");
                self.metrics.invalid.inc();
                return rsp.deny(error);
            }
        };

        // An evaluation that outlives its budget denies the request rather
        // than stalling the API server.
        let verdict = match tokio::time::timeout(self.timeout, self.validator.evaluate(&admission))
            .await
        {
            Ok(verdict) => verdict,
            Err(_) => {
                warn!(timeout = ?self.timeout, "Ingress validation timed out");
                Verdict::Denied(format!(
                    "ingress validation timed out after {}ms",
                    self.timeout.as_millis()
                ))
            }
        };

        match verdict {
            Verdict::Allowed => {
                self.metrics.allowed.inc();
                rsp
            }
            Verdict::Denied(message) => {
                info!(%message, "Denied");
                self.metrics.denied.inc();
                rsp.deny(message)
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

fn json_response(rsp: Review) -> Result<Response<Body>, Error> {
    let bytes = serde_json::to_vec(&rsp)?;
    Ok(Response::builder()
        .status(http::StatusCode::OK)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(Body::from(bytes))
        .expect("admission review response must be valid"))
}

/// Types the request by operation so downstream stages never re-inspect it.
fn parse_admission(req: &AdmissionRequest) -> Result<IngressAdmission> {
    match req.operation {
        Operation::Create => Ok(IngressAdmission::Create {
            new: parse_ingress(req.object.as_ref())?,
        }),
        Operation::Update => Ok(IngressAdmission::Update {
            old: parse_ingress(req.old_object.as_ref())?,
            new: parse_ingress(req.object.as_ref())?,
        }),
        Operation::Delete => Ok(IngressAdmission::Delete),
        Operation::Connect => bail!("unsupported operation: CONNECT"),
    }
}

fn parse_ingress(obj: Option<&DynamicObject>) -> Result<IngressResource> {
    let obj = obj.ok_or_else(|| anyhow!("admission request missing object"))?;
    let namespace = obj
        .namespace()
        .ok_or_else(|| anyhow!("no 'namespace' field set on ingress"))?;
    let class_name = obj
        .data
        .get("spec")
        .and_then(|spec| spec.get("ingressClassName"))
        .and_then(|v| v.as_str())
        .map(str::to_string);
    Ok(IngressResource {
        id: IngressRef::new(namespace, obj.name_any()),
        annotations: obj.annotations().clone(),
        class_name,
    })
}
