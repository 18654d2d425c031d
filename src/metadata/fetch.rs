use std::time::{Duration, Instant};

use serde::Deserialize;

use super::MetadataRecord;
use crate::config::{self, METADATA_URI_ENV};
use crate::errors::{FetchError, TransportError};

/// Caller-side cancellation for a fetch: an optional parent deadline.
///
/// The effective bound of a request is whichever of the explicit timeout and
/// this deadline elapses first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchContext {
    deadline: Option<Instant>,
}

impl FetchContext {
    /// No parent deadline; only the explicit timeout applies.
    pub fn background() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    /// `timeout` clamped to the time left before the deadline.
    /// None once the deadline has passed.
    pub fn bound(&self, timeout: Duration) -> Option<Duration> {
        match self.deadline {
            None => Some(timeout),
            Some(deadline) => {
                let left = deadline.checked_duration_since(Instant::now())?;
                if left.is_zero() {
                    None
                } else {
                    Some(timeout.min(left))
                }
            }
        }
    }
}

/// Source of task metadata.
pub trait MetadataFetcher {
    fn fetch(&self, ctx: &FetchContext, timeout: Duration) -> Result<MetadataRecord, FetchError>;
}

/// Single-shot HTTP client for the ECS task metadata endpoint.
///
/// The endpoint is looked up in the environment on every call. No retries, no
/// logging: the caller decides what a failure means.
#[derive(Debug, Clone)]
pub struct HttpMetadataFetcher {
    endpoint_var: String,
}

impl Default for HttpMetadataFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpMetadataFetcher {
    pub fn new() -> Self {
        Self::with_endpoint_var(METADATA_URI_ENV)
    }

    /// Read the endpoint from `var` instead of `ECS_CONTAINER_METADATA_URI_V4`.
    pub fn with_endpoint_var(var: impl Into<String>) -> Self {
        Self {
            endpoint_var: var.into(),
        }
    }
}

impl MetadataFetcher for HttpMetadataFetcher {
    fn fetch(&self, ctx: &FetchContext, timeout: Duration) -> Result<MetadataRecord, FetchError> {
        // See: https://docs.aws.amazon.com/AmazonECS/latest/developerguide/task-metadata-endpoint-v4-examples.html
        let endpoint =
            config::metadata_endpoint(&self.endpoint_var).ok_or(FetchError::MissingEndpoint)?;

        let timeout = ctx.bound(timeout).ok_or(TransportError::DeadlineExceeded)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .no_proxy()
            .build()
            .map_err(TransportError::Http)?;

        let response = client
            .get(endpoint.as_str())
            .send()
            .map_err(TransportError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(TransportError::Status(status.as_u16()).into());
        }

        let body = response.bytes().map_err(TransportError::Http)?;
        decode_metadata(&body)
    }
}

#[derive(Debug, Default, Deserialize)]
struct MetadataPayload {
    #[serde(rename = "ContainerARN", default)]
    container_arn: Option<String>,
    #[serde(rename = "Name", default)]
    container_name: Option<String>,
    #[serde(rename = "Image", default)]
    container_image: Option<String>,
    #[serde(rename = "Labels", default)]
    labels: Option<MetadataLabels>,
}

#[derive(Debug, Default, Deserialize)]
struct MetadataLabels {
    #[serde(rename = "com.amazonaws.ecs.cluster", default)]
    cluster: Option<String>,
    #[serde(rename = "com.amazonaws.ecs.task-arn", default)]
    task_arn: Option<String>,
    #[serde(rename = "com.amazonaws.ecs.task-definition-family", default)]
    task_definition_family: Option<String>,
    #[serde(rename = "com.amazonaws.ecs.task-definition-version", default)]
    task_definition_version: Option<String>,
}

impl From<MetadataPayload> for MetadataRecord {
    fn from(p: MetadataPayload) -> Self {
        let labels = p.labels.unwrap_or_default();
        MetadataRecord {
            container_arn: p.container_arn.unwrap_or_default(),
            container_name: p.container_name.unwrap_or_default(),
            container_image: p.container_image.unwrap_or_default(),
            task_arn: labels.task_arn.unwrap_or_default(),
            task_definition_family: labels.task_definition_family.unwrap_or_default(),
            task_definition_version: labels.task_definition_version.unwrap_or_default(),
            cluster_name: labels.cluster.unwrap_or_default(),
        }
    }
}

/// Decode a container metadata document into the flat record.
///
/// A top-level `null` decodes to the empty record.
pub(crate) fn decode_metadata(body: &[u8]) -> Result<MetadataRecord, FetchError> {
    let payload: Option<MetadataPayload> = serde_json::from_slice(body)?;
    Ok(payload.unwrap_or_default().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"{
        "DockerId": "ea32192c8553fbff06c9340478a2ff089b2bb5646fb718b4ee206641c9086d66",
        "ContainerARN": "arn:a",
        "Name": "curl",
        "Image": "img",
        "Labels": {
            "com.amazonaws.ecs.cluster": "default",
            "com.amazonaws.ecs.container-name": "curl",
            "com.amazonaws.ecs.task-arn": "arn:t",
            "com.amazonaws.ecs.task-definition-family": "fam",
            "com.amazonaws.ecs.task-definition-version": "3"
        },
        "Limits": { "CPU": 10, "Memory": 128 }
    }"#;

    #[test]
    fn test_decode_flattens_labels_and_ignores_unknown_fields() {
        let rec = decode_metadata(FULL.as_bytes()).expect("decode");
        assert_eq!(
            rec,
            MetadataRecord {
                container_arn: "arn:a".to_string(),
                container_name: "curl".to_string(),
                container_image: "img".to_string(),
                task_arn: "arn:t".to_string(),
                task_definition_family: "fam".to_string(),
                task_definition_version: "3".to_string(),
                cluster_name: "default".to_string(),
            }
        );
    }

    #[test]
    fn test_decode_missing_fields_default_to_empty() {
        let rec = decode_metadata(br#"{"Name":"curl"}"#).expect("decode");
        assert_eq!(rec.container_name, "curl");
        assert_eq!(rec.container_arn, "");
        assert_eq!(rec.cluster_name, "");
        assert_eq!(rec.task_definition_version, "");

        let rec = decode_metadata(br#"{"Labels":{"com.amazonaws.ecs.cluster":"prod"}}"#)
            .expect("decode");
        assert_eq!(rec.cluster_name, "prod");
        assert_eq!(rec.task_arn, "");
    }

    #[test]
    fn test_decode_null_fields_default_to_empty() {
        let rec = decode_metadata(br#"{"ContainerARN":null,"Labels":null}"#).expect("decode");
        assert_eq!(rec, MetadataRecord::default());
    }

    #[test]
    fn test_decode_top_level_null_is_empty_record() {
        let rec = decode_metadata(b"null").expect("decode");
        assert_eq!(rec, MetadataRecord::default());
    }

    #[test]
    fn test_decode_rejects_non_object_and_trailing_data() {
        let bodies: [&[u8]; 4] = [b"42", b"\"text\"", b"{} {}", b""];
        for body in bodies {
            let err = decode_metadata(body).unwrap_err();
            assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
        }
    }

    #[test]
    fn test_decode_malformed_json_is_decode_error() {
        let err = decode_metadata(b"{invalid").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
        assert!(err.to_string().starts_with("failed to decode metadata response"));
    }

    #[test]
    fn test_decode_wrong_type_is_decode_error() {
        let err = decode_metadata(br#"{"Name": 42}"#).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "{err:?}");
    }

    #[test]
    fn test_fetch_without_endpoint_is_missing_endpoint() {
        let fetcher = HttpMetadataFetcher::with_endpoint_var("ECS_TASK_HELPER_TEST_UNSET_ENDPOINT");
        let started = Instant::now();
        let err = fetcher
            .fetch(&FetchContext::background(), Duration::from_secs(5))
            .unwrap_err();
        assert!(err.is_missing_endpoint(), "{err:?}");
        assert!(started.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn test_fetch_with_expired_context_fails_without_request() {
        let var = "ECS_TASK_HELPER_TEST_EXPIRED_CTX_ENDPOINT";
        // Nothing listens here; an attempted request would fail differently.
        std::env::set_var(var, "http://127.0.0.1:9/v4/task");
        let fetcher = HttpMetadataFetcher::with_endpoint_var(var);
        let ctx = FetchContext::with_deadline(Instant::now());
        let err = fetcher.fetch(&ctx, Duration::from_secs(5)).unwrap_err();
        std::env::remove_var(var);
        assert!(
            matches!(err, FetchError::Transport(TransportError::DeadlineExceeded)),
            "{err:?}"
        );
    }

    #[test]
    fn test_context_bound_takes_the_earlier_limit() {
        let ctx = FetchContext::background();
        assert_eq!(ctx.bound(Duration::from_secs(3)), Some(Duration::from_secs(3)));

        let ctx = FetchContext::with_timeout(Duration::from_secs(60));
        assert_eq!(ctx.bound(Duration::from_secs(3)), Some(Duration::from_secs(3)));

        let ctx = FetchContext::with_timeout(Duration::from_millis(500));
        let bounded = ctx.bound(Duration::from_secs(30)).expect("not expired");
        assert!(bounded <= Duration::from_millis(500));

        let ctx = FetchContext::with_deadline(Instant::now() - Duration::from_millis(1));
        assert_eq!(ctx.bound(Duration::from_secs(3)), None);
    }
}
