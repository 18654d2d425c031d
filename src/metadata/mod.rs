//! ECS task/container metadata record and its environment projection.

mod fetch;

pub use fetch::{FetchContext, HttpMetadataFetcher, MetadataFetcher};

use std::ffi::{OsStr, OsString};

use serde::Serialize;

/// Derived environment keys, in the order they are appended.
pub const DERIVED_KEYS: [&str; 7] = [
    "ECS_CONTAINER_ARN",
    "ECS_CONTAINER_NAME",
    "ECS_CONTAINER_IMAGE",
    "ECS_TASK_ARN",
    "ECS_TASK_DEFINITION_FAMILY",
    "ECS_TASK_DEFINITION_VERSION",
    "ECS_CLUSTER_NAME",
];

/// Identity facts about the current container and its task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MetadataRecord {
    #[serde(rename = "containerARN")]
    pub container_arn: String,
    #[serde(rename = "containerName")]
    pub container_name: String,
    #[serde(rename = "containerImage")]
    pub container_image: String,
    #[serde(rename = "taskARN")]
    pub task_arn: String,
    #[serde(rename = "taskDefinitionFamily")]
    pub task_definition_family: String,
    #[serde(rename = "taskDefinitionVersion")]
    pub task_definition_version: String,
    #[serde(rename = "clusterName")]
    pub cluster_name: String,
}

impl MetadataRecord {
    fn derived_values(&self) -> [&str; 7] {
        [
            self.container_arn.as_str(),
            self.container_name.as_str(),
            self.container_image.as_str(),
            self.task_arn.as_str(),
            self.task_definition_family.as_str(),
            self.task_definition_version.as_str(),
            self.cluster_name.as_str(),
        ]
    }

    fn derived_entries(&self) -> impl Iterator<Item = String> + '_ {
        DERIVED_KEYS
            .iter()
            .zip(self.derived_values())
            .map(|(k, v)| format!("{k}={v}"))
    }

    /// Only the seven `ECS_*` entries, as printed by `metadata --format env`.
    pub fn environ(&self) -> Vec<String> {
        self.derived_entries().collect()
    }

    /// `base` with every derived key removed, followed by the seven `ECS_*`
    /// entries in fixed order. Unrelated entries keep their order and bytes.
    pub fn environ_with<S: AsRef<OsStr>>(&self, base: &[S]) -> Vec<OsString> {
        let mut merged = Vec::with_capacity(base.len() + DERIVED_KEYS.len());
        for entry in base {
            let entry: &OsStr = entry.as_ref();
            if !is_derived_key(env_key(entry)) {
                merged.push(entry.to_os_string());
            }
        }
        merged.extend(self.derived_entries().map(OsString::from));
        merged
    }
}

pub fn is_derived_key(key: &[u8]) -> bool {
    DERIVED_KEYS.iter().any(|k| k.as_bytes() == key)
}

/// Key bytes of a `KEY=VALUE` entry; the whole entry when it has no `=`.
pub fn env_key(entry: &OsStr) -> &[u8] {
    let bytes = entry.as_encoded_bytes();
    match bytes.iter().position(|b| *b == b'=') {
        Some(pos) => &bytes[..pos],
        None => bytes,
    }
}

/// Snapshot of the current process environment as `KEY=VALUE` entries,
/// byte for byte.
pub fn current_environ() -> Vec<OsString> {
    std::env::vars_os()
        .map(|(key, value)| {
            let mut entry = key;
            entry.push("=");
            entry.push(value);
            entry
        })
        .collect()
}
