//
// Copyright 2023 The Sigstore Authors.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! OCI image manifest, image index and descriptor types.
//!
//! These types serialize with a fixed field order and sorted annotation
//! keys: serializing the same value twice always produces the same bytes,
//! hence the same digest. Fields that are not modelled here are preserved
//! through the `extra` maps, so parsing and re-serializing a manifest only
//! changes what the caller explicitly mutated.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

use crate::errors::{Result, SigstoreError};

/// Media type of an OCI image manifest
pub const OCI_IMAGE_MEDIA_TYPE: &str = "application/vnd.oci.image.manifest.v1+json";

/// Media type of an OCI image index
pub const OCI_IMAGE_INDEX_MEDIA_TYPE: &str = "application/vnd.oci.image.index.v1+json";

/// Media type of a Docker v2 schema 2 manifest
pub const DOCKER_MANIFEST_MEDIA_TYPE: &str =
    "application/vnd.docker.distribution.manifest.v2+json";

/// Media type of a Docker manifest list
pub const DOCKER_MANIFEST_LIST_MEDIA_TYPE: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";

/// Media type of the OCI empty JSON descriptor
pub const OCI_EMPTY_JSON_MEDIA_TYPE: &str = "application/vnd.oci.empty.v1+json";

/// Content of the OCI empty JSON blob
pub const OCI_EMPTY_JSON_DATA: &[u8] = b"{}";

/// All the manifest media types accepted when fetching a subject descriptor
pub(crate) const MANIFEST_MEDIA_TYPES: &[&str] = &[
    OCI_IMAGE_MEDIA_TYPE,
    OCI_IMAGE_INDEX_MEDIA_TYPE,
    DOCKER_MANIFEST_MEDIA_TYPE,
    DOCKER_MANIFEST_LIST_MEDIA_TYPE,
];

/// Compute the `sha256:<hex>` digest of the given bytes
pub fn sha256_digest(data: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(data)))
}

/// A compact reference to some content: media type, digest and size.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Descriptor {
    pub media_type: String,
    pub digest: String,
    pub size: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub urls: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Descriptor {
    /// Create the descriptor of the given blob
    pub fn for_blob(media_type: &str, data: &[u8]) -> Self {
        Descriptor {
            media_type: media_type.to_string(),
            digest: sha256_digest(data),
            size: data.len() as i64,
            ..Default::default()
        }
    }

    /// Descriptor of the OCI empty JSON blob (`{}`)
    pub fn empty_json() -> Self {
        Self::for_blob(OCI_EMPTY_JSON_MEDIA_TYPE, OCI_EMPTY_JSON_DATA)
    }
}

/// An OCI image manifest
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageManifest {
    pub schema_version: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub artifact_type: Option<String>,

    pub config: Descriptor,

    #[serde(default)]
    pub layers: Vec<Descriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<Descriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl ImageManifest {
    /// Create an OCI image manifest with the given config and layers
    pub fn new(config: Descriptor, layers: Vec<Descriptor>) -> Self {
        ImageManifest {
            schema_version: 2,
            media_type: Some(OCI_IMAGE_MEDIA_TYPE.to_string()),
            artifact_type: None,
            config,
            layers,
            subject: None,
            annotations: None,
            extra: BTreeMap::new(),
        }
    }

    /// Parse raw manifest bytes
    pub fn from_slice(raw: &[u8]) -> Result<Self> {
        serde_json::from_slice(raw).map_err(|e| SigstoreError::ManifestParseError(e.to_string()))
    }

    /// The media type to use as `Content-Type` when pushing this manifest
    pub fn content_type(&self) -> &str {
        self.media_type.as_deref().unwrap_or(OCI_IMAGE_MEDIA_TYPE)
    }

    /// Serialize the manifest and compute the digest of the produced bytes.
    ///
    /// The returned bytes are the ones that have to be pushed: the digest is
    /// only valid for them.
    pub fn to_bytes_and_digest(&self) -> Result<(Vec<u8>, String)> {
        let raw = serde_json::to_vec(self)
            .map_err(|e| SigstoreError::DigestComputeError(e.to_string()))?;
        let digest = sha256_digest(&raw);
        Ok((raw, digest))
    }
}

/// An OCI image index, which is also the format of the referrers API response
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ImageIndex {
    pub schema_version: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,

    #[serde(default)]
    pub manifests: Vec<Descriptor>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotations: Option<BTreeMap<String, String>>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl Default for ImageIndex {
    fn default() -> Self {
        ImageIndex {
            schema_version: 2,
            media_type: Some(OCI_IMAGE_INDEX_MEDIA_TYPE.to_string()),
            manifests: Vec::new(),
            annotations: None,
            extra: BTreeMap::new(),
        }
    }
}

/// Only the `mediaType` of a manifest, whatever its kind
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct MediaTypeOnly {
    media_type: Option<String>,
}

/// Build the descriptor of a raw manifest as served by a registry.
///
/// Manifests that do not declare their `mediaType` are assumed to be OCI
/// image manifests.
pub(crate) fn manifest_descriptor(raw: &[u8], digest: &str) -> Result<Descriptor> {
    let parsed: MediaTypeOnly =
        serde_json::from_slice(raw).map_err(|e| SigstoreError::ManifestParseError(e.to_string()))?;
    Ok(Descriptor {
        media_type: parsed
            .media_type
            .unwrap_or_else(|| OCI_IMAGE_MEDIA_TYPE.to_string()),
        digest: digest.to_string(),
        size: raw.len() as i64,
        ..Default::default()
    })
}
