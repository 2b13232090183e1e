//
// Copyright 2021 The Sigstore Authors.
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

use super::manifest::{manifest_descriptor, Descriptor, ImageIndex, MANIFEST_MEDIA_TYPES};
use super::ClientCapabilities;
use crate::errors::{Result, SigstoreError};

use async_trait::async_trait;
use http::HeaderValue;
use oci_client::errors::{OciDistributionError, OciErrorCode};
use oci_client::secrets::RegistryAuth;
use oci_client::{Reference, RegistryOperation};
use tracing::debug;

/// Internal client for an OCI Registry. This performs actual
/// calls against the remote registry.
///
/// For testing purposes, use instead the client inside of the
/// `mock_client` module.
pub(crate) struct OciClient {
    pub registry_client: oci_client::Client,
}

impl OciClient {
    /// `push_blob` and `pull_referrers` rely on a token previously stored
    /// by the client for the registry.
    async fn authenticate(
        &self,
        image: &Reference,
        auth: &RegistryAuth,
        operation: RegistryOperation,
    ) -> Result<()> {
        self.registry_client
            .auth(image, auth, operation)
            .await
            .map(|_| ())
            .map_err(|e| SigstoreError::RegistryAuthError {
                image: image.whole(),
                error: e.to_string(),
            })
    }
}

/// Registries answer a missing manifest either with an OCI error envelope
/// or with a bare 404.
fn is_not_found(error: &OciDistributionError) -> bool {
    match error {
        OciDistributionError::ImageManifestNotFoundError(_) => true,
        OciDistributionError::ServerError { code, .. } => *code == 404,
        OciDistributionError::RegistryError { envelope, .. } => envelope.errors.iter().any(|e| {
            matches!(
                e.code,
                OciErrorCode::ManifestUnknown | OciErrorCode::NameUnknown | OciErrorCode::NotFound
            )
        }),
        _ => false,
    }
}

/// `oci_client` puts the `artifactType` filter into the query string as is,
/// and registries decode a literal `+` as a space.
fn urlencode(s: &str) -> String {
    url::form_urlencoded::byte_serialize(s.as_bytes()).collect()
}

#[async_trait]
impl ClientCapabilities for OciClient {
    async fn fetch_manifest_descriptor(
        &mut self,
        image: &Reference,
        auth: &RegistryAuth,
    ) -> Result<Descriptor> {
        let (raw, digest) = self
            .registry_client
            .pull_manifest_raw(image, auth, MANIFEST_MEDIA_TYPES)
            .await
            .map_err(|e| {
                if is_not_found(&e) {
                    SigstoreError::RegistryManifestNotFoundError {
                        image: image.whole(),
                    }
                } else {
                    SigstoreError::RegistryFetchManifestError {
                        image: image.whole(),
                        error: e.to_string(),
                    }
                }
            })?;
        debug!(image = image.whole().as_str(), digest = digest.as_str(), "fetched manifest");
        manifest_descriptor(&raw, &digest)
    }

    async fn push_blob(
        &mut self,
        image: &Reference,
        auth: &RegistryAuth,
        data: &[u8],
        digest: &str,
    ) -> Result<()> {
        let to_blob_error = |error: String| SigstoreError::RegistryBlobWriteError {
            image: image.whole(),
            digest: digest.to_string(),
            error,
        };

        self.authenticate(image, auth, RegistryOperation::Push)
            .await
            .map_err(|e| to_blob_error(e.to_string()))?;
        let url = self
            .registry_client
            .push_blob(image, data, digest)
            .await
            .map_err(|e| to_blob_error(e.to_string()))?;
        debug!(url = url.as_str(), "blob pushed");
        Ok(())
    }

    async fn push_manifest_raw(
        &mut self,
        image: &Reference,
        auth: &RegistryAuth,
        manifest: Vec<u8>,
        media_type: &str,
    ) -> Result<String> {
        let content_type =
            HeaderValue::from_str(media_type).map_err(|e| SigstoreError::RegistryPushError {
                image: image.whole(),
                error: format!("invalid media type {media_type}: {e}"),
            })?;

        self.authenticate(image, auth, RegistryOperation::Push).await?;
        self.registry_client
            .push_manifest_raw(image, manifest, content_type)
            .await
            .map_err(|e| SigstoreError::RegistryPushError {
                image: image.whole(),
                error: e.to_string(),
            })
    }

    async fn pull_referrers(
        &mut self,
        image: &Reference,
        auth: &RegistryAuth,
        artifact_type: Option<&str>,
    ) -> Result<ImageIndex> {
        let to_referrers_error = |error: String| SigstoreError::RegistryReferrersError {
            image: image.whole(),
            error,
        };

        self.authenticate(image, auth, RegistryOperation::Pull)
            .await
            .map_err(|e| to_referrers_error(e.to_string()))?;
        let artifact_type = artifact_type.map(urlencode);
        let index = self
            .registry_client
            .pull_referrers(image, artifact_type.as_deref())
            .await
            .map_err(|e| to_referrers_error(e.to_string()))?;

        // Both types describe the same JSON document. The entries of
        // `oci_client` have no `artifactType`, so ours come back untyped.
        let value = serde_json::to_value(&index)?;
        serde_json::from_value(value).map_err(|e| to_referrers_error(e.to_string()))
    }
}
