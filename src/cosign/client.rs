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

use async_trait::async_trait;
use tracing::{debug, info};

use super::{
    constants::{SIGNATURE_ARTIFACT_TYPE, SIGSTORE_OCI_MEDIA_TYPE, UPLOAD_LOG_TARGET},
    referrers::{build_referrer_manifest, filter_referrers},
    CosignCapabilities, ReferrerPushResponse, SignedEntity,
};
use crate::errors::{Result, SigstoreError};
use crate::registry::{AuthSource, ImageIndex, OciReference};

/// Cosign Client
///
/// Instances of `Client` can be built via [`sigstore_referrers::cosign::ClientBuilder`](crate::cosign::ClientBuilder).
pub struct Client {
    pub(crate) registry_client: Box<dyn crate::registry::ClientCapabilities>,
    pub(crate) auth: AuthSource,
}

#[async_trait]
impl CosignCapabilities for Client {
    async fn list_referrers(
        &mut self,
        subject: &OciReference,
        artifact_type: &str,
    ) -> Result<ImageIndex> {
        subject.require_digest()?;
        let auth = self.auth.resolve(subject);
        let oci_auth: oci_client::secrets::RegistryAuth = (&auth).into();

        let index = self
            .registry_client
            .pull_referrers(&subject.oci_reference, &oci_auth, Some(artifact_type))
            .await?;
        debug!(
            subject = subject.whole().as_str(),
            artifact_type,
            referrers = index.manifests.len(),
            "referrers fetched"
        );
        Ok(filter_referrers(index, artifact_type))
    }

    async fn push_signature_referrer(
        &mut self,
        subject: &OciReference,
        signed_entity: &dyn SignedEntity,
    ) -> Result<ReferrerPushResponse> {
        subject.require_digest()?;
        let auth = self.auth.resolve(subject);
        let oci_auth: oci_client::secrets::RegistryAuth = (&auth).into();

        let subject_descriptor = self
            .registry_client
            .fetch_manifest_descriptor(&subject.oci_reference, &oci_auth)
            .await?;

        let layers = signed_entity.signature_layers().map_err(|e| match e {
            SigstoreError::SignatureUnavailableError(_) => e,
            other => SigstoreError::SignatureUnavailableError(other.to_string()),
        })?;
        if layers.is_empty() {
            return Err(SigstoreError::SignatureUnavailableError(format!(
                "no signatures found for {subject}"
            )));
        }

        for layer in &layers {
            let digest = layer.digest();
            self.registry_client
                .push_blob(&subject.oci_reference, &oci_auth, &layer.data, &digest)
                .await?;
            debug!(digest = digest.as_str(), "signature layer uploaded");
        }
        if let Some(config) = signed_entity.config_blob()? {
            self.registry_client
                .push_blob(
                    &subject.oci_reference,
                    &oci_auth,
                    &config.data,
                    &config.digest(),
                )
                .await?;
        }

        let raw_manifest = signed_entity.raw_manifest()?;
        let manifest =
            build_referrer_manifest(&raw_manifest, SIGNATURE_ARTIFACT_TYPE, &subject_descriptor)?;
        let (raw, digest) = manifest.to_bytes_and_digest()?;
        let target = subject.in_same_repository(&digest)?;

        let layer_media_type = manifest
            .layers
            .first()
            .map(|l| l.media_type.as_str())
            .unwrap_or(SIGSTORE_OCI_MEDIA_TYPE);
        info!(
            target: UPLOAD_LOG_TARGET,
            "Uploading signature for [{}] to [{}] with config.mediaType [{}] layers[0].mediaType [{}].",
            subject, target, SIGNATURE_ARTIFACT_TYPE, layer_media_type
        );

        let manifest_url = self
            .registry_client
            .push_manifest_raw(
                &target.oci_reference,
                &oci_auth,
                raw.clone(),
                manifest.content_type(),
            )
            .await?;

        Ok(ReferrerPushResponse {
            target,
            digest,
            manifest: raw,
            manifest_url,
        })
    }
}
