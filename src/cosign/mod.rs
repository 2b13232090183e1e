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

//! Structs providing cosign publishing capabilities based on OCI 1.1 referrers
//!
//! Signatures are published with a [`sigstore_referrers::cosign::Client`](crate::cosign::client::Client).
//! Instances of this struct can be created via the [`sigstore_referrers::cosign::ClientBuilder`](crate::cosign::client_builder::ClientBuilder).
//!
//! ## What is currently supported
//!
//!   * Publish the signatures of a [`SignedEntity`] as a referrer of the
//!     signed image
//!   * List the referrers of an image, filtered by artifact type
//!
//! ## Unit testing inside of our own libraries
//!
//! In case you want to mock sigstore interactions inside of your own code, you
//! can implement the [`CosignCapabilities`] trait inside of your test suite.

use async_trait::async_trait;

use crate::errors::Result;
use crate::registry::{ImageIndex, OciReference};

pub mod constants;
pub use constants::{SIGNATURE_ARTIFACT_TYPE, UPLOAD_LOG_TARGET};

pub mod payload;
pub use payload::simple_signing;

pub mod referrers;
pub use referrers::{artifact_type, build_referrer_manifest};

pub mod signature_layers;
pub use signature_layers::SignatureLayer;

pub mod signed_entity;
pub use signed_entity::{SignatureBlob, SignatureImage, SignedEntity};

pub mod client;
pub use self::client::Client;

pub mod client_builder;
pub use self::client_builder::ClientBuilder;

/// Outcome of a referrer push
#[derive(Debug, Clone)]
pub struct ReferrerPushResponse {
    /// Where the referrer manifest has been pushed: the repository of the
    /// subject, addressed by the manifest digest
    pub target: OciReference,
    /// Digest of the pushed manifest
    pub digest: String,
    /// The exact manifest bytes that have been pushed
    pub manifest: Vec<u8>,
    /// URL of the manifest, as reported by the registry
    pub manifest_url: String,
}

#[async_trait]
/// Cosign Abilities that have to be implemented by a
/// Cosign client
pub trait CosignCapabilities {
    /// Fetch the manifests whose `subject` is `subject`, restricted to the
    /// given artifact type (see [`artifact_type`]).
    ///
    /// Fails when the registry does not implement the referrers API.
    async fn list_referrers(
        &mut self,
        subject: &OciReference,
        artifact_type: &str,
    ) -> Result<ImageIndex>;

    /// Fetch the signatures published with
    /// [`CosignCapabilities::push_signature_referrer`].
    async fn list_signature_referrers(&mut self, subject: &OciReference) -> Result<ImageIndex> {
        self.list_referrers(subject, SIGNATURE_ARTIFACT_TYPE).await
    }

    /// Publish the signatures of `signed_entity` as a referrer of `subject`.
    /// This function will do the following steps:
    /// * Fetch the descriptor of `subject`, which must be a digest reference
    /// * Upload the signature layers (and the config blob, if any) to the
    ///   repository of `subject`, one at a time
    /// * Rewrite the signature manifest: `config.mediaType` becomes
    ///   [`SIGNATURE_ARTIFACT_TYPE`] and `subject` points to the descriptor
    /// * Push the rewritten manifest, addressed by its own digest
    ///
    /// Nothing is retried and already uploaded blobs are not removed on
    /// failure. Pushing the same signatures twice produces the same manifest.
    ///
    /// Right before the manifest push, a line naming the subject, the target
    /// and the media types is logged at `info` level on the
    /// [`UPLOAD_LOG_TARGET`](constants::UPLOAD_LOG_TARGET) `tracing` target.
    /// It is only visible when a subscriber is installed.
    async fn push_signature_referrer(
        &mut self,
        subject: &OciReference,
        signed_entity: &dyn SignedEntity,
    ) -> Result<ReferrerPushResponse>;
}
