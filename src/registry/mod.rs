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

pub mod config;
pub use config::*;

pub mod manifest;
pub use manifest::{Descriptor, ImageIndex, ImageManifest};

pub mod oci_reference;
pub use oci_reference::OciReference;

pub(crate) mod oci_client;
pub(crate) use self::oci_client::*;

use crate::errors::Result;

use async_trait::async_trait;

#[async_trait]
/// Capabilities that are expected to be provided by a registry client
pub(crate) trait ClientCapabilities: Send + Sync {
    /// Metadata of the manifest referenced by `image`: digest, size and
    /// media type.
    async fn fetch_manifest_descriptor(
        &mut self,
        image: &::oci_client::Reference,
        auth: &::oci_client::secrets::RegistryAuth,
    ) -> Result<Descriptor>;

    /// Upload a blob to the repository of `image`. The blob is addressed
    /// by `digest`.
    async fn push_blob(
        &mut self,
        image: &::oci_client::Reference,
        auth: &::oci_client::secrets::RegistryAuth,
        data: &[u8],
        digest: &str,
    ) -> Result<()>;

    /// Put the given manifest bytes at `image`, returning the URL of the
    /// pushed manifest.
    async fn push_manifest_raw(
        &mut self,
        image: &::oci_client::Reference,
        auth: &::oci_client::secrets::RegistryAuth,
        manifest: Vec<u8>,
        media_type: &str,
    ) -> Result<String>;

    /// List the manifests whose `subject` is `image`, optionally filtered
    /// by artifact type.
    async fn pull_referrers(
        &mut self,
        image: &::oci_client::Reference,
        auth: &::oci_client::secrets::RegistryAuth,
        artifact_type: Option<&str>,
    ) -> Result<ImageIndex>;
}
