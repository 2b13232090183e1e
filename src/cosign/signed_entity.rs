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

//! Objects carrying the signatures to be published.

use std::collections::BTreeMap;

use super::signature_layers::SignatureLayer;
use crate::errors::{Result, SigstoreError};
use crate::registry::manifest::{
    Descriptor, ImageManifest, OCI_EMPTY_JSON_DATA, OCI_EMPTY_JSON_MEDIA_TYPE,
};

/// A blob that is part of a signature object, together with the
/// annotations of its descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureBlob {
    pub media_type: String,
    pub data: Vec<u8>,
    pub annotations: BTreeMap<String, String>,
}

impl SignatureBlob {
    pub fn new(media_type: &str, data: Vec<u8>) -> Self {
        SignatureBlob {
            media_type: media_type.to_string(),
            data,
            annotations: BTreeMap::new(),
        }
    }

    /// `sha256:<hex>` digest of the blob contents
    pub fn digest(&self) -> String {
        crate::registry::manifest::sha256_digest(&self.data)
    }

    /// Descriptor of the blob, as found in the manifest layers
    pub fn descriptor(&self) -> Descriptor {
        let mut descriptor = Descriptor::for_blob(&self.media_type, &self.data);
        if !self.annotations.is_empty() {
            descriptor.annotations = Some(self.annotations.clone());
        }
        descriptor
    }
}

/// An entity that has signatures attached to it.
///
/// Implementations provide the signature layers and the manifest that
/// references them.
pub trait SignedEntity: Send + Sync {
    /// The signature layer blobs, in manifest order
    fn signature_layers(&self) -> Result<Vec<SignatureBlob>>;

    /// The raw bytes of the signature manifest
    fn raw_manifest(&self) -> Result<Vec<u8>>;

    /// The config blob referenced by the signature manifest, when it has to
    /// be uploaded together with the layers.
    fn config_blob(&self) -> Result<Option<SignatureBlob>> {
        Ok(None)
    }
}

/// The cosign signature object of an image: one layer per signature and an
/// empty JSON config.
#[derive(Debug, Clone)]
pub struct SignatureImage {
    layers: Vec<SignatureBlob>,
}

impl SignatureImage {
    pub fn new(layers: Vec<SignatureLayer>) -> Result<Self> {
        let layers = layers
            .iter()
            .map(SignatureLayer::to_blob)
            .collect::<Result<Vec<_>>>()?;
        Ok(SignatureImage { layers })
    }

    /// Build the object from already encoded blobs
    pub fn from_blobs(layers: Vec<SignatureBlob>) -> Self {
        SignatureImage { layers }
    }

    /// The OCI manifest describing the signature object
    pub fn manifest(&self) -> ImageManifest {
        ImageManifest::new(
            Descriptor::empty_json(),
            self.layers.iter().map(SignatureBlob::descriptor).collect(),
        )
    }
}

impl SignedEntity for SignatureImage {
    fn signature_layers(&self) -> Result<Vec<SignatureBlob>> {
        if self.layers.is_empty() {
            return Err(SigstoreError::SignatureUnavailableError(
                "the signature image has no layers".to_string(),
            ));
        }
        Ok(self.layers.clone())
    }

    fn raw_manifest(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(&self.manifest())?)
    }

    fn config_blob(&self) -> Result<Option<SignatureBlob>> {
        Ok(Some(SignatureBlob::new(
            OCI_EMPTY_JSON_MEDIA_TYPE,
            OCI_EMPTY_JSON_DATA.to_vec(),
        )))
    }
}
