//
// Copyright 2022 The Sigstore Authors.
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

use base64::{engine::general_purpose::STANDARD as BASE64_STD_ENGINE, Engine as _};
use std::fmt;

use super::constants::{
    SIGSTORE_BUNDLE_ANNOTATION, SIGSTORE_CERT_ANNOTATION, SIGSTORE_CHAIN_ANNOTATION,
    SIGSTORE_OCI_MEDIA_TYPE, SIGSTORE_SIGNATURE_ANNOTATION,
};
use super::payload::SimpleSigning;
use super::signed_entity::SignatureBlob;
use crate::errors::Result;
use crate::registry::OciReference;

/// A signature produced by cosign, ready to be stored inside of a
/// signature object.
///
/// The information ends up in two places:
///   * the layer data, which is the signed `SimpleSigning` payload
///   * the annotations of the layer descriptor: signature, certificate,
///     certificate chain and Rekor bundle
#[derive(Clone, Debug)]
pub struct SignatureLayer {
    pub simple_signing: SimpleSigning,
    /// Base64 encoded signature of the payload
    pub signature: String,
    /// PEM encoded signing certificate
    pub certificate: Option<String>,
    /// PEM encoded certificate chain
    pub chain: Option<String>,
    /// JSON encoded Rekor bundle
    pub bundle: Option<String>,
    raw_data: Option<Vec<u8>>,
}

impl fmt::Display for SignatureLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SignatureLayer\n- signature: {}\n- certificate: {}\n- bundle: {}\n- digest: {}",
            self.signature,
            self.certificate.is_some(),
            self.bundle.is_some(),
            self.simple_signing.critical.image.docker_manifest_digest,
        )
    }
}

impl SignatureLayer {
    /// Signature of the standard cosign payload for `subject`
    pub fn new(subject: &OciReference, manifest_digest: &str, signature: String) -> Self {
        SignatureLayer {
            simple_signing: SimpleSigning::new(subject, manifest_digest),
            signature,
            certificate: None,
            chain: None,
            bundle: None,
            raw_data: None,
        }
    }

    /// Signature of an already serialized payload.
    ///
    /// The payload bytes are kept verbatim: they are the bytes the signature
    /// was computed over.
    pub fn from_payload(payload: &[u8], signature: String) -> Result<Self> {
        let simple_signing: SimpleSigning = serde_json::from_slice(payload)?;
        Ok(SignatureLayer {
            simple_signing,
            signature,
            certificate: None,
            chain: None,
            bundle: None,
            raw_data: Some(payload.to_vec()),
        })
    }

    /// Decode the base64 signature, ensuring it is well formed
    pub fn raw_signature(&self) -> Result<Vec<u8>> {
        Ok(BASE64_STD_ENGINE.decode(&self.signature)?)
    }

    /// Encode the layer as a blob of a signature object
    pub fn to_blob(&self) -> Result<SignatureBlob> {
        self.raw_signature()?;

        let data = match &self.raw_data {
            Some(raw) => raw.clone(),
            None => self.simple_signing.to_bytes()?,
        };
        let mut blob = SignatureBlob::new(SIGSTORE_OCI_MEDIA_TYPE, data);
        blob.annotations.insert(
            SIGSTORE_SIGNATURE_ANNOTATION.to_string(),
            self.signature.clone(),
        );
        let optional = [
            (SIGSTORE_CERT_ANNOTATION, &self.certificate),
            (SIGSTORE_CHAIN_ANNOTATION, &self.chain),
            (SIGSTORE_BUNDLE_ANNOTATION, &self.bundle),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                blob.annotations.insert(key.to_string(), value.clone());
            }
        }
        Ok(blob)
    }
}
