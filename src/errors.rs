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

//! The errors that can be raised by sigstore-referrers

use thiserror::Error;

pub type Result<T> = std::result::Result<T, SigstoreError>;

#[derive(Error, Debug)]
pub enum SigstoreError {
    #[error("OCI reference not valid: {reference}")]
    OciReferenceNotValidError { reference: String },

    #[error("OCI reference {reference} does not point to a digest")]
    OciReferenceWithoutDigestError { reference: String },

    #[error("Cannot find manifest of {image}")]
    RegistryManifestNotFoundError { image: String },

    #[error("Cannot fetch manifest of {image}: {error}")]
    RegistryFetchManifestError { image: String, error: String },

    #[error("Cannot authenticate against registry of {image}: {error}")]
    RegistryAuthError { image: String, error: String },

    #[error("Cannot write blob {digest} to {image}: {error}")]
    RegistryBlobWriteError {
        image: String,
        digest: String,
        error: String,
    },

    #[error("Cannot push {image}: {error}")]
    RegistryPushError { image: String, error: String },

    #[error("Cannot list referrers of {image}: {error}")]
    RegistryReferrersError { image: String, error: String },

    #[error("Signatures not available: {0}")]
    SignatureUnavailableError(String),

    #[error("Cannot parse manifest: {0}")]
    ManifestParseError(String),

    #[error("Cannot compute digest: {0}")]
    DigestComputeError(String),

    #[error(transparent)]
    Base64DecodeError(#[from] base64::DecodeError),

    #[error(transparent)]
    SerdeJsonError(#[from] serde_json::error::Error),

    #[error(transparent)]
    IOError(#[from] std::io::Error),
}
