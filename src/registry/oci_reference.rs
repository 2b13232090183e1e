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

use crate::errors::{Result, SigstoreError};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// `OciReference` provides a general type to represent any way of referencing images within an OCI registry.
#[derive(Debug, Clone, PartialEq)]
pub struct OciReference {
    pub(crate) oci_reference: oci_client::Reference,
}

impl FromStr for OciReference {
    type Err = SigstoreError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.parse::<oci_client::Reference>()
            .map_err(|_| SigstoreError::OciReferenceNotValidError {
                reference: s.to_string(),
            })
            .map(|oci_reference| OciReference { oci_reference })
    }
}

impl OciReference {
    /// Reference to `digest` inside of the same registry and repository
    /// of `self`.
    ///
    /// The result is re-parsed, so a malformed digest is reported as
    /// [`SigstoreError::OciReferenceNotValidError`].
    pub fn in_same_repository(&self, digest: &str) -> Result<OciReference> {
        format!("{}/{}@{}", self.registry(), self.repository(), digest).parse()
    }

    /// Resolve the registry address of a given Reference.
    ///
    /// Some registries, such as docker.io, uses a different address for the actual
    /// registry. This function implements such redirection.
    pub fn resolve_registry(&self) -> &str {
        self.oci_reference.resolve_registry()
    }

    /// registry returns the name of the registry.
    pub fn registry(&self) -> &str {
        self.oci_reference.registry()
    }

    /// repository returns the name of the repository
    pub fn repository(&self) -> &str {
        self.oci_reference.repository()
    }

    /// digest returns the object's digest, if present.
    pub fn digest(&self) -> Option<&str> {
        self.oci_reference.digest()
    }

    /// Like [`OciReference::digest`], but a reference without digest is an error.
    pub fn require_digest(&self) -> Result<&str> {
        self.digest()
            .ok_or_else(|| SigstoreError::OciReferenceWithoutDigestError {
                reference: self.whole(),
            })
    }

    /// whole returns the whole reference.
    pub fn whole(&self) -> String {
        self.oci_reference.whole()
    }
}

impl Display for OciReference {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.oci_reference.fmt(f)
    }
}
