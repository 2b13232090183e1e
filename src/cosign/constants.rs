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

pub const SIGSTORE_OCI_MEDIA_TYPE: &str = "application/vnd.dev.cosign.simplesigning.v1+json";
pub const SIGSTORE_SIGNATURE_ANNOTATION: &str = "dev.cosignproject.cosign/signature";
pub const SIGSTORE_BUNDLE_ANNOTATION: &str = "dev.sigstore.cosign/bundle";
pub const SIGSTORE_CERT_ANNOTATION: &str = "dev.sigstore.cosign/certificate";
pub const SIGSTORE_CHAIN_ANNOTATION: &str = "dev.sigstore.cosign/chain";

pub const COSIGN_SIGNATURE_TYPE: &str = "cosign container image signature";

/// Attachment kind of signatures
pub const SIGNATURE_ATTACHMENT: &str = "sig";
/// Attachment kind of attestations
pub const ATTESTATION_ATTACHMENT: &str = "att";
/// Attachment kind of SBOMs
pub const SBOM_ATTACHMENT: &str = "sbom";

/// Artifact type of signature referrers, `artifact_type(SIGNATURE_ATTACHMENT)`.
///
/// Used both when publishing and when listing signatures.
pub const SIGNATURE_ARTIFACT_TYPE: &str = "application/vnd.dev.cosign.artifact.sig.v1+json";

/// `tracing` target of the line announcing the upload of a referrer
/// manifest. Front ends print it to stderr without any decoration.
pub const UPLOAD_LOG_TARGET: &str = "sigstore_referrers::upload";
