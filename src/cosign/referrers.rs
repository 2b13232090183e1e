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

//! Helpers to attach cosign objects to an image using the
//! [OCI 1.1 referrers](https://github.com/opencontainers/distribution-spec/blob/v1.1.0/spec.md#listing-referrers)
//! model: the attached manifest points at the image through its `subject`
//! field, instead of being stored under a `sha256-<hex>.sig` tag.

use crate::errors::Result;
use crate::registry::manifest::{Descriptor, ImageIndex, ImageManifest};

/// Convert an attachment name (`sig`, `sbom`, `att`,...) into an OCI 1.1
/// artifact type.
///
/// The name is not validated.
pub fn artifact_type(attachment: &str) -> String {
    format!("application/vnd.dev.cosign.artifact.{attachment}.v1+json")
}

/// Turn the manifest of a cosign object into a referrer of `subject`.
///
/// `config.mediaType` is set to `artifact_type`, `subject` is set to the
/// given descriptor. Everything else is left untouched.
pub fn build_referrer_manifest(
    raw_manifest: &[u8],
    artifact_type: &str,
    subject: &Descriptor,
) -> Result<ImageManifest> {
    let mut manifest = ImageManifest::from_slice(raw_manifest)?;
    manifest.config.media_type = artifact_type.to_string();
    manifest.subject = Some(subject.clone());
    Ok(manifest)
}

/// Drop the index entries that declare an artifact type other than the
/// given one.
///
/// Registries are allowed to ignore the `artifactType` filter of the
/// referrers API, in which case they report it through the
/// `OCI-Filters-Applied` header. Entries without an artifact type are
/// kept: the filter was sent to the registry, and the OCI client used
/// against real registries does not carry the field over.
pub(crate) fn filter_referrers(mut index: ImageIndex, artifact_type: &str) -> ImageIndex {
    index.manifests.retain(|desc| {
        desc.artifact_type
            .as_deref()
            .map_or(true, |declared| declared == artifact_type)
    });
    index
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cosign::constants::{SIGNATURE_ARTIFACT_TYPE, SIGNATURE_ATTACHMENT};
    use rstest::rstest;
    use serde_json::{json, Value};

    fn subject() -> Descriptor {
        Descriptor {
            media_type: "application/vnd.oci.image.manifest.v1+json".to_string(),
            digest: "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa"
                .to_string(),
            size: 1234,
            ..Default::default()
        }
    }

    fn signature_manifest() -> Value {
        json!({
            "schemaVersion": 2,
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "config": {
                "mediaType": "application/vnd.oci.image.config.v1+json",
                "digest": "sha256:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb",
                "size": 233
            },
            "layers": [
                {
                    "mediaType": "application/vnd.dev.cosign.simplesigning.v1+json",
                    "digest": "sha256:cccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccccc",
                    "size": 250,
                    "annotations": {
                        "dev.cosignproject.cosign/signature": "MEUCIQ=="
                    }
                }
            ],
            "annotations": {"org.opencontainers.image.created": "2023-01-01T00:00:00Z"}
        })
    }

    #[rstest]
    #[case("sig", "application/vnd.dev.cosign.artifact.sig.v1+json")]
    #[case("sbom", "application/vnd.dev.cosign.artifact.sbom.v1+json")]
    #[case("att", "application/vnd.dev.cosign.artifact.att.v1+json")]
    #[case::empty("", "application/vnd.dev.cosign.artifact..v1+json")]
    #[case::not_validated("a/b c", "application/vnd.dev.cosign.artifact.a/b c.v1+json")]
    fn artifact_type_format(#[case] attachment: &str, #[case] expected: &str) {
        assert_eq!(artifact_type(attachment), expected);
    }

    #[test]
    fn signature_artifact_type_constant_is_consistent() {
        assert_eq!(artifact_type(SIGNATURE_ATTACHMENT), SIGNATURE_ARTIFACT_TYPE);
    }

    #[test]
    fn referrer_manifest_only_changes_config_media_type_and_subject() {
        let original = signature_manifest();
        let raw = serde_json::to_vec(&original).unwrap();

        let manifest = build_referrer_manifest(&raw, SIGNATURE_ARTIFACT_TYPE, &subject()).unwrap();
        assert_eq!(manifest.config.media_type, SIGNATURE_ARTIFACT_TYPE);
        assert_eq!(manifest.subject, Some(subject()));

        let mut expected = original;
        expected["config"]["mediaType"] = json!(SIGNATURE_ARTIFACT_TYPE);
        expected["subject"] = json!({
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "digest": "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa",
            "size": 1234
        });
        assert_eq!(serde_json::to_value(&manifest).unwrap(), expected);
    }

    #[test]
    fn referrer_manifest_replaces_existing_subject() {
        let mut original = signature_manifest();
        original["subject"] = json!({
            "mediaType": "application/vnd.oci.image.manifest.v1+json",
            "digest": "sha256:dddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddddd",
            "size": 1
        });
        let raw = serde_json::to_vec(&original).unwrap();

        let manifest = build_referrer_manifest(&raw, SIGNATURE_ARTIFACT_TYPE, &subject()).unwrap();
        assert_eq!(manifest.subject, Some(subject()));
    }

    #[test]
    fn referrer_manifest_digest_is_stable() {
        let raw = serde_json::to_vec(&signature_manifest()).unwrap();
        let first = build_referrer_manifest(&raw, SIGNATURE_ARTIFACT_TYPE, &subject())
            .unwrap()
            .to_bytes_and_digest()
            .unwrap();
        let second = build_referrer_manifest(&raw, SIGNATURE_ARTIFACT_TYPE, &subject())
            .unwrap()
            .to_bytes_and_digest()
            .unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn filter_drops_other_artifact_types() {
        let mut sig = subject();
        sig.artifact_type = Some(SIGNATURE_ARTIFACT_TYPE.to_string());
        let mut sbom = subject();
        sbom.artifact_type = Some(artifact_type("sbom"));

        let index = ImageIndex {
            manifests: vec![sig.clone(), sbom],
            ..Default::default()
        };
        let index = filter_referrers(index, SIGNATURE_ARTIFACT_TYPE);
        assert_eq!(index.manifests, vec![sig]);
    }

    #[test]
    fn filter_keeps_entries_without_artifact_type() {
        let mut sig = subject();
        sig.artifact_type = Some(SIGNATURE_ARTIFACT_TYPE.to_string());
        let untyped = subject();

        let index = ImageIndex {
            manifests: vec![sig.clone(), untyped.clone()],
            ..Default::default()
        };
        let index = filter_referrers(index, SIGNATURE_ARTIFACT_TYPE);
        assert_eq!(index.manifests, vec![sig, untyped]);
    }
}
