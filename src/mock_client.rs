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

#[cfg(test)]
pub(crate) mod test {
    use async_trait::async_trait;
    use oci_client::{secrets::RegistryAuth, Reference};
    use std::collections::BTreeMap;
    use std::sync::{Arc, Mutex};

    use crate::errors::{Result, SigstoreError};
    use crate::registry::manifest::{
        manifest_descriptor, sha256_digest, Descriptor, ImageIndex, ImageManifest,
    };

    /// In-memory registry, shared between the test and the mock client
    #[derive(Default)]
    pub struct MockRegistry {
        /// `<registry>/<repository>` -> digest -> (manifest, content type)
        manifests: BTreeMap<String, BTreeMap<String, (Vec<u8>, String)>>,
        /// `<registry>/<repository>` -> digest -> blob
        blobs: BTreeMap<String, BTreeMap<String, Vec<u8>>>,
        /// Digests of the blobs pushed, in push order
        pub blob_writes: Vec<String>,
        /// Digests of the manifests pushed, in push order
        pub manifest_writes: Vec<String>,
        pub fail_blob_writes: bool,
        pub referrers_unsupported: bool,
    }

    impl MockRegistry {
        /// Store a manifest without recording a write, returns its digest
        pub fn insert_manifest(&mut self, repository: &str, raw: &[u8]) -> String {
            let digest = sha256_digest(raw);
            let content_type = manifest_descriptor(raw, &digest)
                .map(|d| d.media_type)
                .unwrap_or_default();
            self.manifests
                .entry(repository.to_string())
                .or_default()
                .insert(digest.clone(), (raw.to_vec(), content_type));
            digest
        }

        pub fn has_blob(&self, repository: &str, digest: &str) -> bool {
            self.blobs
                .get(repository)
                .is_some_and(|blobs| blobs.contains_key(digest))
        }

        pub fn manifest_content_type(&self, repository: &str, digest: &str) -> Option<String> {
            self.manifests
                .get(repository)
                .and_then(|m| m.get(digest))
                .map(|(_, content_type)| content_type.clone())
        }
    }

    fn repository_key(image: &Reference) -> String {
        format!("{}/{}", image.registry(), image.repository())
    }

    pub struct MockOciClient {
        pub registry: Arc<Mutex<MockRegistry>>,
    }

    impl MockOciClient {
        fn registry(&self) -> std::sync::MutexGuard<'_, MockRegistry> {
            self.registry.lock().expect("mock registry poisoned")
        }
    }

    #[async_trait]
    impl crate::registry::ClientCapabilities for MockOciClient {
        async fn fetch_manifest_descriptor(
            &mut self,
            image: &Reference,
            _auth: &RegistryAuth,
        ) -> Result<Descriptor> {
            let registry = self.registry();
            let found = image.digest().and_then(|digest| {
                registry
                    .manifests
                    .get(&repository_key(image))
                    .and_then(|m| m.get(digest))
                    .map(|(raw, _)| (raw.clone(), digest.to_string()))
            });
            match found {
                Some((raw, digest)) => manifest_descriptor(&raw, &digest),
                None => Err(SigstoreError::RegistryManifestNotFoundError {
                    image: image.whole(),
                }),
            }
        }

        async fn push_blob(
            &mut self,
            image: &Reference,
            _auth: &RegistryAuth,
            data: &[u8],
            digest: &str,
        ) -> Result<()> {
            let mut registry = self.registry();
            if registry.fail_blob_writes {
                return Err(SigstoreError::RegistryBlobWriteError {
                    image: image.whole(),
                    digest: digest.to_string(),
                    error: "blob upload unknown".to_string(),
                });
            }
            assert_eq!(sha256_digest(data), digest, "blob pushed with wrong digest");
            registry
                .blobs
                .entry(repository_key(image))
                .or_default()
                .insert(digest.to_string(), data.to_vec());
            registry.blob_writes.push(digest.to_string());
            Ok(())
        }

        async fn push_manifest_raw(
            &mut self,
            image: &Reference,
            _auth: &RegistryAuth,
            manifest: Vec<u8>,
            media_type: &str,
        ) -> Result<String> {
            let digest = sha256_digest(&manifest);
            if image.digest() != Some(digest.as_str()) {
                return Err(SigstoreError::RegistryPushError {
                    image: image.whole(),
                    error: format!("manifest digest is {digest}"),
                });
            }
            let mut registry = self.registry();
            registry
                .manifests
                .entry(repository_key(image))
                .or_default()
                .insert(digest.clone(), (manifest, media_type.to_string()));
            registry.manifest_writes.push(digest.clone());
            Ok(format!(
                "https://{}/v2/{}/manifests/{}",
                image.registry(),
                image.repository(),
                digest
            ))
        }

        async fn pull_referrers(
            &mut self,
            image: &Reference,
            _auth: &RegistryAuth,
            artifact_type: Option<&str>,
        ) -> Result<ImageIndex> {
            let registry = self.registry();
            if registry.referrers_unsupported {
                return Err(SigstoreError::RegistryReferrersError {
                    image: image.whole(),
                    error: "404 Not Found".to_string(),
                });
            }

            let mut index = ImageIndex::default();
            let manifests = registry.manifests.get(&repository_key(image));
            for (digest, (raw, content_type)) in manifests.into_iter().flatten() {
                let Ok(manifest) = ImageManifest::from_slice(raw) else {
                    continue;
                };
                let subject_digest = manifest.subject.as_ref().map(|s| s.digest.as_str());
                if subject_digest.is_none() || subject_digest != image.digest() {
                    continue;
                }
                let referrer_type = manifest
                    .artifact_type
                    .clone()
                    .unwrap_or_else(|| manifest.config.media_type.clone());
                if artifact_type.is_some_and(|t| t != referrer_type) {
                    continue;
                }
                index.manifests.push(Descriptor {
                    media_type: content_type.clone(),
                    digest: digest.clone(),
                    size: raw.len() as i64,
                    artifact_type: Some(referrer_type),
                    annotations: manifest.annotations.clone(),
                    ..Default::default()
                });
            }
            Ok(index)
        }
    }
}
