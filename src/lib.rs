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

//! This crate publishes [cosign](https://github.com/sigstore/cosign) signatures
//! into OCI registries using the OCI 1.1 referrers model.
//!
//! Instead of storing the signature object under a `sha256-<digest>.sig` tag,
//! the signature manifest gets a `subject` field pointing at the signed image,
//! and is pushed addressed by its own digest. Registries implementing the
//! referrers API can then list all the signatures of an image.
//!
//! # Publishing a signature
//!
//! ```rust,no_run
//! use sigstore_referrers::cosign::{ClientBuilder, CosignCapabilities, SignatureImage, SignatureLayer};
//! use sigstore_referrers::registry::OciReference;
//!
//! #[tokio::main]
//! pub async fn main() {
//!     let subject: OciReference =
//!         "registry.example/repo@sha256:f3cfc9d0dbf931d3db4685ec659b7ac68e2a578219da4aae65427886e649b06b"
//!             .parse()
//!             .unwrap();
//!     let digest = subject.digest().unwrap().to_string();
//!
//!     // The signature of the payload, computed elsewhere
//!     let signature = "MEUCIQD6q/COgzOyW0YH1Dk+CCYSt4uAhm3FDHUwvPI55zwnlwIgE0ZK58ZOWpZw8YVmBapJhBqCfdPekIknimuO0xH8Jh8=";
//!     let layer = SignatureLayer::new(&subject, &digest, signature.to_string());
//!     let image = SignatureImage::new(vec![layer]).unwrap();
//!
//!     let mut client = ClientBuilder::default().build();
//!     let response = client.push_signature_referrer(&subject, &image).await.unwrap();
//!     println!("signature pushed to {}", response.target);
//!
//!     let referrers = client.list_signature_referrers(&subject).await.unwrap();
//!     println!("{} signatures found", referrers.manifests.len());
//! }
//! ```
//!
//! # Registry access
//!
//! The credentials are taken from the docker configuration file unless
//! explicit ones are given to the [`cosign::ClientBuilder`]. The transport
//! can be tuned with a [`registry::ClientConfig`].

pub mod cosign;
pub mod errors;
pub mod registry;

mod mock_client;
