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

//! Rust structs for the Container signature format described
//! [here](https://github.com/containers/image/blob/a5061e5a5f00333ea3a92e7103effd11c6e2f51d/docs/containers-signature.5.md#json-data-format).

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

use crate::cosign::constants::COSIGN_SIGNATURE_TYPE;
use crate::errors::Result;
use crate::registry::OciReference;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SimpleSigning {
    pub critical: Critical,
    pub optional: Option<Optional>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Critical {
    #[serde(rename = "type")]
    pub type_name: String,
    pub image: Image,
    pub identity: Identity,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Image {
    pub docker_manifest_digest: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Identity {
    pub docker_reference: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Optional {
    pub creator: Option<String>,
    pub timestamp: Option<i64>,

    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SimpleSigning {
    /// Payload signed by cosign for the image identified by `subject`.
    ///
    /// The docker reference is the repository of the subject, without tag
    /// nor digest.
    pub fn new(subject: &OciReference, manifest_digest: &str) -> Self {
        SimpleSigning {
            critical: Critical {
                type_name: COSIGN_SIGNATURE_TYPE.to_string(),
                image: Image {
                    docker_manifest_digest: manifest_digest.to_string(),
                },
                identity: Identity {
                    docker_reference: format!("{}/{}", subject.registry(), subject.repository()),
                },
            },
            optional: None,
        }
    }

    /// Serialized payload, the bytes that are signed
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_for_subject() {
        let digest = "sha256:f3cfc9d0dbf931d3db4685ec659b7ac68e2a578219da4aae65427886e649b06b";
        let subject: OciReference = format!("registry.example/repo@{digest}").parse().unwrap();

        let ss = SimpleSigning::new(&subject, digest);
        let value: Value = serde_json::from_slice(&ss.to_bytes().unwrap()).unwrap();
        assert_eq!(
            value,
            json!({
                "critical": {
                    "type": "cosign container image signature",
                    "image": {"docker-manifest-digest": digest},
                    "identity": {"docker-reference": "registry.example/repo"}
                },
                "optional": null
            })
        );
    }
}
