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

use tracing::debug;

use super::client::Client;
use crate::registry::{Auth, AuthSource, ClientConfig, RegistryOptions};

/// A builder that generates Client objects.
///
/// ## Authentication
///
/// By default the credentials of each registry are looked up inside of the
/// docker configuration file, falling back to anonymous access. Explicit
/// credentials can be provided via [`ClientBuilder::with_auth`].
#[derive(Default)]
pub struct ClientBuilder {
    options: RegistryOptions,
}

impl ClientBuilder {
    /// Optional - the configuration to be used by the OCI client.
    ///
    /// This can be used when dealing with registries that are not using
    /// TLS termination, or are using self-signed certificates.
    pub fn with_oci_client_config(mut self, config: ClientConfig) -> Self {
        self.options.client_config = config;
        self
    }

    /// Optional - always use the given credentials instead of the docker
    /// keychain.
    pub fn with_auth(mut self, auth: Auth) -> Self {
        self.options.auth = AuthSource::Explicit(auth);
        self
    }

    /// Optional - replace both the transport configuration and the source of
    /// credentials.
    pub fn with_registry_options(mut self, options: RegistryOptions) -> Self {
        self.options = options;
        self
    }

    pub fn build(self) -> Client {
        debug!(
            keychain = matches!(self.options.auth, AuthSource::Keychain),
            "building cosign client"
        );
        let oci_client = oci_client::client::Client::new(self.options.client_config.into());

        Client {
            registry_client: Box::new(crate::registry::OciClient {
                registry_client: oci_client,
            }),
            auth: self.options.auth,
        }
    }
}
