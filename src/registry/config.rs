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

//! Set of structs and enums used to define how to interact with OCI registries

use docker_credential::{CredentialRetrievalError, DockerCredential};
use tracing::{debug, warn};

use super::oci_reference::OciReference;

/// A method for authenticating to a registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Auth {
    /// Access the registry anonymously
    Anonymous,
    /// Access the registry using HTTP Basic authentication
    Basic(String, String),
    /// Access the registry using a bearer token
    Bearer(String),
}

impl From<&Auth> for oci_client::secrets::RegistryAuth {
    fn from(auth: &Auth) -> Self {
        match auth {
            Auth::Anonymous => oci_client::secrets::RegistryAuth::Anonymous,
            Auth::Basic(username, pass) => {
                oci_client::secrets::RegistryAuth::Basic(username.clone(), pass.clone())
            }
            Auth::Bearer(token) => oci_client::secrets::RegistryAuth::Bearer(token.clone()),
        }
    }
}

/// Where the credentials used to talk with a registry come from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthSource {
    /// Look up the credentials of the registry inside of the docker
    /// configuration file (and its credential helpers). Registries without
    /// credentials are accessed anonymously.
    #[default]
    Keychain,
    /// Always use the given credentials
    Explicit(Auth),
}

impl AuthSource {
    /// Find the credentials to be used when interacting with the registry
    /// hosting `reference`.
    ///
    /// Keychain lookups never fail: any problem is logged and anonymous
    /// access is used instead. Identity tokens are not supported.
    pub fn resolve(&self, reference: &OciReference) -> Auth {
        match self {
            AuthSource::Explicit(auth) => auth.clone(),
            AuthSource::Keychain => keychain_auth(reference),
        }
    }
}

fn keychain_auth(reference: &OciReference) -> Auth {
    let server = reference
        .resolve_registry()
        .strip_suffix('/')
        .unwrap_or_else(|| reference.resolve_registry());
    match docker_credential::get_credential(server) {
        Err(CredentialRetrievalError::ConfigNotFound) => Auth::Anonymous,
        Err(CredentialRetrievalError::NoCredentialConfigured) => Auth::Anonymous,
        Err(e) => {
            warn!(server, error = %e, "Error handling docker configuration file");
            Auth::Anonymous
        }
        Ok(DockerCredential::UsernamePassword(username, password)) => {
            debug!(server, "Found docker credentials");
            Auth::Basic(username, password)
        }
        Ok(DockerCredential::IdentityToken(_)) => {
            warn!(
                server,
                "Cannot use contents of docker config, identity token not supported. Using anonymous auth"
            );
            Auth::Anonymous
        }
    }
}

/// The protocol that the client should use to connect
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ClientProtocol {
    #[allow(missing_docs)]
    Http,
    #[allow(missing_docs)]
    #[default]
    Https,
    #[allow(missing_docs)]
    HttpsExcept(Vec<String>),
}

impl From<ClientProtocol> for oci_client::client::ClientProtocol {
    fn from(cp: ClientProtocol) -> Self {
        match cp {
            ClientProtocol::Http => oci_client::client::ClientProtocol::Http,
            ClientProtocol::Https => oci_client::client::ClientProtocol::Https,
            ClientProtocol::HttpsExcept(exceptions) => {
                oci_client::client::ClientProtocol::HttpsExcept(exceptions)
            }
        }
    }
}

/// The encoding of the certificate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CertificateEncoding {
    #[allow(missing_docs)]
    Der,
    #[allow(missing_docs)]
    Pem,
}

impl From<CertificateEncoding> for oci_client::client::CertificateEncoding {
    fn from(ce: CertificateEncoding) -> Self {
        match ce {
            CertificateEncoding::Der => oci_client::client::CertificateEncoding::Der,
            CertificateEncoding::Pem => oci_client::client::CertificateEncoding::Pem,
        }
    }
}

/// A x509 certificate
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Certificate {
    /// Which encoding is used by the certificate
    pub encoding: CertificateEncoding,

    /// Actual certificate
    pub data: Vec<u8>,
}

impl From<&Certificate> for oci_client::client::Certificate {
    fn from(cert: &Certificate) -> Self {
        oci_client::client::Certificate {
            encoding: cert.encoding.clone().into(),
            data: cert.data.clone(),
        }
    }
}

/// A client configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Which protocol the client should use
    pub protocol: ClientProtocol,

    /// Accept invalid hostname. Defaults to false
    #[cfg(feature = "native-tls")]
    pub accept_invalid_hostnames: bool,

    /// Accept invalid certificates. Defaults to false
    pub accept_invalid_certificates: bool,

    /// A list of extra root certificate to trust. This can be used to connect
    /// to servers using self-signed certificates
    pub extra_root_certificates: Vec<Certificate>,

    /// Set the `HTTPS PROXY` used by the client.
    ///
    /// This defaults to `None`.
    pub https_proxy: Option<String>,

    /// Set the `HTTP PROXY` used by the client.
    ///
    /// This defaults to `None`.
    pub http_proxy: Option<String>,

    /// Set the `NO PROXY` used by the client.
    ///
    /// This defaults to `None`.
    pub no_proxy: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            protocol: ClientProtocol::Https,
            #[cfg(feature = "native-tls")]
            accept_invalid_hostnames: false,
            accept_invalid_certificates: false,
            extra_root_certificates: Vec::new(),
            https_proxy: None,
            http_proxy: None,
            no_proxy: None,
        }
    }
}

impl From<ClientConfig> for oci_client::client::ClientConfig {
    fn from(config: ClientConfig) -> Self {
        oci_client::client::ClientConfig {
            protocol: config.protocol.into(),
            accept_invalid_certificates: config.accept_invalid_certificates,
            #[cfg(feature = "native-tls")]
            accept_invalid_hostnames: config.accept_invalid_hostnames,
            extra_root_certificates: config
                .extra_root_certificates
                .iter()
                .map(|c| c.into())
                .collect(),
            https_proxy: config.https_proxy,
            http_proxy: config.http_proxy,
            no_proxy: config.no_proxy,
            ..Default::default()
        }
    }
}

/// Everything needed to reach a registry: the transport configuration and
/// the source of credentials.
///
/// The default value uses HTTPS and the docker keychain.
#[derive(Debug, Clone, Default)]
pub struct RegistryOptions {
    /// Where credentials come from
    pub auth: AuthSource,

    /// Transport configuration of the OCI client
    pub client_config: ClientConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options_use_the_keychain_over_https() {
        let options = RegistryOptions::default();
        assert_eq!(options.auth, AuthSource::Keychain);
        assert_eq!(options.client_config.protocol, ClientProtocol::Https);
    }

    #[test]
    fn explicit_auth_is_used_as_is() {
        let reference: OciReference = "registry.example/repo:latest".parse().unwrap();
        let auth = Auth::Basic("alice".to_string(), "secret".to_string());
        let source = AuthSource::Explicit(auth.clone());
        assert_eq!(source.resolve(&reference), auth);
    }

    #[test]
    fn auth_conversion() {
        let auth = Auth::Bearer("token".to_string());
        let oci_auth: oci_client::secrets::RegistryAuth = (&auth).into();
        assert!(matches!(
            oci_auth,
            oci_client::secrets::RegistryAuth::Bearer(t) if t == "token"
        ));
    }
}
