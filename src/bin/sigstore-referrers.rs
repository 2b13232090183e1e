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

//! Attach cosign signatures to images using the OCI 1.1 referrers API.

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use sigstore_referrers::cosign::{
    artifact_type, ClientBuilder, CosignCapabilities, SignatureImage, SignatureLayer,
    UPLOAD_LOG_TARGET,
};
use sigstore_referrers::registry::{Auth, ClientConfig, ClientProtocol, OciReference};
use std::fs;
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{filter, fmt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "sigstore-referrers")]
#[command(about = "Attach cosign signatures to OCI images as referrers", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose mode
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Whether the registry uses HTTP
    #[arg(long, global = true)]
    http: bool,

    /// Registry username, the docker keychain is used when not provided
    #[arg(long, global = true, requires = "password")]
    username: Option<String>,

    /// Registry password
    #[arg(long, global = true, requires = "username")]
    password: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the artifact type of an attachment kind (sig, att, sbom,...)
    ArtifactType {
        /// Attachment kind
        kind: String,
    },

    /// List the referrers of an image
    List {
        /// Image to inspect, must be referenced by digest
        image: OciReference,

        /// Attachment kind of the referrers to look for
        #[arg(long = "type", default_value = "sig")]
        kind: String,
    },

    /// Attach a signature to an image
    Attach {
        /// Image that has been signed, must be referenced by digest
        image: OciReference,

        /// Base64 encoded signature of the payload
        #[arg(long)]
        signature: String,

        /// Signed payload; the standard cosign payload of the image is used
        /// when not provided
        #[arg(long)]
        payload: Option<PathBuf>,

        /// PEM encoded signing certificate
        #[arg(long)]
        certificate: Option<PathBuf>,

        /// PEM encoded certificate chain
        #[arg(long)]
        chain: Option<PathBuf>,

        /// Rekor bundle
        #[arg(long)]
        bundle: Option<PathBuf>,
    },
}

fn read_optional(path: &Option<PathBuf>) -> anyhow::Result<Option<String>> {
    path.as_ref()
        .map(|p| fs::read_to_string(p).with_context(|| format!("Cannot read {}", p.display())))
        .transpose()
}

async fn run_app(cli: Cli) -> anyhow::Result<()> {
    let mut oci_client_config = ClientConfig::default();
    if cli.http {
        oci_client_config.protocol = ClientProtocol::Http;
    }
    let mut builder = ClientBuilder::default().with_oci_client_config(oci_client_config);
    if let (Some(username), Some(password)) = (cli.username, cli.password) {
        builder = builder.with_auth(Auth::Basic(username, password));
    }

    match cli.command {
        Commands::ArtifactType { kind } => {
            println!("{}", artifact_type(&kind));
        }
        Commands::List { image, kind } => {
            let mut client = builder.build();
            let index = client.list_referrers(&image, &artifact_type(&kind)).await?;
            println!("{}", serde_json::to_string_pretty(&index)?);
        }
        Commands::Attach {
            image,
            signature,
            payload,
            certificate,
            chain,
            bundle,
        } => {
            let digest = image
                .digest()
                .ok_or_else(|| anyhow!("{image} is not referenced by digest"))?
                .to_string();

            let mut layer = match &payload {
                Some(path) => {
                    let payload = fs::read(path)
                        .with_context(|| format!("Cannot read {}", path.display()))?;
                    SignatureLayer::from_payload(&payload, signature)?
                }
                None => SignatureLayer::new(&image, &digest, signature),
            };
            layer.certificate = read_optional(&certificate)?;
            layer.chain = read_optional(&chain)?;
            layer.bundle = read_optional(&bundle)?;
            debug!(layer = %layer, "signature layer");

            let signature_image = SignatureImage::new(vec![layer])?;
            let mut client = builder.build();
            let response = client
                .push_signature_referrer(&image, &signature_image)
                .await?;
            println!("{}", response.target);
        }
    }
    Ok(())
}

#[tokio::main]
pub async fn main() {
    let cli = Cli::parse();

    // setup logging, the upload line is printed bare
    let level_filter = if cli.verbose { "debug" } else { "info" };
    let filter_layer = EnvFilter::new(format!("{level_filter},{UPLOAD_LOG_TARGET}=off"));
    let upload_layer = fmt::layer()
        .without_time()
        .with_level(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_filter(filter::filter_fn(|metadata| {
            metadata.target() == UPLOAD_LOG_TARGET
        }));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter_layer))
        .with(upload_layer)
        .init();

    if let Err(err) = run_app(cli).await {
        eprintln!("Error: {:?}", err);
        std::process::exit(1);
    }
}
