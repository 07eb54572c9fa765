// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

//! Azure AD credential resolution.
//!
//! [`EnvironmentSettings`] reads flat component [`Metadata`] and builds a
//! [`TokenCredentialChain`] out of every credential source it can construct,
//! in this order:
//!
//! 1. client secret (`azureClientId`, `azureClientSecret`, `azureTenantId`)
//! 2. client certificate (`azureCertificate` or `azureCertificateFile`, as a
//!    PKCS#12 bundle or PEM blocks, RSA keys only)
//! 3. managed identity (optionally selecting `azureClientId`)
//!
//! ## Example
//!
//! ```no_run
//! use azauth_azure::{EnvironmentSettings, Metadata};
//! use azauth_core::{Context, OsEnv, ProvideToken, Result};
//! use azauth_file_read_tokio::TokioFileRead;
//! use azauth_http_send_reqwest::ReqwestHttpSend;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let ctx = Context::new()
//!         .with_file_read(TokioFileRead)
//!         .with_http_send(ReqwestHttpSend::default())
//!         .with_env(OsEnv);
//!
//!     let metadata = Metadata::new()
//!         .with("azureTenantId", "my-tenant")
//!         .with("azureClientId", "my-client")
//!         .with("azureCertificateFile", "/etc/azure/client.pfx");
//!
//!     let chain = EnvironmentSettings::new(metadata)
//!         .token_credential(&ctx)
//!         .await?;
//!     let token = chain
//!         .provide_token(&ctx, &["https://vault.azure.net/.default"])
//!         .await?;
//!     println!("token expires on {:?}", token.expires_on);
//!
//!     Ok(())
//! }
//! ```

mod constants;

pub mod certificate;
pub use certificate::{decode_certificate, Certificate, DecodedCertificate};

mod environment;
pub use environment::*;

mod metadata;
pub use metadata::{Metadata, MetadataKey};

mod source;
pub use source::*;

mod provide_token;
pub use provide_token::*;

mod settings;
pub use settings::EnvironmentSettings;
