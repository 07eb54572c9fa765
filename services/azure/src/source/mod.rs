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

//! Credential source configs.
//!
//! Each config is validated when it is built from [`Metadata`](crate::Metadata)
//! and can then be asked for a token-issuing handle.

use std::fmt;
use std::sync::Arc;

use azauth_core::{Context, ProvideToken, Result};

use crate::provide_token::BuildCredential;

mod client_certificate;
pub use client_certificate::ClientCertificateConfig;

mod client_secret;
pub use client_secret::ClientSecretConfig;

mod managed_identity;
pub use managed_identity::ManagedIdentityConfig;

/// The kinds of credential sources, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CredentialSource {
    /// Service principal with a client secret.
    ClientSecret,
    /// Service principal with a client certificate.
    ClientCertificate,
    /// Identity assigned to the hosting platform.
    ManagedIdentity,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::ClientSecret => write!(f, "client secret"),
            CredentialSource::ClientCertificate => write!(f, "client certificate"),
            CredentialSource::ManagedIdentity => write!(f, "managed identity"),
        }
    }
}

/// A validated source config.
#[derive(Debug, Clone)]
pub enum SourceConfig {
    /// See [`ClientSecretConfig`].
    ClientSecret(ClientSecretConfig),
    /// See [`ClientCertificateConfig`].
    ClientCertificate(ClientCertificateConfig),
    /// See [`ManagedIdentityConfig`].
    ManagedIdentity(ManagedIdentityConfig),
}

impl SourceConfig {
    /// The kind of source this config belongs to.
    pub fn source(&self) -> CredentialSource {
        match self {
            SourceConfig::ClientSecret(_) => CredentialSource::ClientSecret,
            SourceConfig::ClientCertificate(_) => CredentialSource::ClientCertificate,
            SourceConfig::ManagedIdentity(_) => CredentialSource::ManagedIdentity,
        }
    }

    /// Obtain a token-issuing handle for this config.
    ///
    /// Only the certificate source performs I/O here, to read its certificate file.
    pub async fn obtain_handle(
        &self,
        ctx: &Context,
        builder: &dyn BuildCredential,
    ) -> Result<Arc<dyn ProvideToken>> {
        match self {
            SourceConfig::ClientSecret(config) => config.obtain_handle(builder),
            SourceConfig::ClientCertificate(config) => config.obtain_handle(ctx, builder).await,
            SourceConfig::ManagedIdentity(config) => config.obtain_handle(ctx, builder),
        }
    }
}

impl From<ClientSecretConfig> for SourceConfig {
    fn from(config: ClientSecretConfig) -> Self {
        SourceConfig::ClientSecret(config)
    }
}

impl From<ClientCertificateConfig> for SourceConfig {
    fn from(config: ClientCertificateConfig) -> Self {
        SourceConfig::ClientCertificate(config)
    }
}

impl From<ManagedIdentityConfig> for SourceConfig {
    fn from(config: ManagedIdentityConfig) -> Self {
        SourceConfig::ManagedIdentity(config)
    }
}
