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

use std::fmt::{self, Debug};
use std::sync::Arc;

use azauth_core::{Context, Error, ErrorKind, Result};
use log::{debug, warn};

use crate::environment::{AzureEnvironment, DEFAULT_AZURE_ENVIRONMENT};
use crate::metadata::{Metadata, MetadataKey};
use crate::provide_token::{BuildCredential, DefaultCredentialBuilder, TokenCredentialChain};
use crate::source::{
    ClientCertificateConfig, ClientSecretConfig, CredentialSource, ManagedIdentityConfig,
    SourceConfig,
};

/// EnvironmentSettings resolves the cloud environment and token credentials
/// from component metadata.
///
/// Nothing is cached: every call reads the metadata again and builds fresh
/// configs and credentials.
#[derive(Clone)]
pub struct EnvironmentSettings {
    metadata: Metadata,
    builder: Arc<dyn BuildCredential>,
}

impl EnvironmentSettings {
    /// Create settings over the given metadata using [`DefaultCredentialBuilder`].
    pub fn new(metadata: Metadata) -> Self {
        Self {
            metadata,
            builder: Arc::new(DefaultCredentialBuilder),
        }
    }

    /// Replace the builder used to turn source configs into credentials.
    pub fn with_credential_builder(mut self, builder: impl BuildCredential) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// The metadata these settings read from.
    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Resolve the configured cloud environment, falling back to the public cloud.
    pub fn environment(&self) -> Result<&'static AzureEnvironment> {
        let name = self
            .metadata
            .get_non_empty(MetadataKey::AzureEnvironment)
            .unwrap_or(DEFAULT_AZURE_ENVIRONMENT);
        AzureEnvironment::from_name(name)
    }

    /// Build the client secret config.
    pub fn client_secret_config(&self) -> Result<ClientSecretConfig> {
        ClientSecretConfig::from_metadata(&self.metadata, self.environment()?)
    }

    /// Build the client certificate config.
    pub fn client_certificate_config(&self) -> Result<ClientCertificateConfig> {
        ClientCertificateConfig::from_metadata(&self.metadata, self.environment()?)
    }

    /// Build the managed identity config.
    pub fn managed_identity_config(&self) -> ManagedIdentityConfig {
        ManagedIdentityConfig::from_metadata(&self.metadata)
    }

    /// Build every source config in priority order.
    pub fn source_configs(&self) -> Vec<(CredentialSource, Result<SourceConfig>)> {
        vec![
            (
                CredentialSource::ClientSecret,
                self.client_secret_config().map(SourceConfig::from),
            ),
            (
                CredentialSource::ClientCertificate,
                self.client_certificate_config().map(SourceConfig::from),
            ),
            (
                CredentialSource::ManagedIdentity,
                Ok(self.managed_identity_config().into()),
            ),
        ]
    }

    /// Build a chain of every credential that could be constructed, tried in
    /// the order client secret, client certificate, managed identity.
    ///
    /// No token is requested here. When no credential can be built, the
    /// returned `NoCredentialSource` error lists the reason of each source.
    pub async fn token_credential(&self, ctx: &Context) -> Result<TokenCredentialChain> {
        // An unknown environment would fail every source the same way.
        self.environment()?;

        let mut credentials = Vec::with_capacity(3);
        let mut errors = Vec::new();

        for (source, config) in self.source_configs() {
            let handle = match config {
                Ok(config) => config.obtain_handle(ctx, self.builder.as_ref()).await,
                Err(err) => Err(err),
            };

            match handle {
                Ok(credential) => {
                    debug!("{source} credential is available");
                    credentials.push((source, credential));
                }
                Err(err) if err.kind() == ErrorKind::MissingCredentialFields => {
                    debug!("skipping {source} credential: {err}");
                    errors.push((source, err));
                }
                Err(err) => {
                    warn!("failed to build {source} credential: {err}");
                    errors.push((source, err));
                }
            }
        }

        if credentials.is_empty() {
            let reasons = errors
                .iter()
                .map(|(source, err)| format!("{source}: {err}"))
                .collect::<Vec<_>>()
                .join("; ");
            return Err(Error::no_credential_source(format!(
                "no suitable token provider for Azure AD; errors: {reasons}"
            ))
            .with_related(errors.into_iter().map(|(_, err)| err)));
        }

        TokenCredentialChain::new(credentials)
    }
}

impl Debug for EnvironmentSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvironmentSettings")
            .field("metadata", &self.metadata)
            .field("builder", &self.builder)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{PUBLIC_CLOUD, US_GOVERNMENT_CLOUD};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_environment_default() {
        let settings = EnvironmentSettings::new(Metadata::new());
        assert_eq!(settings.environment().unwrap(), &PUBLIC_CLOUD);

        let settings = EnvironmentSettings::new(Metadata::new().with("azureEnvironment", ""));
        assert_eq!(settings.environment().unwrap(), &PUBLIC_CLOUD);
    }

    #[test]
    fn test_environment_by_name() {
        let md = Metadata::new().with("AzureEnvironment", "AzureUSGovernmentCloud");
        let settings = EnvironmentSettings::new(md);
        assert_eq!(settings.environment().unwrap(), &US_GOVERNMENT_CLOUD);
    }

    #[tokio::test]
    async fn test_unknown_environment_is_fatal() {
        let md = Metadata::new()
            .with("azureEnvironment", "AzureMoonCloud")
            .with("azureClientId", "client");
        let settings = EnvironmentSettings::new(md);

        let err = settings.environment().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEnvironment);
        let err = settings
            .token_credential(&Context::new())
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEnvironment);
    }

    #[test]
    fn test_source_configs_order() {
        let settings = EnvironmentSettings::new(Metadata::new());
        let sources: Vec<_> = settings
            .source_configs()
            .into_iter()
            .map(|(source, config)| (source, config.is_ok()))
            .collect();

        assert_eq!(
            sources,
            vec![
                (CredentialSource::ClientSecret, false),
                (CredentialSource::ClientCertificate, false),
                (CredentialSource::ManagedIdentity, true),
            ]
        );
    }

    #[tokio::test]
    async fn test_default_builder_falls_back_to_managed_identity() {
        let settings = EnvironmentSettings::new(Metadata::new());
        let chain = settings.token_credential(&Context::new()).await.unwrap();
        assert_eq!(chain.sources(), vec![CredentialSource::ManagedIdentity]);
    }

    #[test]
    fn test_debug_is_redacted() {
        let md = Metadata::new().with("azureClientSecret", "very-secret-value");
        let out = format!("{:?}", EnvironmentSettings::new(md));
        assert!(!out.contains("very-secret-value"));
        assert!(out.contains("DefaultCredentialBuilder"));
    }
}
