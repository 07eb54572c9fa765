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

use azauth_core::utils::Redact;
use azauth_core::{Error, ProvideToken, Result};

use crate::environment::AzureEnvironment;
use crate::metadata::{Metadata, MetadataKey};
use crate::provide_token::BuildCredential;

/// ClientSecretConfig holds a service principal and its secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientSecretConfig {
    /// Application (client) id.
    pub client_id: String,
    /// Directory (tenant) id.
    pub tenant_id: String,
    /// The client secret.
    pub client_secret: String,
    /// Authority host tokens are redeemed at.
    pub authority_endpoint: String,
}

impl ClientSecretConfig {
    /// Build the config from metadata.
    ///
    /// Client id, client secret and tenant id must all be present and non-empty.
    pub fn from_metadata(metadata: &Metadata, environment: &AzureEnvironment) -> Result<Self> {
        let client_id = metadata.get_non_empty(MetadataKey::ClientId);
        let client_secret = metadata.get_non_empty(MetadataKey::ClientSecret);
        let tenant_id = metadata.get_non_empty(MetadataKey::TenantId);

        match (client_id, client_secret, tenant_id) {
            (Some(client_id), Some(client_secret), Some(tenant_id)) => Ok(Self {
                client_id: client_id.to_string(),
                tenant_id: tenant_id.to_string(),
                client_secret: client_secret.to_string(),
                authority_endpoint: environment.active_directory_endpoint.to_string(),
            }),
            _ => Err(Error::missing_credential_fields(
                "parameters clientId, clientSecret, and tenantId must all be present",
            )),
        }
    }

    /// Build a handle that redeems the secret.
    pub fn obtain_handle(&self, builder: &dyn BuildCredential) -> Result<Arc<dyn ProvideToken>> {
        builder.client_secret(self)
    }
}

impl Debug for ClientSecretConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretConfig")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("client_secret", &Redact::from(&self.client_secret))
            .field("authority_endpoint", &self.authority_endpoint)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::{CHINA_CLOUD, PUBLIC_CLOUD};
    use azauth_core::ErrorKind;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn full() -> Metadata {
        Metadata::new()
            .with("azureClientId", "client")
            .with("azureClientSecret", "secret-value-1234")
            .with("azureTenantId", "tenant")
    }

    #[test]
    fn test_from_metadata() {
        let config = ClientSecretConfig::from_metadata(&full(), &CHINA_CLOUD).unwrap();
        assert_eq!(
            config,
            ClientSecretConfig {
                client_id: "client".to_string(),
                tenant_id: "tenant".to_string(),
                client_secret: "secret-value-1234".to_string(),
                authority_endpoint: "https://login.chinacloudapi.cn/".to_string(),
            }
        );
    }

    #[test]
    fn test_spn_aliases() {
        let md = Metadata::new()
            .with("spnClientId", "client")
            .with("spnClientSecret", "secret")
            .with("spnTenantId", "tenant");
        assert!(ClientSecretConfig::from_metadata(&md, &PUBLIC_CLOUD).is_ok());
    }

    #[test_case("azureClientId"; "no client id")]
    #[test_case("azureClientSecret"; "no client secret")]
    #[test_case("azureTenantId"; "no tenant id")]
    fn test_missing_field(missing: &str) {
        let md: Metadata = [
            ("azureClientId", "client"),
            ("azureClientSecret", "secret"),
            ("azureTenantId", "tenant"),
        ]
        .into_iter()
        .filter(|(k, _)| *k != missing)
        .collect();

        let err = ClientSecretConfig::from_metadata(&md, &PUBLIC_CLOUD).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredentialFields);
    }

    #[test]
    fn test_empty_field_counts_as_missing() {
        let md = full().with("azureClientSecret", "");
        let err = ClientSecretConfig::from_metadata(&md, &PUBLIC_CLOUD).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingCredentialFields);
    }

    #[test]
    fn test_debug_is_redacted() {
        let config = ClientSecretConfig::from_metadata(&full(), &PUBLIC_CLOUD).unwrap();
        assert!(!format!("{config:?}").contains("secret-value-1234"));
    }
}
