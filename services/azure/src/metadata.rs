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

use std::collections::HashMap;
use std::fmt::{self, Debug};

use azauth_core::utils::Redact;
use azauth_core::Context;
use serde::Deserialize;

use crate::constants::*;

/// Logical configuration keys understood by the credential resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetadataKey {
    /// Name of the Azure cloud environment.
    AzureEnvironment,
    /// Application (client) id of the service principal or managed identity.
    ClientId,
    /// Client secret of the service principal.
    ClientSecret,
    /// Directory (tenant) id.
    TenantId,
    /// Path to a certificate file on local disk.
    CertificateFile,
    /// Raw certificate content.
    Certificate,
    /// Password protecting a PKCS#12 bundle.
    CertificatePassword,
}

impl MetadataKey {
    /// Accepted spellings of this key, in lookup order.
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            MetadataKey::AzureEnvironment => &["azureEnvironment"],
            MetadataKey::ClientId => &["azureClientId", "spnClientId", "clientId"],
            MetadataKey::ClientSecret => &["azureClientSecret", "spnClientSecret", "clientSecret"],
            MetadataKey::TenantId => &["azureTenantId", "spnTenantId", "tenantId"],
            MetadataKey::CertificateFile => &["azureCertificateFile", "spnCertificateFile"],
            MetadataKey::Certificate => &["azureCertificate", "spnCertificate"],
            MetadataKey::CertificatePassword => {
                &["azureCertificatePassword", "spnCertificatePassword"]
            }
        }
    }
}

/// Metadata is the flat key/value configuration a resolution starts from.
///
/// Keys are matched case-insensitively. A logical [`MetadataKey`] resolves to
/// the value of the first alias present, even when that value is empty.
#[derive(Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct Metadata {
    properties: HashMap<String, String>,
}

impl Metadata {
    /// Create an empty metadata set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a raw property.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Load metadata from the conventional `AZURE_*` environment variables.
    ///
    /// - `AZURE_ENVIRONMENT` => `azureEnvironment`
    /// - `AZURE_CLIENT_ID` => `azureClientId`
    /// - `AZURE_CLIENT_SECRET` => `azureClientSecret`
    /// - `AZURE_TENANT_ID` => `azureTenantId`
    /// - `AZURE_CLIENT_CERTIFICATE_PATH` => `azureCertificateFile`
    /// - `AZURE_CLIENT_CERTIFICATE_PASSWORD` => `azureCertificatePassword`
    pub fn from_env(ctx: &Context) -> Self {
        let envs = ctx.env_vars();
        let mapping = [
            (AZURE_ENVIRONMENT, MetadataKey::AzureEnvironment),
            (AZURE_CLIENT_ID, MetadataKey::ClientId),
            (AZURE_CLIENT_SECRET, MetadataKey::ClientSecret),
            (AZURE_TENANT_ID, MetadataKey::TenantId),
            (AZURE_CLIENT_CERTIFICATE_PATH, MetadataKey::CertificateFile),
            (AZURE_CLIENT_CERTIFICATE_PASSWORD, MetadataKey::CertificatePassword),
        ];

        let mut metadata = Self::new();
        for (env, key) in mapping {
            if let Some(v) = envs.get(env) {
                metadata = metadata.with(key.aliases()[0], v.as_str());
            }
        }
        metadata
    }

    /// Resolve a logical key through its aliases.
    ///
    /// Returns `None` only when no alias is present at all.
    pub fn get(&self, key: MetadataKey) -> Option<&str> {
        key.aliases().iter().find_map(|alias| {
            self.properties
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(alias))
                .map(|(_, v)| v.as_str())
        })
    }

    /// Resolve a logical key, treating empty values as absent.
    pub fn get_non_empty(&self, key: MetadataKey) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }
}

impl From<HashMap<String, String>> for Metadata {
    fn from(properties: HashMap<String, String>) -> Self {
        Self { properties }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Metadata {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            properties: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let secrets: Vec<&str> = [
            MetadataKey::ClientSecret,
            MetadataKey::Certificate,
            MetadataKey::CertificatePassword,
        ]
        .iter()
        .flat_map(|k| k.aliases().iter().copied())
        .collect();

        let mut m = f.debug_map();
        for (k, v) in &self.properties {
            if secrets.iter().any(|s| s.eq_ignore_ascii_case(k)) {
                m.entry(k, &Redact::from(v));
            } else {
                m.entry(k, v);
            }
        }
        m.finish()
    }
}
