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
use azauth_core::{Context, Error, ProvideToken, Result};
use log::debug;

use crate::certificate::decode_certificate;
use crate::environment::AzureEnvironment;
use crate::metadata::{Metadata, MetadataKey};
use crate::provide_token::BuildCredential;

/// ClientCertificateConfig holds a service principal and its certificate.
///
/// The certificate is given either inline or as a path on local disk. When
/// both are set, the file wins.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientCertificateConfig {
    /// Application (client) id.
    pub client_id: String,
    /// Directory (tenant) id.
    pub tenant_id: String,
    /// Path of a PKCS#12 bundle or PEM file.
    pub certificate_path: Option<String>,
    /// Inline certificate material.
    pub certificate: Option<Vec<u8>>,
    /// Password of a PKCS#12 bundle.
    pub certificate_password: Option<String>,
    /// Authority host tokens are redeemed at.
    pub authority_endpoint: String,
}

impl ClientCertificateConfig {
    /// Build the config from metadata.
    ///
    /// Client id and tenant id must be non-empty, and a certificate file or
    /// inline certificate must be present.
    pub fn from_metadata(metadata: &Metadata, environment: &AzureEnvironment) -> Result<Self> {
        let certificate_path = metadata.get(MetadataKey::CertificateFile);
        let certificate = metadata.get(MetadataKey::Certificate);
        if certificate_path.is_none() && certificate.is_none() {
            return Err(Error::missing_credential_fields(
                "missing client certificate",
            ));
        }

        let client_id = metadata.get_non_empty(MetadataKey::ClientId);
        let tenant_id = metadata.get_non_empty(MetadataKey::TenantId);
        let (Some(client_id), Some(tenant_id)) = (client_id, tenant_id) else {
            return Err(Error::missing_credential_fields(
                "parameters clientId and tenantId must be present to use a client certificate",
            ));
        };

        Ok(Self {
            client_id: client_id.to_string(),
            tenant_id: tenant_id.to_string(),
            certificate_path: certificate_path.map(str::to_string),
            certificate: certificate.map(|v| v.as_bytes().to_vec()),
            certificate_password: metadata
                .get(MetadataKey::CertificatePassword)
                .map(str::to_string),
            authority_endpoint: environment.active_directory_endpoint.to_string(),
        })
    }

    /// Load the raw certificate material, reading the file when a path is set.
    pub async fn load_certificate(&self, ctx: &Context) -> Result<Vec<u8>> {
        let data = match self.certificate_path.as_deref().filter(|p| !p.is_empty()) {
            Some(path) => {
                debug!("reading client certificate from {path}");
                ctx.file_read(path).await.map_err(|e| {
                    Error::certificate_file_unreadable(format!(
                        "failed to read the certificate file ({path})"
                    ))
                    .with_source(e)
                })?
            }
            None => self.certificate.clone().unwrap_or_default(),
        };

        if data.is_empty() {
            return Err(Error::certificate_missing("certificate is not given"));
        }
        Ok(data)
    }

    /// Decode the certificate and build a handle that signs with it.
    pub async fn obtain_handle(
        &self,
        ctx: &Context,
        builder: &dyn BuildCredential,
    ) -> Result<Arc<dyn ProvideToken>> {
        let data = self.load_certificate(ctx).await?;

        let password = self.certificate_password.as_deref().unwrap_or_default();
        let decoded = decode_certificate(&data, password).map_err(|err| {
            Error::certificate_decode_failed(format!("failed to decode client certificate: {err}"))
                .with_related([err])
        })?;

        builder.client_certificate(self, decoded)
    }
}

impl Debug for ClientCertificateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificateConfig")
            .field("client_id", &self.client_id)
            .field("tenant_id", &self.tenant_id)
            .field("certificate_path", &self.certificate_path)
            .field(
                "certificate",
                &self.certificate.as_ref().map(|v| format!("{} bytes", v.len())),
            )
            .field(
                "certificate_password",
                &Redact::from(&self.certificate_password),
            )
            .field("authority_endpoint", &self.authority_endpoint)
            .finish()
    }
}
