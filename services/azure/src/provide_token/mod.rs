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

//! Token-issuing primitives.
//!
//! Each credential source produces one of these. They never touch the
//! network while being constructed; requests are only sent from
//! [`ProvideToken::provide_token`].

use std::fmt::Debug;
use std::sync::Arc;

use azauth_core::time::{from_unix_seconds, now, DateTime};
use azauth_core::{AccessToken, Context, Error, ProvideToken, Result};
use bytes::Bytes;
use log::debug;
use serde::Deserialize;

use crate::certificate::DecodedCertificate;
use crate::source::{ClientCertificateConfig, ClientSecretConfig, ManagedIdentityConfig};

mod chain;
pub use chain::TokenCredentialChain;

mod client_certificate;
pub use client_certificate::ClientCertificateCredential;

mod client_secret;
pub use client_secret::ClientSecretCredential;

mod managed_identity;
pub use managed_identity::ManagedIdentityCredential;

/// BuildCredential turns validated source configs into token-issuing handles.
///
/// [`EnvironmentSettings`](crate::EnvironmentSettings) only ever talks to the
/// identity provider through this trait, so an alternative implementation can
/// be plugged in to change how tokens are obtained.
pub trait BuildCredential: Debug + Send + Sync + 'static {
    /// Build a handle that redeems a client secret.
    fn client_secret(&self, config: &ClientSecretConfig) -> Result<Arc<dyn ProvideToken>>;

    /// Build a handle that signs client assertions with a certificate.
    fn client_certificate(
        &self,
        config: &ClientCertificateConfig,
        certificate: DecodedCertificate,
    ) -> Result<Arc<dyn ProvideToken>>;

    /// Build a handle backed by the platform managed identity.
    fn managed_identity(
        &self,
        ctx: &Context,
        config: &ManagedIdentityConfig,
    ) -> Result<Arc<dyn ProvideToken>>;
}

/// DefaultCredentialBuilder builds the credentials shipped with this crate.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultCredentialBuilder;

impl BuildCredential for DefaultCredentialBuilder {
    fn client_secret(&self, config: &ClientSecretConfig) -> Result<Arc<dyn ProvideToken>> {
        let cred = ClientSecretCredential::new(
            &config.authority_endpoint,
            &config.tenant_id,
            &config.client_id,
            &config.client_secret,
        )?;
        Ok(Arc::new(cred))
    }

    fn client_certificate(
        &self,
        config: &ClientCertificateConfig,
        certificate: DecodedCertificate,
    ) -> Result<Arc<dyn ProvideToken>> {
        let cred = ClientCertificateCredential::new(
            &config.authority_endpoint,
            &config.tenant_id,
            &config.client_id,
            certificate,
        )?;
        Ok(Arc::new(cred))
    }

    fn managed_identity(
        &self,
        ctx: &Context,
        config: &ManagedIdentityConfig,
    ) -> Result<Arc<dyn ProvideToken>> {
        let cred = ManagedIdentityCredential::from_context(ctx, config.client_id.as_deref())?;
        Ok(Arc::new(cred))
    }
}

/// Build the token endpoint of a tenant, checking the authority and tenant id.
pub(crate) fn token_endpoint(authority: &str, tenant_id: &str) -> Result<String> {
    let uri: http::Uri = authority.parse().map_err(|e| {
        Error::credential_construction_failed(format!("invalid authority host {authority:?}"))
            .with_source(e)
    })?;
    match uri.scheme_str() {
        Some("https") | Some("http") if uri.host().is_some() => {}
        _ => {
            return Err(Error::credential_construction_failed(format!(
                "authority host {authority:?} must be an absolute http(s) URI"
            )))
        }
    }

    let valid_tenant = !tenant_id.is_empty()
        && tenant_id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.');
    if !valid_tenant {
        return Err(Error::credential_construction_failed(format!(
            "invalid tenant id {tenant_id:?}: only alphanumeric characters, '-' and '.' are allowed"
        )));
    }

    Ok(format!(
        "{}/{tenant_id}/oauth2/v2.0/token",
        authority.trim_end_matches('/')
    ))
}

/// Join scopes for the `scope` form field of a token request.
pub(crate) fn join_scopes(scopes: &[&str]) -> Result<String> {
    if scopes.is_empty() {
        return Err(Error::request_invalid(
            "at least one scope is required to request a token",
        ));
    }
    Ok(scopes.join(" "))
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<serde_json::Value>,
    #[serde(default)]
    expires_on: Option<serde_json::Value>,
}

/// Identity endpoints disagree on whether numbers are sent as JSON numbers or strings.
fn seconds(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl TokenResponse {
    fn expires_on(&self) -> Result<Option<DateTime>> {
        if let Some(secs) = self.expires_on.as_ref().and_then(seconds) {
            return from_unix_seconds(secs).map(Some);
        }
        Ok(self
            .expires_in
            .as_ref()
            .and_then(seconds)
            .map(|secs| now() + chrono::TimeDelta::seconds(secs)))
    }
}

/// Send a token request and parse the response into an [`AccessToken`].
pub(crate) async fn send_token_request(
    ctx: &Context,
    req: http::Request<Bytes>,
) -> Result<AccessToken> {
    let uri = req.uri().clone();
    debug!("requesting token from {}", uri.path());

    let resp = ctx.http_send(req).await?;
    let status = resp.status();
    if !status.is_success() {
        let body = String::from_utf8_lossy(resp.body());
        return Err(Error::credential_denied(format!(
            "token request to {uri} failed with status {status}: {body}"
        )));
    }

    let token: TokenResponse = serde_json::from_slice(resp.body()).map_err(|e| {
        Error::unexpected(format!("failed to parse token response from {uri}")).with_source(e)
    })?;
    let expires_on = token.expires_on()?;

    Ok(AccessToken::new(token.access_token, expires_on))
}
