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

use async_trait::async_trait;
use azauth_core::utils::Redact;
use azauth_core::{AccessToken, Context, Error, ProvideToken, Result};
use bytes::Bytes;
use log::debug;

use super::send_token_request;
use crate::constants::*;

#[derive(Clone, PartialEq, Eq)]
enum Endpoint {
    /// Azure Instance Metadata Service on virtual machines.
    Imds { url: String },
    /// App Service and Functions identity endpoint.
    AppService { url: String, secret: String },
}

/// ManagedIdentityCredential obtains tokens for the identity assigned to the
/// host it runs on.
///
/// When `IDENTITY_ENDPOINT` and `IDENTITY_HEADER` are both set the App Service
/// endpoint is used, otherwise the instance metadata service.
#[derive(Clone)]
pub struct ManagedIdentityCredential {
    endpoint: Endpoint,
    client_id: Option<String>,
}

impl ManagedIdentityCredential {
    /// Locate the managed identity endpoint through the context environment.
    ///
    /// An empty or missing `client_id` selects the system assigned identity.
    pub fn from_context(ctx: &Context, client_id: Option<&str>) -> Result<Self> {
        let non_empty = |key: &str| ctx.env_var(key).filter(|v| !v.is_empty());

        let endpoint = match (non_empty(IDENTITY_ENDPOINT), non_empty(IDENTITY_HEADER)) {
            (Some(url), Some(secret)) => Endpoint::AppService {
                url: validate_endpoint(url)?,
                secret,
            },
            _ => {
                let host = non_empty(AZURE_POD_IDENTITY_AUTHORITY_HOST)
                    .unwrap_or_else(|| IMDS_HOST.to_string());
                let url = format!("{}{IMDS_TOKEN_PATH}", host.trim_end_matches('/'));
                Endpoint::Imds {
                    url: validate_endpoint(url)?,
                }
            }
        };

        Ok(Self {
            endpoint,
            client_id: client_id.filter(|v| !v.is_empty()).map(str::to_string),
        })
    }

    /// The endpoint tokens are requested from.
    pub fn endpoint(&self) -> &str {
        match &self.endpoint {
            Endpoint::Imds { url } => url,
            Endpoint::AppService { url, .. } => url,
        }
    }

    /// The user assigned identity, if one was selected.
    pub fn client_id(&self) -> Option<&str> {
        self.client_id.as_deref()
    }
}

fn validate_endpoint(url: String) -> Result<String> {
    let uri: http::Uri = url.parse().map_err(|e| {
        Error::credential_construction_failed(format!(
            "invalid managed identity endpoint {url:?}"
        ))
        .with_source(e)
    })?;
    if uri.scheme().is_none() || uri.host().is_none() {
        return Err(Error::credential_construction_failed(format!(
            "managed identity endpoint {url:?} must be an absolute URI"
        )));
    }
    Ok(url)
}

/// Managed identity endpoints take a resource instead of scopes.
fn scope_to_resource(scopes: &[&str]) -> Result<String> {
    match scopes {
        [scope] => Ok(scope
            .strip_suffix("/.default")
            .unwrap_or(scope)
            .to_string()),
        _ => Err(Error::request_invalid(format!(
            "managed identity tokens take exactly one scope, got {}",
            scopes.len()
        ))),
    }
}

impl Debug for ManagedIdentityCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut d = f.debug_struct("ManagedIdentityCredential");
        match &self.endpoint {
            Endpoint::Imds { url } => d.field("imds", url),
            Endpoint::AppService { url, secret } => d
                .field("app_service", url)
                .field("identity_header", &Redact::from(secret)),
        };
        d.field("client_id", &self.client_id).finish()
    }
}

#[async_trait]
impl ProvideToken for ManagedIdentityCredential {
    async fn provide_token(&self, ctx: &Context, scopes: &[&str]) -> Result<AccessToken> {
        let resource = scope_to_resource(scopes)?;

        let api_version = match self.endpoint {
            Endpoint::Imds { .. } => IMDS_API_VERSION,
            Endpoint::AppService { .. } => APP_SERVICE_API_VERSION,
        };
        // The serializer is not `Send` and must be dropped before awaiting.
        let url = {
            let mut query = form_urlencoded::Serializer::new(String::new());
            query
                .append_pair("api-version", api_version)
                .append_pair("resource", &resource);
            if let Some(client_id) = &self.client_id {
                query.append_pair("client_id", client_id);
            }
            format!("{}?{}", self.endpoint(), query.finish())
        };

        let mut req = http::Request::builder().method(http::Method::GET).uri(url);
        req = match &self.endpoint {
            Endpoint::Imds { .. } => req.header("Metadata", "true"),
            Endpoint::AppService { secret, .. } => req.header(X_IDENTITY_HEADER, secret),
        };
        let req = req.body(Bytes::new())?;

        debug!(
            "requesting managed identity token for {resource} with client id {:?}",
            self.client_id
        );
        send_token_request(ctx, req).await
    }
}
