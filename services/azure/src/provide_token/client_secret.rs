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
use azauth_core::{AccessToken, Context, ProvideToken, Result};
use bytes::Bytes;

use super::{join_scopes, send_token_request, token_endpoint};
use crate::constants::CONTENT_TYPE_FORM;

/// ClientSecretCredential redeems a service principal secret through the
/// OAuth2 client credentials grant.
#[derive(Clone)]
pub struct ClientSecretCredential {
    token_url: String,
    client_id: String,
    client_secret: String,
}

impl ClientSecretCredential {
    /// Create a credential for `tenant_id` at the given authority host.
    ///
    /// Fails when the authority is not an absolute http(s) URI or the tenant id
    /// contains characters that cannot appear in a URL path segment.
    pub fn new(
        authority: &str,
        tenant_id: &str,
        client_id: &str,
        client_secret: &str,
    ) -> Result<Self> {
        Ok(Self {
            token_url: token_endpoint(authority, tenant_id)?,
            client_id: client_id.to_string(),
            client_secret: client_secret.to_string(),
        })
    }

    /// The endpoint tokens are requested from.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }
}

impl Debug for ClientSecretCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientSecretCredential")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("client_secret", &Redact::from(&self.client_secret))
            .finish()
    }
}

#[async_trait]
impl ProvideToken for ClientSecretCredential {
    async fn provide_token(&self, ctx: &Context, scopes: &[&str]) -> Result<AccessToken> {
        let scope = join_scopes(scopes)?;

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.client_id)
            .append_pair("client_secret", &self.client_secret)
            .append_pair("scope", &scope)
            .finish();

        let req = http::Request::builder()
            .method(http::Method::POST)
            .uri(&self.token_url)
            .header(http::header::CONTENT_TYPE, CONTENT_TYPE_FORM)
            .body(Bytes::from(body))?;

        send_token_request(ctx, req).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azauth_core::{ErrorKind, HttpSend};
    use pretty_assertions::assert_eq;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Default, Clone)]
    struct RecordingHttpSend {
        requests: Arc<Mutex<Vec<http::Request<Bytes>>>>,
        status: u16,
        body: &'static str,
    }

    #[async_trait]
    impl HttpSend for RecordingHttpSend {
        async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
            self.requests.lock().unwrap().push(req);
            Ok(http::Response::builder()
                .status(self.status)
                .body(Bytes::from_static(self.body.as_bytes()))?)
        }
    }

    fn credential() -> ClientSecretCredential {
        ClientSecretCredential::new(
            "https://login.microsoftonline.com/",
            "my-tenant",
            "my-client",
            "my-secret-value",
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_client_secret_token_request() {
        let http = RecordingHttpSend {
            status: 200,
            body: r#"{"token_type":"Bearer","expires_in":3599,"access_token":"token-value"}"#,
            ..Default::default()
        };
        let ctx = Context::new().with_http_send(http.clone());

        let token = credential()
            .provide_token(&ctx, &["https://vault.azure.net/.default"])
            .await
            .unwrap();
        assert_eq!(token.token, "token-value");
        assert!(token.is_valid());

        let requests = http.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let req = &requests[0];
        assert_eq!(req.method(), http::Method::POST);
        assert_eq!(
            req.uri().to_string(),
            "https://login.microsoftonline.com/my-tenant/oauth2/v2.0/token"
        );
        let form: Vec<(String, String)> = form_urlencoded::parse(req.body())
            .into_owned()
            .collect();
        assert!(form.contains(&("grant_type".to_string(), "client_credentials".to_string())));
        assert!(form.contains(&("client_secret".to_string(), "my-secret-value".to_string())));
        assert!(form.contains(&(
            "scope".to_string(),
            "https://vault.azure.net/.default".to_string()
        )));
    }

    #[tokio::test]
    async fn test_client_secret_denied() {
        let http = RecordingHttpSend {
            status: 401,
            body: r#"{"error":"invalid_client"}"#,
            ..Default::default()
        };
        let ctx = Context::new().with_http_send(http);

        let err = credential()
            .provide_token(&ctx, &["https://vault.azure.net/.default"])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::CredentialDenied);
        assert!(err.to_string().contains("invalid_client"));
    }

    #[tokio::test]
    async fn test_client_secret_requires_scope() {
        let err = credential()
            .provide_token(&Context::new(), &[])
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_client_secret_debug_is_redacted() {
        let out = format!("{:?}", credential());
        assert!(out.contains("my-client"));
        assert!(!out.contains("my-secret-value"));
    }
}
