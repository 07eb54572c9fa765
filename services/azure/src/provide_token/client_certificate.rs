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
use azauth_core::hash::{base64_url_encode, hex_sha1};
use azauth_core::time::now;
use azauth_core::{AccessToken, Context, Error, ProvideToken, Result};
use bytes::Bytes;
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use rsa::pkcs1::EncodeRsaPrivateKey;
use serde::Serialize;

use super::{join_scopes, send_token_request, token_endpoint};
use crate::certificate::{Certificate, DecodedCertificate};
use crate::constants::{CLIENT_ASSERTION_LIFETIME_SECS, CLIENT_ASSERTION_TYPE, CONTENT_TYPE_FORM};

/// ClientCertificateCredential authenticates a service principal with a
/// JWT client assertion signed by its certificate key.
#[derive(Clone)]
pub struct ClientCertificateCredential {
    token_url: String,
    client_id: String,
    certificate: Certificate,
    encoding_key: EncodingKey,
}

#[derive(Serialize)]
struct ClientAssertionClaims<'a> {
    aud: &'a str,
    iss: &'a str,
    sub: &'a str,
    jti: String,
    nbf: i64,
    iat: i64,
    exp: i64,
}

impl ClientCertificateCredential {
    /// Create a credential for `tenant_id` at the given authority host.
    pub fn new(
        authority: &str,
        tenant_id: &str,
        client_id: &str,
        certificate: DecodedCertificate,
    ) -> Result<Self> {
        let token_url = token_endpoint(authority, tenant_id)?;

        let key_der = certificate.private_key.to_pkcs1_der().map_err(|e| {
            Error::credential_construction_failed(format!(
                "failed to encode certificate private key: {e}"
            ))
        })?;
        let encoding_key = EncodingKey::from_rsa_der(key_der.as_bytes());

        Ok(Self {
            token_url,
            client_id: client_id.to_string(),
            certificate: certificate.certificate,
            encoding_key,
        })
    }

    /// The endpoint tokens are requested from.
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Build a signed client assertion for the token endpoint.
    fn client_assertion(&self) -> Result<String> {
        let now = now();
        let iat = now.timestamp();
        let claims = ClientAssertionClaims {
            aud: &self.token_url,
            iss: &self.client_id,
            sub: &self.client_id,
            jti: hex_sha1(
                format!(
                    "{}:{}",
                    self.client_id,
                    now.timestamp_nanos_opt().unwrap_or(iat)
                )
                .as_bytes(),
            ),
            nbf: iat,
            iat,
            exp: iat + CLIENT_ASSERTION_LIFETIME_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.x5t = Some(base64_url_encode(&self.certificate.thumbprint()));

        jsonwebtoken::encode(&header, &claims, &self.encoding_key).map_err(|e| {
            Error::unexpected("failed to sign client assertion").with_source(e)
        })
    }
}

impl Debug for ClientCertificateCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientCertificateCredential")
            .field("token_url", &self.token_url)
            .field("client_id", &self.client_id)
            .field("certificate", &self.certificate)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl ProvideToken for ClientCertificateCredential {
    async fn provide_token(&self, ctx: &Context, scopes: &[&str]) -> Result<AccessToken> {
        let scope = join_scopes(scopes)?;
        let assertion = self.client_assertion()?;

        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("grant_type", "client_credentials")
            .append_pair("client_id", &self.client_id)
            .append_pair("client_assertion_type", CLIENT_ASSERTION_TYPE)
            .append_pair("client_assertion", &assertion)
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
