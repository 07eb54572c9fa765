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

//! Integration tests for building and using the token credential chain.

use std::io::Write;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use azauth_azure::{
    BuildCredential, ClientCertificateConfig, ClientSecretConfig, CredentialSource,
    DecodedCertificate, DefaultCredentialBuilder, EnvironmentSettings, ManagedIdentityConfig,
    Metadata,
};
use azauth_core::{AccessToken, Context, Error, ErrorKind, HttpSend, ProvideToken, Result};
use azauth_file_read_tokio::TokioFileRead;
use bytes::Bytes;
use pretty_assertions::assert_eq;
use test_case::test_case;

use crate::*;

/// Token handle that always returns a fixed token.
#[derive(Debug)]
struct StaticToken(&'static str);

#[async_trait]
impl ProvideToken for StaticToken {
    async fn provide_token(&self, _: &Context, _: &[&str]) -> Result<AccessToken> {
        Ok(AccessToken::new(self.0, None))
    }
}

/// Builder that hands out static tokens and never reaches a managed identity.
#[derive(Debug, Default, Clone)]
struct OfflineBuilder {
    built: Arc<Mutex<Vec<CredentialSource>>>,
}

impl BuildCredential for OfflineBuilder {
    fn client_secret(&self, _: &ClientSecretConfig) -> Result<Arc<dyn ProvideToken>> {
        self.built.lock().unwrap().push(CredentialSource::ClientSecret);
        Ok(Arc::new(StaticToken("secret-token")))
    }

    fn client_certificate(
        &self,
        _: &ClientCertificateConfig,
        certificate: DecodedCertificate,
    ) -> Result<Arc<dyn ProvideToken>> {
        assert_eq!(certificate.certificate.subject(), "CN=azauth-test");
        self.built
            .lock()
            .unwrap()
            .push(CredentialSource::ClientCertificate);
        Ok(Arc::new(StaticToken("certificate-token")))
    }

    fn managed_identity(
        &self,
        _: &Context,
        _: &ManagedIdentityConfig,
    ) -> Result<Arc<dyn ProvideToken>> {
        Err(Error::credential_construction_failed(
            "managed identity is not available on this host",
        ))
    }
}

fn secret_metadata() -> Metadata {
    Metadata::new()
        .with("azureClientId", "client")
        .with("azureClientSecret", "secret-value-1234")
        .with("azureTenantId", "tenant")
}

#[tokio::test]
async fn test_secret_only_yields_one_handle() {
    init_logger();

    let builder = OfflineBuilder::default();
    let settings =
        EnvironmentSettings::new(secret_metadata()).with_credential_builder(builder.clone());

    let chain = settings.token_credential(&Context::new()).await.unwrap();
    assert_eq!(chain.sources(), vec![CredentialSource::ClientSecret]);
    assert_eq!(
        *builder.built.lock().unwrap(),
        vec![CredentialSource::ClientSecret]
    );

    let token = chain
        .provide_token(&Context::new(), &["https://vault.azure.net/.default"])
        .await
        .unwrap();
    assert_eq!(token.token, "secret-token");
}

#[tokio::test]
async fn test_no_fields_reports_every_source() {
    init_logger();

    let settings = EnvironmentSettings::new(Metadata::new())
        .with_credential_builder(OfflineBuilder::default());

    let err = settings
        .token_credential(&Context::new())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoCredentialSource);

    let message = err.to_string();
    assert!(message.contains("client secret"), "{message}");
    assert!(message.contains("client certificate"), "{message}");
    assert!(message.contains("managed identity"), "{message}");

    let kinds: Vec<ErrorKind> = err.related().iter().map(|e| e.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            ErrorKind::MissingCredentialFields,
            ErrorKind::MissingCredentialFields,
            ErrorKind::CredentialConstructionFailed,
        ]
    );
}

#[tokio::test]
async fn test_secret_and_certificate_keep_priority() {
    let md = secret_metadata().with("spnCertificate", RSA_COMBINED);
    let settings = EnvironmentSettings::new(md).with_credential_builder(OfflineBuilder::default());

    let chain = settings.token_credential(&Context::new()).await.unwrap();
    assert_eq!(
        chain.sources(),
        vec![
            CredentialSource::ClientSecret,
            CredentialSource::ClientCertificate
        ]
    );
}

#[tokio::test]
async fn test_certificate_bundle_from_file() {
    init_logger();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(RSA_BUNDLE).unwrap();

    let md = Metadata::new()
        .with("azureClientId", "client")
        .with("azureTenantId", "tenant")
        .with("azureCertificateFile", file.path().to_string_lossy())
        .with("azureCertificatePassword", BUNDLE_PASSWORD);
    let settings = EnvironmentSettings::new(md);

    let ctx = Context::new().with_file_read(TokioFileRead);
    let chain = settings.token_credential(&ctx).await.unwrap();
    assert_eq!(
        chain.sources(),
        vec![
            CredentialSource::ClientCertificate,
            CredentialSource::ManagedIdentity
        ]
    );
}

#[test_case(EC_BUNDLE, BUNDLE_PASSWORD, ErrorKind::CertificateDecodeFailed; "non rsa bundle")]
#[test_case(RSA_BUNDLE, "wrong", ErrorKind::CertificateDecodeFailed; "wrong password")]
#[test_case(b"", "", ErrorKind::CertificateMissing; "empty file")]
#[tokio::test]
async fn test_certificate_failures_are_aggregated(
    data: &[u8],
    password: &str,
    expected: ErrorKind,
) {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(data).unwrap();

    let md = Metadata::new()
        .with("azureClientId", "client")
        .with("azureTenantId", "tenant")
        .with("azureCertificateFile", file.path().to_string_lossy())
        .with("azureCertificatePassword", password);
    let settings = EnvironmentSettings::new(md).with_credential_builder(OfflineBuilder::default());

    let ctx = Context::new().with_file_read(TokioFileRead);
    let err = settings.token_credential(&ctx).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NoCredentialSource);
    assert_eq!(err.related()[1].kind(), expected);
}

#[test_case(&[("azureClientSecret", "s"), ("azureTenantId", "t")]; "missing client id")]
#[test_case(&[("azureClientId", "c"), ("azureTenantId", "t")]; "missing client secret")]
#[test_case(&[("azureClientId", "c"), ("azureClientSecret", "s")]; "missing tenant id")]
#[test_case(&[("azureClientId", "c"), ("azureClientSecret", "s"), ("azureTenantId", "")]; "empty tenant id")]
fn test_incomplete_secret_config(fields: &[(&str, &str)]) {
    let md: Metadata = fields.iter().copied().collect();
    let err = EnvironmentSettings::new(md)
        .client_secret_config()
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingCredentialFields);
}

/// Routes token requests: client secret requests are rejected, managed
/// identity requests succeed.
#[derive(Debug, Default, Clone)]
struct IdentityEndpoints {
    paths: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl HttpSend for IdentityEndpoints {
    async fn http_send(&self, req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
        let path = req.uri().path().to_string();
        self.paths.lock().unwrap().push(path.clone());

        let resp = if path.ends_with("/oauth2/v2.0/token") {
            http::Response::builder()
                .status(401)
                .body(Bytes::from_static(br#"{"error":"invalid_client"}"#))?
        } else {
            http::Response::builder().status(200).body(Bytes::from_static(
                br#"{"access_token":"mi-token","expires_in":"3600"}"#,
            ))?
        };
        Ok(resp)
    }
}

#[tokio::test]
async fn test_chain_falls_back_at_token_time() {
    init_logger();

    let http = IdentityEndpoints::default();
    let ctx = Context::new().with_http_send(http.clone());

    let settings = EnvironmentSettings::new(secret_metadata())
        .with_credential_builder(DefaultCredentialBuilder);
    let chain = settings.token_credential(&ctx).await.unwrap();
    assert_eq!(
        chain.sources(),
        vec![
            CredentialSource::ClientSecret,
            CredentialSource::ManagedIdentity
        ]
    );
    assert!(http.paths.lock().unwrap().is_empty());

    let token = chain
        .provide_token(&ctx, &["https://vault.azure.net/.default"])
        .await
        .unwrap();
    assert_eq!(token.token, "mi-token");
    assert!(token.is_valid());
    assert_eq!(
        *http.paths.lock().unwrap(),
        vec![
            "/tenant/oauth2/v2.0/token".to_string(),
            "/metadata/identity/oauth2/token".to_string()
        ]
    );
}

#[tokio::test]
async fn test_environment_selects_authority() {
    let md = secret_metadata().with("azureEnvironment", "AzureChinaCloud");
    let settings = EnvironmentSettings::new(md).with_credential_builder(OfflineBuilder::default());

    let config = settings.client_secret_config().unwrap();
    assert_eq!(config.authority_endpoint, "https://login.chinacloudapi.cn/");

    let chain = settings.token_credential(&Context::new()).await.unwrap();
    assert_eq!(chain.len(), 1);
}
