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

use async_trait::async_trait;
use azauth_core::{AccessToken, Context, Error, ProvideToken, Result};

use crate::source::CredentialSource;

/// A chain of token credentials that will be tried in order.
///
/// The first credential that returns a token wins. When every credential
/// fails, the error of the last one is returned.
#[derive(Clone)]
pub struct TokenCredentialChain {
    credentials: Vec<(CredentialSource, Arc<dyn ProvideToken>)>,
}

impl TokenCredentialChain {
    /// Create a chain from credentials in priority order.
    ///
    /// An empty chain could never issue a token and is rejected.
    pub fn new(credentials: Vec<(CredentialSource, Arc<dyn ProvideToken>)>) -> Result<Self> {
        if credentials.is_empty() {
            return Err(Error::no_credential_source(
                "a token credential chain needs at least one credential",
            ));
        }
        Ok(Self { credentials })
    }

    /// Sources of the chained credentials, in the order they are tried.
    pub fn sources(&self) -> Vec<CredentialSource> {
        self.credentials.iter().map(|(source, _)| *source).collect()
    }

    /// Number of chained credentials. Never zero.
    pub fn len(&self) -> usize {
        self.credentials.len()
    }

    /// Whether the chain has no credentials.
    pub fn is_empty(&self) -> bool {
        self.credentials.is_empty()
    }
}

impl Debug for TokenCredentialChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCredentialChain")
            .field("sources", &self.sources())
            .finish()
    }
}

#[async_trait]
impl ProvideToken for TokenCredentialChain {
    async fn provide_token(&self, ctx: &Context, scopes: &[&str]) -> Result<AccessToken> {
        let mut last_err = None;

        for (source, credential) in &self.credentials {
            log::debug!("trying {source} credential: {credential:?}");

            match credential.provide_token(ctx, scopes).await {
                Ok(token) => {
                    log::debug!("acquired token from {source} credential");
                    return Ok(token);
                }
                Err(err) => {
                    log::warn!("failed to acquire token from {source} credential: {err}");
                    last_err = Some(err);
                }
            }
        }

        Err(last_err.unwrap_or_else(|| {
            Error::no_credential_source("a token credential chain needs at least one credential")
        }))
    }
}
