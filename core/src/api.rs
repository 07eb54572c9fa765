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

use crate::time::{now, DateTime};
use crate::utils::Redact;
use crate::{Context, Result};
use std::fmt::{self, Debug};

/// AccessToken is a bearer token issued by an identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    /// The bearer token.
    pub token: String,
    /// Expiration time for this token, if the issuer reported one.
    pub expires_on: Option<DateTime>,
}

impl AccessToken {
    /// Create a new access token.
    pub fn new(token: impl Into<String>, expires_on: Option<DateTime>) -> Self {
        Self {
            token: token.into(),
            expires_on,
        }
    }

    /// Check if the token is non-empty and not about to expire.
    pub fn is_valid(&self) -> bool {
        if self.token.is_empty() {
            return false;
        }
        // Take 20s as buffer to avoid edge cases.
        match self.expires_on {
            Some(expires) => expires > now() + chrono::TimeDelta::seconds(20),
            None => true,
        }
    }
}

impl Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("token", &Redact::from(&self.token))
            .field("expires_on", &self.expires_on)
            .finish()
    }
}

/// ProvideToken is the token-issuing capability shared by every credential source.
///
/// Implementations are expected to be cheap to construct: all network I/O
/// happens inside `provide_token`.
#[async_trait::async_trait]
pub trait ProvideToken: Debug + Send + Sync + 'static {
    /// Acquire a bearer token valid for the given scopes.
    async fn provide_token(&self, ctx: &Context, scopes: &[&str]) -> Result<AccessToken>;
}
