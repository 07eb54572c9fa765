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

//! Azure AD credential resolution with convenience APIs.

pub use azauth_azure::*;

#[cfg(feature = "default-context")]
use crate::{default_context, Context, Result};

/// Resolve a token credential chain from metadata using the default context.
///
/// The context is returned as well, since tokens must be requested through it.
///
/// # Example
///
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> azauth::Result<()> {
/// use azauth::azure::Metadata;
///
/// let metadata = Metadata::new()
///     .with("azureClientId", "my-client")
///     .with("azureTenantId", "my-tenant")
///     .with("azureCertificateFile", "/etc/azure/client.pem");
///
/// let (ctx, chain) = azauth::azure::default_token_credential(metadata).await?;
/// println!("resolved {:?} with {:?}", chain.sources(), ctx);
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "default-context")]
pub async fn default_token_credential(
    metadata: Metadata,
) -> Result<(Context, TokenCredentialChain)> {
    let ctx = default_context();
    let chain = EnvironmentSettings::new(metadata)
        .token_credential(&ctx)
        .await?;
    Ok((ctx, chain))
}

/// Resolve a token credential chain from the `AZURE_*` environment variables.
#[cfg(feature = "default-context")]
pub async fn env_token_credential() -> Result<(Context, TokenCredentialChain)> {
    let ctx = default_context();
    let chain = EnvironmentSettings::new(Metadata::from_env(&ctx))
        .token_credential(&ctx)
        .await?;
    Ok((ctx, chain))
}
