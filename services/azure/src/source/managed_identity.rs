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

use std::sync::Arc;

use azauth_core::{Context, ProvideToken, Result};

use crate::metadata::{Metadata, MetadataKey};
use crate::provide_token::BuildCredential;

/// ManagedIdentityConfig selects the platform identity to use.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManagedIdentityConfig {
    /// Client id of a user assigned identity. `None` selects the system assigned one.
    pub client_id: Option<String>,
}

impl ManagedIdentityConfig {
    /// Build the config from metadata. This never fails.
    pub fn from_metadata(metadata: &Metadata) -> Self {
        Self {
            client_id: metadata
                .get_non_empty(MetadataKey::ClientId)
                .map(str::to_string),
        }
    }

    /// Build a handle backed by the platform identity endpoint.
    pub fn obtain_handle(
        &self,
        ctx: &Context,
        builder: &dyn BuildCredential,
    ) -> Result<Arc<dyn ProvideToken>> {
        builder.managed_identity(ctx, self)
    }
}
