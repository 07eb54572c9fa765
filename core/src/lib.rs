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

//! Core components for resolving identity provider credentials.
//!
//! This crate provides the foundational types and traits for the azauth ecosystem.
//!
//! ## Overview
//!
//! The crate is built around a few key concepts:
//!
//! - **Context**: A container that holds implementations for file reading, HTTP sending, and environment access
//! - **ProvideToken**: The token-issuing capability every credential source exposes
//! - **Error**: A single error type whose [`ErrorKind`] tells callers why resolution failed
//!
//! ## Example
//!
//! ```no_run
//! use async_trait::async_trait;
//! use azauth_core::{AccessToken, Context, ProvideToken, Result};
//!
//! #[derive(Debug)]
//! struct StaticToken(String);
//!
//! #[async_trait]
//! impl ProvideToken for StaticToken {
//!     async fn provide_token(&self, _: &Context, _: &[&str]) -> Result<AccessToken> {
//!         Ok(AccessToken::new(self.0.clone(), None))
//!     }
//! }
//!
//! # async fn example() -> Result<()> {
//! let ctx = Context::new();
//! let token = StaticToken("token".to_string())
//!     .provide_token(&ctx, &["https://vault.azure.net/.default"])
//!     .await?;
//! assert!(token.is_valid());
//! # Ok(())
//! # }
//! ```
//!
//! ## Traits
//!
//! - [`FileRead`]: For asynchronous file reading
//! - [`HttpSend`]: For sending HTTP requests
//! - [`Env`]: For environment variable access
//! - [`ProvideToken`]: For acquiring bearer tokens
//!
//! ## Utilities
//!
//! - [`hash`]: Hashing and encoding helpers
//! - [`time`]: Time helpers
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{
    Context, Env, FileRead, HttpSend, NoopEnv, NoopFileRead, NoopHttpSend, OsEnv, StaticEnv,
};

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::{AccessToken, ProvideToken};
