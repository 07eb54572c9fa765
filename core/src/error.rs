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

use std::fmt;
use thiserror::Error;

/// The error type for azauth operations
#[derive(Error, Debug)]
#[error("{message}")]
pub struct Error {
    kind: ErrorKind,
    message: String,
    #[source]
    source: Option<anyhow::Error>,
    related: Vec<Error>,
}

/// The kind of error that occurred
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The configured cloud environment name matches no known environment
    UnknownEnvironment,

    /// A credential source lacks one or more of its required fields
    MissingCredentialFields,

    /// Neither certificate bytes nor a certificate file were provided
    CertificateMissing,

    /// The certificate file could not be read
    CertificateFileUnreadable,

    /// Certificate material was provided but could not be decoded
    CertificateDecodeFailed,

    /// More than one certificate or more than one private key was found
    AmbiguousCertificate,

    /// The private key is not an RSA key
    UnsupportedKeyAlgorithm,

    /// A certificate or a private key is missing from the material
    IncompleteCertificate,

    /// The material is neither a valid bundle nor a valid PEM stream
    InvalidCertificate,

    /// The token-issuing primitive rejected its inputs
    CredentialConstructionFailed,

    /// Every credential source failed
    NoCredentialSource,

    /// Token request cannot be built (missing scopes, bad uri, etc.)
    RequestInvalid,

    /// The identity endpoint refused to issue a token
    CredentialDenied,

    /// Unexpected errors (network, I/O, service errors, etc.)
    Unexpected,
}

impl Error {
    /// Create a new error with the given kind and message
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            related: Vec::new(),
        }
    }

    /// Add a source error
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Attach errors that led to this one, kept in the given order.
    pub fn with_related(mut self, related: impl IntoIterator<Item = Error>) -> Self {
        self.related.extend(related);
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Errors aggregated into this one.
    pub fn related(&self) -> &[Error] {
        &self.related
    }
}

// Convenience constructors
impl Error {
    /// Create an unknown environment error
    pub fn unknown_environment(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownEnvironment, message)
    }

    /// Create a missing credential fields error
    pub fn missing_credential_fields(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::MissingCredentialFields, message)
    }

    /// Create a certificate missing error
    pub fn certificate_missing(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CertificateMissing, message)
    }

    /// Create a certificate file unreadable error
    pub fn certificate_file_unreadable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CertificateFileUnreadable, message)
    }

    /// Create a certificate decode failed error
    pub fn certificate_decode_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CertificateDecodeFailed, message)
    }

    /// Create an ambiguous certificate error
    pub fn ambiguous_certificate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AmbiguousCertificate, message)
    }

    /// Create an unsupported key algorithm error
    pub fn unsupported_key_algorithm(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedKeyAlgorithm, message)
    }

    /// Create an incomplete certificate error
    pub fn incomplete_certificate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IncompleteCertificate, message)
    }

    /// Create an invalid certificate error
    pub fn invalid_certificate(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCertificate, message)
    }

    /// Create a credential construction failed error
    pub fn credential_construction_failed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialConstructionFailed, message)
    }

    /// Create a no credential source error
    pub fn no_credential_source(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NoCredentialSource, message)
    }

    /// Create a request invalid error
    pub fn request_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RequestInvalid, message)
    }

    /// Create a credential denied error
    pub fn credential_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::CredentialDenied, message)
    }

    /// Create an unexpected error
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::UnknownEnvironment => write!(f, "unknown environment"),
            ErrorKind::MissingCredentialFields => write!(f, "missing credential fields"),
            ErrorKind::CertificateMissing => write!(f, "certificate missing"),
            ErrorKind::CertificateFileUnreadable => write!(f, "certificate file unreadable"),
            ErrorKind::CertificateDecodeFailed => write!(f, "certificate decode failed"),
            ErrorKind::AmbiguousCertificate => write!(f, "ambiguous certificate"),
            ErrorKind::UnsupportedKeyAlgorithm => write!(f, "unsupported key algorithm"),
            ErrorKind::IncompleteCertificate => write!(f, "incomplete certificate"),
            ErrorKind::InvalidCertificate => write!(f, "invalid certificate"),
            ErrorKind::CredentialConstructionFailed => write!(f, "credential construction failed"),
            ErrorKind::NoCredentialSource => write!(f, "no credential source"),
            ErrorKind::RequestInvalid => write!(f, "invalid request"),
            ErrorKind::CredentialDenied => write!(f, "credential denied"),
            ErrorKind::Unexpected => write!(f, "unexpected error"),
        }
    }
}

/// Convenience type alias for Results
pub type Result<T> = std::result::Result<T, Error>;

// Common From implementations
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::Error> for Error {
    fn from(err: http::Error) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<http::uri::InvalidUri> for Error {
    fn from(err: http::uri::InvalidUri) -> Self {
        Self::request_invalid(err.to_string()).with_source(anyhow::Error::from(err))
    }
}

impl From<std::string::FromUtf8Error> for Error {
    fn from(err: std::string::FromUtf8Error) -> Self {
        Self::unexpected(err.to_string()).with_source(anyhow::Error::from(err))
    }
}
