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

//! Decoding of client certificates.
//!
//! Two containers are accepted:
//!
//! - PKCS#12 (PFX) bundles holding exactly one certificate and one private key,
//!   optionally protected by a password.
//! - PEM streams whose first two blocks are a `CERTIFICATE` and either a
//!   `PRIVATE KEY` (PKCS#8) or an `RSA PRIVATE KEY` (PKCS#1), in any order.
//!
//! Only RSA keys are supported.

use std::fmt::{self, Debug};

use azauth_core::hash::{hex_sha1, sha1};
use azauth_core::{Error, Result};
use log::debug;
use p12::PFX;
use rsa::pkcs1::DecodeRsaPrivateKey;
use rsa::pkcs8::PrivateKeyInfo;
use rsa::traits::PublicKeyParts;
use rsa::RsaPrivateKey;

const PEM_CERTIFICATE: &str = "CERTIFICATE";
const PEM_PKCS8_PRIVATE_KEY: &str = "PRIVATE KEY";
const PEM_PKCS1_PRIVATE_KEY: &str = "RSA PRIVATE KEY";
/// Only the first two PEM blocks are considered.
const PEM_BLOCK_SLOTS: usize = 2;

/// An X.509 certificate that has been checked to parse.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
    subject: String,
}

impl Certificate {
    /// Parse a DER encoded X.509 certificate.
    pub fn from_der(der: impl Into<Vec<u8>>) -> Result<Self> {
        let der = der.into();
        let subject = {
            let (_, cert) = x509_parser::parse_x509_certificate(&der).map_err(|e| {
                Error::invalid_certificate(format!("failed to parse x509 certificate: {e}"))
            })?;
            cert.subject().to_string()
        };

        Ok(Self { der, subject })
    }

    /// The DER encoding of this certificate.
    pub fn der(&self) -> &[u8] {
        &self.der
    }

    /// The subject distinguished name, e.g. `CN=my-app`.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// SHA-1 thumbprint of the DER encoding.
    pub fn thumbprint(&self) -> [u8; 20] {
        sha1(&self.der)
    }
}

impl Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Certificate")
            .field("subject", &self.subject)
            .field("thumbprint", &hex_sha1(&self.der))
            .finish()
    }
}

/// A certificate together with its RSA private key.
#[derive(Clone)]
pub struct DecodedCertificate {
    /// The client certificate.
    pub certificate: Certificate,
    /// The private key matching the certificate.
    pub private_key: RsaPrivateKey,
}

impl Debug for DecodedCertificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DecodedCertificate")
            .field("certificate", &self.certificate)
            .field("key_bits", &(self.private_key.size() * 8))
            .finish()
    }
}

/// Container formats understood by [`decode_certificate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CertificateFormat {
    /// Binary PKCS#12 (PFX) bundle.
    Pkcs12,
    /// PEM encoded certificate and key blocks.
    Pem,
}

impl CertificateFormat {
    /// The order in which formats are attempted.
    pub const ATTEMPT_ORDER: [CertificateFormat; 2] =
        [CertificateFormat::Pkcs12, CertificateFormat::Pem];

    /// Decode `data` as this format. The password is only used by PKCS#12.
    pub fn decode(self, data: &[u8], password: &str) -> Result<DecodedCertificate> {
        match self {
            CertificateFormat::Pkcs12 => decode_pkcs12(data, password),
            CertificateFormat::Pem => decode_pem(data),
        }
    }
}

impl fmt::Display for CertificateFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CertificateFormat::Pkcs12 => write!(f, "PKCS#12"),
            CertificateFormat::Pem => write!(f, "PEM"),
        }
    }
}

/// Decode a certificate and RSA private key from either a PKCS#12 bundle or PEM blocks.
///
/// The first format that decodes wins. When none does, the returned
/// `InvalidCertificate` error carries each attempt's error as related errors,
/// in attempt order.
pub fn decode_certificate(data: &[u8], password: &str) -> Result<DecodedCertificate> {
    let mut errors = Vec::with_capacity(CertificateFormat::ATTEMPT_ORDER.len());

    for format in CertificateFormat::ATTEMPT_ORDER {
        match format.decode(data, password) {
            Ok(decoded) => {
                debug!(
                    "decoded {format} certificate for {}",
                    decoded.certificate.subject()
                );
                return Ok(decoded);
            }
            Err(err) => {
                debug!("certificate is not a valid {format} container: {err}");
                errors.push(err);
            }
        }
    }

    Err(Error::invalid_certificate("certificate is not valid").with_related(errors))
}

/// Decode a PKCS#12 bundle holding exactly one certificate and one RSA key.
pub fn decode_pkcs12(data: &[u8], password: &str) -> Result<DecodedCertificate> {
    let pfx = PFX::parse(data).map_err(|e| {
        Error::invalid_certificate(format!("failed to parse PKCS#12 bundle: {e:?}"))
    })?;

    if !pfx.verify_mac(password) {
        return Err(Error::invalid_certificate(
            "PKCS#12 bundle integrity check failed: decryption password incorrect",
        ));
    }

    let certs = pfx.cert_x509_bags(password).map_err(|e| {
        Error::invalid_certificate(format!("failed to read PKCS#12 certificates: {e:?}"))
    })?;
    let keys = pfx.key_bags(password).map_err(|e| {
        Error::invalid_certificate(format!("failed to read PKCS#12 private keys: {e:?}"))
    })?;

    let cert = exactly_one(certs, "certificate")?;
    let key = exactly_one(keys, "private key")?;

    let private_key = rsa_key_from_pkcs8(&key).map_err(|err| {
        if err.kind() == azauth_core::ErrorKind::UnsupportedKeyAlgorithm {
            Error::unsupported_key_algorithm("PKCS#12 certificate must contain an RSA private key")
                .with_related([err])
        } else {
            err
        }
    })?;

    Ok(DecodedCertificate {
        certificate: Certificate::from_der(cert)?,
        private_key,
    })
}

fn exactly_one(mut items: Vec<Vec<u8>>, what: &str) -> Result<Vec<u8>> {
    match items.len() {
        0 => Err(Error::incomplete_certificate(format!(
            "PKCS#12 bundle contains no {what}"
        ))),
        1 => Ok(items.remove(0)),
        n => Err(Error::ambiguous_certificate(format!(
            "PKCS#12 bundle contains {n} entries of type {what}, expected exactly one"
        ))),
    }
}

/// Decode a certificate and an RSA key from the first two PEM blocks of `data`.
///
/// Blocks with other labels are skipped but still count towards the two.
pub fn decode_pem(data: &[u8]) -> Result<DecodedCertificate> {
    let blocks = leading_pem_blocks(data, PEM_BLOCK_SLOTS)?;

    let mut certificate: Option<Certificate> = None;
    let mut private_key: Option<RsaPrivateKey> = None;

    for block in &blocks {
        match block.tag() {
            PEM_CERTIFICATE => {
                if certificate.is_some() {
                    return Err(Error::ambiguous_certificate(
                        "PEM data contains more than one certificate",
                    ));
                }
                certificate = Some(Certificate::from_der(block.contents())?);
            }
            PEM_PKCS8_PRIVATE_KEY => {
                if private_key.is_some() {
                    return Err(Error::ambiguous_certificate(
                        "PEM data contains more than one private key",
                    ));
                }
                private_key = Some(rsa_key_from_pkcs8(block.contents())?);
            }
            PEM_PKCS1_PRIVATE_KEY => {
                if private_key.is_some() {
                    return Err(Error::ambiguous_certificate(
                        "PEM data contains more than one private key",
                    ));
                }
                let key = RsaPrivateKey::from_pkcs1_der(block.contents()).map_err(|e| {
                    Error::invalid_certificate(format!("failed to parse PKCS#1 private key: {e}"))
                })?;
                private_key = Some(key);
            }
            tag => debug!("skipping PEM block of type {tag}"),
        }
    }

    match (certificate, private_key) {
        (Some(certificate), Some(private_key)) => Ok(DecodedCertificate {
            certificate,
            private_key,
        }),
        (None, _) => Err(Error::incomplete_certificate(
            "PEM data does not contain a certificate",
        )),
        (_, None) => Err(Error::incomplete_certificate(
            "PEM data does not contain a private key",
        )),
    }
}

/// Parse at most `limit` PEM blocks from the start of `data`.
///
/// Bytes after the last block taken are never parsed.
fn leading_pem_blocks(data: &[u8], limit: usize) -> Result<Vec<pem::Pem>> {
    const BEGIN: &[u8] = b"-----BEGIN ";
    const END: &[u8] = b"-----END ";
    const DASHES: &[u8] = b"-----";

    let mut blocks = Vec::with_capacity(limit);
    let mut rest = data;

    while blocks.len() < limit {
        let Some(begin) = find(rest, BEGIN) else {
            break;
        };
        let Some(end) = find(&rest[begin..], END).map(|i| begin + i + END.len()) else {
            break;
        };
        let Some(close) = find(&rest[end..], DASHES).map(|i| end + i + DASHES.len()) else {
            break;
        };

        let block = pem::parse(&rest[begin..close])
            .map_err(|e| Error::invalid_certificate(format!("failed to parse PEM block: {e}")))?;
        blocks.push(block);
        rest = &rest[close..];
    }

    Ok(blocks)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn rsa_key_from_pkcs8(der: &[u8]) -> Result<RsaPrivateKey> {
    let info = PrivateKeyInfo::try_from(der).map_err(|e| {
        Error::invalid_certificate(format!("failed to parse PKCS#8 private key: {e}"))
    })?;

    if info.algorithm.oid != rsa::pkcs1::ALGORITHM_OID {
        return Err(Error::unsupported_key_algorithm(format!(
            "certificate must contain an RSA private key, found algorithm {}",
            info.algorithm.oid
        )));
    }

    RsaPrivateKey::try_from(info).map_err(|e| {
        Error::invalid_certificate(format!("failed to parse RSA private key: {e}"))
    })
}
