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

use azauth_azure::certificate::{decode_pem, decode_pkcs12, CertificateFormat};
use azauth_azure::decode_certificate;
use azauth_core::ErrorKind;
use test_case::test_case;

use crate::*;

fn pem(blocks: &[&str]) -> Vec<u8> {
    blocks.concat().into_bytes()
}

#[test_case(pem(&[RSA_CERT, RSA_KEY_PKCS8]), ""; "pem certificate then pkcs8 key")]
#[test_case(pem(&[RSA_KEY_PKCS1, RSA_CERT]), ""; "pem pkcs1 key then certificate")]
#[test_case(RSA_COMBINED.as_bytes().to_vec(), ""; "combined pem file")]
#[test_case(RSA_BUNDLE.to_vec(), BUNDLE_PASSWORD; "password protected bundle")]
#[test_case(pem(&[RSA_CERT, RSA_KEY_PKCS8, "-----BEGIN CERTIFICATE-----\n!!!\n-----END CERTIFICATE-----\n"]), ""; "broken third block is ignored")]
fn test_decode_valid(data: Vec<u8>, password: &str) {
    init_logger();

    let decoded = decode_certificate(&data, password).unwrap();
    assert_eq!(decoded.certificate.subject(), "CN=azauth-test");
}

#[test_case(pem(&[RSA_CERT, RSA_CERT, RSA_KEY_PKCS8]) => ErrorKind::AmbiguousCertificate; "two certificates")]
#[test_case(pem(&[RSA_KEY_PKCS8, RSA_KEY_PKCS8]) => ErrorKind::AmbiguousCertificate; "two keys")]
#[test_case(pem(&[RSA_CERT]) => ErrorKind::IncompleteCertificate; "certificate only")]
#[test_case(pem(&[RSA_KEY_PKCS1]) => ErrorKind::IncompleteCertificate; "key only")]
#[test_case(pem(&[EC_CERT, EC_KEY_PKCS8]) => ErrorKind::UnsupportedKeyAlgorithm; "ec key")]
#[test_case(b"\x00\x01garbage".to_vec() => ErrorKind::IncompleteCertificate; "no pem blocks")]
fn test_decode_pem_errors(data: Vec<u8>) -> ErrorKind {
    decode_pem(&data).unwrap_err().kind()
}

#[test]
fn test_bundle_with_ec_key_is_unsupported() {
    let err = decode_pkcs12(EC_BUNDLE, BUNDLE_PASSWORD).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedKeyAlgorithm);
}

#[test]
fn test_pkcs1_and_pkcs8_yield_same_key() {
    let pkcs1 = decode_certificate(&pem(&[RSA_CERT, RSA_KEY_PKCS1]), "").unwrap();
    let pkcs8 = decode_certificate(&pem(&[RSA_CERT, RSA_KEY_PKCS8]), "").unwrap();

    assert_eq!(pkcs1.private_key, pkcs8.private_key);
    assert_eq!(pkcs1.certificate, pkcs8.certificate);
}

#[test]
fn test_garbage_is_invalid_and_keeps_both_attempts() {
    init_logger();

    let err = decode_certificate(b"neither a bundle nor pem", "").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCertificate);

    let attempts: Vec<ErrorKind> = err.related().iter().map(|e| e.kind()).collect();
    assert_eq!(
        attempts,
        vec![
            ErrorKind::InvalidCertificate,
            ErrorKind::IncompleteCertificate
        ]
    );
}

#[test]
fn test_formats_are_tried_bundle_first() {
    assert_eq!(
        CertificateFormat::ATTEMPT_ORDER,
        [CertificateFormat::Pkcs12, CertificateFormat::Pem]
    );

    // A bundle is never mistaken for PEM and vice versa.
    assert!(CertificateFormat::Pem.decode(RSA_BUNDLE, "").is_err());
    assert!(CertificateFormat::Pkcs12
        .decode(RSA_COMBINED.as_bytes(), "")
        .is_err());
}

#[test]
fn test_wrong_bundle_password_is_invalid() {
    let err = decode_certificate(RSA_BUNDLE, "wrong").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidCertificate);
    assert_eq!(err.related()[0].kind(), ErrorKind::InvalidCertificate);
}
