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

mod certificate_decoder;
mod credential_chain;

pub(crate) const RSA_CERT: &str = include_str!("../../testdata/rsa_cert.pem");
pub(crate) const RSA_KEY_PKCS8: &str = include_str!("../../testdata/rsa_key_pkcs8.pem");
pub(crate) const RSA_KEY_PKCS1: &str = include_str!("../../testdata/rsa_key_pkcs1.pem");
pub(crate) const RSA_COMBINED: &str = include_str!("../../testdata/rsa_combined.pem");
pub(crate) const EC_CERT: &str = include_str!("../../testdata/ec_cert.pem");
pub(crate) const EC_KEY_PKCS8: &str = include_str!("../../testdata/ec_key_pkcs8.pem");
pub(crate) const RSA_BUNDLE: &[u8] = include_bytes!("../../testdata/rsa_bundle.pfx");
pub(crate) const EC_BUNDLE: &[u8] = include_bytes!("../../testdata/ec_bundle.pfx");
pub(crate) const BUNDLE_PASSWORD: &str = "azauth-test";

pub(crate) fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}
