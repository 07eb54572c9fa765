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

use azauth_core::{Error, Result};

/// Name used when no environment is configured.
pub const DEFAULT_AZURE_ENVIRONMENT: &str = "AZUREPUBLICCLOUD";

/// AzureEnvironment describes one Azure cloud deployment and its service endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AzureEnvironment {
    /// Canonical name of the cloud.
    pub name: &'static str,
    /// Authority host used to redeem credentials for tokens.
    pub active_directory_endpoint: &'static str,
    /// Azure Resource Manager endpoint.
    pub resource_manager_endpoint: &'static str,
    /// DNS suffix of Key Vault instances.
    pub key_vault_dns_suffix: &'static str,
    /// DNS suffix of storage accounts.
    pub storage_endpoint_suffix: &'static str,
    /// DNS suffix of Service Bus namespaces.
    pub service_bus_endpoint_suffix: &'static str,
}

/// The global Azure cloud.
pub const PUBLIC_CLOUD: AzureEnvironment = AzureEnvironment {
    name: "AzurePublicCloud",
    active_directory_endpoint: "https://login.microsoftonline.com/",
    resource_manager_endpoint: "https://management.azure.com/",
    key_vault_dns_suffix: "vault.azure.net",
    storage_endpoint_suffix: "core.windows.net",
    service_bus_endpoint_suffix: "servicebus.windows.net",
};

/// Azure operated by 21Vianet.
pub const CHINA_CLOUD: AzureEnvironment = AzureEnvironment {
    name: "AzureChinaCloud",
    active_directory_endpoint: "https://login.chinacloudapi.cn/",
    resource_manager_endpoint: "https://management.chinacloudapi.cn/",
    key_vault_dns_suffix: "vault.azure.cn",
    storage_endpoint_suffix: "core.chinacloudapi.cn",
    service_bus_endpoint_suffix: "servicebus.chinacloudapi.cn",
};

/// Azure Government.
pub const US_GOVERNMENT_CLOUD: AzureEnvironment = AzureEnvironment {
    name: "AzureUSGovernmentCloud",
    active_directory_endpoint: "https://login.microsoftonline.us/",
    resource_manager_endpoint: "https://management.usgovcloudapi.net/",
    key_vault_dns_suffix: "vault.usgovcloudapi.net",
    storage_endpoint_suffix: "core.usgovcloudapi.net",
    service_bus_endpoint_suffix: "servicebus.usgovcloudapi.net",
};

/// Azure Germany.
pub const GERMAN_CLOUD: AzureEnvironment = AzureEnvironment {
    name: "AzureGermanCloud",
    active_directory_endpoint: "https://login.microsoftonline.de/",
    resource_manager_endpoint: "https://management.microsoftazure.de/",
    key_vault_dns_suffix: "vault.microsoftazure.de",
    storage_endpoint_suffix: "core.cloudapi.de",
    service_bus_endpoint_suffix: "servicebus.cloudapi.de",
};

impl AzureEnvironment {
    /// Look up an environment by name, ignoring case.
    ///
    /// Accepted names are `AZUREPUBLICCLOUD` (or `AZURECLOUD`), `AZURECHINACLOUD`,
    /// `AZUREUSGOVERNMENTCLOUD` (or `AZUREUSGOVERNMENT`) and `AZUREGERMANCLOUD`.
    pub fn from_name(name: &str) -> Result<&'static AzureEnvironment> {
        match name.trim().to_ascii_uppercase().as_str() {
            "AZUREPUBLICCLOUD" | "AZURECLOUD" => Ok(&PUBLIC_CLOUD),
            "AZURECHINACLOUD" => Ok(&CHINA_CLOUD),
            "AZUREUSGOVERNMENTCLOUD" | "AZUREUSGOVERNMENT" => Ok(&US_GOVERNMENT_CLOUD),
            "AZUREGERMANCLOUD" => Ok(&GERMAN_CLOUD),
            _ => Err(Error::unknown_environment(format!(
                "there is no cloud environment matching the name {:?}",
                name.to_ascii_uppercase()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use azauth_core::ErrorKind;
    use test_case::test_case;

    #[test_case("AzurePublicCloud", &PUBLIC_CLOUD)]
    #[test_case("azurecloud", &PUBLIC_CLOUD)]
    #[test_case("AZURECHINACLOUD", &CHINA_CLOUD)]
    #[test_case("AzureUSGovernment", &US_GOVERNMENT_CLOUD)]
    #[test_case("azureusgovernmentcloud", &US_GOVERNMENT_CLOUD)]
    #[test_case(" AzureGermanCloud ", &GERMAN_CLOUD)]
    fn test_from_name(name: &str, expected: &AzureEnvironment) {
        assert_eq!(AzureEnvironment::from_name(name).unwrap(), expected);
    }

    #[test]
    fn test_default_name_resolves() {
        let env = AzureEnvironment::from_name(DEFAULT_AZURE_ENVIRONMENT).unwrap();
        assert_eq!(env.name, "AzurePublicCloud");
        assert_eq!(
            env.active_directory_endpoint,
            "https://login.microsoftonline.com/"
        );
    }

    #[test]
    fn test_unknown_name() {
        let err = AzureEnvironment::from_name("AzureMoonCloud").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnknownEnvironment);
        assert!(err.to_string().contains("AZUREMOONCLOUD"));
    }
}
