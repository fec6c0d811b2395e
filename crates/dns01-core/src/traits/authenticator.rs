// # Authenticator Trait
//
// The contract an issuance tool uses to drive a DNS-01 challenge: two entry
// points plus the metadata a host needs to describe the plugin and prompt
// for credentials.

use async_trait::async_trait;

use crate::error::PluginError;

/// A credential the plugin requires from its host
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CredentialKey {
    /// Key name inside the credentials file
    pub name: &'static str,
    /// Help text shown when the key is missing
    pub help: &'static str,
}

/// Static description of a provider plugin
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInfo {
    /// Short provider name (e.g. "hetzner")
    pub name: &'static str,
    /// One-line description
    pub description: &'static str,
    /// Longer help text
    pub more_info: &'static str,
    /// Credential keys the host must supply
    pub credentials: &'static [CredentialKey],
    /// Seconds to wait for propagation after `perform`
    pub propagation_seconds: u64,
}

/// DNS-01 challenge authenticator
///
/// `perform` publishes `validation` under `validation_name` before the CA
/// checks it; `cleanup` withdraws it afterwards. Both are safe to call for
/// names that already carry values from other concurrent challenges.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// One-line description of the plugin
    fn description(&self) -> &'static str;

    /// Longer help text for CLI output
    fn more_info(&self) -> &'static str;

    /// Credential keys the host must supply
    fn required_credentials(&self) -> &'static [CredentialKey];

    /// Seconds the host should wait after `perform` before validation
    fn default_propagation_seconds(&self) -> u64 {
        60
    }

    /// Publish a validation token
    async fn perform(
        &self,
        domain: &str,
        validation_name: &str,
        validation: &str,
    ) -> Result<(), PluginError>;

    /// Withdraw a validation token
    async fn cleanup(
        &self,
        domain: &str,
        validation_name: &str,
        validation: &str,
    ) -> Result<(), PluginError>;
}
