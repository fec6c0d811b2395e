//! DNS-01 challenge orchestration
//!
//! The [`ChallengeAuthenticator`] reconciles the TXT record at a validation
//! name with the tokens currently being validated:
//!
//! ```text
//!              perform(token)                      cleanup(token)
//!                   │                                    │
//!          ┌────────┴────────┐                  ┌────────┴─────────┐
//!     record missing    record exists      tokens left ≤ 1    tokens left ≥ 2
//!          │                 │                  │                  │
//!     add_record      update_record        delete_record     update_record
//!                   (append token)                          (drop token)
//! ```
//!
//! ## Event Flow
//!
//! 1. Normalize the validation name to an FQDN
//! 2. Resolve the zone for the domain
//! 3. Look up the TXT record at the name
//! 4. Add, update or delete it
//!
//! Every call re-reads provider state. There is no locking between the read
//! and the write, so two concurrent calls on the same name can lose an
//! update.

pub mod values;

use async_trait::async_trait;
use tracing::{debug, error, info};

use crate::error::{Error, PluginError, Result};
use crate::traits::{Authenticator, CredentialKey, PluginInfo, ZoneRecordApi};

/// TTL in seconds for every record written during a challenge
pub const CHALLENGE_TTL: u32 = 60;

/// Record type used for challenge records
pub const TXT: &str = "TXT";

/// Challenge authenticator backed by a provider client
pub struct ChallengeAuthenticator {
    /// Provider client used for all zone/record operations
    api: Box<dyn ZoneRecordApi>,

    /// Plugin metadata reported to the host
    info: PluginInfo,
}

impl ChallengeAuthenticator {
    /// Create an authenticator for the given provider client
    pub fn new(api: Box<dyn ZoneRecordApi>, info: PluginInfo) -> Self {
        Self { api, info }
    }

    /// Look up the ID and value of the TXT record at `fqdn`
    async fn lookup(&self, zone_id: &str, fqdn: &str) -> Result<(String, String)> {
        let record_id = self.api.get_record_id_by_name(zone_id, fqdn).await?;
        let value = self.api.get_record_value_by_name(zone_id, fqdn).await?;
        Ok((record_id, value))
    }

    async fn publish(&self, domain: &str, fqdn: &str, validation: &str) -> Result<()> {
        let zone_id = self.api.get_zone_id_by_domain(domain).await?;

        match self.lookup(&zone_id, fqdn).await {
            Ok((record_id, current)) => {
                let mut tokens = values::split(&current);
                if tokens.iter().any(|token| token == validation) {
                    info!(record = %fqdn, "Validation token already published");
                    return Ok(());
                }

                tokens.push(validation.to_string());
                let value = values::join(&tokens);

                info!(
                    record = %fqdn,
                    record_id = %record_id,
                    tokens = tokens.len(),
                    "Appending validation token to existing TXT record"
                );
                self.api
                    .update_record(domain, &record_id, TXT, fqdn, &value, CHALLENGE_TTL)
                    .await?;
            }
            Err(Error::RecordNotFound(_)) => {
                info!(record = %fqdn, "Creating TXT record");
                self.api
                    .add_record(domain, TXT, fqdn, validation, CHALLENGE_TTL)
                    .await?;
            }
            Err(e) => return Err(e),
        }

        Ok(())
    }

    async fn withdraw(&self, domain: &str, fqdn: &str, validation: &str) -> Result<()> {
        let zone_id = self.api.get_zone_id_by_domain(domain).await?;
        let (record_id, current) = self.lookup(&zone_id, fqdn).await?;

        let mut tokens = values::split(&current);
        let before = tokens.len();
        tokens.retain(|token| token != validation);
        let removed = tokens.len() != before;

        // A single leftover value is removed together with the record.
        if tokens.len() <= 1 {
            info!(record = %fqdn, remaining = tokens.len(), "Deleting TXT record");
            self.api.delete_record_by_name(domain, fqdn).await?;
        } else if removed {
            info!(
                record = %fqdn,
                record_id = %record_id,
                remaining = tokens.len(),
                "Removing validation token from TXT record"
            );
            let value = values::join(&tokens);
            self.api
                .update_record(domain, &record_id, TXT, fqdn, &value, CHALLENGE_TTL)
                .await?;
        } else {
            debug!(record = %fqdn, "Validation token not present, record left unchanged");
        }

        Ok(())
    }
}

#[async_trait]
impl Authenticator for ChallengeAuthenticator {
    fn description(&self) -> &'static str {
        self.info.description
    }

    fn more_info(&self) -> &'static str {
        self.info.more_info
    }

    fn required_credentials(&self) -> &'static [CredentialKey] {
        self.info.credentials
    }

    fn default_propagation_seconds(&self) -> u64 {
        self.info.propagation_seconds
    }

    async fn perform(
        &self,
        domain: &str,
        validation_name: &str,
        validation: &str,
    ) -> std::result::Result<(), PluginError> {
        let fqdn = values::fqdn(validation_name);
        debug!(
            provider = self.api.provider_name(),
            domain = %domain,
            record = %fqdn,
            "Performing DNS-01 challenge"
        );

        self.publish(domain, &fqdn, validation).await.map_err(|e| {
            error!(domain = %domain, record = %fqdn, error = %e, "DNS-01 perform failed");
            PluginError::from(e)
        })
    }

    async fn cleanup(
        &self,
        domain: &str,
        validation_name: &str,
        validation: &str,
    ) -> std::result::Result<(), PluginError> {
        let fqdn = values::fqdn(validation_name);
        debug!(
            provider = self.api.provider_name(),
            domain = %domain,
            record = %fqdn,
            "Cleaning up DNS-01 challenge"
        );

        match self.withdraw(domain, &fqdn, validation).await {
            Ok(()) => Ok(()),
            Err(Error::RecordNotFound(_)) => {
                info!(record = %fqdn, "No TXT record left to clean up");
                Ok(())
            }
            Err(e) => {
                error!(domain = %domain, record = %fqdn, error = %e, "DNS-01 cleanup failed");
                Err(PluginError::from(e))
            }
        }
    }
}

impl std::fmt::Debug for ChallengeAuthenticator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChallengeAuthenticator")
            .field("provider", &self.api.provider_name())
            .field("info", &self.info.name)
            .finish()
    }
}
