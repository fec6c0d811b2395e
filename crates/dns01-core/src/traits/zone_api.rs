// # Zone Record API Trait
//
// Defines the interface a DNS provider client must offer for the DNS-01
// challenge workflow: zone lookup, TXT record lookup, create, replace and
// delete.
//
// ## Implementations
//
// - Hetzner DNS: `dns01-provider-hetzner` crate
//
// ## Usage
//
// ```rust,ignore
// use dns01_core::ZoneRecordApi;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let api = /* ZoneRecordApi implementation */;
//
//     let zone_id = api.get_zone_id_by_domain("example.com").await?;
//     let value = api
//         .get_record_value_by_name(&zone_id, "_acme-challenge.example.com.")
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A DNS resource record as stored by the provider
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Provider-assigned record ID
    pub id: String,
    /// Provider-assigned ID of the zone holding the record
    pub zone_id: String,
    /// Record type (always `TXT` in this workspace)
    pub record_type: String,
    /// Record name as stored by the provider
    pub name: String,
    /// Record value; may hold several challenge tokens
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: Option<u32>,
}

/// Trait for DNS provider clients
///
/// Every method performs a linear sequence of HTTP requests and classifies
/// failures into [`crate::Error`]:
///
/// - transport failures → [`Error::Connection`](crate::Error::Connection)
/// - rejected token → [`Error::NotAuthorized`](crate::Error::NotAuthorized)
/// - missing zone → [`Error::ZoneNotFound`](crate::Error::ZoneNotFound)
/// - missing TXT record → [`Error::RecordNotFound`](crate::Error::RecordNotFound)
/// - unexpected status or body → [`Error::MalformedResponse`](crate::Error::MalformedResponse)
///
/// Implementations must not retry, cache zone IDs between calls, or spawn
/// tasks. Retry policy belongs to the caller.
#[async_trait]
pub trait ZoneRecordApi: Send + Sync {
    /// Resolve the zone managing `domain`
    async fn get_zone_id_by_domain(&self, domain: &str) -> Result<String, crate::Error>;

    /// Find the ID of the TXT record at `fqdn` inside a zone
    async fn get_record_id_by_name(&self, zone_id: &str, fqdn: &str)
    -> Result<String, crate::Error>;

    /// Find the value of the TXT record at `fqdn` inside a zone
    async fn get_record_value_by_name(
        &self,
        zone_id: &str,
        fqdn: &str,
    ) -> Result<String, crate::Error>;

    /// Create a record in the zone managing `domain`
    async fn add_record(
        &self,
        domain: &str,
        record_type: &str,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Record, crate::Error>;

    /// Replace an existing record in place
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        record_type: &str,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Record, crate::Error>;

    /// Delete the TXT record at `fqdn` in the zone managing `domain`
    async fn delete_record_by_name(&self, domain: &str, fqdn: &str) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
