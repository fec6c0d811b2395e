// # Hetzner DNS Provider
//
// Provider client for the Hetzner DNS API, used by the DNS-01 challenge
// workflow in `dns01-core`.
//
// ## Behavior
//
// - One linear sequence of HTTP requests per call
// - Zone IDs are looked up on every call, never cached
// - No retry, no backoff: every failure is classified and returned
// - HTTP timeout configured (30 seconds)
//
// ## Error Classification
//
// | condition                         | error               |
// |-----------------------------------|---------------------|
// | connect/timeout/body read failure | `Connection`        |
// | 401, 403                          | `NotAuthorized`     |
// | 404 on zone endpoints             | `ZoneNotFound`      |
// | 404 on record endpoints           | `RecordNotFound`    |
// | other status, undecodable body    | `MalformedResponse` |
//
// ## Security Requirements
//
// - API token NEVER appears in logs or Debug output
// - Construction fails if the token is empty
//
// ## API Reference
//
// - Hetzner DNS API v1: https://dns.hetzner.com/api-docs
// - List Zones: GET `/zones?page=...&per_page=...`
// - Get Zone: GET `/zones/:zone_id`
// - List Records: GET `/records?zone_id=...`
// - Create Record: POST `/records`
// - Update Record: PUT `/records/:record_id`
// - Delete Record: DELETE `/records/:record_id`

use async_trait::async_trait;
use dns01_core::traits::{CredentialKey, PluginInfo, Record, ZoneRecordApi};
use dns01_core::{ChallengeAuthenticator, Error, PluginConfig, Result, TXT};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Hetzner DNS API base URL
pub const HETZNER_API_BASE: &str = "https://dns.hetzner.com/api/v1";

/// Header carrying the API token
const AUTH_HEADER: &str = "Auth-API-Token";

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Page size for zone listings (API maximum)
const ZONES_PER_PAGE: u32 = 100;

/// Plugin metadata for Hetzner DNS
pub const HETZNER_PLUGIN: PluginInfo = PluginInfo {
    name: "hetzner",
    description: "Obtain certificates using a DNS TXT record (if you are using Hetzner for DNS).",
    more_info: "This plugin configures a DNS TXT record to respond to a dns-01 challenge using \
                the Hetzner API.",
    credentials: &[CredentialKey {
        name: "api_token",
        help: "Hetzner API Token from 'https://dns.hetzner.com/settings/api-token'",
    }],
    propagation_seconds: 60,
};

/// Build a challenge authenticator talking to Hetzner DNS
pub fn authenticator(config: &PluginConfig) -> Result<ChallengeAuthenticator> {
    let client = HetznerClient::from_config(config)?;
    Ok(ChallengeAuthenticator::new(Box::new(client), HETZNER_PLUGIN))
}

/// Hetzner DNS client
///
/// Stateless apart from the token: every call re-reads zones and records.
pub struct HetznerClient {
    /// Hetzner DNS API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// API base URL (without trailing slash)
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for HetznerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HetznerClient")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HetznerClient {
    /// Create a client for the public Hetzner DNS API
    pub fn new(api_token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_token, HETZNER_API_BASE)
    }

    /// Create a client for a custom API base URL
    pub fn with_base_url(api_token: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_token = api_token.into();
        if api_token.trim().is_empty() {
            return Err(Error::config("Hetzner API token cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(DEFAULT_HTTP_TIMEOUT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Create a client from hook configuration
    pub fn from_config(config: &PluginConfig) -> Result<Self> {
        config.validate()?;
        match config.api_base {
            Some(ref base) => Self::with_base_url(config.credentials.api_token.clone(), base),
            None => Self::new(config.credentials.api_token.clone()),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send a request and classify the outcome
    ///
    /// `not_found` is returned for HTTP 404.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
        not_found: Error,
    ) -> Result<T> {
        let body = self.send(request, context, not_found).await?;
        serde_json::from_str(&body).map_err(|e| {
            Error::malformed(format!("{}: unexpected response body: {}", context, e))
        })
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
        not_found: Error,
    ) -> Result<String> {
        let response = request
            .header(AUTH_HEADER, &self.api_token)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::connection(format!("{}: request timed out: {}", context, e))
                } else {
                    Error::connection(format!("{}: HTTP request failed: {}", context, e))
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Error::connection(format!("{}: failed to read response: {}", context, e)))?;

        if status.is_success() {
            return Ok(body);
        }

        match status.as_u16() {
            401 | 403 => Err(Error::not_authorized(format!(
                "{}: invalid API token or insufficient permissions. Status: {}",
                context, status
            ))),
            404 => Err(not_found),
            _ => Err(Error::malformed(format!(
                "{}: unexpected status {} - {}",
                context, status, body
            ))),
        }
    }

    /// Get the zone name for a zone ID
    ///
    /// ```http
    /// GET /zones/:zone_id
    /// Auth-API-Token: <token>
    /// ```
    async fn get_zone_name(&self, zone_id: &str) -> Result<String> {
        let response: ZoneResponse = self
            .execute(
                self.client.get(self.url(&format!("/zones/{}", zone_id))),
                "Zone lookup",
                Error::zone_not_found(zone_id),
            )
            .await?;

        Ok(normalize(&response.zone.name).to_string())
    }

    /// List every zone visible to the token, following pagination
    ///
    /// ```http
    /// GET /zones?page=:page&per_page=100
    /// Auth-API-Token: <token>
    /// ```
    async fn list_zones(&self, domain: &str) -> Result<Vec<ApiZone>> {
        let mut zones = Vec::new();
        let mut page = 1;

        loop {
            let response: ZonesResponse = self
                .execute(
                    self.client.get(self.url(&format!(
                        "/zones?page={}&per_page={}",
                        page, ZONES_PER_PAGE
                    ))),
                    "Zone lookup",
                    Error::zone_not_found(domain),
                )
                .await?;

            zones.extend(response.zones);

            let last_page = response
                .meta
                .map_or(page, |meta| meta.pagination.last_page);
            if page >= last_page {
                break;
            }
            tracing::debug!(page, last_page, "Fetching next page of zones");
            page += 1;
        }

        Ok(zones)
    }

    /// Find the TXT record at `fqdn`
    ///
    /// Stored names match when equal to the FQDN (with or without trailing
    /// dot) or to the name relative to the zone.
    ///
    /// ```http
    /// GET /records?zone_id=:zone_id
    /// Auth-API-Token: <token>
    /// ```
    async fn find_txt_record(&self, zone_id: &str, fqdn: &str) -> Result<ApiRecord> {
        tracing::debug!(zone_id = %zone_id, record = %fqdn, "Looking up TXT record");

        let response: RecordsResponse = self
            .execute(
                self.client
                    .get(self.url(&format!("/records?zone_id={}", zone_id))),
                "Record lookup",
                Error::record_not_found(fqdn),
            )
            .await?;

        let target = normalize(fqdn);
        let (exact, others): (Vec<ApiRecord>, Vec<ApiRecord>) = response
            .records
            .into_iter()
            .filter(|record| record.record_type.eq_ignore_ascii_case(TXT))
            .partition(|record| normalize(&record.name).eq_ignore_ascii_case(target));

        if let Some(record) = exact.into_iter().next() {
            tracing::debug!(record_id = %record.id, "Found TXT record");
            return Ok(record);
        }

        if others.is_empty() {
            return Err(Error::record_not_found(fqdn));
        }

        let zone_name = self.get_zone_name(zone_id).await?;
        let relative = relative_name(target, &zone_name);
        others
            .into_iter()
            .find(|record| record.name.eq_ignore_ascii_case(&relative))
            .inspect(|record| tracing::debug!(record_id = %record.id, "Found TXT record"))
            .ok_or_else(|| Error::record_not_found(fqdn))
    }
}

#[async_trait]
impl ZoneRecordApi for HetznerClient {
    /// Resolve the zone managing `domain`
    ///
    /// All pages of the zone listing are searched before the most specific
    /// match is picked.
    async fn get_zone_id_by_domain(&self, domain: &str) -> Result<String> {
        tracing::debug!(domain = %domain, "Looking up zone ID");

        let zones = self.list_zones(domain).await?;

        let zone = base_domain_guesses(domain)
            .into_iter()
            .find_map(|guess| {
                zones
                    .iter()
                    .find(|zone| normalize(&zone.name).eq_ignore_ascii_case(guess))
            })
            .ok_or_else(|| Error::zone_not_found(domain))?;

        tracing::debug!(zone_id = %zone.id, zone_name = %zone.name, "Found zone");
        Ok(zone.id.clone())
    }

    async fn get_record_id_by_name(&self, zone_id: &str, fqdn: &str) -> Result<String> {
        self.find_txt_record(zone_id, fqdn).await.map(|record| record.id)
    }

    async fn get_record_value_by_name(&self, zone_id: &str, fqdn: &str) -> Result<String> {
        self.find_txt_record(zone_id, fqdn)
            .await
            .map(|record| record.value)
    }

    /// ```http
    /// POST /records
    /// {"zone_id": "...", "type": "TXT", "name": "...", "value": "...", "ttl": 60}
    /// ```
    async fn add_record(
        &self,
        domain: &str,
        record_type: &str,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Record> {
        let zone_id = self.get_zone_id_by_domain(domain).await?;

        tracing::info!(record = %name, record_type = %record_type, "Creating Hetzner DNS record");

        let payload = RecordPayload {
            zone_id: &zone_id,
            record_type,
            name,
            value,
            ttl,
        };

        let response: RecordResponse = self
            .execute(
                self.client.post(self.url("/records")).json(&payload),
                "Record creation",
                Error::zone_not_found(domain),
            )
            .await?;

        tracing::info!(record_id = %response.record.id, "DNS record created");
        Ok(response.record.into())
    }

    /// ```http
    /// PUT /records/:record_id
    /// {"zone_id": "...", "type": "TXT", "name": "...", "value": "...", "ttl": 60}
    /// ```
    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        record_type: &str,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Record> {
        let zone_id = self.get_zone_id_by_domain(domain).await?;

        tracing::info!(
            record = %name,
            record_id = %record_id,
            record_type = %record_type,
            "Updating Hetzner DNS record"
        );

        let payload = RecordPayload {
            zone_id: &zone_id,
            record_type,
            name,
            value,
            ttl,
        };

        let response: RecordResponse = self
            .execute(
                self.client
                    .put(self.url(&format!("/records/{}", record_id)))
                    .json(&payload),
                "Record update",
                Error::record_not_found(name),
            )
            .await?;

        tracing::info!(record_id = %response.record.id, "DNS record updated");
        Ok(response.record.into())
    }

    /// ```http
    /// DELETE /records/:record_id
    /// ```
    async fn delete_record_by_name(&self, domain: &str, fqdn: &str) -> Result<()> {
        let zone_id = self.get_zone_id_by_domain(domain).await?;
        let record_id = self.get_record_id_by_name(&zone_id, fqdn).await?;

        tracing::info!(record = %fqdn, record_id = %record_id, "Deleting Hetzner DNS record");

        self.send(
            self.client
                .delete(self.url(&format!("/records/{}", record_id))),
            "Record deletion",
            Error::record_not_found(fqdn),
        )
        .await?;

        tracing::info!(record_id = %record_id, "DNS record deleted");
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "hetzner"
    }
}

/// Strip a trailing dot
fn normalize(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// Candidate zone names for a domain, most specific first
///
/// `a.b.example.com` → `a.b.example.com`, `b.example.com`, `example.com`, `com`
fn base_domain_guesses(domain: &str) -> Vec<&str> {
    let mut guesses = Vec::new();
    let mut current = normalize(domain);
    while !current.is_empty() {
        guesses.push(current);
        current = match current.find('.') {
            Some(pos) => &current[pos + 1..],
            None => "",
        };
    }
    guesses
}

/// Name of `fqdn` relative to `zone_name` (`@` for the apex)
fn relative_name(fqdn: &str, zone_name: &str) -> String {
    let fqdn = normalize(fqdn);
    let zone_name = normalize(zone_name);
    if fqdn.eq_ignore_ascii_case(zone_name) {
        return "@".to_string();
    }

    let split = fqdn.len().saturating_sub(zone_name.len() + 1);
    match (fqdn.get(..split), fqdn.get(split..)) {
        (Some(label), Some(suffix))
            if !label.is_empty()
                && suffix.starts_with('.')
                && suffix[1..].eq_ignore_ascii_case(zone_name) =>
        {
            label.to_string()
        }
        _ => fqdn.to_string(),
    }
}

// Hetzner API types

#[derive(Debug, Deserialize)]
struct ZonesResponse {
    zones: Vec<ApiZone>,
    #[serde(default)]
    meta: Option<ZonesMeta>,
}

#[derive(Debug, Deserialize)]
struct ZonesMeta {
    pagination: Pagination,
}

#[derive(Debug, Deserialize)]
struct Pagination {
    #[serde(default = "first_page")]
    last_page: u32,
}

fn first_page() -> u32 {
    1
}

#[derive(Debug, Deserialize)]
struct ZoneResponse {
    zone: ApiZone,
}

#[derive(Debug, Deserialize)]
struct ApiZone {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RecordsResponse {
    #[serde(default)]
    records: Vec<ApiRecord>,
}

#[derive(Debug, Deserialize)]
struct RecordResponse {
    record: ApiRecord,
}

#[derive(Debug, Deserialize)]
struct ApiRecord {
    id: String,
    #[serde(default)]
    zone_id: String,
    #[serde(rename = "type")]
    record_type: String,
    name: String,
    value: String,
    #[serde(default)]
    ttl: Option<u32>,
}

impl From<ApiRecord> for Record {
    fn from(record: ApiRecord) -> Self {
        Self {
            id: record.id,
            zone_id: record.zone_id,
            record_type: record.record_type,
            name: record.name,
            value: record.value,
            ttl: record.ttl,
        }
    }
}

#[derive(Debug, Serialize)]
struct RecordPayload<'a> {
    zone_id: &'a str,
    #[serde(rename = "type")]
    record_type: &'a str,
    name: &'a str,
    value: &'a str,
    ttl: u32,
}
