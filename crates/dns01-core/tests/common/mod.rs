//! Test doubles and common utilities for challenge contract tests
//!
//! [`FakeZoneApi`] keeps zones and TXT records in memory, records every
//! call made through [`ZoneRecordApi`], and can be told to fail a given
//! operation with any error kind.

#![allow(dead_code)]

use dns01_core::error::{Error, Result};
use dns01_core::traits::{CredentialKey, PluginInfo, Record, ZoneRecordApi};
use dns01_core::ChallengeAuthenticator;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub const DOMAIN: &str = "example.com";
pub const ZONE_ID: &str = "zone-1";
pub const VALIDATION_NAME: &str = "_acme-challenge.example.com";
pub const VALIDATION_FQDN: &str = "_acme-challenge.example.com.";

pub const TEST_PLUGIN: PluginInfo = PluginInfo {
    name: "fake",
    description: "Fake DNS provider",
    more_info: "Keeps records in memory",
    credentials: &[CredentialKey {
        name: "api_token",
        help: "Fake API token",
    }],
    propagation_seconds: 0,
};

/// Provider operations that can be made to fail
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    GetZoneId,
    GetRecordId,
    GetRecordValue,
    Add,
    Update,
    Delete,
}

/// A recorded provider call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetZoneId {
        domain: String,
    },
    GetRecordId {
        zone_id: String,
        fqdn: String,
    },
    GetRecordValue {
        zone_id: String,
        fqdn: String,
    },
    Add {
        domain: String,
        record_type: String,
        name: String,
        value: String,
        ttl: u32,
    },
    Update {
        domain: String,
        record_id: String,
        record_type: String,
        name: String,
        value: String,
        ttl: u32,
    },
    Delete {
        domain: String,
        fqdn: String,
    },
}

/// In-memory provider client
#[derive(Clone, Default)]
pub struct FakeZoneApi {
    /// domain → zone ID
    zones: Arc<Mutex<HashMap<String, String>>>,
    /// (zone ID, name) → record
    records: Arc<Mutex<HashMap<(String, String), Record>>>,
    calls: Arc<Mutex<Vec<Call>>>,
    failures: Arc<Mutex<HashMap<Op, Error>>>,
    next_id: Arc<AtomicUsize>,
}

impl FakeZoneApi {
    /// Create a fake with the `example.com` zone and no records
    pub fn new() -> Self {
        let api = Self::default();
        api.zones
            .lock()
            .unwrap()
            .insert(DOMAIN.to_string(), ZONE_ID.to_string());
        api
    }

    /// Create a fake that already holds a TXT record at the validation name
    pub fn with_record(value: &str) -> Self {
        let api = Self::new();
        api.insert_record(VALIDATION_FQDN, value);
        api
    }

    /// Insert a TXT record directly (not recorded as a call)
    pub fn insert_record(&self, name: &str, value: &str) {
        let id = self.allocate_id();
        self.records.lock().unwrap().insert(
            (ZONE_ID.to_string(), name.to_string()),
            Record {
                id,
                zone_id: ZONE_ID.to_string(),
                record_type: "TXT".to_string(),
                name: name.to_string(),
                value: value.to_string(),
                ttl: Some(60),
            },
        );
    }

    /// Make an operation fail with the given error
    pub fn fail_on(&self, op: Op, error: Error) {
        self.failures.lock().unwrap().insert(op, error);
    }

    /// Build an authenticator sharing this fake's state
    pub fn authenticator(&self) -> ChallengeAuthenticator {
        ChallengeAuthenticator::new(Box::new(self.clone()), TEST_PLUGIN)
    }

    /// All calls made so far
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Only the mutating calls (add, update, delete)
    pub fn writes(&self) -> Vec<Call> {
        self.calls()
            .into_iter()
            .filter(|call| {
                matches!(
                    call,
                    Call::Add { .. } | Call::Update { .. } | Call::Delete { .. }
                )
            })
            .collect()
    }

    /// Current value of the TXT record at the validation name
    pub fn value(&self) -> Option<String> {
        self.value_at(VALIDATION_FQDN)
    }

    /// Current value of the TXT record at `name`
    pub fn value_at(&self, name: &str) -> Option<String> {
        self.records
            .lock()
            .unwrap()
            .get(&(ZONE_ID.to_string(), name.to_string()))
            .map(|record| record.value.clone())
    }

    fn allocate_id(&self) -> String {
        format!("record-{}", self.next_id.fetch_add(1, Ordering::SeqCst) + 1)
    }

    fn record_call(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check(&self, op: Op) -> Result<()> {
        match self.failures.lock().unwrap().get(&op) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    fn zone_for(&self, domain: &str) -> Result<String> {
        self.zones
            .lock()
            .unwrap()
            .get(domain)
            .cloned()
            .ok_or_else(|| Error::zone_not_found(domain))
    }

    fn find(&self, zone_id: &str, fqdn: &str) -> Result<Record> {
        self.records
            .lock()
            .unwrap()
            .get(&(zone_id.to_string(), fqdn.to_string()))
            .cloned()
            .ok_or_else(|| Error::record_not_found(fqdn))
    }
}

#[async_trait::async_trait]
impl ZoneRecordApi for FakeZoneApi {
    async fn get_zone_id_by_domain(&self, domain: &str) -> Result<String> {
        self.record_call(Call::GetZoneId {
            domain: domain.to_string(),
        });
        self.check(Op::GetZoneId)?;
        self.zone_for(domain)
    }

    async fn get_record_id_by_name(&self, zone_id: &str, fqdn: &str) -> Result<String> {
        self.record_call(Call::GetRecordId {
            zone_id: zone_id.to_string(),
            fqdn: fqdn.to_string(),
        });
        self.check(Op::GetRecordId)?;
        self.find(zone_id, fqdn).map(|record| record.id)
    }

    async fn get_record_value_by_name(&self, zone_id: &str, fqdn: &str) -> Result<String> {
        self.record_call(Call::GetRecordValue {
            zone_id: zone_id.to_string(),
            fqdn: fqdn.to_string(),
        });
        self.check(Op::GetRecordValue)?;
        self.find(zone_id, fqdn).map(|record| record.value)
    }

    async fn add_record(
        &self,
        domain: &str,
        record_type: &str,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Record> {
        self.record_call(Call::Add {
            domain: domain.to_string(),
            record_type: record_type.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            ttl,
        });
        self.check(Op::Add)?;

        let zone_id = self.zone_for(domain)?;
        let record = Record {
            id: self.allocate_id(),
            zone_id: zone_id.clone(),
            record_type: record_type.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            ttl: Some(ttl),
        };
        self.records
            .lock()
            .unwrap()
            .insert((zone_id, name.to_string()), record.clone());
        Ok(record)
    }

    async fn update_record(
        &self,
        domain: &str,
        record_id: &str,
        record_type: &str,
        name: &str,
        value: &str,
        ttl: u32,
    ) -> Result<Record> {
        self.record_call(Call::Update {
            domain: domain.to_string(),
            record_id: record_id.to_string(),
            record_type: record_type.to_string(),
            name: name.to_string(),
            value: value.to_string(),
            ttl,
        });
        self.check(Op::Update)?;

        let zone_id = self.zone_for(domain)?;
        let mut records = self.records.lock().unwrap();
        let record = records
            .get_mut(&(zone_id, name.to_string()))
            .filter(|record| record.id == record_id)
            .ok_or_else(|| Error::record_not_found(record_id))?;
        record.value = value.to_string();
        record.ttl = Some(ttl);
        Ok(record.clone())
    }

    async fn delete_record_by_name(&self, domain: &str, fqdn: &str) -> Result<()> {
        self.record_call(Call::Delete {
            domain: domain.to_string(),
            fqdn: fqdn.to_string(),
        });
        self.check(Op::Delete)?;

        let zone_id = self.zone_for(domain)?;
        self.records
            .lock()
            .unwrap()
            .remove(&(zone_id, fqdn.to_string()))
            .map(|_| ())
            .ok_or_else(|| Error::record_not_found(fqdn))
    }

    fn provider_name(&self) -> &'static str {
        "fake"
    }
}
