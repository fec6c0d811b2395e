//! Core traits for DNS-01 challenge handling
//!
//! - [`ZoneRecordApi`]: Provider client for zone and TXT record operations
//! - [`Authenticator`]: Entry points and metadata exposed to the issuance tool

pub mod authenticator;
pub mod zone_api;

pub use authenticator::{Authenticator, CredentialKey, PluginInfo};
pub use zone_api::{Record, ZoneRecordApi};
