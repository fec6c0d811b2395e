// # dns01-core
//
// Core library for DNS-01 ACME challenge automation.
//
// ## Architecture Overview
//
// - **ZoneRecordApi**: Trait for provider clients (zone lookup, TXT record CRUD)
// - **Authenticator**: Trait exposing `perform`/`cleanup` and plugin metadata
// - **ChallengeAuthenticator**: Reconciles the TXT record at a validation name
//   with the tokens being validated (add, merge, shrink, delete)
// - **Credentials / PluginConfig**: Resolved configuration handed to the core
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Wire formats stay inside provider crates
// 2. **Typed failures**: "Not found" is an error kind, inspected explicitly
// 3. **No hidden retries**: Every failure reaches the caller immediately
// 4. **Library-First**: The hook binary is a thin wrapper around this crate

pub mod challenge;
pub mod config;
pub mod error;
pub mod traits;

// Re-export core types for convenience
pub use challenge::{CHALLENGE_TTL, ChallengeAuthenticator, TXT};
pub use config::{Credentials, PluginConfig};
pub use error::{Error, PluginError, Result};
pub use traits::{Authenticator, CredentialKey, PluginInfo, Record, ZoneRecordApi};
