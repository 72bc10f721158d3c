//! # Claim Ledger
//!
//! A read-only JSON API over a flat-file corpus of fact-checking
//! "abstracts" — structured claims with a quantified confidence score,
//! a domain, and scenario/conclusion metadata.
//!
//! The corpus lives on disk as per-document JSON files and is re-read on
//! every query; there is no database, cache, or write path. Two document
//! shapes are supported: plain claim documents and "claim-set" documents
//! bundling retained/removed sub-claims, which are flattened into
//! individual summaries at query time.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐   ┌──────────────┐   ┌───────────────┐
//! │ Filesystem │──▶│    Loader     │──▶│  Query Engine  │
//! │ JSON files │   │ walk + parse │   │ list/get/search│
//! └────────────┘   └──────────────┘   │ filter/validate│
//!                                     └───────┬───────┘
//!                             ┌───────────────┤
//!                             ▼               ▼
//!                        ┌──────────┐   ┌──────────┐
//!                        │   CLI    │   │   HTTP   │
//!                        │ (ledger) │   │  (axum)  │
//!                        └──────────┘   └──────────┘
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Document shapes and the summary projection |
//! | [`loader`] | Recursive discovery and tolerant parsing |
//! | [`engine`] | List, lookup, search, and filter operations |
//! | [`validate`] | Schema validation rules and reports |
//! | [`auth`] | Optional API-key middleware |
//! | [`server`] | axum HTTP server |

pub mod auth;
pub mod config;
pub mod engine;
pub mod loader;
pub mod models;
pub mod server;
pub mod validate;
