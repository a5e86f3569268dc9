//! loopia-dns - declarative DNS record management for Loopia
//!
//! Architecture:
//! - `xmlrpc`: hand-written XML-RPC request encoder and response decoder
//! - `loopia`: HTTP client for the Loopia API (reqwest, rustls)
//! - `reconcile`: create/read/update/delete of one desired record against the remote listing
//! - `identity`: stable external ids (`zone:name:type:tail`)

pub mod config;
pub mod constants;
pub mod dns_provider;
pub mod error;
pub mod identity;
pub mod loopia;
pub mod reconcile;
pub mod validation;
pub mod xmlrpc;

pub use config::Config;
pub use dns_provider::{DesiredRecord, NewRecord, RemoteRecord, ZoneRecordApi};
pub use error::{Error, Result};
pub use identity::{compute_id, ExternalId, IdTail};
pub use loopia::LoopiaClient;
pub use reconcile::{ExecutionMode, ReadOutcome, Reconciled, Reconciler};
