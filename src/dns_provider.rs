//! DNS provider abstraction layer
//!
//! This module defines the record types exchanged with the remote zone API
//! and the [`ZoneRecordApi`] trait the reconciler drives. [`LoopiaClient`]
//! is the production implementation; tests substitute their own.
//!
//! [`LoopiaClient`]: crate::loopia::LoopiaClient

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_RECORD_PRIORITY;
use crate::error::Result;
use crate::xmlrpc::WireStruct;

//==============================================================================
// Types
//==============================================================================

/// A record as declared by the caller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DesiredRecord {
    /// The DNS zone (e.g. "example.com")
    pub zone: String,
    /// The subdomain within the zone (e.g. "www", "@")
    pub name: String,
    /// The record type (e.g. "A", "CNAME")
    #[serde(rename = "type")]
    pub record_type: String,
    /// The record data
    pub value: String,
    /// Time-to-live in seconds
    pub ttl: u32,
}

impl DesiredRecord {
    pub fn new(
        zone: impl Into<String>,
        name: impl Into<String>,
        record_type: impl Into<String>,
        value: impl Into<String>,
        ttl: u32,
    ) -> Self {
        Self {
            zone: zone.into(),
            name: name.into(),
            record_type: record_type.into(),
            value: value.into(),
            ttl,
        }
    }
}

impl fmt::Display for DesiredRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {}.{} -> {} (TTL: {})",
            self.record_type, self.name, self.zone, self.value, self.ttl
        )
    }
}

/// A record as reported by the remote listing
///
/// Only produced by [`ZoneRecordApi::get_zone_records`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub value: String,
    pub ttl: u32,
    pub priority: u32,
    /// Opaque numeric id assigned by the remote system
    pub remote_handle: i64,
}

impl RemoteRecord {
    /// Type and value are equal (exact string comparison); ttl ignored
    pub fn matches(&self, record_type: &str, value: &str) -> bool {
        self.record_type == record_type && self.value == value
    }

    /// Type, value and ttl are all equal
    pub fn matches_exactly(&self, desired: &DesiredRecord) -> bool {
        self.matches(&desired.record_type, &desired.value) && self.ttl == desired.ttl
    }
}

impl fmt::Display for RemoteRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{} {} -> {} (TTL: {}, Priority: {})",
            self.remote_handle, self.record_type, self.value, self.ttl, self.priority
        )
    }
}

/// Payload of an add call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub record_type: String,
    pub ttl: u32,
    pub priority: u32,
    pub rdata: String,
}

impl NewRecord {
    /// Encodes the record as the `record_obj` struct the remote expects
    pub fn to_wire(&self) -> WireStruct {
        WireStruct::new()
            .text("type", self.record_type.as_str())
            .int("ttl", i64::from(self.ttl))
            .int("priority", i64::from(self.priority))
            .text("rdata", self.rdata.as_str())
    }
}

impl From<&DesiredRecord> for NewRecord {
    fn from(desired: &DesiredRecord) -> Self {
        Self {
            record_type: desired.record_type.clone(),
            ttl: desired.ttl,
            priority: DEFAULT_RECORD_PRIORITY,
            rdata: desired.value.clone(),
        }
    }
}

//==============================================================================
// Trait
//==============================================================================

/// Remote zone record operations
///
/// Implementations hold their own credentials and endpoint. Every call goes
/// to the remote system; nothing is cached, so a listing always reflects the
/// remote state at the time of the call.
#[async_trait]
pub trait ZoneRecordApi: Send + Sync {
    /// Adds one record under `zone`/`name`
    ///
    /// # Errors
    ///
    /// Returns `Error::Delivery` if the request cannot be delivered. A
    /// delivered request counts as success whatever the remote answered.
    async fn add_zone_record(&self, zone: &str, name: &str, record: &NewRecord) -> Result<()>;

    /// Removes the record with the given remote handle, if it exists
    async fn remove_zone_record(&self, zone: &str, name: &str, remote_handle: i64) -> Result<()>;

    /// Lists the records currently stored under `zone`/`name`
    async fn get_zone_records(&self, zone: &str, name: &str) -> Result<Vec<RemoteRecord>>;
}

//==============================================================================
// Tests
//==============================================================================
