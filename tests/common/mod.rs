//! Test doubles shared by the integration tests

#![allow(dead_code)]

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use loopia_dns::error::{Error, Result};
use loopia_dns::{NewRecord, RemoteRecord, ZoneRecordApi};

/// One recorded call against the mock
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List { zone: String, name: String },
    Add { zone: String, name: String, record: NewRecord },
    Remove { zone: String, name: String, handle: i64 },
}

/// Which operation the mock should fail with a delivery error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOn {
    Nothing,
    List,
    Add,
    Remove,
}

/// An in-memory zone that records every call made against it
pub struct MockZoneApi {
    records: Mutex<Vec<RemoteRecord>>,
    calls: Mutex<Vec<Call>>,
    next_handle: AtomicI64,
    fail_on: Mutex<FailOn>,
}

impl MockZoneApi {
    pub fn new(records: Vec<RemoteRecord>) -> Self {
        Self {
            records: Mutex::new(records),
            calls: Mutex::new(Vec::new()),
            next_handle: AtomicI64::new(1000),
            fail_on: Mutex::new(FailOn::Nothing),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    pub fn fail_on(&self, op: FailOn) {
        *self.fail_on.lock().unwrap() = op;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn records(&self) -> Vec<RemoteRecord> {
        self.records.lock().unwrap().clone()
    }

    pub fn add_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Add { .. }))
            .count()
    }

    pub fn removed_handles(&self) -> Vec<i64> {
        self.calls()
            .iter()
            .filter_map(|c| match c {
                Call::Remove { handle, .. } => Some(*handle),
                _ => None,
            })
            .collect()
    }

    fn check(&self, op: FailOn, method: &'static str) -> Result<()> {
        if *self.fail_on.lock().unwrap() == op {
            let cause = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "connection refused");
            return Err(Error::delivery(method, cause));
        }
        Ok(())
    }
}

#[async_trait]
impl ZoneRecordApi for MockZoneApi {
    async fn add_zone_record(&self, zone: &str, name: &str, record: &NewRecord) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Add {
            zone: zone.to_string(),
            name: name.to_string(),
            record: record.clone(),
        });
        self.check(FailOn::Add, "addZoneRecord")?;
        self.records.lock().unwrap().push(RemoteRecord {
            record_type: record.record_type.clone(),
            value: record.rdata.clone(),
            ttl: record.ttl,
            priority: record.priority,
            remote_handle: self.next_handle.fetch_add(1, Ordering::SeqCst),
        });
        Ok(())
    }

    async fn remove_zone_record(&self, zone: &str, name: &str, remote_handle: i64) -> Result<()> {
        self.calls.lock().unwrap().push(Call::Remove {
            zone: zone.to_string(),
            name: name.to_string(),
            handle: remote_handle,
        });
        self.check(FailOn::Remove, "removeZoneRecord")?;
        self.records
            .lock()
            .unwrap()
            .retain(|r| r.remote_handle != remote_handle);
        Ok(())
    }

    async fn get_zone_records(&self, zone: &str, name: &str) -> Result<Vec<RemoteRecord>> {
        self.calls.lock().unwrap().push(Call::List {
            zone: zone.to_string(),
            name: name.to_string(),
        });
        self.check(FailOn::List, "getZoneRecords")?;
        Ok(self.records())
    }
}

pub fn remote(record_type: &str, value: &str, ttl: u32, handle: i64) -> RemoteRecord {
    RemoteRecord {
        record_type: record_type.to_string(),
        value: value.to_string(),
        ttl,
        priority: 0,
        remote_handle: handle,
    }
}
