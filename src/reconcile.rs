//! Record reconciliation
//!
//! Converges the remote records under a zone/subdomain towards one desired
//! record. Each operation lists the remote records first and decides from
//! that listing; remote calls within an operation are strictly sequential.
//!
//! The remote system gives no atomicity across the list-then-mutate
//! sequence: a concurrent writer, or a write that is not yet visible to the
//! listing, can make a decision stale. Operations on different records share
//! no state and may run in parallel.

use tracing::{debug, info};

use crate::dns_provider::{DesiredRecord, NewRecord, ZoneRecordApi};
use crate::error::Result;
use crate::identity::{compute_id, ExternalId};
use crate::validation::validate_desired_record;

//==============================================================================
// Types
//==============================================================================

/// Whether an operation may mutate remote state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionMode {
    /// Perform remote calls
    #[default]
    Apply,
    /// Speculative evaluation: no remote mutation
    Preview,
}

impl ExecutionMode {
    pub fn is_preview(self) -> bool {
        self == Self::Preview
    }
}

/// Result of a create or update
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciled {
    /// Identity to persist for the record
    pub id: ExternalId,
    /// The record attributes now in effect
    pub record: DesiredRecord,
    /// Whether a remote write was issued
    pub changed: bool,
}

/// Result of a read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    /// A matching record exists; `current` carries the observed ttl
    Present { id: String, current: DesiredRecord },
    /// No remote record matches any more; the caller should re-create it
    Vanished,
}

impl ReadOutcome {
    /// The id to keep, empty when the record vanished
    pub fn id(&self) -> &str {
        match self {
            Self::Present { id, .. } => id,
            Self::Vanished => "",
        }
    }
}

//==============================================================================
// Reconciler
//==============================================================================

/// Drives create/read/update/delete for one record at a time
///
/// Borrows the client; the reconciler itself holds no state between calls.
pub struct Reconciler<'a, C: ZoneRecordApi + ?Sized> {
    client: &'a C,
}

impl<'a, C: ZoneRecordApi + ?Sized> Reconciler<'a, C> {
    pub fn new(client: &'a C) -> Self {
        Self { client }
    }

    /// Ensures the desired record exists remotely
    ///
    /// A remote record equal on type, value AND ttl satisfies the request
    /// without a write and yields a handle-based id. Otherwise the record is
    /// added and a value-based id is returned. In preview mode no remote call
    /// is made and a preview id is returned.
    pub async fn create(&self, desired: &DesiredRecord, mode: ExecutionMode) -> Result<Reconciled> {
        validate_desired_record(desired)?;

        if mode.is_preview() {
            debug!("Preview create: {}", desired);
            return Ok(preview(desired));
        }

        let records = self
            .client
            .get_zone_records(&desired.zone, &desired.name)
            .await?;
        if let Some(existing) = records.iter().find(|r| r.matches_exactly(desired)) {
            info!("Record already present: {} (handle {})", desired, existing.remote_handle);
            return Ok(Reconciled {
                id: id_for(desired, Some(existing.remote_handle)),
                record: desired.clone(),
                changed: false,
            });
        }

        self.client
            .add_zone_record(&desired.zone, &desired.name, &NewRecord::from(desired))
            .await?;
        info!("Record added: {}", desired);

        Ok(Reconciled {
            id: id_for(desired, None),
            record: desired.clone(),
            changed: true,
        })
    }

    /// Refreshes a record the caller already tracks
    ///
    /// Matches on type and value only. A missing record is reported as
    /// [`ReadOutcome::Vanished`], not as an error.
    pub async fn read(&self, id: &str, prior: &DesiredRecord) -> Result<ReadOutcome> {
        let records = self.client.get_zone_records(&prior.zone, &prior.name).await?;
        let Some(found) = records
            .iter()
            .find(|r| r.matches(&prior.record_type, &prior.value))
        else {
            info!("Record vanished: {}", prior);
            return Ok(ReadOutcome::Vanished);
        };

        if found.ttl != prior.ttl {
            debug!("TTL drift on {}: remote {}", prior, found.ttl);
        }
        Ok(ReadOutcome::Present {
            id: id.to_string(),
            current: DesiredRecord {
                ttl: found.ttl,
                ..prior.clone()
            },
        })
    }

    /// Replaces `old` with `new`
    ///
    /// Every remote record matching the old type and value is removed,
    /// whatever its ttl, then the new record is added. There is no in-place
    /// update: the remote API has no such verb.
    pub async fn update(
        &self,
        old: &DesiredRecord,
        new: &DesiredRecord,
        mode: ExecutionMode,
    ) -> Result<Reconciled> {
        validate_desired_record(new)?;

        if mode.is_preview() {
            debug!("Preview update: {} -> {}", old, new);
            return Ok(preview(new));
        }

        let removed = self.remove_matching(old).await?;
        debug!("Removed {} record(s) matching {}", removed, old);

        self.client
            .add_zone_record(&new.zone, &new.name, &NewRecord::from(new))
            .await?;
        info!("Record replaced: {} -> {}", old, new);

        Ok(Reconciled {
            id: id_for(new, None),
            record: new.clone(),
            changed: true,
        })
    }

    /// Removes every remote record matching the old type and value
    ///
    /// Returns the number of remove calls issued; always 0 in preview mode.
    pub async fn delete(&self, old: &DesiredRecord, mode: ExecutionMode) -> Result<usize> {
        if mode.is_preview() {
            debug!("Preview delete: {}", old);
            return Ok(0);
        }

        let removed = self.remove_matching(old).await?;
        info!("Deleted {} record(s) matching {}", removed, old);
        Ok(removed)
    }

    async fn remove_matching(&self, old: &DesiredRecord) -> Result<usize> {
        let records = self.client.get_zone_records(&old.zone, &old.name).await?;
        let mut removed = 0;
        for record in records
            .iter()
            .filter(|r| r.matches(&old.record_type, &old.value))
        {
            self.client
                .remove_zone_record(&old.zone, &old.name, record.remote_handle)
                .await?;
            removed += 1;
        }
        Ok(removed)
    }
}

fn id_for(record: &DesiredRecord, remote_handle: Option<i64>) -> ExternalId {
    compute_id(
        &record.zone,
        &record.name,
        &record.record_type,
        &record.value,
        remote_handle,
        false,
    )
}

fn preview(record: &DesiredRecord) -> Reconciled {
    Reconciled {
        id: compute_id(&record.zone, &record.name, &record.record_type, "", None, true),
        record: record.clone(),
        changed: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_execution_mode_default_applies() {
        assert_eq!(ExecutionMode::default(), ExecutionMode::Apply);
        assert!(!ExecutionMode::Apply.is_preview());
        assert!(ExecutionMode::Preview.is_preview());
    }

    #[test]
    fn test_read_outcome_id() {
        assert_eq!(ReadOutcome::Vanished.id(), "");
        let present = ReadOutcome::Present {
            id: "example.com:www:A:1".to_string(),
            current: DesiredRecord::new("example.com", "www", "A", "1.2.3.4", 300),
        };
        assert_eq!(present.id(), "example.com:www:A:1");
    }

    #[test]
    fn test_preview_id_ignores_value() {
        let record = DesiredRecord::new("example.com", "www", "A", "1.2.3.4", 300);
        let outcome = preview(&record);
        assert_eq!(outcome.id.to_string(), "example.com:www:A:preview");
        assert!(!outcome.changed);
    }
}
