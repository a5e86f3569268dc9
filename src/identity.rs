//! External record identity
//!
//! An external id is `zone:name:type:tail`. The tail is the remote handle
//! when the record is known to exist remotely, the record value right after
//! an add (the remote does not return the new handle), or `preview` for ids
//! handed out during a dry run.

use std::fmt;
use std::str::FromStr;

use crate::constants::{ID_PREVIEW_TAIL, ID_SEPARATOR};
use crate::error::{Error, Result};

/// Last segment of an external id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdTail {
    /// Remote numeric handle
    Handle(i64),
    /// Record value, used until the handle is known
    Value(String),
    /// Speculative id from a dry run
    Preview,
}

/// Identity of a managed record as persisted by the caller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalId {
    pub zone: String,
    pub name: String,
    pub record_type: String,
    pub tail: IdTail,
}

impl ExternalId {
    pub fn is_preview(&self) -> bool {
        self.tail == IdTail::Preview
    }

    /// The remote handle, if the id carries one
    pub fn remote_handle(&self) -> Option<i64> {
        match self.tail {
            IdTail::Handle(h) => Some(h),
            _ => None,
        }
    }
}

/// Derives the external id of a record
///
/// `preview` wins over `remote_handle`, which wins over the value.
///
/// # Examples
///
/// ```
/// use loopia_dns::identity::compute_id;
///
/// let id = compute_id("example.com", "www", "A", "1.2.3.4", Some(42), false);
/// assert_eq!(id.to_string(), "example.com:www:A:42");
///
/// let id = compute_id("example.com", "www", "A", "1.2.3.4", None, false);
/// assert_eq!(id.to_string(), "example.com:www:A:1.2.3.4");
///
/// let id = compute_id("example.com", "www", "A", "1.2.3.4", None, true);
/// assert_eq!(id.to_string(), "example.com:www:A:preview");
/// ```
pub fn compute_id(
    zone: &str,
    name: &str,
    record_type: &str,
    value: &str,
    remote_handle: Option<i64>,
    preview: bool,
) -> ExternalId {
    let tail = match (preview, remote_handle) {
        (true, _) => IdTail::Preview,
        (false, Some(handle)) => IdTail::Handle(handle),
        (false, None) => IdTail::Value(value.to_string()),
    };
    ExternalId {
        zone: zone.to_string(),
        name: name.to_string(),
        record_type: record_type.to_string(),
        tail,
    }
}

impl fmt::Display for ExternalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{zone}{sep}{name}{sep}{rtype}{sep}",
            zone = self.zone,
            name = self.name,
            rtype = self.record_type,
            sep = ID_SEPARATOR
        )?;
        match &self.tail {
            IdTail::Handle(h) => write!(f, "{h}"),
            IdTail::Value(v) => f.write_str(v),
            IdTail::Preview => f.write_str(ID_PREVIEW_TAIL),
        }
    }
}

/// Parses a persisted id
///
/// The tail is everything after the third separator, so values containing
/// `:` (IPv6 addresses) survive. A value-based tail that happens to be an
/// integer or the literal `preview` reads back as a handle or preview tail.
impl FromStr for ExternalId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.splitn(4, ID_SEPARATOR);
        let (Some(zone), Some(name), Some(record_type), Some(tail)) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(Error::invalid_record(format!(
                "External id must have the form zone:name:type:tail, got: {}",
                s
            )));
        };
        if zone.is_empty() || name.is_empty() || record_type.is_empty() || tail.is_empty() {
            return Err(Error::invalid_record(format!(
                "External id has an empty segment: {}",
                s
            )));
        }

        let tail = if tail == ID_PREVIEW_TAIL {
            IdTail::Preview
        } else if let Ok(handle) = tail.parse::<i64>() {
            IdTail::Handle(handle)
        } else {
            IdTail::Value(tail.to_string())
        };

        Ok(Self {
            zone: zone.to_string(),
            name: name.to_string(),
            record_type: record_type.to_string(),
            tail,
        })
    }
}
