//! Loopia API client for zone record operations
//!
//! Uses reqwest with rustls for HTTP requests and the XML-RPC codec in
//! [`crate::xmlrpc`] for the wire format. Credentials travel as the first two
//! positional parameters of every call, as the Loopia API requires.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use crate::config::Config;
use crate::constants::{
    LOOPIA_USER_AGENT, MAX_RESPONSE_BYTES, METHOD_ADD_ZONE_RECORD, METHOD_GET_ZONE_RECORDS,
    METHOD_REMOVE_ZONE_RECORD, XMLRPC_CONTENT_TYPE,
};
use crate::dns_provider::{NewRecord, RemoteRecord, ZoneRecordApi};
use crate::error::{Error, Result};
use crate::xmlrpc::{encode_request, escape_text, parse_response, ResponseValue, WireValue};

/// Redacts the password (raw and markup-escaped) from a log message
#[must_use]
pub fn redact_secrets(message: &str, password: &str) -> String {
    if password.is_empty() {
        return message.to_string();
    }
    message
        .replace(&escape_text(password), "***REDACTED***")
        .replace(password, "***REDACTED***")
}

//==============================================================================
// Client
//==============================================================================

pub struct LoopiaClient {
    username: String,
    password: Zeroizing<String>,
    endpoint: String,
    client: reqwest::Client,
}

impl LoopiaClient {
    /// Creates a client from a configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` if credentials are missing or the HTTP client
    /// cannot be built.
    pub fn new(config: &Config) -> Result<Self> {
        if config.username.trim().is_empty() || config.password.is_empty() {
            return Err(Error::config("Loopia username and password are required"));
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .user_agent(LOOPIA_USER_AGENT)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            username: config.username.clone(),
            password: config.password.clone(),
            endpoint: config.endpoint.clone(),
            client,
        })
    }

    /// Encodes and POSTs one call, returning the raw response body
    async fn call(&self, method: &'static str, args: Vec<WireValue>) -> Result<String> {
        let mut params = Vec::with_capacity(args.len() + 2);
        params.push(WireValue::from(self.username.as_str()));
        params.push(WireValue::from(self.password.as_str()));
        params.extend(args);
        let body = encode_request(method, &params);

        debug!("POST {} ({})", self.endpoint, method);
        debug!("Request body: {}", redact_secrets(&body, &self.password));

        let resp = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, XMLRPC_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::delivery(method, e))?;
        let mut resp = resp.error_for_status().map_err(|e| {
            warn!("{} rejected with HTTP status", method);
            Error::delivery(method, e)
        })?;

        let mut raw = Vec::new();
        while let Some(chunk) = resp.chunk().await.map_err(|e| Error::delivery(method, e))? {
            if raw.len() + chunk.len() > MAX_RESPONSE_BYTES {
                return Err(Error::malformed(format!(
                    "{} response exceeds {} bytes",
                    method, MAX_RESPONSE_BYTES
                )));
            }
            raw.extend_from_slice(&chunk);
        }
        Ok(String::from_utf8_lossy(&raw).into_owned())
    }
}

#[async_trait]
impl ZoneRecordApi for LoopiaClient {
    async fn add_zone_record(&self, zone: &str, name: &str, record: &NewRecord) -> Result<()> {
        let body = self
            .call(
                METHOD_ADD_ZONE_RECORD,
                vec![zone.into(), name.into(), record.to_wire().into()],
            )
            .await?;
        // KNOWN LIMITATION: the status in the body ("OK", "AUTH_ERROR", a
        // fault, ...) is not decoded. Any HTTP success counts as success.
        debug!("{} response: {}", METHOD_ADD_ZONE_RECORD, body.trim());
        Ok(())
    }

    async fn remove_zone_record(&self, zone: &str, name: &str, remote_handle: i64) -> Result<()> {
        let body = self
            .call(
                METHOD_REMOVE_ZONE_RECORD,
                vec![zone.into(), name.into(), remote_handle.into()],
            )
            .await?;
        // KNOWN LIMITATION: same as add, the body is logged but not decoded.
        debug!("{} response: {}", METHOD_REMOVE_ZONE_RECORD, body.trim());
        Ok(())
    }

    async fn get_zone_records(&self, zone: &str, name: &str) -> Result<Vec<RemoteRecord>> {
        let body = self
            .call(METHOD_GET_ZONE_RECORDS, vec![zone.into(), name.into()])
            .await?;
        let records = records_from_response(&parse_response(&body)?)?;
        debug!("{} record(s) under {}.{}", records.len(), name, zone);
        Ok(records)
    }
}

//==============================================================================
// Response mapping
//==============================================================================

/// Maps a decoded `getZoneRecords` result to records
///
/// The remote answers either an array of record structs or, on failure, a
/// bare status string (e.g. `AUTH_ERROR`), alone or as an array element.
fn records_from_response(value: &ResponseValue) -> Result<Vec<RemoteRecord>> {
    match value {
        ResponseValue::Array(items) => items
            .iter()
            .map(|item| match item {
                ResponseValue::Struct(_) => remote_record_from(item),
                ResponseValue::Text(status) => Err(status_fault(status)),
                other => Err(Error::malformed(format!(
                    "expected record struct, found {}",
                    other.kind()
                ))),
            })
            .collect(),
        ResponseValue::Text(status) => Err(status_fault(status)),
        other => Err(Error::malformed(format!(
            "expected record array, found {}",
            other.kind()
        ))),
    }
}

fn status_fault(status: &str) -> Error {
    Error::ProtocolFault {
        code: 0,
        message: status.trim().to_string(),
    }
}

/// Reads one record struct; absent fields fall back to empty/zero
fn remote_record_from(item: &ResponseValue) -> Result<RemoteRecord> {
    let text = |name: &str| {
        item.member(name)
            .and_then(ResponseValue::as_str)
            .unwrap_or_default()
            .to_string()
    };
    let int = |name: &str| item.member(name).and_then(ResponseValue::as_int).unwrap_or(0);
    let unsigned = |name: &str| {
        let raw = int(name);
        u32::try_from(raw).map_err(|_| Error::malformed(format!("{} out of range: {}", name, raw)))
    };

    Ok(RemoteRecord {
        record_type: text("type"),
        value: text("rdata"),
        ttl: unsigned("ttl")?,
        priority: unsigned("priority")?,
        remote_handle: int("record_id"),
    })
}

//==============================================================================
// Tests
//==============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record_struct(members: &[(&str, ResponseValue)]) -> ResponseValue {
        ResponseValue::Struct(
            members
                .iter()
                .map(|(n, v)| (n.to_string(), v.clone()))
                .collect(),
        )
    }

    #[test]
    fn test_redact_secrets() {
        let msg = "<string>user</string><string>p&amp;ss</string> p&ss";
        let redacted = redact_secrets(msg, "p&ss");
        assert!(!redacted.contains("p&amp;ss"));
        assert!(!redacted.contains("p&ss"));
        assert_eq!(redacted.matches("***REDACTED***").count(), 2);
        assert_eq!(redact_secrets("unchanged", ""), "unchanged");
    }

    #[test]
    fn test_records_from_response() {
        let value = ResponseValue::Array(vec![record_struct(&[
            ("type", ResponseValue::Text("A".into())),
            ("ttl", ResponseValue::Int(300)),
            ("priority", ResponseValue::Int(0)),
            ("rdata", ResponseValue::Text("1.2.3.4".into())),
            ("record_id", ResponseValue::Int(99)),
        ])]);

        let records = records_from_response(&value).unwrap();
        assert_eq!(
            records,
            vec![RemoteRecord {
                record_type: "A".into(),
                value: "1.2.3.4".into(),
                ttl: 300,
                priority: 0,
                remote_handle: 99,
            }]
        );
    }

    #[test]
    fn test_missing_fields_default() {
        let value = ResponseValue::Array(vec![record_struct(&[(
            "type",
            ResponseValue::Text("TXT".into()),
        )])]);
        let records = records_from_response(&value).unwrap();
        assert_eq!(records[0].value, "");
        assert_eq!(records[0].ttl, 0);
        assert_eq!(records[0].remote_handle, 0);
    }

    #[test]
    fn test_status_string_is_fault() {
        let err = records_from_response(&ResponseValue::Text("AUTH_ERROR".into())).unwrap_err();
        assert!(matches!(err, Error::ProtocolFault { code: 0, ref message } if message == "AUTH_ERROR"));

        let err = records_from_response(&ResponseValue::Array(vec![ResponseValue::Text(
            "UNKNOWN_ERROR".into(),
        )]))
        .unwrap_err();
        assert!(matches!(err, Error::ProtocolFault { .. }));
    }

    #[test]
    fn test_unexpected_shapes_are_malformed() {
        assert!(matches!(
            records_from_response(&ResponseValue::Int(1)),
            Err(Error::MalformedResponse(_))
        ));
        assert!(matches!(
            records_from_response(&ResponseValue::Array(vec![ResponseValue::Bool(true)])),
            Err(Error::MalformedResponse(_))
        ));
        let negative_ttl = ResponseValue::Array(vec![record_struct(&[("ttl", ResponseValue::Int(-5))])]);
        assert!(matches!(
            records_from_response(&negative_ttl),
            Err(Error::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_empty_array_is_no_records() {
        assert!(records_from_response(&ResponseValue::Array(vec![]))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_new_requires_credentials() {
        let mut cfg = Config::new("user@loopiaapi", "s3cret", None).unwrap();
        assert!(LoopiaClient::new(&cfg).is_ok());

        cfg.username = String::new();
        assert!(matches!(LoopiaClient::new(&cfg), Err(Error::Config(_))));
    }
}
