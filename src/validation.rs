//! Validation utilities for loopia-dns
//!
//! Desired records are checked before any remote call so that a malformed
//! input never produces a half-applied change.

use crate::constants::{
    ID_SEPARATOR, MAX_LABEL_LENGTH, MAX_RECORD_NAME_LENGTH, MAX_RECORD_TYPE_LENGTH, MAX_TTL,
};
use crate::dns_provider::DesiredRecord;
use crate::error::{Error, Result};

/// Validates that a string is a valid DNS zone or subdomain name
///
/// # Validation Rules
///
/// 1. **Length constraints**:
///    - Maximum total length: 253 characters (excluding trailing dot)
///    - Maximum label length: 63 characters
///
/// 2. **Syntax rules**:
///    - Labels must be separated by dots (`.`)
///    - Labels cannot start or end with hyphens (`-`)
///    - Empty labels are not allowed (e.g., `example..com`)
///
/// 3. **Allowed characters**: letters, digits, `-`, `_`, and `*` as a
///    complete label
///
/// 4. **Special cases**: `@` is the zone apex, a trailing dot is ignored,
///    surrounding whitespace is rejected (names are sent as given)
///
/// # Examples
///
/// ```
/// use loopia_dns::validation::validate_domain_name;
///
/// assert!(validate_domain_name("@").is_ok());
/// assert!(validate_domain_name("www").is_ok());
/// assert!(validate_domain_name("*").is_ok());
/// assert!(validate_domain_name("_acme-challenge").is_ok());
/// assert!(validate_domain_name("example.com.").is_ok());
///
/// assert!(validate_domain_name("").is_err());
/// assert!(validate_domain_name(" www").is_err());
/// assert!(validate_domain_name("example..com").is_err());
/// assert!(validate_domain_name("ex:ample.com").is_err());
/// ```
pub fn validate_domain_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_record("Name cannot be empty"));
    }
    if name.trim() != name {
        return Err(Error::invalid_record(format!(
            "Name cannot have leading or trailing whitespace: {:?}",
            name
        )));
    }
    if name == "@" {
        return Ok(());
    }
    if name.contains(' ') {
        return Err(Error::invalid_record("Name cannot contain spaces"));
    }

    let name = name.strip_suffix('.').unwrap_or(name);
    if name.is_empty() {
        return Err(Error::invalid_record("Name cannot be empty"));
    }
    if name.len() > MAX_RECORD_NAME_LENGTH {
        return Err(Error::invalid_record(format!(
            "Name too long (max {} characters, got {})",
            MAX_RECORD_NAME_LENGTH,
            name.len()
        )));
    }
    if name.starts_with('.') {
        return Err(Error::invalid_record("Name cannot start with a dot"));
    }
    if name.contains("..") {
        return Err(Error::invalid_record("Name cannot contain consecutive dots"));
    }

    for label in name.split('.') {
        if label.is_empty() {
            return Err(Error::invalid_record("Name contains empty label"));
        }
        if label == "*" {
            continue;
        }
        if label.len() > MAX_LABEL_LENGTH {
            return Err(Error::invalid_record(format!(
                "Name label too long (max {} characters, got {})",
                MAX_LABEL_LENGTH,
                label.len()
            )));
        }
        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::invalid_record(
                "Name label cannot start or end with hyphen",
            ));
        }
        for ch in label.chars() {
            if !ch.is_alphanumeric() && ch != '-' && ch != '_' {
                return Err(Error::invalid_record(format!(
                    "Name contains invalid character: '{}' (allowed: letters, digits, '-', '_', or wildcard labels)",
                    ch
                )));
            }
        }
    }

    Ok(())
}

/// Validates a record type mnemonic such as `A`, `AAAA`, `CNAME` or `TXT`
pub fn validate_record_type(record_type: &str) -> Result<()> {
    if record_type.is_empty() {
        return Err(Error::invalid_record("Record type cannot be empty"));
    }
    if record_type.len() > MAX_RECORD_TYPE_LENGTH {
        return Err(Error::invalid_record(format!(
            "Record type too long (max {} characters, got {})",
            MAX_RECORD_TYPE_LENGTH,
            record_type.len()
        )));
    }
    if !record_type.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err(Error::invalid_record(format!(
            "Record type must be alphanumeric, got: {}",
            record_type
        )));
    }
    Ok(())
}

/// Characters allowed in an XML 1.0 document
fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\r' | '\u{20}'..='\u{D7FF}' | '\u{E000}'..='\u{FFFD}' | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Validates every field of a desired record
///
/// Zone, name and type end up as colon-separated segments of the external
/// id, so none of them may contain the separator. The value is the last
/// segment and may (IPv6, TXT) contain it, but must be representable in an
/// XML document. The ttl is sent as a 32-bit signed `<int>`.
pub fn validate_desired_record(record: &DesiredRecord) -> Result<()> {
    for (field, value) in [("zone", &record.zone), ("name", &record.name)] {
        if value.contains(ID_SEPARATOR) {
            return Err(Error::invalid_record(format!(
                "{} cannot contain '{}': {}",
                field, ID_SEPARATOR, value
            )));
        }
    }
    if record.zone == "@" {
        return Err(Error::invalid_record("Zone cannot be the apex marker '@'"));
    }
    validate_domain_name(&record.zone)?;
    validate_domain_name(&record.name)?;
    validate_record_type(&record.record_type)?;
    if record.value.is_empty() {
        return Err(Error::invalid_record("Record value cannot be empty"));
    }
    if let Some(c) = record.value.chars().find(|&c| !is_xml_char(c)) {
        return Err(Error::invalid_record(format!(
            "Record value contains a character XML cannot carry: U+{:04X}",
            u32::from(c)
        )));
    }
    if record.ttl > MAX_TTL {
        return Err(Error::invalid_record(format!(
            "TTL too large (max {}, got {})",
            MAX_TTL, record.ttl
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(zone: &str, name: &str, record_type: &str, value: &str) -> DesiredRecord {
        DesiredRecord::new(zone, name, record_type, value, 300)
    }

    #[test]
    fn test_validate_domain_name_valid_cases() {
        assert!(validate_domain_name("@").is_ok());
        assert!(validate_domain_name("*").is_ok());
        assert!(validate_domain_name("www").is_ok());
        assert!(validate_domain_name("example.com").is_ok());
        assert!(validate_domain_name("_dmarc").is_ok());
        assert!(validate_domain_name("*.dev").is_ok());
        assert!(validate_domain_name("example.se.").is_ok());
        assert!(validate_domain_name(&("a".repeat(63) + ".com")).is_ok());
    }

    #[test]
    fn test_validate_domain_name_invalid_cases() {
        assert!(validate_domain_name("").is_err());
        assert!(validate_domain_name(" ").is_err());
        assert!(validate_domain_name("www test").is_err());
        assert!(validate_domain_name(".example.com").is_err());
        assert!(validate_domain_name("example..com").is_err());
        assert!(validate_domain_name("-www").is_err());
        assert!(validate_domain_name("www-").is_err());
        assert!(validate_domain_name("ex@mple.com").is_err());
        assert!(validate_domain_name(&"a".repeat(64)).is_err());
        assert!(validate_domain_name(&"a.".repeat(254)).is_err());
    }

    #[test]
    fn test_validate_record_type() {
        for t in ["A", "AAAA", "CNAME", "MX", "TXT", "SRV", "CAA"] {
            assert!(validate_record_type(t).is_ok(), "{t}");
        }
        assert!(validate_record_type("").is_err());
        assert!(validate_record_type("A:B").is_err());
        assert!(validate_record_type("TOOLONGTYPE1").is_err());
    }

    #[test]
    fn test_validate_desired_record() {
        assert!(validate_desired_record(&record("example.com", "www", "A", "1.2.3.4")).is_ok());
        assert!(validate_desired_record(&record("example.com", "@", "AAAA", "2001:db8::1")).is_ok());
        assert!(validate_desired_record(&record("example.com", "www", "TXT", "a:b:c")).is_ok());

        assert!(validate_desired_record(&record("", "www", "A", "1.2.3.4")).is_err());
        assert!(validate_desired_record(&record("@", "www", "A", "1.2.3.4")).is_err());
        assert!(validate_desired_record(&record("example.com", "", "A", "1.2.3.4")).is_err());
        assert!(validate_desired_record(&record("example.com", "www", "", "1.2.3.4")).is_err());
        assert!(validate_desired_record(&record("example.com", "www", "A", "")).is_err());
        assert!(validate_desired_record(&record("exa:mple.com", "www", "A", "1.2.3.4")).is_err());
    }

    #[test]
    fn test_surrounding_whitespace_rejected() {
        assert!(validate_domain_name(" www").is_err());
        assert!(validate_domain_name("www ").is_err());
        assert!(validate_domain_name("\twww").is_err());
        assert!(validate_domain_name(" @").is_err());
        assert!(validate_desired_record(&record(" example.com", "www", "A", "1.2.3.4")).is_err());
        assert!(validate_desired_record(&record("example.com", "www\n", "A", "1.2.3.4")).is_err());
    }

    #[test]
    fn test_value_must_be_xml_text() {
        assert!(validate_desired_record(&record("example.com", "www", "TXT", "a\u{1}b")).is_err());
        assert!(validate_desired_record(&record("example.com", "www", "TXT", "a\u{7f}b")).is_ok());
        assert!(validate_desired_record(&record("example.com", "www", "TXT", "line\tone\r\n")).is_ok());
        assert!(validate_desired_record(&record("example.com", "www", "TXT", "\u{FFFE}")).is_err());

        let err = validate_desired_record(&record("example.com", "www", "TXT", "\u{0}"))
            .expect_err("nul");
        assert!(err.to_string().contains("U+0000"));
    }

    #[test]
    fn test_ttl_fits_xmlrpc_int() {
        let mut rec = record("example.com", "www", "A", "1.2.3.4");
        rec.ttl = MAX_TTL;
        assert!(validate_desired_record(&rec).is_ok());
        rec.ttl = MAX_TTL + 1;
        assert!(validate_desired_record(&rec).is_err());
        rec.ttl = u32::MAX;
        assert!(validate_desired_record(&rec).is_err());
    }

    #[test]
    fn test_validation_errors_are_invalid_record() {
        let err = validate_desired_record(&record("example.com", "w w", "A", "1.2.3.4"))
            .expect_err("space in name");
        assert!(matches!(err, Error::InvalidRecord(_)));
        assert!(err.to_string().contains("spaces"));
    }
}
