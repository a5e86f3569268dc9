//! XML-RPC request encoding
//!
//! Turns a method name and an ordered list of typed arguments into a
//! `methodCall` document. Encoding is total: every [`WireValue`] has exactly
//! one rendering, and values of any other type enter through
//! [`WireValue::coerce`], which renders them as text.

use std::fmt;

//==============================================================================
// Types
//==============================================================================

/// A scalar XML-RPC value, allowed both as an argument and as a struct member
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireScalar {
    /// `<string>`, escaped on encode
    Text(String),
    /// `<int>`, plain decimal digits
    Int(i64),
}

/// One positional argument of a remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireValue {
    /// A single text or integer value
    Scalar(WireScalar),
    /// An ordered mapping of member names to scalars (`<struct>`)
    Struct(WireStruct),
}

/// An ordered name/value mapping encoded as an XML-RPC `<struct>`
///
/// Members keep insertion order so that two encodes of the same input are
/// byte-identical. Setting a name twice replaces the earlier value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WireStruct {
    members: Vec<(String, WireScalar)>,
}

impl WireStruct {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a text member
    #[must_use]
    pub fn text(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.member(name, WireScalar::Text(value.into()))
    }

    /// Adds (or replaces) an integer member
    #[must_use]
    pub fn int(self, name: impl Into<String>, value: i64) -> Self {
        self.member(name, WireScalar::Int(value))
    }

    /// Adds (or replaces) a member
    #[must_use]
    pub fn member(mut self, name: impl Into<String>, value: WireScalar) -> Self {
        let name = name.into();
        match self.members.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.members.push((name, value)),
        }
        self
    }

    /// Looks up a member by name
    pub fn get(&self, name: &str) -> Option<&WireScalar> {
        self.members.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Members in encode order
    pub fn members(&self) -> impl Iterator<Item = (&str, &WireScalar)> {
        self.members.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl WireValue {
    /// Renders any displayable value as a text argument
    ///
    /// This is the single place where values outside the three wire shapes are
    /// accepted; they are sent as `<string>` using their `Display` output.
    pub fn coerce(value: impl fmt::Display) -> Self {
        Self::Scalar(WireScalar::Text(value.to_string()))
    }
}

impl From<&str> for WireValue {
    fn from(v: &str) -> Self {
        Self::Scalar(WireScalar::Text(v.to_string()))
    }
}

impl From<String> for WireValue {
    fn from(v: String) -> Self {
        Self::Scalar(WireScalar::Text(v))
    }
}

impl From<i64> for WireValue {
    fn from(v: i64) -> Self {
        Self::Scalar(WireScalar::Int(v))
    }
}

impl From<i32> for WireValue {
    fn from(v: i32) -> Self {
        Self::Scalar(WireScalar::Int(i64::from(v)))
    }
}

impl From<WireStruct> for WireValue {
    fn from(v: WireStruct) -> Self {
        Self::Struct(v)
    }
}

//==============================================================================
// Encoding
//==============================================================================

/// Escapes the five reserved markup characters (`& < > " '`)
///
/// `&` is replaced first by construction (single pass), so the output is
/// reversed exactly by a standard XML unescape.
///
/// Characters XML 1.0 forbids (C0 controls other than tab, newline and
/// carriage return) have no escape and pass through unchanged. Record values
/// containing them are rejected by
/// [`validate_desired_record`](crate::validation::validate_desired_record).
pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}

/// Builds a complete `methodCall` document
///
/// # Examples
///
/// ```
/// use loopia_dns::xmlrpc::{encode_request, WireValue};
///
/// let body = encode_request("getZoneRecords", &[WireValue::from("a&b"), WireValue::from(7)]);
/// assert!(body.contains("<methodName>getZoneRecords</methodName>"));
/// assert!(body.contains("<string>a&amp;b</string>"));
/// assert!(body.contains("<int>7</int>"));
/// ```
pub fn encode_request(method: &str, args: &[WireValue]) -> String {
    let mut out = String::with_capacity(128 + args.len() * 64);
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<methodCall>\n");
    out.push_str("  <methodName>");
    out.push_str(&escape_text(method));
    out.push_str("</methodName>\n");
    out.push_str("  <params>\n");
    for arg in args {
        out.push_str("    <param>\n      <value>");
        encode_value(&mut out, arg);
        out.push_str("</value>\n    </param>\n");
    }
    out.push_str("  </params>\n");
    out.push_str("</methodCall>\n");
    out
}

fn encode_value(out: &mut String, value: &WireValue) {
    match value {
        WireValue::Scalar(scalar) => encode_scalar(out, scalar),
        WireValue::Struct(st) => {
            out.push_str("<struct>");
            for (name, member) in st.members() {
                out.push_str("<member><name>");
                out.push_str(&escape_text(name));
                out.push_str("</name><value>");
                encode_scalar(out, member);
                out.push_str("</value></member>");
            }
            out.push_str("</struct>");
        }
    }
}

fn encode_scalar(out: &mut String, scalar: &WireScalar) {
    match scalar {
        WireScalar::Text(s) => {
            out.push_str("<string>");
            out.push_str(&escape_text(s));
            out.push_str("</string>");
        }
        WireScalar::Int(i) => {
            out.push_str("<int>");
            out.push_str(&i.to_string());
            out.push_str("</int>");
        }
    }
}

//==============================================================================
// Tests
//==============================================================================
