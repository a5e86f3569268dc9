//! XML-RPC response decoding
//!
//! A small pull parser for `methodResponse` documents. It understands the
//! value types the Loopia API returns (string, int/i4/i8, boolean, double,
//! array, struct, nil) and maps a standard `<fault>` envelope to
//! [`Error::ProtocolFault`]. Attributes, namespaces and CDATA are not
//! supported.

use crate::constants::MAX_VALUE_NESTING;
use crate::error::{Error, Result};

//==============================================================================
// Types
//==============================================================================

/// A decoded XML-RPC value
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseValue {
    Text(String),
    Int(i64),
    Bool(bool),
    Double(f64),
    Array(Vec<ResponseValue>),
    Struct(Vec<(String, ResponseValue)>),
    Nil,
}

impl ResponseValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Looks up a struct member; `None` for missing members and non-structs
    pub fn member(&self, name: &str) -> Option<&ResponseValue> {
        match self {
            Self::Struct(members) => members.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    /// Short type name used in error messages
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text(_) => "string",
            Self::Int(_) => "int",
            Self::Bool(_) => "boolean",
            Self::Double(_) => "double",
            Self::Array(_) => "array",
            Self::Struct(_) => "struct",
            Self::Nil => "nil",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Token<'a> {
    Open(&'a str),
    Close(&'a str),
    Empty(&'a str),
    Text(&'a str),
}

//==============================================================================
// Public API
//==============================================================================

/// Decodes a `methodResponse` document into its single return value
///
/// A `<fault>` response is returned as `Err(Error::ProtocolFault)`.
pub fn parse_response(body: &str) -> Result<ResponseValue> {
    let mut parser = Parser::new(tokenize(body)?);
    parser.expect_open("methodResponse")?;
    parser.skip_ws();
    match parser.bump() {
        Some(Token::Open("params")) => {
            parser.expect_open("param")?;
            parser.expect_open("value")?;
            let value = parser.parse_value()?;
            parser.expect_close("param")?;
            parser.expect_close("params")?;
            parser.expect_close("methodResponse")?;
            Ok(value)
        }
        Some(Token::Open("fault")) => {
            parser.expect_open("value")?;
            let value = parser.parse_value()?;
            Err(fault_from(&value))
        }
        other => Err(Error::malformed(format!(
            "expected <params> or <fault>, found {}",
            describe(other)
        ))),
    }
}

/// Reverses markup escaping: the five named entities plus numeric references
pub fn unescape_text(s: &str) -> Result<String> {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let semi = after
            .find(';')
            .ok_or_else(|| Error::malformed("unterminated entity reference"))?;
        let entity = &after[..semi];
        let ch = match entity {
            "amp" => '&',
            "lt" => '<',
            "gt" => '>',
            "quot" => '"',
            "apos" => '\'',
            _ => numeric_entity(entity)
                .ok_or_else(|| Error::malformed(format!("unknown entity &{entity};")))?,
        };
        out.push(ch);
        rest = &after[semi + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn numeric_entity(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let code = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(code)
}

fn fault_from(value: &ResponseValue) -> Error {
    let code = value.member("faultCode").and_then(ResponseValue::as_int).unwrap_or(0);
    let message = value
        .member("faultString")
        .and_then(ResponseValue::as_str)
        .unwrap_or("unspecified fault")
        .to_string();
    Error::ProtocolFault { code, message }
}

//==============================================================================
// Tokenizer
//==============================================================================

fn tokenize(input: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = input;
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix("<?") {
            let end = after
                .find("?>")
                .ok_or_else(|| Error::malformed("unterminated processing instruction"))?;
            rest = &after[end + 2..];
        } else if let Some(after) = rest.strip_prefix("<!--") {
            let end = after
                .find("-->")
                .ok_or_else(|| Error::malformed("unterminated comment"))?;
            rest = &after[end + 3..];
        } else if let Some(after) = rest.strip_prefix('<') {
            let end = after
                .find('>')
                .ok_or_else(|| Error::malformed("unterminated tag"))?;
            let tag = &after[..end];
            rest = &after[end + 1..];
            if tag.starts_with('!') {
                continue;
            }
            if let Some(name) = tag.strip_prefix('/') {
                tokens.push(Token::Close(name.trim()));
            } else if let Some(body) = tag.strip_suffix('/') {
                tokens.push(Token::Empty(tag_name(body)));
            } else {
                tokens.push(Token::Open(tag_name(tag)));
            }
        } else {
            let end = rest.find('<').unwrap_or(rest.len());
            tokens.push(Token::Text(&rest[..end]));
            rest = &rest[end..];
        }
    }
    Ok(tokens)
}

fn tag_name(tag: &str) -> &str {
    tag.split_whitespace().next().unwrap_or("")
}

fn describe(token: Option<Token<'_>>) -> String {
    match token {
        Some(Token::Open(n)) => format!("<{n}>"),
        Some(Token::Close(n)) => format!("</{n}>"),
        Some(Token::Empty(n)) => format!("<{n}/>"),
        Some(Token::Text(t)) => format!("text {:?}", t.trim()),
        None => "end of document".to_string(),
    }
}

//==============================================================================
// Parser
//==============================================================================

struct Parser<'a> {
    tokens: Vec<Token<'a>>,
    pos: usize,
    /// Arrays and structs currently open
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(tokens: Vec<Token<'a>>) -> Self {
        Self {
            tokens,
            pos: 0,
            depth: 0,
        }
    }

    fn peek(&self) -> Option<Token<'a>> {
        self.tokens.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<Token<'a>> {
        let token = self.peek();
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    fn skip_ws(&mut self) {
        while let Some(Token::Text(t)) = self.peek() {
            if !t.trim().is_empty() {
                break;
            }
            self.pos += 1;
        }
    }

    fn expect_open(&mut self, name: &str) -> Result<()> {
        self.skip_ws();
        match self.bump() {
            Some(Token::Open(n)) if n == name => Ok(()),
            other => Err(Error::malformed(format!(
                "expected <{name}>, found {}",
                describe(other)
            ))),
        }
    }

    fn expect_close(&mut self, name: &str) -> Result<()> {
        self.skip_ws();
        match self.bump() {
            Some(Token::Close(n)) if n == name => Ok(()),
            other => Err(Error::malformed(format!(
                "expected </{name}>, found {}",
                describe(other)
            ))),
        }
    }

    /// Collects character data up to `</name>` and unescapes it
    fn text_until_close(&mut self, name: &str) -> Result<String> {
        let mut raw = String::new();
        loop {
            match self.bump() {
                Some(Token::Text(t)) => raw.push_str(t),
                Some(Token::Close(n)) if n == name => break,
                other => {
                    return Err(Error::malformed(format!(
                        "expected text in <{name}>, found {}",
                        describe(other)
                    )))
                }
            }
        }
        unescape_text(&raw)
    }

    /// Parses the content of a `<value>` element, consuming its closing tag
    fn parse_value(&mut self) -> Result<ResponseValue> {
        let start = self.pos;
        self.skip_ws();
        match self.peek() {
            // Untyped content defaults to string, whitespace included.
            Some(Token::Close("value")) | Some(Token::Text(_)) => {
                self.pos = start;
                Ok(ResponseValue::Text(self.text_until_close("value")?))
            }
            Some(Token::Empty(tag)) => {
                self.pos += 1;
                let value = match tag {
                    "nil" => ResponseValue::Nil,
                    "string" => ResponseValue::Text(String::new()),
                    "array" => ResponseValue::Array(Vec::new()),
                    "struct" => ResponseValue::Struct(Vec::new()),
                    other => {
                        return Err(Error::malformed(format!("empty <{other}/> has no value")))
                    }
                };
                self.expect_close("value")?;
                Ok(value)
            }
            Some(Token::Open(tag)) => {
                self.pos += 1;
                let value = self.parse_typed(tag)?;
                self.expect_close("value")?;
                Ok(value)
            }
            other => Err(Error::malformed(format!(
                "expected a value, found {}",
                describe(other)
            ))),
        }
    }

    fn parse_typed(&mut self, tag: &str) -> Result<ResponseValue> {
        match tag {
            "string" | "dateTime.iso8601" | "base64" => {
                Ok(ResponseValue::Text(self.text_until_close(tag)?))
            }
            "int" | "i4" | "i8" => {
                let raw = self.text_until_close(tag)?;
                raw.trim()
                    .parse::<i64>()
                    .map(ResponseValue::Int)
                    .map_err(|_| Error::malformed(format!("invalid <{tag}> value {raw:?}")))
            }
            "boolean" => {
                let raw = self.text_until_close(tag)?;
                match raw.trim() {
                    "1" | "true" => Ok(ResponseValue::Bool(true)),
                    "0" | "false" => Ok(ResponseValue::Bool(false)),
                    other => Err(Error::malformed(format!("invalid <boolean> value {other:?}"))),
                }
            }
            "double" => {
                let raw = self.text_until_close(tag)?;
                raw.trim()
                    .parse::<f64>()
                    .map(ResponseValue::Double)
                    .map_err(|_| Error::malformed(format!("invalid <double> value {raw:?}")))
            }
            "nil" => {
                self.expect_close("nil")?;
                Ok(ResponseValue::Nil)
            }
            "array" | "struct" => {
                if self.depth >= MAX_VALUE_NESTING {
                    return Err(Error::malformed(format!(
                        "nesting too deep (max {MAX_VALUE_NESTING})"
                    )));
                }
                self.depth += 1;
                let value = if tag == "array" {
                    self.parse_array()
                } else {
                    self.parse_struct()
                };
                self.depth -= 1;
                value
            }
            other => Err(Error::malformed(format!("unsupported value type <{other}>"))),
        }
    }

    fn parse_array(&mut self) -> Result<ResponseValue> {
        let mut items = Vec::new();
        self.skip_ws();
        match self.bump() {
            Some(Token::Empty("data")) => {}
            Some(Token::Open("data")) => loop {
                self.skip_ws();
                match self.bump() {
                    Some(Token::Open("value")) => items.push(self.parse_value()?),
                    Some(Token::Close("data")) => break,
                    other => {
                        return Err(Error::malformed(format!(
                            "expected <value> in <data>, found {}",
                            describe(other)
                        )))
                    }
                }
            },
            other => {
                return Err(Error::malformed(format!(
                    "expected <data> in <array>, found {}",
                    describe(other)
                )))
            }
        }
        self.expect_close("array")?;
        Ok(ResponseValue::Array(items))
    }

    fn parse_struct(&mut self) -> Result<ResponseValue> {
        let mut members = Vec::new();
        loop {
            self.skip_ws();
            match self.bump() {
                Some(Token::Open("member")) => {
                    self.expect_open("name")?;
                    let name = self.text_until_close("name")?;
                    self.expect_open("value")?;
                    let value = self.parse_value()?;
                    self.expect_close("member")?;
                    members.push((name, value));
                }
                Some(Token::Close("struct")) => break,
                other => {
                    return Err(Error::malformed(format!(
                        "expected <member> in <struct>, found {}",
                        describe(other)
                    )))
                }
            }
        }
        Ok(ResponseValue::Struct(members))
    }
}

//==============================================================================
// Tests
//==============================================================================
