//! XML-RPC wire format
//!
//! The Loopia API speaks XML-RPC over HTTP POST. Requests are built by
//! [`encode_request`]; only listing responses are decoded ([`parse_response`]).

pub mod decode;
pub mod encode;

pub use decode::{parse_response, unescape_text, ResponseValue};
pub use encode::{encode_request, escape_text, WireScalar, WireStruct, WireValue};
