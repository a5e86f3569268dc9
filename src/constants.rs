//! Common constants used throughout loopia-dns

//==============================================================================
// Loopia API Constants
//==============================================================================

/// Production XML-RPC endpoint of the Loopia API
pub const LOOPIA_DEFAULT_ENDPOINT: &str = "https://api.loopia.se/RPCSERV";

/// User agent string for Loopia API requests
pub const LOOPIA_USER_AGENT: &str = "loopia-dns/0.1";

/// Content type of an XML-RPC request body
pub const XMLRPC_CONTENT_TYPE: &str = "text/xml";

/// Remote method adding a record under a zone/subdomain
pub const METHOD_ADD_ZONE_RECORD: &str = "addZoneRecord";

/// Remote method removing a record by its numeric handle
pub const METHOD_REMOVE_ZONE_RECORD: &str = "removeZoneRecord";

/// Remote method listing the records of a zone/subdomain
pub const METHOD_GET_ZONE_RECORDS: &str = "getZoneRecords";

/// Priority sent with every added record (only meaningful for MX/SRV)
pub const DEFAULT_RECORD_PRIORITY: u32 = 0;

/// Largest response body read from the API, in bytes
pub const MAX_RESPONSE_BYTES: usize = 4 * 1024 * 1024;

/// Deepest array/struct nesting accepted in a response
///
/// A record listing is array -> struct -> scalar.
pub const MAX_VALUE_NESTING: usize = 32;

/// Largest ttl representable as an XML-RPC `<int>` (32-bit signed)
pub const MAX_TTL: u32 = i32::MAX as u32;

//==============================================================================
// Identity Constants
//==============================================================================

/// Separator between the segments of an external id
pub const ID_SEPARATOR: char = ':';

/// Tail of an external id produced during preview evaluation
pub const ID_PREVIEW_TAIL: &str = "preview";

//==============================================================================
// Timeout Constants
//==============================================================================

/// Default HTTP request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Minimum HTTP request timeout in seconds
pub const MIN_TIMEOUT_SECS: u64 = 1;

/// Maximum HTTP request timeout in seconds
pub const MAX_TIMEOUT_SECS: u64 = 300;

//==============================================================================
// Validation Constants
//==============================================================================

/// Maximum DNS name length in characters
pub const MAX_RECORD_NAME_LENGTH: usize = 253;

/// Maximum DNS label length in characters
pub const MAX_LABEL_LENGTH: usize = 63;

/// Maximum record type length (e.g. "DNSKEY", "CDNSKEY")
pub const MAX_RECORD_TYPE_LENGTH: usize = 10;

//==============================================================================
// Environment Variable Names
//==============================================================================

/// Environment variable name for the Loopia API username
pub const ENV_USERNAME: &str = "LOOPIA_USERNAME";

/// Environment variable name for the Loopia API password
pub const ENV_PASSWORD: &str = "LOOPIA_PASSWORD";

/// Environment variable name for an endpoint override
pub const ENV_ENDPOINT: &str = "LOOPIA_ENDPOINT";

/// Environment variable name for the HTTP timeout in seconds
pub const ENV_TIMEOUT: &str = "LOOPIA_TIMEOUT";
