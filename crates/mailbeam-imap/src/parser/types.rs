//! Parsed server response types.
//!
//! Responses form a closed sum type dispatched by tag kind: status
//! (tagged or untagged), untagged server data, or a continuation request.

use crate::types::{Capability, Flag, MailboxListing, ResponseCode};

/// Status condition of a status response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    /// Success.
    Ok,
    /// Operational failure.
    No,
    /// Protocol or syntax failure.
    Bad,
    /// Server is closing the connection. Always untagged.
    Bye,
    /// Greeting: connection starts pre-authenticated. Always untagged.
    PreAuth,
}

/// Human-readable response text with optional bracketed code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseText {
    /// Machine-readable code, when present.
    pub code: Option<ResponseCode>,
    /// Free-form text, without the trailing CRLF.
    pub text: String,
}

/// A status response: `OK`, `NO`, `BAD`, `BYE` or `PREAUTH`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// The command tag, or `None` for untagged (`*`) responses.
    pub tag: Option<String>,
    /// The status condition.
    pub kind: StatusKind,
    /// Response text and optional code.
    pub text: ResponseText,
}

/// Untagged server data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataResponse {
    /// `* CAPABILITY ...`
    Capability(Vec<Capability>),
    /// `* LIST (...) delim name`
    List(MailboxListing),
    /// `* LSUB (...) delim name`
    LSub(MailboxListing),
    /// `* FLAGS (...)`
    Flags(Vec<Flag>),
    /// `* n EXISTS`
    Exists(u32),
    /// `* n RECENT`
    Recent(u32),
    /// `* SEARCH n...`
    Search(Vec<u32>),
}

/// One complete server response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// A tagged or untagged status response.
    Status(StatusResponse),
    /// Untagged server data.
    Data(DataResponse),
    /// A continuation request (`+ ...`).
    Continuation {
        /// Text following the `+`, often a base64 challenge.
        text: String,
    },
}

impl Response {
    /// Returns the status response, if this is one.
    #[must_use]
    pub fn as_status(&self) -> Option<&StatusResponse> {
        match self {
            Self::Status(status) => Some(status),
            _ => None,
        }
    }
}
