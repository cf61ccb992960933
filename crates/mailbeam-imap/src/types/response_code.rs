//! Bracketed response-text codes.

use super::capability::Capability;
use super::flag::Flag;

/// A machine-readable code from the bracketed part of a response text.
///
/// Numeric payloads are positive 32-bit values; a zero payload is a
/// contract violation rejected at parse time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseCode {
    /// `ALERT`: the text must be shown to the user.
    Alert,
    /// `PARSE`: the server had trouble parsing a message.
    Parse,
    /// `READ-ONLY`: the mailbox is open read-only.
    ReadOnly,
    /// `READ-WRITE`: the mailbox is open read-write.
    ReadWrite,
    /// `TRYCREATE`: the target mailbox does not exist yet.
    TryCreate,
    /// `CAPABILITY ...`: inline capability advertisement.
    Capability(Vec<Capability>),
    /// `PERMANENTFLAGS (...)`: flags the client may change permanently.
    PermanentFlags(Vec<Flag>),
    /// `UIDNEXT n`.
    UidNext(u32),
    /// `UIDVALIDITY n`.
    UidValidity(u32),
    /// `UNSEEN n`.
    Unseen(u32),
    /// `HIGHESTMODSEQ n`.
    HighestModSeq(u32),
    /// Any other code, name plus raw payload bytes.
    Other {
        /// Code name as sent by the server.
        name: String,
        /// Raw payload bytes (empty when the code had none).
        data: Vec<u8>,
    },
}

impl ResponseCode {
    /// Returns the inline capability list, if this is a CAPABILITY code.
    #[must_use]
    pub fn capabilities(&self) -> Option<&[Capability]> {
        match self {
            Self::Capability(caps) => Some(caps),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capabilities_accessor() {
        let code = ResponseCode::Capability(vec![Capability::Imap4Rev1]);
        assert_eq!(code.capabilities(), Some(&[Capability::Imap4Rev1][..]));
        assert_eq!(ResponseCode::Alert.capabilities(), None);
    }
}
