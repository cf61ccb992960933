//! Error types for the IMAP library.
//!
//! A single crate-wide error enum covers transport failures, wire-grammar
//! violations, authentication negotiation and per-command server failures.
//! `NO`/`BAD` statuses are recovered at the command level; grammar and
//! transport errors poison the connection.

use thiserror::Error;

/// Errors that can occur during IMAP operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error on the underlying transport.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// TLS handshake or encryption error.
    #[error("TLS error: {0}")]
    Tls(#[from] rustls::Error),

    /// Invalid DNS name for TLS.
    #[error("Invalid DNS name: {0}")]
    InvalidDnsName(#[from] rustls::pki_types::InvalidDnsNameError),

    /// Grammar violation in a server response.
    #[error("Malformed response at byte {position}: {message}")]
    Parse {
        /// Stream offset where the error occurred.
        position: usize,
        /// Description of what went wrong.
        message: String,
    },

    /// Unrecognized but well-formed response token. Recoverable: the line
    /// has been consumed and the caller may keep reading.
    #[error("Unknown response token {0:?}")]
    UnknownResponse(String),

    /// Bracketed response-code payload out of contract (e.g. zero UIDNEXT).
    #[error("Malformed {0} response code payload")]
    MalformedResponseCode(String),

    /// Modified UTF-7 decode failure.
    #[error("Invalid modified UTF-7 encoding")]
    MalformedEncoding,

    /// A LIST/LSUB mailbox name failed modified UTF-7 decoding.
    #[error("Invalid mailbox name {0:?}")]
    MalformedMailboxName(String),

    /// IMAP4rev1 absent from the server capability set.
    #[error("Server does not support IMAP4rev1")]
    UnsupportedProtocol,

    /// No advertised authentication mechanism is supported.
    #[error("No supported authentication mechanism")]
    NoSupportedAuthMechanism,

    /// The requested authentication mechanism is not advertised.
    #[error("Authentication mechanism {0} not advertised by server")]
    UnsupportedAuthMechanism(String),

    /// Server sent BYE as its greeting.
    #[error("Server rejected connection: {0}")]
    ServerRejected(String),

    /// The greeting was not OK, PREAUTH or BYE.
    #[error("Invalid greeting: {0}")]
    InvalidGreeting(String),

    /// Untagged BYE observed; the connection is going away.
    #[error("Server shutting down: {0}")]
    ServerShuttingDown(String),

    /// The connection is no longer usable for commands.
    #[error("Connection is down")]
    ConnectionDown,

    /// Tagged NO: logical command failure with server-supplied text.
    #[error("Server returned NO: {0}")]
    No(String),

    /// Tagged BAD: protocol-level command failure with server-supplied text.
    #[error("Server returned BAD: {0}")]
    Bad(String),

    /// OK status received while awaiting a literal continuation.
    #[error("Unexpected OK while sending literal")]
    UnexpectedOkDuringLiteral,

    /// Unknown SEARCH key tag in the surface syntax.
    #[error("Unknown search key {0:?}")]
    UnknownSearchKey(String),

    /// A SEARCH key argument did not match its expected form.
    #[error("Invalid argument for {key} key: {message}")]
    InvalidSearchArgument {
        /// The SEARCH key tag.
        key: String,
        /// What was wrong with the argument.
        message: String,
    },

    /// Protocol violation not covered by a more specific variant.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl Error {
    /// Returns true if this error means the connection can no longer be
    /// used and must be closed.
    #[must_use]
    pub const fn is_connection_dead(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::Tls(_)
                | Self::Parse { .. }
                | Self::ServerShuttingDown(_)
                | Self::ConnectionDown
                | Self::UnexpectedOkDuringLiteral
        )
    }

    /// Returns true if the enclosing command may be retried by the caller
    /// on a fresh connection.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::No(_) | Self::UnknownResponse(_))
    }
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_connection_dead_predicate() {
        assert!(Error::ConnectionDown.is_connection_dead());
        assert!(Error::ServerShuttingDown("going down".into()).is_connection_dead());
        assert!(Error::UnexpectedOkDuringLiteral.is_connection_dead());
        assert!(!Error::No("denied".into()).is_connection_dead());
        assert!(!Error::MalformedEncoding.is_connection_dead());
    }

    #[test]
    fn test_recoverable_predicate() {
        assert!(Error::No("mailbox exists".into()).is_recoverable());
        assert!(Error::UnknownResponse("XDATA".into()).is_recoverable());
        assert!(!Error::Bad("syntax".into()).is_recoverable());
        assert!(!Error::ConnectionDown.is_recoverable());
    }

    #[test]
    fn test_display_carries_server_text() {
        let err = Error::No("name invalid".into());
        assert_eq!(err.to_string(), "Server returned NO: name invalid");
    }
}
