//! Server capability tokens.

/// A server-advertised capability.
///
/// The token set is open-ended; anything unrecognized is preserved in
/// [`Capability::Unknown`] with its original spelling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Capability {
    /// `IMAP4rev1` (RFC 3501). Mandatory for this library.
    Imap4Rev1,
    /// STARTTLS support.
    StartTls,
    /// LOGIN is disabled (e.g. before TLS).
    LoginDisabled,
    /// `AUTH=<mechanism>` authentication mechanism advertisement.
    Auth(String),
    /// Unrecognized capability token.
    Unknown(String),
}

impl Capability {
    /// Parses a capability token.
    #[must_use]
    pub fn parse(token: &str) -> Self {
        let upper = token.to_uppercase();
        match upper.as_str() {
            "IMAP4REV1" => Self::Imap4Rev1,
            "STARTTLS" => Self::StartTls,
            "LOGINDISABLED" => Self::LoginDisabled,
            _ if upper.starts_with("AUTH=") => Self::Auth(upper[5..].to_string()),
            _ => Self::Unknown(token.to_string()),
        }
    }

    /// Returns the advertised authentication mechanism name, if any.
    #[must_use]
    pub fn auth_mechanism(&self) -> Option<&str> {
        match self {
            Self::Auth(mech) => Some(mech),
            _ => None,
        }
    }
}

impl std::fmt::Display for Capability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Imap4Rev1 => write!(f, "IMAP4rev1"),
            Self::StartTls => write!(f, "STARTTLS"),
            Self::LoginDisabled => write!(f, "LOGINDISABLED"),
            Self::Auth(mech) => write!(f, "AUTH={mech}"),
            Self::Unknown(token) => write!(f, "{token}"),
        }
    }
}
