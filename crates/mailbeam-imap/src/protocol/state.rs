//! Connection lifecycle states.

/// Protocol state of a connection (RFC 3501 section 3).
///
/// ```text
/// Disconnected ──connect──▶ NotAuthenticated ──auth OK──▶ Authenticated
///        ▲                        │                            │  ▲
///        │                        └──PREAUTH greeting──────────┘  │
///        │                                    SELECT/EXAMINE OK ──┼──▶ Selected
///        │                                       CLOSE / SELECT fail ──┘
///        └──socket closed── Logout ◀──BYE / LOGOUT OK── any state
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionState {
    /// No transport attached.
    #[default]
    Disconnected,
    /// Greeting consumed, waiting for credentials.
    NotAuthenticated,
    /// Credentials accepted (or PREAUTH greeting).
    Authenticated,
    /// A mailbox is open.
    Selected,
    /// BYE observed or LOGOUT completed; no further commands.
    Logout,
}

impl ConnectionState {
    /// Returns true if commands may still be issued.
    #[must_use]
    pub const fn is_usable(self) -> bool {
        matches!(
            self,
            Self::NotAuthenticated | Self::Authenticated | Self::Selected
        )
    }

    /// Returns true if authentication has completed.
    #[must_use]
    pub const fn is_authenticated(self) -> bool {
        matches!(self, Self::Authenticated | Self::Selected)
    }

    /// Returns true if a mailbox is open.
    #[must_use]
    pub const fn is_selected(self) -> bool {
        matches!(self, Self::Selected)
    }
}
