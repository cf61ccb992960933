//! Typed IMAP commands and their wire serialization.
//!
//! A command contributes an ordered argument vector and, for the
//! multi-step commands, a continuation hook. The [`CommandEncoder`]
//! turns the vector into wire chunks: literal arguments split the
//! command line at `{n}` announcements that each require a server
//! continuation before the payload may follow.

pub mod encode;
mod search;
mod tag;

pub use search::{SearchDate, SearchKey};
pub use tag::TagGenerator;

use crate::auth::Mechanism;
use crate::Result;

use encode::{astring_bytes, mailbox_arg, quoted_arg};

/// One element of a command's argument vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Arg {
    /// Pre-encoded bytes, emitted verbatim.
    Raw(Vec<u8>),
    /// ASCII string, emitted as an atom or quoted string.
    String(String),
    /// Length-prefixed literal with a continuation handshake.
    Literal(Vec<u8>),
}

/// A client command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// CAPABILITY: request the capability list.
    Capability,
    /// NOOP: keep-alive, polls for unsolicited data.
    Noop,
    /// LOGOUT: end the session.
    Logout,
    /// LOGIN: plaintext credentials.
    Login {
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// AUTHENTICATE: SASL challenge-response authentication.
    Authenticate {
        /// The SASL mechanism driving the continuation exchange.
        mechanism: Mechanism,
        /// User name.
        username: String,
        /// Password.
        password: String,
    },
    /// LIST: match mailbox names against a pattern.
    List {
        /// Reference name (naming context).
        reference: String,
        /// Mailbox name pattern with `*`/`%` wildcards.
        pattern: String,
    },
    /// LSUB: like LIST, restricted to subscribed mailboxes.
    LSub {
        /// Reference name.
        reference: String,
        /// Mailbox name pattern.
        pattern: String,
    },
    /// CREATE: create a mailbox.
    Create {
        /// Mailbox name.
        mailbox: String,
    },
    /// DELETE: delete a mailbox.
    Delete {
        /// Mailbox name.
        mailbox: String,
    },
    /// RENAME: rename a mailbox.
    Rename {
        /// Current name.
        from: String,
        /// New name.
        to: String,
    },
    /// SUBSCRIBE: add a mailbox to the subscription list.
    Subscribe {
        /// Mailbox name.
        mailbox: String,
    },
    /// UNSUBSCRIBE: remove a mailbox from the subscription list.
    Unsubscribe {
        /// Mailbox name.
        mailbox: String,
    },
    /// EXAMINE: open a mailbox read-only.
    Examine {
        /// Mailbox name.
        mailbox: String,
    },
    /// SELECT: open a mailbox read-write.
    Select {
        /// Mailbox name.
        mailbox: String,
    },
    /// CLOSE: close the selected mailbox.
    Close,
    /// SEARCH: find messages matching a key.
    Search {
        /// Optional CHARSET argument.
        charset: Option<String>,
        /// The search key.
        key: SearchKey,
    },
}

impl Command {
    /// Returns the command keyword.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Capability => "CAPABILITY",
            Self::Noop => "NOOP",
            Self::Logout => "LOGOUT",
            Self::Login { .. } => "LOGIN",
            Self::Authenticate { .. } => "AUTHENTICATE",
            Self::List { .. } => "LIST",
            Self::LSub { .. } => "LSUB",
            Self::Create { .. } => "CREATE",
            Self::Delete { .. } => "DELETE",
            Self::Rename { .. } => "RENAME",
            Self::Subscribe { .. } => "SUBSCRIBE",
            Self::Unsubscribe { .. } => "UNSUBSCRIBE",
            Self::Examine { .. } => "EXAMINE",
            Self::Select { .. } => "SELECT",
            Self::Close => "CLOSE",
            Self::Search { .. } => "SEARCH",
        }
    }

    /// Returns the ordered argument vector, keyword first.
    #[must_use]
    pub fn args(&self) -> Vec<Arg> {
        let mut args = vec![Arg::Raw(self.name().as_bytes().to_vec())];

        match self {
            Self::Capability | Self::Noop | Self::Logout | Self::Close => {}

            Self::Login { username, password } => {
                args.push(Arg::String(username.clone()));
                args.push(Arg::String(password.clone()));
            }

            Self::Authenticate { mechanism, .. } => {
                args.push(Arg::Raw(mechanism.name().as_bytes().to_vec()));
            }

            Self::List { reference, pattern } | Self::LSub { reference, pattern } => {
                args.push(quoted_arg(reference));
                args.push(quoted_arg(pattern));
            }

            Self::Create { mailbox }
            | Self::Delete { mailbox }
            | Self::Subscribe { mailbox }
            | Self::Unsubscribe { mailbox }
            | Self::Examine { mailbox }
            | Self::Select { mailbox } => {
                args.push(mailbox_arg(mailbox));
            }

            Self::Rename { from, to } => {
                args.push(mailbox_arg(from));
                args.push(mailbox_arg(to));
            }

            Self::Search { charset, key } => {
                if let Some(charset) = charset {
                    args.push(Arg::Raw(b"CHARSET".to_vec()));
                    args.push(Arg::String(charset.clone()));
                }
                for token in key.tokens() {
                    args.push(Arg::Raw(token.clone()));
                }
            }
        }

        args
    }

    /// Handles a server continuation that is not part of literal
    /// transmission.
    ///
    /// Returns the bytes to send (including CRLF), or `None` when the
    /// command expects no continuation.
    ///
    /// # Errors
    ///
    /// Fails when an AUTHENTICATE challenge cannot be decoded.
    pub fn on_continuation(&self, prompt: &str) -> Result<Option<Vec<u8>>> {
        match self {
            Self::Authenticate {
                mechanism,
                username,
                password,
            } => {
                let mut line = mechanism.respond(prompt, username, password)?;
                line.extend_from_slice(b"\r\n");
                Ok(Some(line))
            }
            _ => Ok(None),
        }
    }
}

/// Serializes one command into wire chunks.
///
/// Every chunk but the last ends with a `{n}` literal announcement and
/// must be followed by a server continuation before the next chunk (the
/// literal payload and whatever follows it) may be sent.
#[derive(Debug)]
pub struct CommandEncoder {
    chunks: std::vec::IntoIter<Vec<u8>>,
    remaining: usize,
}

impl CommandEncoder {
    /// Builds the chunk sequence for `cmd` under the given tag.
    #[must_use]
    pub fn new(tag: &str, cmd: &Command) -> Self {
        let mut chunks = Vec::new();
        let mut current: Vec<u8> = tag.as_bytes().to_vec();

        for arg in cmd.args() {
            current.push(b' ');
            match arg {
                Arg::Raw(bytes) => current.extend_from_slice(&bytes),
                Arg::String(text) => current.extend_from_slice(&astring_bytes(text.as_bytes())),
                Arg::Literal(payload) => {
                    current.extend_from_slice(format!("{{{}}}\r\n", payload.len()).as_bytes());
                    chunks.push(std::mem::take(&mut current));
                    current = payload;
                }
            }
        }

        current.extend_from_slice(b"\r\n");
        chunks.push(current);

        let remaining = chunks.len();
        Self {
            chunks: chunks.into_iter(),
            remaining,
        }
    }

    /// Returns the next wire chunk and whether it must be followed by a
    /// server continuation before more bytes may be sent.
    pub fn next_chunk(&mut self) -> Option<(Vec<u8>, bool)> {
        let chunk = self.chunks.next()?;
        self.remaining -= 1;
        Some((chunk, self.remaining > 0))
    }
}
