//! # mailbeam-imap
//!
//! A client library for IMAP4rev1 (RFC 3501) with SASL authentication
//! (CRAM-MD5, PLAIN) and modified UTF-7 mailbox names.
//!
//! ## Features
//!
//! - **Streaming wire parser**: a resumable tokenizer and grammar for
//!   server responses, including length-prefixed literals, quoted
//!   strings and response-text codes
//! - **Strict command lifecycle**: one command in flight per connection,
//!   tag pairing, continuation-driven literals and AUTHENTICATE
//! - **Connection state machine**: `NotAuthenticated` → `Authenticated`
//!   → `Selected` → `Logout`, with capability negotiation on connect
//! - **TLS via rustls**: optional CA roots and client certificates
//!   loaded from PEM files
//!
//! ## Quick start
//!
//! ```ignore
//! use mailbeam_imap::{Config, Engine, SearchKey};
//!
//! #[tokio::main]
//! async fn main() -> mailbeam_imap::Result<()> {
//!     let config = Config::builder("imap.example.com")
//!         .port(993)
//!         .tls(true)
//!         .credentials("user@example.com", "password")
//!         .build();
//!
//!     let mut engine = Engine::connect(config).await?;
//!     engine.authenticate().await?;
//!
//!     for mailbox in engine.list("", "*").await? {
//!         println!("{}", mailbox.name);
//!     }
//!
//!     let view = engine.select("INBOX").await?;
//!     println!("{} messages, {} recent", view.exists, view.recent);
//!
//!     let unseen = engine.search(None, SearchKey::unseen()).await?;
//!     println!("unseen: {unseen:?}");
//!
//!     engine.logout().await
//! }
//! ```
//!
//! ## Modules
//!
//! - [`connection`]: transport configuration, TLS and buffered reading
//! - [`parser`]: the server-response grammar
//! - [`command`]: typed commands, tags and SEARCH keys
//! - [`auth`]: SASL mechanisms
//! - [`protocol`]: the connection engine
//! - [`types`]: capabilities, flags, mailboxes and response codes

#![warn(missing_docs)]
#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod aggregate;
pub mod auth;
pub mod command;
pub mod connection;
mod error;
pub mod mutf7;
pub mod parser;
pub mod protocol;
pub mod types;

pub use auth::Mechanism;
pub use command::{Command, SearchDate, SearchKey, TagGenerator};
pub use connection::{Config, ConfigBuilder, ImapStream};
pub use error::{Error, Result};
pub use parser::{DataResponse, Response, StatusKind, StatusResponse};
pub use protocol::{CommandReply, ConnectionState, Engine};
pub use types::{Capability, Flag, MailboxAttribute, MailboxListing, MailboxView};
