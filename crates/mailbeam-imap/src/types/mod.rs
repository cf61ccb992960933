//! Core IMAP data types.

mod capability;
mod flag;
mod mailbox;
mod response_code;

pub use capability::Capability;
pub use flag::{Flag, MailboxAttribute};
pub use mailbox::{MailboxListing, MailboxView};
pub use response_code::ResponseCode;
