//! Mailbox listing and selected-mailbox view types.

use super::flag::{Flag, MailboxAttribute};

/// One mailbox from a LIST or LSUB response.
///
/// The name is stored decoded from modified UTF-7.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailboxListing {
    /// Name attributes (`\HasNoChildren`, `\Noselect`, ...).
    pub attributes: Vec<MailboxAttribute>,
    /// Hierarchy delimiter, or `None` when the server sent `NIL`.
    pub delimiter: Option<char>,
    /// Decoded mailbox name.
    pub name: String,
}

impl MailboxListing {
    /// Returns true if the mailbox carries the given attribute.
    #[must_use]
    pub fn has_attribute(&self, attribute: &MailboxAttribute) -> bool {
        self.attributes.contains(attribute)
    }

    /// Returns true if the mailbox can be selected.
    #[must_use]
    pub fn is_selectable(&self) -> bool {
        !self.has_attribute(&MailboxAttribute::Noselect)
    }
}

/// The state of a mailbox after SELECT or EXAMINE.
///
/// Folds the untagged FLAGS/EXISTS/RECENT data and the OK response codes
/// the server sends while opening a mailbox.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailboxView {
    /// Flags defined in the mailbox.
    pub flags: Vec<Flag>,
    /// Number of messages in the mailbox.
    pub exists: u32,
    /// Number of messages with `\Recent` set.
    pub recent: u32,
    /// Sequence number of the first unseen message, if reported.
    pub unseen: Option<u32>,
    /// Flags the client may change permanently, if reported.
    pub permanent_flags: Vec<Flag>,
    /// Predicted next UID, if reported.
    pub uid_next: Option<u32>,
    /// UID validity value, if reported.
    pub uid_validity: Option<u32>,
    /// Whether the mailbox was opened read-only (EXAMINE, or the server's
    /// READ-ONLY code on SELECT).
    pub read_only: bool,
    /// Untagged OK texts that carried no recognized code.
    pub info: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selectable() {
        let listing = MailboxListing {
            attributes: vec![MailboxAttribute::HasNoChildren],
            delimiter: Some('/'),
            name: "INBOX".to_string(),
        };
        assert!(listing.is_selectable());

        let parent = MailboxListing {
            attributes: vec![MailboxAttribute::Noselect, MailboxAttribute::HasChildren],
            delimiter: Some('/'),
            name: "Archive".to_string(),
        };
        assert!(!parent.is_selectable());
    }

    #[test]
    fn test_view_default_is_empty() {
        let view = MailboxView::default();
        assert_eq!(view.exists, 0);
        assert_eq!(view.unseen, None);
        assert!(view.flags.is_empty());
        assert!(!view.read_only);
    }
}
