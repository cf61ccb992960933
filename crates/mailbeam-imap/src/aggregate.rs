//! Typed result sets folded from a command's untagged responses.

use crate::parser::{DataResponse, StatusKind};
use crate::protocol::CommandReply;
use crate::types::{MailboxListing, MailboxView, ResponseCode};

/// Collects the LIST data responses of a reply.
#[must_use]
pub fn listings(reply: &CommandReply) -> Vec<MailboxListing> {
    reply
        .data
        .iter()
        .filter_map(|data| match data {
            DataResponse::List(listing) => Some(listing.clone()),
            _ => None,
        })
        .collect()
}

/// Collects the LSUB data responses of a reply.
#[must_use]
pub fn subscribed_listings(reply: &CommandReply) -> Vec<MailboxListing> {
    reply
        .data
        .iter()
        .filter_map(|data| match data {
            DataResponse::LSub(listing) => Some(listing.clone()),
            _ => None,
        })
        .collect()
}

/// Concatenates all SEARCH data responses of a reply, in order.
#[must_use]
pub fn search_results(reply: &CommandReply) -> Vec<u32> {
    let mut numbers = Vec::new();
    for data in &reply.data {
        if let DataResponse::Search(found) = data {
            numbers.extend_from_slice(found);
        }
    }
    numbers
}

/// Folds the responses of a SELECT/EXAMINE into a mailbox view.
///
/// `read_only` seeds the view; a READ-ONLY or READ-WRITE code on the
/// terminating status overrides it. Untagged OK texts without a
/// recognized code are preserved as raw informational text.
#[must_use]
pub fn mailbox_view(reply: &CommandReply, read_only: bool) -> MailboxView {
    let mut view = MailboxView {
        read_only,
        ..MailboxView::default()
    };

    for data in &reply.data {
        match data {
            DataResponse::Flags(flags) => view.flags = flags.clone(),
            DataResponse::Exists(count) => view.exists = *count,
            DataResponse::Recent(count) => view.recent = *count,
            _ => {}
        }
    }

    for status in &reply.info {
        if status.kind != StatusKind::Ok {
            continue;
        }
        match &status.text.code {
            Some(ResponseCode::Unseen(n)) => view.unseen = Some(*n),
            Some(ResponseCode::PermanentFlags(flags)) => view.permanent_flags = flags.clone(),
            Some(ResponseCode::UidNext(n)) => view.uid_next = Some(*n),
            Some(ResponseCode::UidValidity(n)) => view.uid_validity = Some(*n),
            None => view.info.push(status.text.text.clone()),
            _ => {}
        }
    }

    match &reply.status.text.code {
        Some(ResponseCode::ReadOnly) => view.read_only = true,
        Some(ResponseCode::ReadWrite) => view.read_only = false,
        _ => {}
    }

    view
}
