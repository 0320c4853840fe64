//! Display order for conversation rows.
//!
//! Rows with unread messages come first, then the most recent activity,
//! then display name (case-insensitive), then user id so that the order is
//! total and independent of the input order.

use std::cmp::Ordering;

use crate::aggregator::ConversationRow;

/// Comparator behind [`rank`].
pub fn compare(a: &ConversationRow, b: &ConversationRow) -> Ordering {
    let a_unread = a.summary.unread_count > 0;
    let b_unread = b.summary.unread_count > 0;

    b_unread
        .cmp(&a_unread)
        .then_with(|| match (a.summary.last_message_at, b.summary.last_message_at) {
            (Some(x), Some(y)) => y.cmp(&x),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
        .then_with(|| {
            a.user
                .full_name
                .to_lowercase()
                .cmp(&b.user.full_name.to_lowercase())
        })
        .then_with(|| a.user.id.cmp(&b.user.id))
}

/// Sort `rows` for display.
pub fn rank(mut rows: Vec<ConversationRow>) -> Vec<ConversationRow> {
    rows.sort_by(compare);
    rows
}
