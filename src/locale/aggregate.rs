//! Group-summary placeholders for messages with several recipients.

use crate::common::types::OnlineUser;

pub const GROUP_AMOUNT_SUBSCRIPT: &str = "%group_amount_subscript%";
pub const GROUP_AMOUNT: &str = "%group_amount%";
pub const GROUP_MEMBERS_COMMA_SEPARATED: &str = "%group_members_comma_separated%";
pub const GROUP_MEMBERS: &str = "%group_members%";

const SUBSCRIPT_DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];

/// Aggregates derived from a recipient list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSummary {
    /// Number of group members counted.
    pub count: usize,
    /// `count` in subscript digits.
    pub subscript_count: String,
    /// Member names joined with the caller's delimiter.
    pub comma_list: String,
    /// Member names joined with newlines. Not yet escaped.
    pub newline_list: String,
}

impl GroupSummary {
    /// Token/value pairs in substitution order. `escape` is applied to the
    /// newline list, which is meant for hover text.
    pub fn placeholders(&self, escape: impl Fn(&str) -> String) -> [(&'static str, String); 4] {
        [
            (GROUP_AMOUNT_SUBSCRIPT, self.subscript_count.clone()),
            (GROUP_AMOUNT, self.count.to_string()),
            (GROUP_MEMBERS_COMMA_SEPARATED, self.comma_list.clone()),
            (GROUP_MEMBERS, escape(&self.newline_list)),
        ]
    }
}

/// Summarise `recipients`.
///
/// With `exclude_primary` the first recipient is addressed separately by the
/// message, so it is left out of the count and both name lists.
/// Callers only aggregate when there is more than one recipient.
pub fn aggregate(recipients: &[OnlineUser], exclude_primary: bool, delimiter: &str) -> GroupSummary {
    let members = if exclude_primary {
        recipients.get(1..).unwrap_or_default()
    } else {
        recipients
    };
    let names: Vec<&str> = members.iter().map(OnlineUser::name).collect();

    GroupSummary {
        count: members.len(),
        subscript_count: subscript_number(members.len()),
        comma_list: names.join(delimiter),
        newline_list: names.join("\n"),
    }
}

/// Render a number with Unicode subscript digits, e.g. 12 -> "₁₂".
pub fn subscript_number(number: usize) -> String {
    number
        .to_string()
        .chars()
        .filter_map(|c| c.to_digit(10))
        .map(|d| SUBSCRIPT_DIGITS[d as usize])
        .collect()
}
