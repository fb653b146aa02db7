use crate::types::{Pair, Role, Turn};

/// Reduce a turn sequence to ordered (user, assistant) pairs.
///
/// A single pending-user slot is kept: a new `User` turn replaces any pending
/// one, an `Assistant` turn consumes it, and an `Assistant` turn with nothing
/// pending is dropped. `Unlabeled` turns are skipped.
#[must_use]
pub fn build_pairs(turns: &[Turn]) -> Vec<Pair> {
    let mut pairs = Vec::new();
    let mut pending_user: Option<&str> = None;

    for turn in turns {
        match turn.role {
            Role::User => {
                if pending_user.is_some() {
                    log::debug!("Discarding unanswered user turn before turn {}", pairs.len() + 1);
                }
                pending_user = Some(turn.text.as_str());
            }
            Role::Assistant => match pending_user.take() {
                Some(user) => {
                    let index = pairs.len() + 1;
                    pairs.push(Pair::new(index, user.trim(), turn.text.trim()));
                }
                None => log::debug!("Dropping assistant turn without a preceding user turn"),
            },
            Role::Unlabeled => log::debug!("Skipping {} turn", turn.role.as_str()),
        }
    }

    if pending_user.is_some() {
        log::debug!("Trailing user turn left without an assistant reply");
    }

    pairs
}
