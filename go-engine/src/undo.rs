use crate::error::GoError;
use crate::snapshot::{BoardSnapshot, Captures};
use crate::stone::Stone;

/// Number of snapshots an undo by `requester` removes when the latest snapshot is
/// `latest_move_num`.
///
/// If the requester made the latest move, only that move goes. If it is the requester's
/// turn, the opponent's reply goes too, so the turn comes back to the requester either way.
pub fn undo_depth(latest_move_num: u32, requester: Stone) -> Result<usize, GoError> {
    let to_move = Stone::to_move_after(latest_move_num);
    let (depth, needed) = if requester != to_move { (1, 1) } else { (2, 2) };

    if latest_move_num < needed {
        return Err(GoError::NothingToUndo);
    }
    Ok(depth)
}

/// Truncate the snapshot suffix for an undo and bring the capture counters along.
///
/// The counters must match a tally of the full chain going in; they are then
/// decremented by exactly the removed snapshots and checked against a tally of what
/// remains. Nothing is touched unless every check passes.
pub(crate) fn retract(
    snapshots: &mut Vec<BoardSnapshot>,
    captures: &mut Captures,
    requester: Stone,
) -> Result<usize, GoError> {
    let latest = snapshots
        .last()
        .ok_or_else(|| GoError::CorruptHistory("no snapshots".to_string()))?;
    let depth = undo_depth(latest.move_num(), requester)?;
    let keep = snapshots
        .len()
        .checked_sub(depth)
        .filter(|&k| k > 0)
        .ok_or_else(|| GoError::CorruptHistory("undo past the initial board".to_string()))?;

    let before = Captures::tally(snapshots);
    if *captures != before {
        return Err(disagreement(*captures, before));
    }

    let mut remaining = *captures;
    for removed in &snapshots[keep..] {
        if let Some(stone) = removed.mover() {
            remaining = remaining
                .checked_sub(stone, removed.captured_stones())
                .ok_or_else(|| disagreement(*captures, before))?;
        }
    }

    let after = Captures::tally(&snapshots[..keep]);
    if remaining != after {
        return Err(disagreement(remaining, after));
    }

    snapshots.truncate(keep);
    *captures = remaining;
    Ok(depth)
}

fn disagreement(counters: Captures, tally: Captures) -> GoError {
    GoError::CorruptHistory(format!(
        "capture counters {counters:?} disagree with snapshots {tally:?}"
    ))
}
