use crate::Pos;
use crate::error::GoError;
use crate::goban::Goban;

/// Ko point created by a placement, if any.
///
/// A ko exists only when exactly one stone was captured and the capturing stone stands
/// alone with its single liberty on the point it just emptied. `goban` is the board
/// after captures were removed.
pub fn detect_ko(goban: &Goban, placed: Pos, captured: &[Pos]) -> Result<Option<Pos>, GoError> {
    let [taken] = captured else {
        return Ok(None);
    };

    let group = goban.find_group(placed)?;
    let is_ko = group.stones.len() == 1
        && group.liberties.len() == 1
        && group.liberties.contains(taken);

    Ok(is_ko.then_some(*taken))
}
