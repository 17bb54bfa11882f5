//! Pointer drag-and-drop and keyboard pick-up/move/drop over one ordered list.
//!
//! Both input paths end in the same [`ReorderTarget::reorder`] call followed
//! by [`ReorderTarget::follow`], so the moved item becomes current at its new
//! position. The two modalities exclude each other: while a pointer drag is
//! in progress keyboard reordering is ignored, and the other way round.

use crate::navigation::Direction;

/// Whatever owns the ordered list being reordered.
pub trait ReorderTarget {
    fn len(&self) -> usize;
    /// Move the item at `from` to `to`. Returns whether the order changed.
    fn reorder(&mut self, from: usize, to: usize) -> bool;
    /// Make the item at `index` the current one.
    fn follow(&mut self, index: usize);
    /// Publish a one-line status description. Fire and forget.
    fn announce(&mut self, message: String);
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ReorderState {
    #[default]
    Idle,
    PointerDrag {
        from: usize,
    },
    PickedUp {
        index: usize,
    },
}

/// A completed move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: usize,
    pub to: usize,
}

#[derive(Debug, Default)]
pub struct ReorderController {
    state: ReorderState,
}

impl ReorderController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ReorderState {
        self.state
    }

    pub fn dragged_index(&self) -> Option<usize> {
        match self.state {
            ReorderState::PointerDrag { from } => Some(from),
            _ => None,
        }
    }

    pub fn picked_up_index(&self) -> Option<usize> {
        match self.state {
            ReorderState::PickedUp { index } => Some(index),
            _ => None,
        }
    }

    /// Forget any interaction in progress without announcing (modal closed).
    pub fn reset(&mut self) {
        self.state = ReorderState::Idle;
    }

    // ── Pointer ─────────────────────────────────────────────────────────

    /// Start a pointer drag on `index`. Ignored during a keyboard pick-up.
    pub fn pick_up(&mut self, index: usize, target: &mut impl ReorderTarget) -> bool {
        let len = target.len();
        if matches!(self.state, ReorderState::PickedUp { .. }) || index >= len {
            return false;
        }
        self.state = ReorderState::PointerDrag { from: index };
        target.announce(format!("Picked up image {} of {}", index + 1, len));
        true
    }

    /// Finish a pointer drag over `index`.
    pub fn drop_on(&mut self, index: usize, target: &mut impl ReorderTarget) -> Option<Move> {
        let ReorderState::PointerDrag { from } = self.state else {
            return None;
        };
        self.state = ReorderState::Idle;
        if index >= target.len() {
            return None;
        }
        if from == index {
            target.follow(index);
            target.announce(format!("Dropped image {} in original position.", index + 1));
            return None;
        }
        self.commit(from, index, target)
    }

    /// The drag ended somewhere that is not a drop target.
    pub fn cancel_drag(&mut self) -> bool {
        if matches!(self.state, ReorderState::PointerDrag { .. }) {
            self.state = ReorderState::Idle;
            true
        } else {
            false
        }
    }

    // ── Keyboard ────────────────────────────────────────────────────────

    /// Space on the item at `index`: pick up, drop in place, or drop onto
    /// another item.
    pub fn activate(&mut self, index: usize, target: &mut impl ReorderTarget) -> Option<Move> {
        if index >= target.len() {
            return None;
        }
        match self.state {
            ReorderState::PointerDrag { .. } => None,
            ReorderState::Idle => {
                self.state = ReorderState::PickedUp { index };
                target.announce(format!(
                    "Picked up image {}. Use arrow keys to move, space to drop.",
                    index + 1
                ));
                None
            }
            ReorderState::PickedUp { index: held } if held == index => {
                self.state = ReorderState::Idle;
                target.announce(format!("Dropped image {} in original position.", index + 1));
                None
            }
            ReorderState::PickedUp { index: held } => {
                self.state = ReorderState::Idle;
                self.commit(held, index, target)
            }
        }
    }

    /// Arrow key while holding an item: move it one slot, clamped at the ends.
    pub fn move_picked(
        &mut self,
        direction: Direction,
        target: &mut impl ReorderTarget,
    ) -> Option<Move> {
        let ReorderState::PickedUp { index } = self.state else {
            return None;
        };
        let last = target.len().checked_sub(1)?;
        let next = match direction {
            Direction::Prev => index.saturating_sub(1),
            Direction::Next => (index + 1).min(last),
        };
        if next == index || !target.reorder(index, next) {
            return None;
        }
        self.state = ReorderState::PickedUp { index: next };
        target.follow(next);
        let side = match direction {
            Direction::Prev => "left",
            Direction::Next => "right",
        };
        target.announce(format!("Moving image {} to position {}", side, next + 1));
        Some(Move {
            from: index,
            to: next,
        })
    }

    /// Escape while holding an item puts it back. Returns whether the key was
    /// consumed; when idle the caller should treat Escape as "close".
    pub fn escape(&mut self, target: &mut impl ReorderTarget) -> bool {
        if matches!(self.state, ReorderState::PickedUp { .. }) {
            self.state = ReorderState::Idle;
            target.announce("Cancelled move operation".to_string());
            true
        } else {
            false
        }
    }

    fn commit(&mut self, from: usize, to: usize, target: &mut impl ReorderTarget) -> Option<Move> {
        if !target.reorder(from, to) {
            return None;
        }
        target.follow(to);
        target.announce(format!(
            "Moved image from position {} to position {}",
            from + 1,
            to + 1
        ));
        Some(Move { from, to })
    }
}
