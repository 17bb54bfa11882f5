//! Current-item navigation inside the preview modal.
//!
//! Time is passed in explicitly. The event loop's tick calls [`tick`] with the
//! current instant, which is what fires the cooldown timer.
//!
//! [`tick`]: NavigationController::tick

use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use tracing::trace;

/// Default minimum gap between two accepted navigation steps.
pub const DEFAULT_NAVIGATION_COOLDOWN: Duration = Duration::from_millis(200);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Prev,
    Next,
}

/// Result of feeding a key to the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavOutcome {
    Navigated,
    Ignored,
    /// Escape: the owner should close the modal.
    Close,
}

/// Position of the current item within an ordered list of `len` items.
#[derive(Debug, Clone)]
pub struct NavigationController {
    current: usize,
    len: usize,
    cooldown: Duration,
    last_navigation: Option<Instant>,
    transitioning: bool,
    /// Pending cooldown timer; `None` once fired or cancelled.
    transition_deadline: Option<Instant>,
}

impl NavigationController {
    pub fn new(initial_index: usize, len: usize, cooldown: Duration) -> Self {
        Self {
            current: clamp_index(initial_index, len),
            len,
            cooldown,
            last_navigation: None,
            transitioning: false,
            transition_deadline: None,
        }
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_transitioning(&self) -> bool {
        self.transitioning
    }

    fn can_navigate(&self, now: Instant) -> bool {
        if let Some(last) = self.last_navigation {
            if now.saturating_duration_since(last) < self.cooldown {
                return false;
            }
        }
        !self.transitioning
    }

    /// Step one item with wraparound. Requests inside the cooldown window and
    /// requests on a list of one or zero items are ignored.
    pub fn navigate(&mut self, direction: Direction, now: Instant) -> bool {
        if self.len <= 1 || !self.can_navigate(now) {
            trace!(?direction, "navigation ignored");
            return false;
        }
        self.current = match direction {
            Direction::Next if self.current + 1 >= self.len => 0,
            Direction::Next => self.current + 1,
            Direction::Prev if self.current == 0 => self.len - 1,
            Direction::Prev => self.current - 1,
        };
        self.last_navigation = Some(now);
        self.transitioning = true;
        self.transition_deadline = Some(now + self.cooldown);
        true
    }

    /// Click on the image surface: left third goes back, right third goes
    /// forward, the middle third does nothing.
    pub fn click(&mut self, x: u16, width: u16, now: Instant) -> bool {
        let (x, width) = (u32::from(x), u32::from(width));
        if width == 0 {
            return false;
        }
        if x * 3 < width {
            self.navigate(Direction::Prev, now)
        } else if x * 3 > width * 2 {
            self.navigate(Direction::Next, now)
        } else {
            false
        }
    }

    /// Map arrow keys to navigation and Escape to close. Escape bypasses the
    /// cooldown.
    pub fn handle_key(&mut self, code: KeyCode, now: Instant) -> NavOutcome {
        let moved = match code {
            KeyCode::Esc => return NavOutcome::Close,
            KeyCode::Left => self.navigate(Direction::Prev, now),
            KeyCode::Right => self.navigate(Direction::Next, now),
            _ => false,
        };
        if moved {
            NavOutcome::Navigated
        } else {
            NavOutcome::Ignored
        }
    }

    /// Fire the cooldown timer if it is due. Returns whether it fired.
    pub fn tick(&mut self, now: Instant) -> bool {
        match self.transition_deadline {
            Some(deadline) if now >= deadline => {
                self.transition_deadline = None;
                self.transitioning = false;
                true
            }
            _ => false,
        }
    }

    /// Drop the pending timer. Later ticks are guaranteed no-ops.
    pub fn cancel(&mut self) {
        self.transition_deadline = None;
    }

    /// Jump straight to `index` (thumbnail selection, following a moved item).
    pub fn follow(&mut self, index: usize) {
        self.current = clamp_index(index, self.len);
    }

    /// Update the list length after items were removed or added.
    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        self.current = clamp_index(self.current, len);
    }
}

fn clamp_index(index: usize, len: usize) -> usize {
    index.min(len.saturating_sub(1))
}
