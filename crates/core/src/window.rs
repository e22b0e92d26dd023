//! Respawn window engine.
//!
//! Converts a recorded death plus a boss's timer/window configuration into a
//! [`WindowState`]. Everything here is pure: callers pass `now` explicitly, so
//! the same inputs always produce the same state.
//!
//! ```text
//! death_time ──(respawn_timer)──> window_start ──(window_length)──> window_end
//!            Pending              [            Open             ]   Expired
//! ```

use std::fmt;

use chrono::Duration;

use crate::error::CoreError;
use crate::types::Timestamp;

/// Time left in an open window, floored to whole minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Remaining {
    pub hours: i64,
    pub minutes: i64,
}

impl Remaining {
    /// Decompose a non-negative duration into whole hours and remainder minutes.
    ///
    /// Negative input clamps to zero.
    pub fn from_duration(duration: Duration) -> Self {
        let total_minutes = duration.num_minutes().max(0);
        Self {
            hours: total_minutes / 60,
            minutes: total_minutes % 60,
        }
    }
}

impl fmt::Display for Remaining {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}h {}m", self.hours, self.minutes)
    }
}

/// Where `now` falls relative to a respawn window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// The respawn timer is still running.
    Pending {
        window_start: Timestamp,
        window_length: Duration,
    },
    /// `window_start <= now <= window_end`.
    Open {
        window_end: Timestamp,
        remaining: Remaining,
    },
    /// `now > window_end`.
    Expired { window_end: Timestamp },
}

impl WindowState {
    pub fn is_pending(&self) -> bool {
        matches!(self, WindowState::Pending { .. })
    }

    pub fn is_open(&self) -> bool {
        matches!(self, WindowState::Open { .. })
    }

    pub fn is_expired(&self) -> bool {
        matches!(self, WindowState::Expired { .. })
    }

    /// The instant summary listings sort by: the end of the window.
    pub fn sort_key(&self) -> Timestamp {
        match *self {
            WindowState::Pending {
                window_start,
                window_length,
            } => window_start + window_length,
            WindowState::Open { window_end, .. } | WindowState::Expired { window_end } => {
                window_end
            }
        }
    }

    /// Ordinal used to check forward-only progression (Pending < Open < Expired).
    #[cfg(test)]
    fn phase(&self) -> u8 {
        match self {
            WindowState::Pending { .. } => 0,
            WindowState::Open { .. } => 1,
            WindowState::Expired { .. } => 2,
        }
    }
}

/// The fixed bounds of one respawn window, computed once per death event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RespawnWindow {
    pub start: Timestamp,
    pub end: Timestamp,
    pub length: Duration,
}

impl RespawnWindow {
    /// Derive window bounds from a death time.
    ///
    /// Fails with [`CoreError::InvalidTimestamp`] when the window would end
    /// past the largest representable instant.
    ///
    /// # Panics
    ///
    /// Panics if `respawn_timer` is negative or `window_length` is not
    /// positive. Catalog validation rejects such entries before they reach
    /// the engine.
    pub fn new(
        death_time: Timestamp,
        respawn_timer: Duration,
        window_length: Duration,
    ) -> Result<Self, CoreError> {
        assert!(
            respawn_timer >= Duration::zero(),
            "respawn timer must not be negative"
        );
        assert!(
            window_length > Duration::zero(),
            "window length must be positive"
        );

        let start = death_time.checked_add_signed(respawn_timer);
        let end = start.and_then(|start| start.checked_add_signed(window_length));
        match (start, end) {
            (Some(start), Some(end)) => Ok(Self {
                start,
                end,
                length: window_length,
            }),
            _ => Err(CoreError::InvalidTimestamp(format!(
                "A death at {death_time} puts the respawn window out of range"
            ))),
        }
    }

    /// Classify `now` against the window. Both ends are inclusive.
    pub fn state_at(&self, now: Timestamp) -> WindowState {
        if now < self.start {
            WindowState::Pending {
                window_start: self.start,
                window_length: self.length,
            }
        } else if now <= self.end {
            WindowState::Open {
                window_end: self.end,
                remaining: Remaining::from_duration(self.end - now),
            }
        } else {
            WindowState::Expired {
                window_end: self.end,
            }
        }
    }
}

/// Compute the window state for a death event at `now`.
pub fn compute_window(
    death_time: Timestamp,
    respawn_timer: Duration,
    window_length: Duration,
    now: Timestamp,
) -> Result<WindowState, CoreError> {
    Ok(RespawnWindow::new(death_time, respawn_timer, window_length)?.state_at(now))
}
