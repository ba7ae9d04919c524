//! Session countdown.
//!
//! A tick-driven state machine with no scheduling of its own: the caller
//! delivers one `tick()` per elapsed second while the timer runs.
//!
//! ```text
//! Idle -> Running <-> Paused
//!         Running -> Complete      (remaining reaches 0)
//! any     -> Idle                  (cancel / reset)
//! ```

use crate::error::{ForgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionKind {
    Focus,
    Break,
}

impl SessionKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SessionKind::Focus => "Focus",
            SessionKind::Break => "Break",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerPhase {
    Idle,
    Running,
    Paused,
    Complete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    Started { remaining_secs: u32 },
    Paused { remaining_secs: u32 },
    Resumed { remaining_secs: u32 },
    Cancelled,
    /// Emitted exactly once, on the tick that reaches zero.
    Completed { kind: SessionKind, total_secs: u32 },
}

#[derive(Debug, Clone)]
pub struct SessionTimer {
    kind: SessionKind,
    total_secs: u32,
    remaining_secs: u32,
    phase: TimerPhase,
}

impl SessionTimer {
    pub fn new(kind: SessionKind, total_secs: u32) -> Result<Self> {
        if total_secs == 0 {
            return Err(ForgeError::invalid("duration", "timer needs at least 1 second"));
        }
        Ok(Self {
            kind,
            total_secs,
            remaining_secs: total_secs,
            phase: TimerPhase::Idle,
        })
    }

    pub fn from_minutes(kind: SessionKind, minutes: u32) -> Result<Self> {
        Self::new(kind, minutes.saturating_mul(60))
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn kind(&self) -> SessionKind {
        self.kind
    }

    pub fn phase(&self) -> TimerPhase {
        self.phase
    }

    pub fn total_secs(&self) -> u32 {
        self.total_secs
    }

    pub fn remaining_secs(&self) -> u32 {
        self.remaining_secs
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.total_secs - self.remaining_secs
    }

    pub fn is_running(&self) -> bool {
        self.phase == TimerPhase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == TimerPhase::Paused
    }

    pub fn is_complete(&self) -> bool {
        self.phase == TimerPhase::Complete
    }

    /// 0.0 .. 100.0
    pub fn progress(&self) -> f64 {
        f64::from(self.elapsed_secs()) / f64::from(self.total_secs) * 100.0
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start(&mut self) -> Option<TimerEvent> {
        match self.phase {
            TimerPhase::Idle | TimerPhase::Paused => {
                self.phase = TimerPhase::Running;
                log::debug!("{} timer started, {}s left", self.kind.display_name(), self.remaining_secs);
                Some(TimerEvent::Started {
                    remaining_secs: self.remaining_secs,
                })
            }
            TimerPhase::Running | TimerPhase::Complete => None,
        }
    }

    pub fn pause(&mut self) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.phase = TimerPhase::Paused;
        log::debug!("{} timer paused, {}s left", self.kind.display_name(), self.remaining_secs);
        Some(TimerEvent::Paused {
            remaining_secs: self.remaining_secs,
        })
    }

    pub fn resume(&mut self) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Paused {
            return None;
        }
        self.phase = TimerPhase::Running;
        log::debug!("{} timer resumed, {}s left", self.kind.display_name(), self.remaining_secs);
        Some(TimerEvent::Resumed {
            remaining_secs: self.remaining_secs,
        })
    }

    /// Abandons the countdown. Progress is discarded, no credit is due.
    pub fn cancel(&mut self) -> Option<TimerEvent> {
        self.rewind();
        log::debug!("{} timer cancelled", self.kind.display_name());
        Some(TimerEvent::Cancelled)
    }

    pub fn reset(&mut self) {
        self.rewind();
    }

    pub fn tick(&mut self) -> Option<TimerEvent> {
        if self.phase != TimerPhase::Running {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        self.phase = TimerPhase::Complete;
        log::debug!("{} timer complete", self.kind.display_name());
        Some(TimerEvent::Completed {
            kind: self.kind,
            total_secs: self.total_secs,
        })
    }

    fn rewind(&mut self) {
        self.phase = TimerPhase::Idle;
        self.remaining_secs = self.total_secs;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn focus(secs: u32) -> SessionTimer {
        SessionTimer::new(SessionKind::Focus, secs).unwrap()
    }

    #[test]
    fn rejects_zero_duration() {
        assert!(SessionTimer::new(SessionKind::Focus, 0).is_err());
        assert!(SessionTimer::from_minutes(SessionKind::Break, 0).is_err());
    }

    #[test]
    fn five_ticks_complete_a_five_second_timer() {
        let mut timer = focus(5);
        assert!(timer.start().is_some());
        for _ in 0..4 {
            assert_eq!(timer.tick(), None);
        }
        assert_eq!(
            timer.tick(),
            Some(TimerEvent::Completed {
                kind: SessionKind::Focus,
                total_secs: 5
            })
        );
        assert_eq!(timer.phase(), TimerPhase::Complete);
        assert_eq!(timer.remaining_secs(), 0);
        assert!(!timer.is_running());
        assert_eq!(timer.progress(), 100.0);
    }

    #[test]
    fn completion_fires_once() {
        let mut timer = focus(1);
        timer.start();
        assert!(timer.tick().is_some());
        assert!(timer.tick().is_none());
        assert!(timer.start().is_none());
        assert!(timer.is_complete());
    }

    #[test]
    fn pause_freezes_the_countdown() {
        let mut timer = focus(10);
        timer.start();
        timer.tick();
        assert!(timer.pause().is_some());
        assert!(timer.is_paused());
        assert!(!timer.is_running());
        timer.tick();
        timer.tick();
        assert_eq!(timer.remaining_secs(), 9);
        assert!(timer.resume().is_some());
        timer.tick();
        assert_eq!(timer.remaining_secs(), 8);
    }

    #[test]
    fn pause_and_resume_are_no_ops_out_of_phase() {
        let mut timer = focus(10);
        assert!(timer.pause().is_none());
        assert!(timer.resume().is_none());
        timer.start();
        assert!(timer.resume().is_none());
        assert!(timer.start().is_none());
        timer.pause();
        assert!(timer.pause().is_none());
        assert!(timer.start().is_some());
        assert!(timer.is_running());
    }

    #[test]
    fn cancel_restores_full_duration_from_any_phase() {
        let mut timer = focus(5);
        timer.start();
        timer.tick();
        timer.tick();
        assert_eq!(timer.cancel(), Some(TimerEvent::Cancelled));
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.remaining_secs(), 5);

        timer.start();
        timer.tick();
        timer.pause();
        timer.cancel();
        assert_eq!(timer.remaining_secs(), 5);

        timer.start();
        for _ in 0..5 {
            timer.tick();
        }
        assert!(timer.is_complete());
        timer.reset();
        assert_eq!(timer.phase(), TimerPhase::Idle);
        assert_eq!(timer.remaining_secs(), 5);
    }

    #[test]
    fn progress_tracks_elapsed_share() {
        let mut timer = focus(4);
        assert_eq!(timer.progress(), 0.0);
        timer.start();
        timer.tick();
        assert_eq!(timer.progress(), 25.0);
        timer.tick();
        assert_eq!(timer.progress(), 50.0);
    }

    #[test]
    fn minutes_convert_to_seconds() {
        let timer = SessionTimer::from_minutes(SessionKind::Break, 5).unwrap();
        assert_eq!(timer.total_secs(), 300);
        assert_eq!(timer.kind(), SessionKind::Break);
    }
}
