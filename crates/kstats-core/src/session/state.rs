use super::clock::{SceneTag, SessionClock};
use crate::config::AnonymousId;
use chrono::{DateTime, TimeDelta, Utc};

/// How often a checkpoint snapshot is written by default, in seconds.
pub const DEFAULT_CHECKPOINT_SECS: i64 = 60;

/// The running instance's mutable session record.
///
/// Created once the instance wins arbitration, mutated on every tick, and
/// finalized at shutdown.
#[derive(Debug, Clone)]
pub struct SessionState {
    pub id: AnonymousId,
    pub started_at: DateTime<Utc>,
    pub clock: SessionClock,
    pub next_checkpoint_at: DateTime<Utc>,
    checkpoint_interval: TimeDelta,
}

impl SessionState {
    pub fn new(id: AnonymousId, now: DateTime<Utc>, checkpoint_interval: TimeDelta) -> Self {
        Self {
            id,
            started_at: now,
            clock: SessionClock::new(now),
            next_checkpoint_at: later_by(now, checkpoint_interval),
            checkpoint_interval,
        }
    }

    pub fn current_scene(&self) -> Option<&SceneTag> {
        self.clock.current_scene()
    }

    pub fn checkpoint_due(&self, now: DateTime<Utc>) -> bool {
        now >= self.next_checkpoint_at
    }

    /// Moves the next checkpoint one interval past `now`.
    pub fn schedule_next_checkpoint(&mut self, now: DateTime<Utc>) {
        self.next_checkpoint_at = later_by(now, self.checkpoint_interval);
    }

    /// Wall time since the session started.
    pub fn elapsed(&self, now: DateTime<Utc>) -> TimeDelta {
        now - self.started_at
    }
}

/// `now + delta`, saturating at the end of representable time.
fn later_by(now: DateTime<Utc>, delta: TimeDelta) -> DateTime<Utc> {
    now.checked_add_signed(delta).unwrap_or(DateTime::<Utc>::MAX_UTC)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_checkpoint_schedule() {
        let mut state = SessionState::new(AnonymousId::generate(), at(0), TimeDelta::seconds(30));

        assert!(!state.checkpoint_due(at(29)));
        assert!(state.checkpoint_due(at(30)));

        state.schedule_next_checkpoint(at(31));
        assert_eq!(state.next_checkpoint_at, at(61));
    }

    #[test]
    fn test_unrepresentable_schedule_saturates() {
        let mut state = SessionState::new(AnonymousId::generate(), at(0), TimeDelta::MAX);
        assert_eq!(state.next_checkpoint_at, DateTime::<Utc>::MAX_UTC);
        assert!(!state.checkpoint_due(at(1_000_000)));

        state.schedule_next_checkpoint(at(5));
        assert_eq!(state.next_checkpoint_at, DateTime::<Utc>::MAX_UTC);
    }

    #[test]
    fn test_recorded_plus_in_progress_equals_elapsed() {
        let mut state = SessionState::new(
            AnonymousId::generate(),
            at(0),
            TimeDelta::seconds(DEFAULT_CHECKPOINT_SECS),
        );
        state.clock.on_scene_observed(&"LOADING".into(), at(0));
        state.clock.on_scene_observed(&"MAINMENU".into(), at(14));
        state.clock.on_scene_observed(&"FLIGHT".into(), at(33));

        let now = at(50);
        let in_progress = now - state.clock.current_scene_entered_at();
        assert_eq!(state.clock.recorded_total() + in_progress, state.elapsed(now));
    }
}
