use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A host-defined scene name, e.g. `FLIGHT` or `SPACECENTER`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneTag(String);

impl SceneTag {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SceneTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Accumulates time spent per scene.
///
/// Time in the current scene only lands in the map on the next transition
/// or on [`flush`](Self::flush).
#[derive(Debug, Clone)]
pub struct SessionClock {
    current: Option<SceneTag>,
    entered_at: DateTime<Utc>,
    durations: BTreeMap<SceneTag, TimeDelta>,
}

impl SessionClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            current: None,
            entered_at: now,
            durations: BTreeMap::new(),
        }
    }

    pub fn current_scene(&self) -> Option<&SceneTag> {
        self.current.as_ref()
    }

    pub fn current_scene_entered_at(&self) -> DateTime<Utc> {
        self.entered_at
    }

    /// Feeds the scene the host reports for this tick.
    ///
    /// The very first observation only establishes the starting scene.
    pub fn on_scene_observed(&mut self, scene: &SceneTag, now: DateTime<Utc>) {
        match &self.current {
            Some(current) if current == scene => {}
            Some(_) => {
                self.close_interval(now);
                tracing::trace!("[SessionClock] scene changed to {}", scene);
                self.current = Some(scene.clone());
            }
            None => {
                self.current = Some(scene.clone());
                self.entered_at = now;
            }
        }
    }

    /// Credits the in-progress interval to the current scene without leaving it.
    pub fn flush(&mut self, now: DateTime<Utc>) {
        if self.current.is_some() {
            self.close_interval(now);
        }
    }

    /// Accumulated durations. Does not include the unflushed interval.
    pub fn elapsed_map_snapshot(&self) -> BTreeMap<SceneTag, TimeDelta> {
        self.durations.clone()
    }

    /// Sum of all recorded durations.
    pub fn recorded_total(&self) -> TimeDelta {
        self.durations
            .values()
            .fold(TimeDelta::zero(), |acc, d| acc + *d)
    }

    fn close_interval(&mut self, now: DateTime<Utc>) {
        if let Some(current) = &self.current {
            let delta = now - self.entered_at;
            let slot = self
                .durations
                .entry(current.clone())
                .or_insert_with(TimeDelta::zero);
            *slot += delta;
        }
        self.entered_at = now;
    }
}
