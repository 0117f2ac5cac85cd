use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;

/// Failure of a timer transition on a single tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SessionError {
    /// Stop or pause was requested while no session is open.
    #[error("no session is running")]
    NotRunning,
}

/// A closed interval during which the timer was running.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Instant the session was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
    /// Instant the session was closed.
    #[serde(with = "time::serde::rfc3339")]
    pub end_time: OffsetDateTime,
    /// Whole seconds between start and end.
    #[serde(alias = "duration")]
    pub duration_seconds: u64,
}

/// The currently open session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenSession {
    /// Instant the session was opened.
    #[serde(with = "time::serde::rfc3339")]
    pub start_time: OffsetDateTime,
}

/// Per-task timer state: idle when no session is open, running otherwise.
///
/// The running flag is derived from the open session so the two can never
/// disagree, and the accumulated total only changes when a session closes
/// or the tracker is reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TrackingRecord", into = "TrackingRecord")]
pub struct TimeTracking {
    total_time: u64,
    sessions: Vec<Session>,
    current_session: Option<OpenSession>,
}

impl TimeTracking {
    /// Accumulated seconds over all closed sessions.
    #[must_use]
    pub const fn total_time(&self) -> u64 {
        self.total_time
    }

    /// Closed sessions in the order they were recorded.
    #[must_use]
    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    /// The open session, if the timer is running.
    #[must_use]
    pub const fn current_session(&self) -> Option<&OpenSession> {
        self.current_session.as_ref()
    }

    /// True while a session is open.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.current_session.is_some()
    }

    /// Open a session at `now`.
    ///
    /// A session that is already open is closed first, so no running time
    /// is dropped. Returns that closed session, if any.
    pub fn start(&mut self, now: OffsetDateTime) -> Option<Session> {
        let closed = self.stop(now).ok();
        self.current_session = Some(OpenSession { start_time: now });
        closed
    }

    /// Close the open session at `now` and fold it into the total.
    ///
    /// # Errors
    /// Returns [`SessionError::NotRunning`] when no session is open.
    pub fn stop(&mut self, now: OffsetDateTime) -> Result<Session, SessionError> {
        let open = self.current_session.take().ok_or(SessionError::NotRunning)?;
        let session = Session {
            start_time: open.start_time,
            end_time: now,
            duration_seconds: elapsed_seconds(open.start_time, now),
        };
        self.total_time = self.total_time.saturating_add(session.duration_seconds);
        self.sessions.push(session.clone());
        Ok(session)
    }

    /// Drop every recorded session and the open one, if any.
    pub fn reset(&mut self) {
        self.total_time = 0;
        self.sessions.clear();
        self.current_session = None;
    }

    /// Total time plus the live elapsed time of the open session.
    #[must_use]
    pub fn time_spent(&self, now: OffsetDateTime) -> u64 {
        let live = self
            .current_session
            .map_or(0, |open| elapsed_seconds(open.start_time, now));
        self.total_time.saturating_add(live)
    }

    /// Recompute the total from the recorded sessions.
    ///
    /// Externally supplied records may carry a total that disagrees with
    /// their session list; the sessions win.
    pub(crate) fn normalize(&mut self) {
        self.total_time = self
            .sessions
            .iter()
            .fold(0, |total: u64, session| total.saturating_add(session.duration_seconds));
    }
}

/// Whole seconds from `start` to `end`, clamped at zero.
#[must_use]
pub fn elapsed_seconds(start: OffsetDateTime, end: OffsetDateTime) -> u64 {
    u64::try_from((end - start).whole_seconds()).unwrap_or(0)
}

/// Render seconds as `H:MM:SS`.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;
    format!("{hours}:{minutes:02}:{secs:02}")
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TrackingRecord {
    #[serde(default)]
    total_time: u64,
    #[serde(default)]
    sessions: Vec<Session>,
    #[serde(default)]
    current_session: Option<OpenSession>,
    #[serde(default)]
    is_running: bool,
}

impl From<TrackingRecord> for TimeTracking {
    fn from(record: TrackingRecord) -> Self {
        // isRunning is derived from the open session.
        Self {
            total_time: record.total_time,
            sessions: record.sessions,
            current_session: record.current_session,
        }
    }
}

impl From<TimeTracking> for TrackingRecord {
    fn from(tracking: TimeTracking) -> Self {
        let is_running = tracking.is_running();
        Self {
            total_time: tracking.total_time,
            sessions: tracking.sessions,
            current_session: tracking.current_session,
            is_running,
        }
    }
}
