//! Recalculation scheduling for hosts that recalculate while the user types.
//!
//! The engines are synchronous, so deciding *when* to call
//! [`crate::report::recalculate`] is left to the host. [`RecalcScheduler`] is
//! a leading/trailing debounce driven entirely by timestamps the host passes
//! in: it owns no timer and spawns nothing.

use tracing::trace;

/// Debounce configuration (milliseconds).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecalcConfig {
    /// Quiet period after the last edit before a trailing run.
    pub debounce_ms: u64,
    /// Upper bound on how long a burst of edits can postpone a run.
    pub max_wait_ms: u64,
    /// Run immediately on the first edit after a quiet period.
    pub leading: bool,
}

impl Default for RecalcConfig {
    fn default() -> Self {
        Self {
            debounce_ms: 300,
            max_wait_ms: 2000,
            leading: true,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct RecalcScheduler {
    config: RecalcConfig,
    burst_start: Option<u64>,
    last_edit: Option<u64>,
    burst_edits: u32,
    last_run: Option<u64>,
    due_at: Option<u64>,
}

impl RecalcScheduler {
    pub fn new(config: RecalcConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn is_pending(&self) -> bool {
        self.last_edit.is_some()
    }

    /// Records an edit. A later edit pushes the trailing deadline out.
    pub fn note_edit(&mut self, now: u64) {
        if self.burst_start.is_none() {
            self.burst_start = Some(now);
        }
        self.last_edit = Some(now);
        self.burst_edits += 1;
    }

    /// Whether the host should recalculate now. Keeps answering `true` until
    /// [`commit`](Self::commit) is called.
    pub fn poll(&mut self, now: u64) -> bool {
        let (Some(last_edit), Some(burst_start)) = (self.last_edit, self.burst_start) else {
            return false;
        };
        let quiet_since_run = self
            .last_run
            .map_or(true, |run| now.saturating_sub(run) >= self.config.debounce_ms);

        let leading = self.config.leading && self.burst_edits == 1 && quiet_since_run;
        let trailing = now.saturating_sub(last_edit) >= self.config.debounce_ms;
        let overdue = now.saturating_sub(burst_start) >= self.config.max_wait_ms;

        let due = leading || trailing || overdue;
        if due {
            self.due_at.get_or_insert(now);
            trace!(now, leading, trailing, overdue, "recalculation due");
        }
        due
    }

    /// Marks the pending edits as recalculated.
    pub fn commit(&mut self) {
        self.last_run = self.due_at.take().or(self.last_edit);
        self.burst_start = None;
        self.last_edit = None;
        self.burst_edits = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_scheduler_never_fires() {
        let mut scheduler = RecalcScheduler::new(RecalcConfig::default());
        assert!(!scheduler.poll(0));
        assert!(!scheduler.poll(10_000));
    }

    #[test]
    fn test_leading_edge_runs_immediately() {
        let mut scheduler = RecalcScheduler::new(RecalcConfig::default());
        scheduler.note_edit(1000);
        assert!(scheduler.poll(1000));
        scheduler.commit();
        assert!(!scheduler.is_pending());
    }

    #[test]
    fn test_burst_waits_for_trailing_edge() {
        let mut scheduler = RecalcScheduler::new(RecalcConfig::default());
        scheduler.note_edit(1000);
        assert!(scheduler.poll(1000));
        scheduler.commit();

        scheduler.note_edit(1100);
        assert!(!scheduler.poll(1100));
        scheduler.note_edit(1250);
        assert!(!scheduler.poll(1400));
        assert!(scheduler.poll(1550));
        scheduler.commit();
        assert!(!scheduler.poll(1600));
    }

    #[test]
    fn test_max_wait_bounds_a_long_burst() {
        let config = RecalcConfig {
            leading: false,
            ..RecalcConfig::default()
        };
        let mut scheduler = RecalcScheduler::new(config);
        let mut fired = None;
        for now in (0..5000).step_by(100) {
            scheduler.note_edit(now);
            if scheduler.poll(now) {
                fired = Some(now);
                break;
            }
        }
        assert_eq!(fired, Some(2000));
    }
}
