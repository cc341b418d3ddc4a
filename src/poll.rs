//! The fetch, filter, notify, sleep cycle.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use crate::dedup::DedupWindow;
use crate::error::FetchError;
use crate::event::Event;
use crate::format::format_event;
use crate::notify::{Notification, NotificationSink};
use crate::source::{Credentials, EventSource};

#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Pause between ticks.
    pub interval: Duration,
    /// Most events inspected per tick.
    pub max_events: usize,
    /// Events older than this are not notified.
    pub max_age: chrono::Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(30),
            max_events: 5,
            max_age: chrono::Duration::hours(1),
        }
    }
}

/// Counts for a single tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub fetched: usize,
    pub selected: usize,
    pub dispatched: usize,
    pub already_seen: usize,
    pub dropped: usize,
    pub failed: usize,
}

/// The newest-first prefix of `events` worth notifying: at most
/// `max_events` entries, ending before the first event created before
/// `now - max_age`.
pub fn select_recent<'a>(
    events: &'a [Event],
    now: DateTime<Utc>,
    config: &PollConfig,
) -> &'a [Event] {
    select_since(events, now - config.max_age, config.max_events)
}

fn select_since(events: &[Event], cutoff: DateTime<Utc>, max_events: usize) -> &[Event] {
    let end = events
        .iter()
        .take(max_events)
        .position(|e| e.created_at < cutoff)
        .unwrap_or_else(|| events.len().min(max_events));
    &events[..end]
}

pub struct PollLoop<S, N> {
    source: S,
    sink: N,
    credentials: Credentials,
    dedup: DedupWindow,
    config: PollConfig,
    /// Highest age cutoff applied so far. Never moves backwards, even if the
    /// wall clock does, so pruned ids cannot become selectable again.
    cutoff: Option<DateTime<Utc>>,
}

impl<S: EventSource, N: NotificationSink> PollLoop<S, N> {
    pub fn new(source: S, sink: N, credentials: Credentials, config: PollConfig) -> Self {
        Self {
            source,
            sink,
            credentials,
            dedup: DedupWindow::new(),
            config,
            cutoff: None,
        }
    }

    pub fn dedup(&self) -> &DedupWindow {
        &self.dedup
    }

    fn advance_cutoff(&mut self, now: DateTime<Utc>) -> DateTime<Utc> {
        let candidate = now - self.config.max_age;
        let cutoff = self.cutoff.map_or(candidate, |prev| prev.max(candidate));
        self.cutoff = Some(cutoff);
        cutoff
    }

    /// Poll forever.
    pub async fn run(mut self) {
        info!(
            "Polling events for {} every {}s",
            self.credentials.username,
            self.config.interval.as_secs()
        );

        loop {
            match self.tick(Utc::now()).await {
                Ok(report) => debug!(?report, "tick complete"),
                Err(e) => warn!(error = %e, "failed to fetch events, retrying next tick"),
            }
            tokio::time::sleep(self.config.interval).await;
        }
    }

    /// Run one fetch and notify pass as of `now`.
    pub async fn tick(&mut self, now: DateTime<Utc>) -> Result<TickReport, FetchError> {
        let cutoff = self.advance_cutoff(now);
        let events = self.source.fetch(&self.credentials).await?;
        let selected = select_since(&events, cutoff, self.config.max_events);

        let mut report = TickReport {
            fetched: events.len(),
            selected: selected.len(),
            ..TickReport::default()
        };

        for event in selected {
            if self.dedup.seen(&event.id) {
                report.already_seen += 1;
                continue;
            }
            self.dedup.mark_seen(&event.id, event.created_at);

            let Some(formatted) = format_event(event) else {
                report.dropped += 1;
                continue;
            };

            let notification = Notification::from(formatted);
            match self.sink.dispatch(&notification).await {
                Ok(()) => {
                    info!(id = %event.id, kind = %event.kind, "{}", notification.message);
                    report.dispatched += 1;
                }
                Err(e) => {
                    error!(id = %event.id, error = %e, "failed to show notification");
                    report.failed += 1;
                }
            }
        }

        let pruned = self.dedup.prune(cutoff);
        if pruned > 0 {
            debug!(pruned, remaining = self.dedup.len(), "pruned dedup window");
        }

        Ok(report)
    }
}
