//! Scan session: dedupe set, row log and the busy/debounce guard.

use chrono::{DateTime, Local, Utc};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use crate::clock::{Clock, SystemClock};
use crate::config::ScannerConfig;
use crate::models::payload_schema::{DISPATCH_ID, TIMESTAMP};
use crate::parser;
use crate::types::{IngestStatus, ScanRow, ScanSummary};

/// Local-time rendering used for the `timestamp` column (e.g. `18/10/2026, 2:05:09 pm`).
pub const TIMESTAMP_FORMAT: &str = "%-d/%-m/%Y, %-I:%M:%S %P";

pub type SharedSession = Arc<Mutex<ScanSession>>;

/// End of the busy window starting at `now`. Saturates instead of overflowing.
fn window_end(now: DateTime<Utc>, debounce: std::time::Duration) -> DateTime<Utc> {
    chrono::Duration::from_std(debounce)
        .ok()
        .and_then(|window| now.checked_add_signed(window))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

pub struct ScanSession<C: Clock = SystemClock> {
    config: ScannerConfig,
    clock: C,
    seen: HashSet<String>,
    rows: Vec<ScanRow>,
    busy_until: Option<DateTime<Utc>>,
    summary: ScanSummary,
}

impl ScanSession<SystemClock> {
    pub fn new(config: ScannerConfig) -> Self {
        Self::with_clock(config, SystemClock)
    }

    pub fn shared(config: ScannerConfig) -> SharedSession {
        Arc::new(Mutex::new(Self::new(config)))
    }
}

impl<C: Clock> ScanSession<C> {
    pub fn with_clock(config: ScannerConfig, clock: C) -> Self {
        Self {
            config,
            clock,
            seen: HashSet::new(),
            rows: Vec::new(),
            busy_until: None,
            summary: ScanSummary::default(),
        }
    }

    /// Feed one decoded payload. Never fails; the outcome is the returned status.
    pub fn ingest(&mut self, raw: &str) -> IngestStatus {
        let now = self.clock.now();
        let status = if self.is_busy_at(now) {
            IngestStatus::Busy
        } else {
            // Busy for the debounce window, whatever the outcome below.
            self.busy_until = Some(window_end(now, self.config.debounce));
            self.process(raw, now)
        };

        self.summary.count = self.seen.len();
        self.summary.last_scan = raw.to_string();
        self.summary.status = Some(status);
        self.summary.message = status.message().to_string();

        tracing::debug!(status = ?status, count = self.summary.count, "ingested scan");
        status
    }

    fn process(&mut self, raw: &str, now: DateTime<Utc>) -> IngestStatus {
        if self.seen.contains(raw) {
            tracing::debug!("duplicate payload ignored");
            return IngestStatus::Duplicate;
        }
        self.seen.insert(raw.to_string());

        let mut row = parser::parse_payload(raw, self.config.schema);
        if row.variant.is_timestamped() {
            let stamp = now.with_timezone(&Local).format(TIMESTAMP_FORMAT).to_string();
            row.set(TIMESTAMP, stamp);
        }
        tracing::info!(
            variant = ?row.variant,
            dispatch_id = row.get(DISPATCH_ID).unwrap_or(""),
            rows = self.rows.len() + 1,
            "scan saved"
        );
        self.rows.push(row);
        IngestStatus::Saved
    }

    fn is_busy_at(&self, now: DateTime<Utc>) -> bool {
        self.busy_until.map(|until| now < until).unwrap_or(false)
    }

    pub fn is_busy(&self) -> bool {
        self.is_busy_at(self.clock.now())
    }

    /// Rows in scan order.
    pub fn rows(&self) -> &[ScanRow] {
        &self.rows
    }

    pub fn summary(&self) -> &ScanSummary {
        &self.summary
    }

    /// Number of distinct payloads seen.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }

    /// Forget every scan and clear the busy window.
    pub fn reset(&mut self) {
        self.seen.clear();
        self.rows.clear();
        self.busy_until = None;
        self.summary = ScanSummary::default();
        tracing::info!("scan session reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::Duration;

    fn session() -> (ScanSession<ManualClock>, ManualClock) {
        let clock = ManualClock::default();
        (ScanSession::with_clock(ScannerConfig::default(), clock.clone()), clock)
    }

    #[test]
    fn saved_then_busy_then_duplicate() {
        let (mut s, clock) = session();
        assert_eq!(s.ingest("Dispatch ID:1"), IngestStatus::Saved);
        assert_eq!(s.ingest("Dispatch ID:1"), IngestStatus::Busy);
        clock.advance(Duration::milliseconds(1000));
        assert_eq!(s.ingest("Dispatch ID:1"), IngestStatus::Duplicate);
        assert_eq!(s.rows().len(), 1);
        assert_eq!(s.len(), 1);
    }

    #[test]
    fn busy_does_not_extend_window() {
        let (mut s, clock) = session();
        s.ingest("a");
        clock.advance(Duration::milliseconds(900));
        assert_eq!(s.ingest("b"), IngestStatus::Busy);
        clock.advance(Duration::milliseconds(100));
        assert_eq!(s.ingest("b"), IngestStatus::Saved);
    }

    #[test]
    fn duplicate_also_starts_window() {
        let (mut s, clock) = session();
        s.ingest("a");
        clock.advance(Duration::seconds(2));
        assert_eq!(s.ingest("a"), IngestStatus::Duplicate);
        assert!(s.is_busy());
        assert_eq!(s.ingest("b"), IngestStatus::Busy);
    }

    #[test]
    fn summary_tracks_every_call() {
        let (mut s, _clock) = session();
        s.ingest("first");
        s.ingest("second");
        let summary = s.summary();
        assert_eq!(summary.count, 1);
        assert_eq!(summary.last_scan, "second");
        assert_eq!(summary.status, Some(IngestStatus::Busy));
        assert_eq!(summary.message, IngestStatus::Busy.message());
    }

    #[test]
    fn dispatch_rows_are_stamped() {
        let (mut s, _clock) = session();
        s.ingest("Dispatch ID:9");
        let stamp = s.rows()[0].get(TIMESTAMP).unwrap_or("");
        assert!(!stamp.is_empty());
        assert!(stamp.contains("1970") || stamp.contains("1969"));
    }

    #[test]
    fn zero_debounce_never_busy() {
        let config = ScannerConfig {
            debounce: std::time::Duration::ZERO,
            ..ScannerConfig::default()
        };
        let mut s = ScanSession::with_clock(config, ManualClock::default());
        assert_eq!(s.ingest("a"), IngestStatus::Saved);
        assert_eq!(s.ingest("a"), IngestStatus::Duplicate);
        assert_eq!(s.ingest("b"), IngestStatus::Saved);
    }

    #[test]
    fn oversized_debounce_saturates() {
        for millis in [u64::MAX, 9_000_000_000_000_000] {
            let config = ScannerConfig {
                debounce: std::time::Duration::from_millis(millis),
                ..ScannerConfig::default()
            };
            let clock = ManualClock::default();
            let mut s = ScanSession::with_clock(config, clock.clone());
            assert_eq!(s.ingest("a"), IngestStatus::Saved);
            assert_eq!(s.ingest("b"), IngestStatus::Busy);
            clock.advance(Duration::days(365 * 100));
            assert_eq!(s.ingest("b"), IngestStatus::Busy);
        }
    }

    #[test]
    fn window_end_near_max_instant() {
        let late = DateTime::<Utc>::MAX_UTC - Duration::seconds(1);
        assert_eq!(
            window_end(late, std::time::Duration::from_secs(10)),
            DateTime::<Utc>::MAX_UTC
        );
        assert_eq!(
            window_end(late, std::time::Duration::ZERO),
            late
        );
    }

    #[test]
    fn reset_clears_everything() {
        let (mut s, _clock) = session();
        s.ingest("a");
        s.reset();
        assert!(s.is_empty());
        assert_eq!(s.len(), 0);
        assert!(!s.is_busy());
        assert_eq!(s.summary(), &ScanSummary::default());
        assert_eq!(s.ingest("a"), IngestStatus::Saved);
    }
}
