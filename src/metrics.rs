// src/metrics.rs
//! Counter names shared by the poller and notifier. No exporter is installed
//! by the binary; a recorder installed by the embedding process (or a test)
//! picks these up.

use metrics::describe_counter;
use once_cell::sync::OnceCell;

pub const POLLS_TOTAL: &str = "quake_polls_total";
pub const FETCH_ERRORS_TOTAL: &str = "quake_fetch_errors_total";
pub const EVENTS_STALE_TOTAL: &str = "quake_events_stale_total";
pub const EVENTS_EMITTED_TOTAL: &str = "quake_events_emitted_total";
pub const NOTIFY_SENT_TOTAL: &str = "quake_notify_sent_total";
pub const NOTIFY_FAILED_TOTAL: &str = "quake_notify_failed_total";

/// One-time metrics registration (so series carry descriptions once scraped).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(POLLS_TOTAL, "Feed queries issued by the poller.");
        describe_counter!(FETCH_ERRORS_TOTAL, "Feed queries that failed (transport/status/decode).");
        describe_counter!(
            EVENTS_STALE_TOTAL,
            "Leading events rejected for being older than the staleness threshold."
        );
        describe_counter!(EVENTS_EMITTED_TOTAL, "Events handed off to the notifier.");
        describe_counter!(NOTIFY_SENT_TOTAL, "Alerts accepted by the push endpoint.");
        describe_counter!(NOTIFY_FAILED_TOTAL, "Alerts dropped after a formatting or push failure.");
    });
}
