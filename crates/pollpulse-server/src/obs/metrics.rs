//! Minimal metrics registry for the poll server.
//!
//! Counter/gauge/histogram vectors with dynamic labels backed by `DashMap`.
//! Label sets are flattened into sorted key vectors for deterministic
//! ordering. Histogram buckets are fixed in milliseconds, which matches the
//! duration scale of poll sessions.

use std::fmt::Write;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;

type LabelKey = Vec<(String, String)>;

fn label_key(labels: &[(&str, &str)]) -> LabelKey {
    let mut key: LabelKey = labels
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    key.sort();
    key
}

fn format_labels(key: &LabelKey) -> String {
    key.iter()
        .map(|(k, v)| {
            let escaped = v.replace('\\', "\\\\").replace('"', "\\\"").replace('\n', "\\n");
            format!("{k}=\"{escaped}\"")
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[derive(Default)]
pub struct CounterVec {
    map: DashMap<LabelKey, AtomicU64>,
}

impl CounterVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: u64) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicU64::new(0))
            .fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> u64 {
        self.map
            .get(&label_key(labels))
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} counter");
        for r in self.map.iter() {
            let _ = writeln!(
                out,
                "{name}{{{}}} {}",
                format_labels(r.key()),
                r.value().load(Ordering::Relaxed)
            );
        }
    }
}

#[derive(Default)]
pub struct GaugeVec {
    map: DashMap<LabelKey, AtomicI64>,
}

impl GaugeVec {
    pub fn inc(&self, labels: &[(&str, &str)]) {
        self.add(labels, 1);
    }

    pub fn dec(&self, labels: &[(&str, &str)]) {
        self.add(labels, -1);
    }

    pub fn add(&self, labels: &[(&str, &str)], v: i64) {
        self.map
            .entry(label_key(labels))
            .or_insert_with(|| AtomicI64::new(0))
            .fetch_add(v, Ordering::Relaxed);
    }

    pub fn get(&self, labels: &[(&str, &str)]) -> i64 {
        self.map
            .get(&label_key(labels))
            .map_or(0, |g| g.load(Ordering::Relaxed))
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} gauge");
        for r in self.map.iter() {
            let _ = writeln!(
                out,
                "{name}{{{}}} {}",
                format_labels(r.key()),
                r.value().load(Ordering::Relaxed)
            );
        }
    }
}

// Session durations run from milliseconds to tens of seconds.
const BUCKETS_MS: [u64; 9] = [10, 50, 100, 250, 500, 1_000, 5_000, 10_000, 30_000];

struct AtomicHistogram {
    count: AtomicU64,
    sum_ms: AtomicU64,
    buckets: [AtomicU64; BUCKETS_MS.len()],
}

impl Default for AtomicHistogram {
    fn default() -> Self {
        Self {
            count: AtomicU64::new(0),
            sum_ms: AtomicU64::new(0),
            buckets: Default::default(),
        }
    }
}

#[derive(Default)]
pub struct HistogramVec {
    map: DashMap<LabelKey, AtomicHistogram>,
}

impl HistogramVec {
    /// Observe a duration (millisecond scale, cumulative buckets).
    pub fn observe(&self, labels: &[(&str, &str)], duration: Duration) {
        let hist = self
            .map
            .entry(label_key(labels))
            .or_insert_with(AtomicHistogram::default);
        let ms = duration.as_millis() as u64;

        hist.count.fetch_add(1, Ordering::Relaxed);
        hist.sum_ms.fetch_add(ms, Ordering::Relaxed);
        for (i, &le) in BUCKETS_MS.iter().enumerate() {
            if ms <= le {
                hist.buckets[i].fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    fn render(&self, name: &str, out: &mut String) {
        let _ = writeln!(out, "# TYPE {name} histogram");
        for r in self.map.iter() {
            let labels = format_labels(r.key());
            let prefix = if labels.is_empty() {
                String::new()
            } else {
                format!("{labels},")
            };
            let hist = r.value();

            for (i, &le) in BUCKETS_MS.iter().enumerate() {
                let _ = writeln!(
                    out,
                    "{name}_bucket{{{prefix}le=\"{le}\"}} {}",
                    hist.buckets[i].load(Ordering::Relaxed)
                );
            }
            let count = hist.count.load(Ordering::Relaxed);
            let _ = writeln!(out, "{name}_bucket{{{prefix}le=\"+Inf\"}} {count}");
            let _ = writeln!(out, "{name}_sum{{{labels}}} {}", hist.sum_ms.load(Ordering::Relaxed));
            let _ = writeln!(out, "{name}_count{{{labels}}} {count}");
        }
    }
}

/// All metrics the poll server exports. Label `mode` is `wait`/`stream`;
/// `outcome` is `completed`/`aborted`.
#[derive(Default)]
pub struct PollMetrics {
    pub sessions_started: CounterVec,
    pub sessions_active: GaugeVec,
    pub session_outcomes: CounterVec,
    pub messages_emitted: CounterVec,
    pub capacity_rejections: CounterVec,
    pub session_duration: HistogramVec,
}

impl PollMetrics {
    /// Render every metric in Prometheus text exposition format.
    pub fn render(&self) -> String {
        let mut out = String::new();
        self.sessions_started
            .render("pollpulse_sessions_started_total", &mut out);
        self.sessions_active
            .render("pollpulse_sessions_active", &mut out);
        self.session_outcomes
            .render("pollpulse_session_outcomes_total", &mut out);
        self.messages_emitted
            .render("pollpulse_messages_emitted_total", &mut out);
        self.capacity_rejections
            .render("pollpulse_capacity_rejections_total", &mut out);
        self.session_duration
            .render("pollpulse_session_duration_ms", &mut out);
        out
    }
}

/// RAII handle for the `sessions_active` gauge.
///
/// Increments on creation, decrements on drop. The handling context owns it
/// next to the semaphore permit, so a request future that is dropped
/// mid-session (client disconnect during a long-poll wait, task teardown)
/// still releases its gauge slot. Terminal hooks cannot be relied on for
/// this: a cancelled future never reaches them.
pub struct ActiveSession {
    metrics: Arc<PollMetrics>,
    mode: &'static str,
}

impl ActiveSession {
    pub fn begin(metrics: Arc<PollMetrics>, mode: &'static str) -> Self {
        metrics.sessions_active.inc(&[("mode", mode)]);
        Self { metrics, mode }
    }
}

impl Drop for ActiveSession {
    fn drop(&mut self) {
        self.metrics.sessions_active.dec(&[("mode", self.mode)]);
    }
}
