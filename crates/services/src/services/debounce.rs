//! Coalesces rapid edits into one write after a quiet period.

use std::{
    collections::HashMap,
    hash::Hash,
    sync::{Arc, Mutex},
    time::Duration,
};

use async_trait::async_trait;
use tracing::debug;

/// Receives the settled value for a key. Implementations log their own failures.
#[async_trait]
pub trait FlushSink<K, V>: Send + Sync {
    async fn flush(&self, key: K, value: V);
}

struct Pending<K, V> {
    next_generation: u64,
    entries: HashMap<K, (u64, V)>,
}

/// Per-key debouncer: each `push` restarts that key's quiet period, and only the
/// last value pushed before the period elapses is flushed.
pub struct Debouncer<K, V> {
    quiet: Duration,
    pending: Arc<Mutex<Pending<K, V>>>,
    sink: Arc<dyn FlushSink<K, V>>,
}

impl<K, V> Clone for Debouncer<K, V> {
    fn clone(&self) -> Self {
        Self {
            quiet: self.quiet,
            pending: self.pending.clone(),
            sink: self.sink.clone(),
        }
    }
}

impl<K, V> Debouncer<K, V>
where
    K: Eq + Hash + Clone + Send + 'static,
    V: Send + 'static,
{
    pub fn new(quiet: Duration, sink: Arc<dyn FlushSink<K, V>>) -> Self {
        Self {
            quiet,
            pending: Arc::new(Mutex::new(Pending {
                next_generation: 0,
                entries: HashMap::new(),
            })),
            sink,
        }
    }

    /// Records `value` for `key` and schedules a flush after the quiet period.
    pub fn push(&self, key: K, value: V) {
        let generation = {
            let mut pending = lock(&self.pending);
            pending.next_generation += 1;
            let generation = pending.next_generation;
            pending.entries.insert(key.clone(), (generation, value));
            generation
        };

        let pending = self.pending.clone();
        let sink = self.sink.clone();
        let quiet = self.quiet;
        tokio::spawn(async move {
            tokio::time::sleep(quiet).await;
            let settled = {
                let mut pending = lock(&pending);
                let is_latest = matches!(
                    pending.entries.get(&key),
                    Some((current, _)) if *current == generation
                );
                if is_latest {
                    pending.entries.remove(&key).map(|(_, value)| value)
                } else {
                    None
                }
            };
            if let Some(value) = settled {
                sink.flush(key, value).await;
            }
        });
    }

    /// Number of keys still waiting for their quiet period.
    pub fn pending_len(&self) -> usize {
        lock(&self.pending).entries.len()
    }

    /// Flushes every pending value now. Timers still running find nothing left to do.
    pub async fn flush_all(&self) {
        let drained: Vec<(K, V)> = {
            let mut pending = lock(&self.pending);
            pending
                .entries
                .drain()
                .map(|(key, (_, value))| (key, value))
                .collect()
        };
        debug!(count = drained.len(), "Flushing pending debounced writes");
        for (key, value) in drained {
            self.sink.flush(key, value).await;
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    // A panic while holding the lock leaves the map itself intact.
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSink {
        writes: Mutex<Vec<(&'static str, String)>>,
    }

    impl RecordingSink {
        fn writes(&self) -> Vec<(&'static str, String)> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl FlushSink<&'static str, String> for RecordingSink {
        async fn flush(&self, key: &'static str, value: String) {
            self.writes.lock().unwrap().push((key, value));
        }
    }

    fn debouncer(sink: &Arc<RecordingSink>) -> Debouncer<&'static str, String> {
        Debouncer::new(Duration::from_secs(1), sink.clone())
    }

    #[tokio::test(start_paused = true)]
    async fn rapid_edits_produce_one_write_with_the_final_value() {
        let sink = Arc::new(RecordingSink::default());
        let notes = debouncer(&sink);

        for text in ["D", "De", "Dee", "Deep work"] {
            notes.push("morning_plan", text.to_string());
            tokio::time::sleep(Duration::from_millis(300)).await;
        }
        assert!(sink.writes().is_empty());

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.writes(), vec![("morning_plan", "Deep work".to_string())]);
        assert_eq!(notes.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn edits_separated_by_the_quiet_period_are_written_separately() {
        let sink = Arc::new(RecordingSink::default());
        let notes = debouncer(&sink);

        notes.push("morning_plan", "first".to_string());
        tokio::time::sleep(Duration::from_millis(1500)).await;
        notes.push("morning_plan", "second".to_string());
        notes.push("evening_review", "calm day".to_string());
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let mut writes = sink.writes();
        writes.sort();
        assert_eq!(
            writes,
            vec![
                ("evening_review", "calm day".to_string()),
                ("morning_plan", "first".to_string()),
                ("morning_plan", "second".to_string()),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn flush_all_writes_pending_values_once() {
        let sink = Arc::new(RecordingSink::default());
        let notes = debouncer(&sink);

        notes.push("evening_review", "unfinished thought".to_string());
        notes.flush_all().await;
        assert_eq!(sink.writes().len(), 1);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(sink.writes().len(), 1);
    }
}
