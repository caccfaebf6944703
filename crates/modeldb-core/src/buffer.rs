//! Append-only buffer of events waiting to be flushed.

use crate::event::Event;
use chrono::{DateTime, Utc};

/// An event plus the bookkeeping the buffer attaches on append.
#[derive(Debug, Clone)]
pub struct PendingEvent {
    /// Position in the overall record order of this buffer.
    pub seq: u64,
    pub recorded_at: DateTime<Utc>,
    pub event: Event,
}

/// FIFO log of recorded events. No deduplication, no reordering.
#[derive(Debug, Default)]
pub struct EventBuffer {
    pending: Vec<PendingEvent>,
    next_seq: u64,
}

impl EventBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, event: Event) {
        let seq = self.next_seq;
        self.next_seq += 1;
        tracing::debug!("[EventBuffer] append {} (seq {})", event.kind(), seq);
        self.pending.push(PendingEvent {
            seq,
            recorded_at: Utc::now(),
            event,
        });
    }

    /// Takes every pending event in insertion order, leaving the buffer
    /// empty.
    pub fn drain(&mut self) -> Vec<PendingEvent> {
        std::mem::take(&mut self.pending)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PendingEvent> {
        self.pending.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::ModelSnapshot;
    use crate::event::MetricRecord;
    use crate::frame::DataFrame;
    use crate::handle::Handle;

    fn metric(value: f64) -> Event {
        Event::Metric(MetricRecord {
            model: ModelSnapshot {
                handle: Handle::next(),
                type_name: "LinearRegression".to_string(),
                weights: None,
            },
            frame: DataFrame::unstructured(Vec::new()).snapshot(),
            metric_type: "r2".to_string(),
            value,
            label_column: "y".to_string(),
            prediction_column: "p".to_string(),
        })
    }

    fn value_of(pending: &PendingEvent) -> f64 {
        match &pending.event {
            Event::Metric(record) => record.value,
            other => panic!("unexpected event {}", other.kind()),
        }
    }

    #[test]
    fn drain_returns_events_in_append_order() {
        let mut buffer = EventBuffer::new();
        buffer.append(metric(1.0));
        buffer.append(metric(2.0));
        buffer.append(metric(3.0));

        let drained = buffer.drain();
        let values: Vec<f64> = drained.iter().map(value_of).collect();
        assert_eq!(values, vec![1.0, 2.0, 3.0]);
        assert_eq!(
            drained.iter().map(|p| p.seq).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
    }

    #[test]
    fn drain_empties_the_buffer() {
        let mut buffer = EventBuffer::new();
        buffer.append(metric(1.0));

        assert_eq!(buffer.drain().len(), 1);
        assert!(buffer.is_empty());
        assert!(buffer.drain().is_empty());
    }

    #[test]
    fn sequence_continues_after_drain() {
        let mut buffer = EventBuffer::new();
        buffer.append(metric(1.0));
        buffer.drain();
        buffer.append(metric(2.0));

        assert_eq!(buffer.iter().next().map(|p| p.seq), Some(1));
    }
}
