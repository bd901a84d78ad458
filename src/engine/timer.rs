use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerEvent {
    SpawnHazard,
    ActivateHazard(u64),
    DespawnHazard(u64),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FiredTimer {
    pub id: TimerId,
    pub due_ms: u64,
    pub event: TimerEvent,
}

#[derive(Clone, Debug)]
struct ScheduledTimer {
    due_ms: u64,
    id: TimerId,
    event: TimerEvent,
    repeat_ms: Option<u64>,
}

impl PartialEq for ScheduledTimer {
    fn eq(&self, other: &Self) -> bool {
        self.due_ms == other.due_ms && self.id == other.id
    }
}

impl Eq for ScheduledTimer {}

impl PartialOrd for ScheduledTimer {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ScheduledTimer {
    fn cmp(&self, other: &Self) -> Ordering {
        self.due_ms
            .cmp(&other.due_ms)
            .then_with(|| self.id.cmp(&other.id))
    }
}

/// Min-heap of scheduled events keyed by due time, ties broken by schedule
/// order. Timers never run on their own: the engine pulls due ones between
/// ticks with [`TimerService::pop_due`].
#[derive(Clone, Debug, Default)]
pub struct TimerService {
    queue: BinaryHeap<Reverse<ScheduledTimer>>,
    next_id: u64,
}

impl TimerService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule_once(&mut self, now_ms: u64, delay_ms: u64, event: TimerEvent) -> TimerId {
        self.push(now_ms.saturating_add(delay_ms), event, None)
    }

    /// First fires one interval after `now_ms`, then every interval after the
    /// previous due time so the cadence doesn't drift with tick length.
    pub fn schedule_repeating(
        &mut self,
        now_ms: u64,
        interval_ms: u64,
        event: TimerEvent,
    ) -> TimerId {
        let interval_ms = interval_ms.max(1);
        self.push(now_ms.saturating_add(interval_ms), event, Some(interval_ms))
    }

    pub fn cancel_all(&mut self) {
        self.queue.clear();
    }

    pub fn pop_due(&mut self, now_ms: u64) -> Option<FiredTimer> {
        let due = self.queue.peek().map(|Reverse(timer)| timer.due_ms)?;
        if due > now_ms {
            return None;
        }
        let Reverse(timer) = self.queue.pop()?;
        if let Some(repeat_ms) = timer.repeat_ms {
            self.queue.push(Reverse(ScheduledTimer {
                due_ms: timer.due_ms.saturating_add(repeat_ms),
                ..timer.clone()
            }));
        }
        Some(FiredTimer {
            id: timer.id,
            due_ms: timer.due_ms,
            event: timer.event,
        })
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    fn push(&mut self, due_ms: u64, event: TimerEvent, repeat_ms: Option<u64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        self.queue.push(Reverse(ScheduledTimer {
            due_ms,
            id,
            event,
            repeat_ms,
        }));
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(timers: &mut TimerService, now_ms: u64) -> Vec<(u64, TimerEvent)> {
        let mut fired = Vec::new();
        while let Some(timer) = timers.pop_due(now_ms) {
            fired.push((timer.due_ms, timer.event));
        }
        fired
    }

    #[test]
    fn fires_in_due_order_with_schedule_order_tiebreak() {
        let mut timers = TimerService::new();
        timers.schedule_once(0, 300, TimerEvent::DespawnHazard(1));
        timers.schedule_once(0, 100, TimerEvent::ActivateHazard(1));
        timers.schedule_once(0, 100, TimerEvent::ActivateHazard(2));

        assert!(drain(&mut timers, 99).is_empty());
        assert_eq!(
            drain(&mut timers, 300),
            vec![
                (100, TimerEvent::ActivateHazard(1)),
                (100, TimerEvent::ActivateHazard(2)),
                (300, TimerEvent::DespawnHazard(1)),
            ]
        );
        assert_eq!(timers.pending(), 0);
    }

    #[test]
    fn repeating_timer_keeps_cadence() {
        let mut timers = TimerService::new();
        timers.schedule_repeating(0, 1_000, TimerEvent::SpawnHazard);

        assert_eq!(drain(&mut timers, 999), vec![]);
        assert_eq!(
            drain(&mut timers, 1_050),
            vec![(1_000, TimerEvent::SpawnHazard)]
        );
        assert_eq!(
            drain(&mut timers, 3_000),
            vec![
                (2_000, TimerEvent::SpawnHazard),
                (3_000, TimerEvent::SpawnHazard)
            ]
        );
        assert_eq!(timers.pending(), 1);
        assert!(drain(&mut timers, 3_999).is_empty());
    }

    #[test]
    fn fired_ids_follow_schedule_order() {
        let mut timers = TimerService::new();
        let first = timers.schedule_once(0, 50, TimerEvent::ActivateHazard(7));
        let second = timers.schedule_once(0, 50, TimerEvent::DespawnHazard(7));
        assert!(first < second);
        assert_eq!(timers.pop_due(50).map(|timer| timer.id), Some(first));
        assert_eq!(timers.pop_due(50).map(|timer| timer.id), Some(second));
        assert_eq!(timers.pop_due(50), None);
    }

    #[test]
    fn cancel_all_clears_everything_including_repeating() {
        let mut timers = TimerService::new();
        timers.schedule_repeating(0, 10, TimerEvent::SpawnHazard);
        timers.schedule_once(0, 5, TimerEvent::ActivateHazard(1));
        timers.cancel_all();
        assert_eq!(timers.pending(), 0);
        assert!(drain(&mut timers, 10_000).is_empty());
    }
}
