use std::collections::{BTreeMap, HashMap};
use std::time::{Duration, Instant};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimerError {
    #[error("interval timer '{0}' needs a non-zero period")]
    ZeroPeriod(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

/// A timer that came due, reported with the deadline it was armed for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fired<K> {
    pub id: TimerId,
    pub kind: K,
    pub deadline: Instant,
}

#[derive(Debug, Clone)]
struct Timer<K> {
    kind: K,
    deadline: Instant,
    period: Option<Duration>,
}

/// Deterministic one-shot and interval timers driven by an external clock.
///
/// Nothing here sleeps or spawns: the owner asks for [`TimerQueue::next_deadline`],
/// waits however it likes, and drains [`TimerQueue::pop_due`] with the current
/// instant. Timers due at the same instant fire in scheduling order.
#[derive(Debug)]
pub struct TimerQueue<K> {
    timers: HashMap<TimerId, Timer<K>>,
    queue: BTreeMap<(Instant, u64), TimerId>,
    next_id: u64,
    next_seq: u64,
}

impl<K: Clone + std::fmt::Debug> TimerQueue<K> {
    pub fn new() -> Self {
        Self {
            timers: HashMap::new(),
            queue: BTreeMap::new(),
            next_id: 0,
            next_seq: 0,
        }
    }

    pub fn schedule_once(&mut self, kind: K, deadline: Instant) -> TimerId {
        self.insert(kind, deadline, None)
    }

    /// Fires first at `first_at`, then every `period` after the previous deadline.
    pub fn schedule_interval(
        &mut self,
        kind: K,
        first_at: Instant,
        period: Duration,
    ) -> Result<TimerId, TimerError> {
        if period.is_zero() {
            return Err(TimerError::ZeroPeriod(format!("{kind:?}")));
        }
        Ok(self.insert(kind, first_at, Some(period)))
    }

    /// Returns whether the timer was still armed. Cancelling twice is harmless.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.timers.remove(&id) {
            Some(_) => {
                self.queue.retain(|_, queued| *queued != id);
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self, id: TimerId) -> bool {
        self.timers.contains_key(&id)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Removes and returns the earliest timer due at or before `now`.
    /// Interval timers are re-armed one period after the deadline they fired for.
    pub fn pop_due(&mut self, now: Instant) -> Option<Fired<K>> {
        let (&(deadline, seq), &id) = self.queue.iter().next()?;
        if deadline > now {
            return None;
        }
        self.queue.remove(&(deadline, seq));

        let timer = self.timers.get_mut(&id)?;
        let kind = timer.kind.clone();
        match timer.period {
            Some(period) => {
                let next = deadline + period;
                timer.deadline = next;
                let seq = self.bump_seq();
                self.queue.insert((next, seq), id);
            }
            None => {
                self.timers.remove(&id);
            }
        }
        Some(Fired { id, kind, deadline })
    }

    /// Drains everything due at or before `now`, in firing order.
    pub fn drain_due(&mut self, now: Instant) -> Vec<Fired<K>> {
        let mut fired = Vec::new();
        while let Some(event) = self.pop_due(now) {
            fired.push(event);
        }
        fired
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
        self.queue.clear();
    }

    fn insert(&mut self, kind: K, deadline: Instant, period: Option<Duration>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let seq = self.bump_seq();
        self.queue.insert((deadline, seq), id);
        self.timers.insert(
            id,
            Timer {
                kind,
                deadline,
                period,
            },
        );
        id
    }

    fn bump_seq(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        seq
    }
}

impl<K: Clone + std::fmt::Debug> Default for TimerQueue<K> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Kind {
        Advance,
        Progress,
        Restart,
    }

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn interval_fires_on_period_boundaries() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers
            .schedule_interval(Kind::Advance, start + ms(5000), ms(5000))
            .unwrap();

        assert!(timers.pop_due(start + ms(4999)).is_none());
        let fired = timers.pop_due(start + ms(5000)).unwrap();
        assert_eq!(fired.kind, Kind::Advance);
        assert_eq!(fired.deadline, start + ms(5000));
        assert_eq!(timers.next_deadline(), Some(start + ms(10000)));
    }

    #[test]
    fn late_drain_replays_every_missed_deadline() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        timers
            .schedule_interval(Kind::Progress, start + ms(50), ms(50))
            .unwrap();
        let fired = timers.drain_due(start + ms(220));
        let deadlines: Vec<_> = fired.iter().map(|f| f.deadline).collect();
        assert_eq!(
            deadlines,
            vec![start + ms(50), start + ms(100), start + ms(150), start + ms(200)]
        );
    }

    #[test]
    fn one_shot_fires_once() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        let id = timers.schedule_once(Kind::Restart, start + ms(100));
        assert!(timers.is_armed(id));
        assert_eq!(timers.drain_due(start + ms(500)).len(), 1);
        assert!(!timers.is_armed(id));
        assert!(timers.is_empty());
        assert_eq!(timers.next_deadline(), None);
    }

    #[test]
    fn cancel_is_idempotent() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        let id = timers
            .schedule_interval(Kind::Advance, start + ms(10), ms(10))
            .unwrap();
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.pop_due(start + ms(1000)).is_none());
    }

    #[test]
    fn simultaneous_deadlines_keep_scheduling_order() {
        let start = Instant::now();
        let mut timers = TimerQueue::new();
        let at = start + ms(100);
        timers.schedule_once(Kind::Restart, at);
        timers.schedule_once(Kind::Advance, at);
        timers.schedule_once(Kind::Progress, at);
        let kinds: Vec<_> = timers.drain_due(at).into_iter().map(|f| f.kind).collect();
        assert_eq!(kinds, vec![Kind::Restart, Kind::Advance, Kind::Progress]);
    }

    #[test]
    fn zero_period_is_rejected() {
        let mut timers = TimerQueue::new();
        let err = timers
            .schedule_interval(Kind::Advance, Instant::now(), Duration::ZERO)
            .unwrap_err();
        assert_eq!(err, TimerError::ZeroPeriod("Advance".into()));
        assert!(timers.is_empty());
    }
}
