/// Time sources and periodic triggers.
///
/// The frame loop and the spawn timers read the same [`Clock`], so a test can
/// swap in a [`ManualClock`] and advance time by hand.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Instant;

pub trait Clock {
    /// Milliseconds since an arbitrary, fixed origin.  Never decreases.
    fn now_ms(&self) -> u64;
}

/// Monotonic wall clock.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

/// A clock that only moves when told to.  Clones share the same time.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, ms: u64) {
        self.now.set(self.now.get() + ms);
    }

    pub fn set(&self, ms: u64) {
        self.now.set(ms);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> u64 {
        self.now.get()
    }
}

// ── Scheduler ─────────────────────────────────────────────────────────────────

/// What a periodic timer triggers.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Trigger {
    EnemySpawn,
    PowerUpSpawn,
}

#[derive(Clone, Copy, Debug)]
struct Periodic {
    trigger: Trigger,
    period_ms: u64,
    next_due: u64,
}

/// Periodic triggers polled against a [`Clock`].
#[derive(Debug, Default, Clone)]
pub struct Scheduler {
    timers: Vec<Periodic>,
}

impl Scheduler {
    /// Arm `trigger` to fire every `period_ms`, first at `now + period_ms`.
    /// Re-arming an armed trigger restarts its period.
    pub fn arm(&mut self, trigger: Trigger, period_ms: u64, now: u64) {
        self.timers.retain(|t| t.trigger != trigger);
        self.timers.push(Periodic {
            trigger,
            period_ms: period_ms.max(1),
            next_due: now + period_ms.max(1),
        });
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    pub fn is_armed(&self) -> bool {
        !self.timers.is_empty()
    }

    /// Triggers due at or before `now`, oldest first.  A timer that fell
    /// several periods behind fires once and skips the missed periods, staying
    /// on its original cadence.
    pub fn due(&mut self, now: u64) -> Vec<Trigger> {
        let mut fired: Vec<(u64, Trigger)> = Vec::new();
        for timer in &mut self.timers {
            if timer.next_due > now {
                continue;
            }
            fired.push((timer.next_due, timer.trigger));
            let missed = (now - timer.next_due) / timer.period_ms;
            timer.next_due += (missed + 1) * timer.period_ms;
        }
        fired.sort_by_key(|(at, _)| *at);
        fired.into_iter().map(|(_, trigger)| trigger).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_clones_share_time() {
        let clock = ManualClock::new();
        let view = clock.clone();
        clock.advance(250);
        assert_eq!(view.now_ms(), 250);
        clock.set(10);
        assert_eq!(view.now_ms(), 10);
    }

    #[test]
    fn scheduler_fires_on_period() {
        let mut s = Scheduler::default();
        s.arm(Trigger::EnemySpawn, 2000, 0);
        assert!(s.due(1999).is_empty());
        assert_eq!(s.due(2000), vec![Trigger::EnemySpawn]);
        assert!(s.due(2001).is_empty());
        assert_eq!(s.due(4000), vec![Trigger::EnemySpawn]);
    }

    #[test]
    fn scheduler_skips_missed_periods_after_a_stall() {
        let mut s = Scheduler::default();
        s.arm(Trigger::EnemySpawn, 2000, 0);
        s.arm(Trigger::PowerUpSpawn, 3000, 0);
        // one firing per trigger, however long the stall
        assert_eq!(s.due(60_500), vec![Trigger::EnemySpawn, Trigger::PowerUpSpawn]);
        assert!(s.due(61_999).is_empty());
        assert_eq!(s.due(62_000), vec![Trigger::EnemySpawn]);
        assert_eq!(s.due(63_000), vec![Trigger::PowerUpSpawn]);
    }

    #[test]
    fn cancel_all_stops_everything() {
        let mut s = Scheduler::default();
        s.arm(Trigger::EnemySpawn, 100, 0);
        s.cancel_all();
        assert!(!s.is_armed());
        assert!(s.due(10_000).is_empty());
    }

    #[test]
    fn rearm_restarts_period() {
        let mut s = Scheduler::default();
        s.arm(Trigger::EnemySpawn, 2000, 0);
        s.arm(Trigger::EnemySpawn, 2000, 1500);
        assert!(s.due(3000).is_empty());
        assert_eq!(s.due(3500), vec![Trigger::EnemySpawn]);
    }
}
