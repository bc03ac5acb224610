//! Countdown timer backed by a scheduled-event queue.
//!
//! Every scheduled event carries the generation it was created in. Starting
//! or stopping the countdown bumps the generation, so events left over from a
//! previous run are dropped when they come due instead of mutating state.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::time::{Duration, Instant};

/// Event fired by [`Countdown::poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// One second elapsed; `remaining` is the count before decrementing.
    Tick { remaining: u32 },
    /// The countdown reached zero.
    Expired,
    /// A blink scheduled with [`Countdown::schedule_blink`] ended.
    BlinkEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Pending {
    Tick,
    BlinkEnd,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct Scheduled {
    due: Instant,
    seq: u64,
    generation: u64,
    event: Pending,
}

/// A re-armable one-second countdown.
#[derive(Debug)]
pub struct Countdown {
    period: Duration,
    remaining: u32,
    running: bool,
    generation: u64,
    seq: u64,
    queue: BinaryHeap<Reverse<Scheduled>>,
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl Countdown {
    /// A stopped countdown ticking every `period`.
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            remaining: 0,
            running: false,
            generation: 0,
            seq: 0,
            queue: BinaryHeap::new(),
        }
    }

    /// Start counting down `secs` ticks from `now`, cancelling any previous run.
    pub fn start(&mut self, secs: u32, now: Instant) {
        self.generation += 1;
        self.remaining = secs;
        self.running = secs > 0;
        if self.running {
            self.schedule(now + self.period, Pending::Tick);
        }
    }

    /// Stop the countdown and invalidate everything scheduled so far.
    pub fn stop(&mut self) {
        self.generation += 1;
        self.remaining = 0;
        self.running = false;
    }

    /// Schedule a [`TimerEvent::BlinkEnd`] after `length`.
    pub fn schedule_blink(&mut self, now: Instant, length: Duration) {
        self.schedule(now + length, Pending::BlinkEnd);
    }

    fn schedule(&mut self, due: Instant, event: Pending) {
        self.seq += 1;
        self.queue.push(Reverse(Scheduled {
            due,
            seq: self.seq,
            generation: self.generation,
            event,
        }));
    }

    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Current generation tag.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// When the next live event comes due.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.queue
            .iter()
            .filter(|Reverse(s)| s.generation == self.generation)
            .map(|Reverse(s)| s.due)
            .min()
    }

    /// Fire every event due at or before `now`, in due order.
    pub fn poll(&mut self, now: Instant) -> Vec<TimerEvent> {
        let mut fired = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek().copied() {
            if next.due > now {
                break;
            }
            self.queue.pop();
            if next.generation != self.generation {
                continue;
            }
            match next.event {
                Pending::Tick => {
                    fired.push(TimerEvent::Tick {
                        remaining: self.remaining,
                    });
                    if self.remaining <= 1 {
                        self.remaining = 0;
                        self.running = false;
                        fired.push(TimerEvent::Expired);
                    } else {
                        self.remaining -= 1;
                        self.schedule(next.due + self.period, Pending::Tick);
                    }
                }
                Pending::BlinkEnd => fired.push(TimerEvent::BlinkEnd),
            }
        }
        fired
    }
}
