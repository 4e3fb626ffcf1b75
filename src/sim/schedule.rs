//! Generation-tagged deferred transitions
//!
//! Recovery delays are scheduled against the simulation clock instead of
//! free-running timers. Every entry carries the generation it was scheduled
//! in; entering or restarting a level bumps the generation, so a stale
//! transition can never fire into freshly reset state.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Scheduled<T> {
    pub generation: u64,
    pub fire_at: f64,
    pub transition: T,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scheduler<T> {
    generation: u64,
    /// Sorted by `fire_at`, ties in scheduling order
    pending: Vec<Scheduled<T>>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            generation: 0,
            pending: Vec::new(),
        }
    }
}

impl<T: Copy + PartialEq> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn schedule(&mut self, now: f64, delay: f32, transition: T) {
        let entry = Scheduled {
            generation: self.generation,
            fire_at: now + delay as f64,
            transition,
        };
        let at = self.pending.partition_point(|p| p.fire_at <= entry.fire_at);
        self.pending.insert(at, entry);
    }

    /// Drop everything pending and start a new generation
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.pending.clear();
    }

    pub fn cancel(&mut self, transition: T) {
        self.pending.retain(|p| p.transition != transition);
    }

    pub fn is_pending(&self, transition: T) -> bool {
        self.pending.iter().any(|p| p.transition == transition)
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    /// Remove and return transitions due at `now`, in firing order.
    /// Entries from an older generation are discarded.
    pub fn take_due(&mut self, now: f64) -> Vec<T> {
        let split = self.pending.partition_point(|p| p.fire_at <= now);
        let generation = self.generation;
        self.pending
            .drain(..split)
            .filter(|p| {
                let current = p.generation == generation;
                if !current {
                    log::warn!("Discarding stale deferred transition from generation {}", p.generation);
                }
                current
            })
            .map(|p| p.transition)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum T {
        A,
        B,
    }

    #[test]
    fn test_fires_in_time_order() {
        let mut s = Scheduler::new();
        s.schedule(0.0, 1.0, T::B);
        s.schedule(0.0, 0.5, T::A);
        assert!(s.take_due(0.4).is_empty());
        assert_eq!(s.take_due(0.5), vec![T::A]);
        assert_eq!(s.take_due(2.0), vec![T::B]);
        assert!(s.is_empty());
    }

    #[test]
    fn test_invalidate_drops_pending() {
        let mut s = Scheduler::new();
        s.schedule(0.0, 1.0, T::A);
        s.invalidate();
        assert_eq!(s.generation(), 1);
        assert!(s.take_due(5.0).is_empty());
    }

    #[test]
    fn test_stale_generation_discarded() {
        let mut s = Scheduler::new();
        s.schedule(0.0, 1.0, T::A);
        // Simulate an entry surviving a generation bump
        let stale = s.pending[0];
        s.invalidate();
        s.pending.push(stale);
        s.schedule(0.0, 1.0, T::B);
        assert_eq!(s.take_due(1.0), vec![T::B]);
    }

    #[test]
    fn test_cancel() {
        let mut s = Scheduler::new();
        s.schedule(0.0, 1.0, T::A);
        s.schedule(0.0, 1.0, T::B);
        s.cancel(T::A);
        assert!(!s.is_pending(T::A));
        assert_eq!(s.take_due(1.0), vec![T::B]);
    }
}
