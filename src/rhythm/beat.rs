//! Beats and the fixed-capacity arena they live in.

use crate::shared::*;

/// One marker on the track. `position` is the signed distance to the hit
/// zone: positive while approaching, negative once it has scrolled past.
#[derive(Debug, Clone, PartialEq)]
pub struct Beat {
    pub spec: BeatSpec,
    pub position: f32,
    pub velocity: f32,
    pub available: bool,
    pub hit: bool,
}

impl Beat {
    pub fn beat_type(&self) -> BeatType {
        self.spec.beat_type
    }

    pub fn action(&self) -> Option<ActionType> {
        self.spec.action
    }

    pub fn distance(&self) -> f32 {
        self.position.abs()
    }

    /// Small beats never become available; Big beats only for a legal action.
    pub fn refresh_available(&mut self, legal: &[ActionType]) {
        self.available = match (self.spec.beat_type, self.spec.action) {
            (BeatType::Big, Some(action)) => legal.contains(&action),
            _ => false,
        };
    }
}

/// Handle into a `BeatPool`. Stale once its slot is released and reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BeatId {
    slot: usize,
    generation: u32,
}

impl BeatId {
    pub fn slot(&self) -> usize {
        self.slot
    }
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    beat: Option<Beat>,
}

/// Arena of `capacity` beat slots recycled through a free list. Acquiring
/// writes every field of the beat from scratch.
#[derive(Debug, Clone)]
pub struct BeatPool {
    slots: Vec<Slot>,
    /// Stack of free slot indices. Each release pushes highest first, so
    /// the lowest slot it freed is reused first.
    free: Vec<usize>,
}

impl BeatPool {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![Slot { generation: 0, beat: None }; capacity],
            free: (0..capacity).rev().collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn live_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// `None` when every slot is taken.
    pub fn acquire(&mut self, beat: Beat) -> Option<BeatId> {
        let slot = self.free.pop()?;
        let entry = &mut self.slots[slot];
        entry.generation = entry.generation.wrapping_add(1);
        entry.beat = Some(beat);
        Some(BeatId { slot, generation: entry.generation })
    }

    pub fn get(&self, id: BeatId) -> Option<&Beat> {
        self.slots
            .get(id.slot)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.beat.as_ref())
    }

    pub fn get_mut(&mut self, id: BeatId) -> Option<&mut Beat> {
        self.slots
            .get_mut(id.slot)
            .filter(|e| e.generation == id.generation)
            .and_then(|e| e.beat.as_mut())
    }

    pub fn iter(&self) -> impl Iterator<Item = (BeatId, &Beat)> {
        self.slots.iter().enumerate().filter_map(|(slot, e)| {
            e.beat
                .as_ref()
                .map(|b| (BeatId { slot, generation: e.generation }, b))
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Beat> {
        self.slots.iter_mut().filter_map(|e| e.beat.as_mut())
    }

    /// Releases every beat matching `pred`; returns how many went back.
    pub fn release_where(&mut self, mut pred: impl FnMut(&Beat) -> bool) -> usize {
        let mut released = 0;
        // Highest slot first, so the lowest freed index ends up on top.
        for (slot, entry) in self.slots.iter_mut().enumerate().rev() {
            if entry.beat.as_ref().is_some_and(&mut pred) {
                entry.beat = None;
                self.free.push(slot);
                released += 1;
            }
        }
        released
    }

    pub fn clear(&mut self) {
        self.release_where(|_| true);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn beat(position: f32) -> Beat {
        Beat {
            spec: BeatSpec::big(ActionType::Plow),
            position,
            velocity: 1.0,
            available: false,
            hit: false,
        }
    }

    #[test]
    fn acquire_until_full() {
        let mut pool = BeatPool::with_capacity(2);
        let a = pool.acquire(beat(1.0)).unwrap();
        let b = pool.acquire(beat(2.0)).unwrap();
        assert_eq!((a.slot(), b.slot()), (0, 1));
        assert!(pool.acquire(beat(3.0)).is_none());
        assert_eq!(pool.live_count(), 2);
    }

    #[test]
    fn reused_slot_starts_fresh_and_old_handle_goes_stale() {
        let mut pool = BeatPool::with_capacity(1);
        let old = pool.acquire(beat(1.0)).unwrap();
        pool.get_mut(old).unwrap().hit = true;
        assert_eq!(pool.release_where(|_| true), 1);
        assert_eq!(pool.release_where(|_| true), 0, "empty slots are not released twice");

        let new = pool.acquire(beat(5.0)).unwrap();
        assert_eq!(new.slot(), old.slot());
        assert!(pool.get(old).is_none());
        let fresh = pool.get(new).unwrap();
        assert!(!fresh.hit);
        assert_eq!(fresh.position, 5.0);
    }

    #[test]
    fn release_where_returns_slots_to_free_list() {
        let mut pool = BeatPool::with_capacity(3);
        for p in [-10.0, 5.0, -20.0] {
            pool.acquire(beat(p));
        }
        assert_eq!(pool.release_where(|b| b.position < 0.0), 2);
        assert_eq!(pool.live_count(), 1);
        assert!(pool.acquire(beat(0.0)).is_some());
        assert!(pool.acquire(beat(0.0)).is_some());
        assert!(pool.acquire(beat(0.0)).is_none());
    }

    #[test]
    fn freed_slots_are_reused_lowest_first() {
        let mut pool = BeatPool::with_capacity(4);
        for p in [1.0, 2.0, 3.0, 4.0] {
            pool.acquire(beat(p));
        }
        assert_eq!(pool.release_where(|b| b.position != 2.0), 3);
        let slots: Vec<usize> = (0..3)
            .map(|_| pool.acquire(beat(0.0)).unwrap().slot())
            .collect();
        assert_eq!(slots, vec![0, 2, 3]);
    }

    #[test]
    fn small_beats_never_available() {
        let mut small = Beat { spec: BeatSpec::small(), ..beat(0.0) };
        small.refresh_available(&ActionType::ALL);
        assert!(!small.available);

        let mut big = beat(0.0);
        big.refresh_available(&[ActionType::Water]);
        assert!(!big.available);
        big.refresh_available(&[ActionType::Water, ActionType::Plow]);
        assert!(big.available);
    }
}
