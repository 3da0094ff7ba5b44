//! Fixed-capacity object storage with an intrusive active list threaded
//! through slot indices.

use alloc::vec::Vec;
use core::ops::{Index, IndexMut};

use crate::error::RuleCode;
use crate::object::{ObjectRef, ObjectState, SpaceObject};

#[derive(Clone, Debug)]
pub struct ObjectPool {
    objects: Vec<SpaceObject>,
    root: Option<usize>,
}

impl ObjectPool {
    pub fn new(capacity: usize) -> Self {
        let objects = (0..capacity)
            .map(|slot| SpaceObject {
                entry_number: slot,
                ..SpaceObject::default()
            })
            .collect();
        Self {
            objects,
            root: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.objects.len()
    }

    pub fn head(&self) -> Option<usize> {
        self.root
    }

    pub fn get(&self, slot: usize) -> Option<&SpaceObject> {
        self.objects.get(slot)
    }

    pub fn get_mut(&mut self, slot: usize) -> Option<&mut SpaceObject> {
        self.objects.get_mut(slot)
    }

    /// First slot that is neither in use nor awaiting reaping.
    pub fn first_free(&self) -> Option<usize> {
        self.objects
            .iter()
            .position(|object| object.active == ObjectState::Available)
    }

    /// Resolve a weak reference to its slot if the referent is still alive.
    pub fn resolve(&self, reference: ObjectRef) -> Option<usize> {
        let object = self.objects.get(reference.slot)?;
        (object.is_in_use() && object.id == reference.id).then_some(reference.slot)
    }

    /// Like `resolve`, but also accepts an object awaiting reaping. Queued
    /// actions still run against a subject that died earlier in the tick.
    pub fn resolve_pending(&self, reference: ObjectRef) -> Option<usize> {
        let object = self.objects.get(reference.slot)?;
        (object.active != ObjectState::Available && object.id == reference.id)
            .then_some(reference.slot)
    }

    pub fn resolve_opt(&self, reference: Option<ObjectRef>) -> Option<usize> {
        reference.and_then(|reference| self.resolve(reference))
    }

    /// Weak reference to a slot, if it currently holds a live object.
    pub fn reference(&self, slot: usize) -> Option<ObjectRef> {
        let object = self.objects.get(slot)?;
        object.is_in_use().then(|| object.reference())
    }

    /// Store `object` in `slot`, mark it in use and link it at the list head.
    pub fn insert_at_head(&mut self, slot: usize, mut object: SpaceObject) {
        object.entry_number = slot;
        object.active = ObjectState::InUse;
        object.previous = None;
        object.next = self.root;
        if let Some(old_root) = self.root {
            self.objects[old_root].previous = Some(slot);
        }
        self.objects[slot] = object;
        self.root = Some(slot);
    }

    fn unlink(&mut self, slot: usize) {
        let (previous, next) = {
            let object = &self.objects[slot];
            (object.previous, object.next)
        };
        match previous {
            Some(previous) => self.objects[previous].next = next,
            None => self.root = next,
        }
        if let Some(next) = next {
            self.objects[next].previous = previous;
        }
        let object = &mut self.objects[slot];
        object.next = None;
        object.previous = None;
    }

    /// Unlink every object marked `ToBeFreed` and return its slot to the free
    /// set. Returns the number of slots reclaimed.
    pub fn reap(&mut self) -> usize {
        let mut reaped = 0;
        let mut cursor = self.root;
        while let Some(slot) = cursor {
            cursor = self.objects[slot].next;
            if self.objects[slot].active == ObjectState::ToBeFreed {
                self.unlink(slot);
                let object = &mut self.objects[slot];
                object.active = ObjectState::Available;
                object.sprite = None;
                reaped += 1;
            }
        }
        reaped
    }

    /// Slots in active-list order, captured up front so callers may mutate
    /// the pool while walking them.
    pub fn active_slots(&self) -> Vec<usize> {
        let mut slots = Vec::new();
        let mut cursor = self.root;
        while let Some(slot) = cursor {
            slots.push(slot);
            cursor = self.objects[slot].next;
        }
        slots
    }

    pub fn iter_in_use(&self) -> impl Iterator<Item = &SpaceObject> {
        self.objects.iter().filter(|object| object.is_in_use())
    }

    pub fn in_use_count(&self) -> usize {
        self.iter_in_use().count()
    }

    pub fn validate(&self) -> Result<(), RuleCode> {
        if let Some(root) = self.root {
            if root >= self.objects.len() || self.objects[root].previous.is_some() {
                return Err(RuleCode::ActiveListHead);
            }
        }

        let mut linked = 0usize;
        let mut in_use_linked = 0usize;
        let mut previous = None;
        let mut cursor = self.root;
        while let Some(slot) = cursor {
            let object = self.objects.get(slot).ok_or(RuleCode::ActiveListLink)?;
            if object.previous != previous || object.entry_number != slot {
                return Err(RuleCode::ActiveListLink);
            }
            if object.active == ObjectState::Available {
                return Err(RuleCode::ActiveListMembership);
            }
            if object.is_in_use() {
                in_use_linked += 1;
            }
            linked += 1;
            if linked > self.objects.len() {
                return Err(RuleCode::ActiveListLink);
            }
            previous = Some(slot);
            cursor = object.next;
        }

        let not_available = self
            .objects
            .iter()
            .filter(|object| object.active != ObjectState::Available)
            .count();
        if linked != not_available || in_use_linked != self.in_use_count() {
            return Err(RuleCode::ActiveListCount);
        }

        Ok(())
    }
}

impl Index<usize> for ObjectPool {
    type Output = SpaceObject;

    fn index(&self, slot: usize) -> &SpaceObject {
        &self.objects[slot]
    }
}

impl IndexMut<usize> for ObjectPool {
    fn index_mut(&mut self, slot: usize) -> &mut SpaceObject {
        &mut self.objects[slot]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spawn(pool: &mut ObjectPool, id: i32) -> usize {
        let slot = pool.first_free().expect("free slot");
        pool.insert_at_head(
            slot,
            SpaceObject {
                id,
                ..SpaceObject::default()
            },
        );
        slot
    }

    #[test]
    fn inserts_link_at_head() {
        let mut pool = ObjectPool::new(4);
        let a = spawn(&mut pool, 10);
        let b = spawn(&mut pool, 11);
        assert_eq!(pool.head(), Some(b));
        assert_eq!(pool.active_slots(), vec![b, a]);
        assert_eq!(pool.validate(), Ok(()));
    }

    #[test]
    fn full_pool_has_no_free_slot() {
        let mut pool = ObjectPool::new(2);
        spawn(&mut pool, 1);
        spawn(&mut pool, 2);
        assert_eq!(pool.first_free(), None);
    }

    #[test]
    fn reap_unlinks_marked_objects_from_any_position() {
        let mut pool = ObjectPool::new(5);
        let slots: Vec<usize> = (0..5).map(|id| spawn(&mut pool, id)).collect();
        pool[slots[2]].active = ObjectState::ToBeFreed;
        pool[slots[4]].active = ObjectState::ToBeFreed;
        pool[slots[0]].active = ObjectState::ToBeFreed;
        assert_eq!(pool.validate(), Ok(()));

        assert_eq!(pool.reap(), 3);
        assert_eq!(pool.active_slots(), vec![slots[3], slots[1]]);
        assert_eq!(pool.in_use_count(), 2);
        assert_eq!(pool.validate(), Ok(()));
    }

    #[test]
    fn stale_reference_stops_resolving_after_reuse() {
        let mut pool = ObjectPool::new(1);
        let slot = spawn(&mut pool, 42);
        let original = pool.reference(slot).expect("live reference");
        assert_eq!(pool.resolve(original), Some(slot));

        pool[slot].active = ObjectState::ToBeFreed;
        assert_eq!(pool.resolve(original), None);
        assert_eq!(pool.resolve_pending(original), Some(slot));
        pool.reap();
        assert_eq!(pool.resolve_pending(original), None);

        let reused = spawn(&mut pool, 43);
        assert_eq!(reused, slot);
        assert_eq!(pool.resolve(original), None);
        assert_eq!(pool.resolve_pending(original), None);
    }

    #[test]
    fn validate_catches_orphaned_slot() {
        let mut pool = ObjectPool::new(3);
        spawn(&mut pool, 1);
        pool[2].active = ObjectState::InUse;
        assert_eq!(pool.validate(), Err(RuleCode::ActiveListCount));
    }
}
