//! Delayed action scheduling: a fixed set of entries threaded into a list
//! sorted by countdown.

use alloc::vec::Vec;

use crate::base::ActionListRef;
use crate::error::RuleCode;
use crate::fixed_point::Point;
use crate::object::ObjectRef;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QueuedAction {
    pub list: ActionListRef,
    pub scheduled_time: i32,
    pub subject: Option<ObjectRef>,
    pub direct: Option<ObjectRef>,
    pub offset: Point,
    next: Option<usize>,
}

#[derive(Clone, Debug)]
pub struct ActionQueue {
    entries: Vec<Option<QueuedAction>>,
    first: Option<usize>,
}

impl ActionQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: (0..capacity).map(|_| None).collect(),
            first: None,
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.first.is_none()
    }

    /// Insert after every entry with a strictly smaller countdown. Returns
    /// `false` when every entry is taken; the request is dropped.
    pub fn schedule(
        &mut self,
        list: ActionListRef,
        delay: i32,
        subject: Option<ObjectRef>,
        direct: Option<ObjectRef>,
        offset: Point,
    ) -> bool {
        let Some(index) = self.entries.iter().position(|entry| entry.is_none()) else {
            tracing::debug!(
                start = list.start,
                count = list.count,
                delay,
                "action queue full, dropping delayed action"
            );
            return false;
        };

        let mut previous = None;
        let mut cursor = self.first;
        while let Some(current) = cursor {
            let Some(entry) = self.entries[current].as_ref() else {
                break;
            };
            if entry.scheduled_time >= delay {
                break;
            }
            previous = Some(current);
            cursor = entry.next;
        }

        let next = match previous {
            Some(previous) => self.entries[previous].as_ref().and_then(|entry| entry.next),
            None => self.first,
        };
        self.entries[index] = Some(QueuedAction {
            list,
            scheduled_time: delay,
            subject,
            direct,
            offset,
            next,
        });
        match previous {
            Some(previous) => {
                if let Some(entry) = self.entries[previous].as_mut() {
                    entry.next = Some(index);
                }
            }
            None => self.first = Some(index),
        }
        true
    }

    /// Count every live entry down by `elapsed`.
    pub fn decrement(&mut self, elapsed: i32) {
        for entry in self.entries.iter_mut().flatten() {
            entry.scheduled_time -= elapsed;
        }
    }

    /// Remove and return the head entry if it is due.
    pub fn pop_due(&mut self) -> Option<QueuedAction> {
        let first = self.first?;
        let due = self.entries[first]
            .as_ref()
            .is_some_and(|entry| entry.scheduled_time <= 0);
        if !due {
            return None;
        }
        let entry = self.entries[first].take()?;
        self.first = entry.next;
        Some(entry)
    }

    /// Entries in firing order.
    pub fn iter(&self) -> impl Iterator<Item = &QueuedAction> + '_ {
        let mut cursor = self.first;
        core::iter::from_fn(move || {
            let entry = self.entries.get(cursor?)?.as_ref()?;
            cursor = entry.next;
            Some(entry)
        })
    }

    pub fn clear(&mut self) {
        self.entries.iter_mut().for_each(|entry| *entry = None);
        self.first = None;
    }

    pub fn validate(&self) -> Result<(), RuleCode> {
        let live = self.len();
        if live > self.capacity() {
            return Err(RuleCode::QueueCapacity);
        }

        let mut walked = 0usize;
        let mut last_time = i32::MIN;
        let mut cursor = self.first;
        while let Some(index) = cursor {
            let entry = self
                .entries
                .get(index)
                .and_then(|entry| entry.as_ref())
                .ok_or(RuleCode::QueueLink)?;
            if entry.scheduled_time < last_time {
                return Err(RuleCode::QueueOrder);
            }
            last_time = entry.scheduled_time;
            walked += 1;
            if walked > self.capacity() {
                return Err(RuleCode::QueueLink);
            }
            cursor = entry.next;
        }

        if walked != live {
            return Err(RuleCode::QueueLink);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(start: u32) -> ActionListRef {
        ActionListRef::new(start, 1)
    }

    fn schedule(queue: &mut ActionQueue, start: u32, delay: i32) -> bool {
        queue.schedule(list(start), delay, None, None, Point::default())
    }

    fn order(queue: &ActionQueue) -> Vec<u32> {
        queue.iter().map(|entry| entry.list.start).collect()
    }

    #[test]
    fn entries_fire_in_countdown_order() {
        let mut queue = ActionQueue::new(8);
        schedule(&mut queue, 1, 30);
        schedule(&mut queue, 2, 10);
        schedule(&mut queue, 3, 20);
        assert_eq!(order(&queue), vec![2, 3, 1]);
        assert_eq!(queue.validate(), Ok(()));
    }

    #[test]
    fn equal_countdowns_insert_ahead_of_existing_ties() {
        let mut queue = ActionQueue::new(8);
        schedule(&mut queue, 1, 5);
        schedule(&mut queue, 2, 10);
        schedule(&mut queue, 3, 10);
        assert_eq!(order(&queue), vec![1, 3, 2]);
    }

    #[test]
    fn full_queue_drops_new_requests() {
        let mut queue = ActionQueue::new(2);
        assert!(schedule(&mut queue, 1, 1));
        assert!(schedule(&mut queue, 2, 2));
        assert!(!schedule(&mut queue, 3, 0));
        assert_eq!(order(&queue), vec![1, 2]);
    }

    #[test]
    fn decrement_then_pop_only_due_entries() {
        let mut queue = ActionQueue::new(4);
        schedule(&mut queue, 1, 3);
        schedule(&mut queue, 2, 6);

        queue.decrement(3);
        let due = queue.pop_due().expect("first entry due");
        assert_eq!(due.list.start, 1);
        assert_eq!(due.scheduled_time, 0);
        assert!(queue.pop_due().is_none());

        queue.decrement(3);
        assert_eq!(queue.pop_due().map(|entry| entry.list.start), Some(2));
        assert!(queue.is_empty());
        assert_eq!(queue.len(), 0);
    }

    #[test]
    fn freed_entries_are_reused() {
        let mut queue = ActionQueue::new(1);
        assert!(schedule(&mut queue, 1, 0));
        assert!(queue.pop_due().is_some());
        assert!(schedule(&mut queue, 2, 4));
        assert_eq!(queue.validate(), Ok(()));
    }
}
