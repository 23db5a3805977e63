//! Threshold regeneration scheduler
//!
//! A non-lethal hit on a regenerating bone lowers its immediate threshold.
//! Each such hit enqueues its own restoration task, due one regeneration
//! window later on the simulation clock. Tasks are never coalesced: overlapping
//! windows each give back exactly the slice they took.
//!
//! One scheduler serves every skeleton hosted by the authority. Due tasks are
//! handed back to the caller, which applies them through the same `&mut` path
//! as live damage.

use std::cmp::Reverse;
use std::collections::BinaryHeap;

use ordered_float::OrderedFloat;

use crate::core::types::{BoneId, SimTime, SkeletonId};

/// Deferred restoration of immediate threshold
#[derive(Debug, Clone, PartialEq)]
pub struct RegenTask {
    pub skeleton: SkeletonId,
    /// Position of the rule in the skeleton's rule store
    pub rule: usize,
    /// Primary bone of that rule, for logging
    pub bone: BoneId,
    pub amount: f32,
    pub due: SimTime,
}

/// Heap ordering: (due ASC, seq ASC) so equal deadlines fire in schedule order
#[derive(Debug, Clone, PartialEq)]
struct QueuedTask {
    seq: u64,
    task: RegenTask,
}

impl QueuedTask {
    fn key(&self) -> (OrderedFloat<SimTime>, u64) {
        (OrderedFloat(self.task.due), self.seq)
    }
}

impl Eq for QueuedTask {}

impl PartialOrd for QueuedTask {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedTask {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key().cmp(&other.key())
    }
}

/// Single owner of every pending restoration
#[derive(Debug, Default)]
pub struct RegenScheduler {
    queue: BinaryHeap<Reverse<QueuedTask>>,
    next_seq: u64,
}

impl RegenScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `amount` to be restored to rule `rule` at `now + window`
    pub fn schedule(
        &mut self,
        skeleton: SkeletonId,
        rule: usize,
        bone: BoneId,
        amount: f32,
        now: SimTime,
        window: f32,
    ) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse(QueuedTask {
            seq,
            task: RegenTask {
                skeleton,
                rule,
                bone,
                amount,
                due: now + f64::from(window),
            },
        }));
    }

    /// Remove and return every task due at or before `now`, earliest first
    pub fn take_due(&mut self, now: SimTime) -> Vec<RegenTask> {
        let mut due = Vec::new();
        while let Some(Reverse(next)) = self.queue.peek() {
            if next.task.due > now {
                break;
            }
            if let Some(Reverse(queued)) = self.queue.pop() {
                due.push(queued.task);
            }
        }
        due
    }

    /// Drop every task belonging to a skeleton; returns how many were dropped
    pub fn cancel_skeleton(&mut self, skeleton: SkeletonId) -> usize {
        let before = self.queue.len();
        self.queue.retain(|Reverse(queued)| queued.task.skeleton != skeleton);
        before - self.queue.len()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tasks_fire_in_due_order() {
        let mut scheduler = RegenScheduler::new();
        let skeleton = SkeletonId::new();
        scheduler.schedule(skeleton, 1, "b".into(), 2.0, 0.0, 3.0);
        scheduler.schedule(skeleton, 0, "a".into(), 1.0, 0.0, 1.0);

        assert!(scheduler.take_due(0.5).is_empty());

        let due = scheduler.take_due(5.0);
        let bones: Vec<_> = due.iter().map(|t| t.bone.as_str()).collect();
        assert_eq!(bones, vec!["a", "b"]);
        assert_eq!(scheduler.pending(), 0);
    }

    #[test]
    fn test_equal_deadlines_keep_schedule_order() {
        let mut scheduler = RegenScheduler::new();
        let skeleton = SkeletonId::new();
        scheduler.schedule(skeleton, 0, "arm".into(), 1.0, 0.0, 2.0);
        scheduler.schedule(skeleton, 0, "arm".into(), 4.0, 0.0, 2.0);
        scheduler.schedule(skeleton, 1, "arm".into(), 2.0, 0.0, 2.0);

        let due = scheduler.take_due(2.0);
        let order: Vec<_> = due.iter().map(|t| (t.rule, t.amount)).collect();
        assert_eq!(order, vec![(0, 1.0), (0, 4.0), (1, 2.0)]);
    }

    #[test]
    fn test_overlapping_tasks_are_not_coalesced() {
        let mut scheduler = RegenScheduler::new();
        let skeleton = SkeletonId::new();
        scheduler.schedule(skeleton, 0, "arm".into(), 3.0, 0.0, 2.0);
        scheduler.schedule(skeleton, 0, "arm".into(), 5.0, 1.0, 2.0);

        let first = scheduler.take_due(2.0);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].amount, 3.0);

        let second = scheduler.take_due(3.0);
        assert_eq!(second.len(), 1);
        assert_eq!(second[0].amount, 5.0);
    }

    #[test]
    fn test_cancel_skeleton_leaves_others() {
        let mut scheduler = RegenScheduler::new();
        let gone = SkeletonId::new();
        let kept = SkeletonId::new();
        scheduler.schedule(gone, 0, "arm".into(), 1.0, 0.0, 1.0);
        scheduler.schedule(gone, 1, "leg".into(), 1.0, 0.0, 1.0);
        scheduler.schedule(kept, 0, "arm".into(), 1.0, 0.0, 1.0);

        assert_eq!(scheduler.cancel_skeleton(gone), 2);
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(scheduler.take_due(1.0)[0].skeleton, kept);
    }
}
