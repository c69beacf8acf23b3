//! Priority queue of pending jobs
//!
//! Higher priority dequeues first; equal priorities dequeue in submission
//! order.

use crate::domain::Job;
use std::cmp::Ordering;
use std::collections::BinaryHeap;

#[derive(Debug)]
struct QueueEntry {
    priority: i32,
    seq: u64,
    job: Job,
}

impl PartialEq for QueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueueEntry {}

impl PartialOrd for QueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Max-heap: higher priority first, then the lower sequence number
        self.priority
            .cmp(&other.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Pending jobs ordered by `(priority desc, submission order asc)`
#[derive(Debug, Default)]
pub struct PendingQueue {
    heap: BinaryHeap<QueueEntry>,
    next_seq: u64,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, job: Job) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.heap.push(QueueEntry {
            priority: job.priority,
            seq,
            job,
        });
    }

    pub fn pop(&mut self) -> Option<Job> {
        self.heap.pop().map(|entry| entry.job)
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&Job> {
        self.heap
            .iter()
            .map(|entry| &entry.job)
            .find(|job| job.id.as_str() == id)
    }

    /// Pending jobs in dequeue order
    pub fn to_vec(&self) -> Vec<Job> {
        let mut entries: Vec<&QueueEntry> = self.heap.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|entry| entry.job.clone()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::PresetCatalog;

    fn job(priority: i32) -> Job {
        let preset = PresetCatalog::new().get("youtube_1080p").unwrap();
        Job::new("project", "/tmp/out.mp4", preset).with_priority(priority)
    }

    #[test]
    fn test_priority_then_fifo() {
        let mut queue = PendingQueue::new();
        let low = job(-1);
        let first_normal = job(0);
        let urgent = job(10);
        let second_normal = job(0);

        let expected = vec![
            urgent.id.clone(),
            first_normal.id.clone(),
            second_normal.id.clone(),
            low.id.clone(),
        ];

        queue.push(low);
        queue.push(first_normal);
        queue.push(urgent);
        queue.push(second_normal);

        let preview: Vec<_> = queue.to_vec().into_iter().map(|j| j.id).collect();
        assert_eq!(preview, expected);

        let mut popped = Vec::new();
        while let Some(job) = queue.pop() {
            popped.push(job.id);
        }
        assert_eq!(popped, expected);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_get_by_id() {
        let mut queue = PendingQueue::new();
        let j = job(0);
        let id = j.id.clone();
        queue.push(j);
        assert!(queue.get(id.as_str()).is_some());
        assert!(queue.get("other").is_none());
        assert_eq!(queue.len(), 1);
    }
}
