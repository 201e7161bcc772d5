//! Recency-based tabu memory.

use std::collections::{HashMap, VecDeque};
use std::hash::Hash;

use crate::model::Cost;

/// FIFO memory of the most recent `tenure` move identities.
///
/// An identity is a sequence of move keys, so compound candidates are
/// remembered as a whole. The same identity may be inserted more than
/// once; it stays tabu until its last copy is evicted. Buffers of evicted
/// entries are recycled, so a warmed memory inserts without allocating.
///
/// # Examples
///
/// ```
/// use u_mets::tabu::TabuMemory;
///
/// let mut memory = TabuMemory::new(2);
/// memory.insert(&[1]);
/// memory.insert(&[2]);
/// memory.insert(&[3]);
/// assert!(!memory.is_tabu(&[1]));
/// assert!(memory.is_tabu(&[3]));
///
/// memory.set_tenure(1);
/// assert!(!memory.is_tabu(&[2]));
/// ```
#[derive(Debug, Clone)]
pub struct TabuMemory<K> {
    tenure: usize,
    queue: VecDeque<Vec<K>>,
    counts: HashMap<Vec<K>, usize>,
    spare: Vec<Vec<K>>,
}

impl<K: Clone + Eq + Hash> TabuMemory<K> {
    /// Creates an empty memory. A tenure of 0 disables it.
    pub fn new(tenure: usize) -> Self {
        Self {
            tenure,
            queue: VecDeque::with_capacity(tenure + 1),
            counts: HashMap::new(),
            spare: Vec::new(),
        }
    }

    /// Current tenure.
    pub fn tenure(&self) -> usize {
        self.tenure
    }

    /// Changes the tenure, evicting the oldest entries beyond it now.
    pub fn set_tenure(&mut self, tenure: usize) {
        self.tenure = tenure;
        self.evict_to(tenure);
    }

    /// Remembers `keys` as tabu.
    pub fn insert(&mut self, keys: &[K]) {
        if self.tenure == 0 {
            return;
        }
        self.evict_to(self.tenure - 1);
        if let Some(count) = self.counts.get_mut(keys) {
            *count += 1;
        } else {
            let key = self.buffer(keys);
            self.counts.insert(key, 1);
        }
        let entry = self.buffer(keys);
        self.queue.push_back(entry);
    }

    /// Whether `keys` is currently tabu.
    pub fn is_tabu(&self, keys: &[K]) -> bool {
        self.counts.contains_key(keys)
    }

    /// Number of remembered entries, duplicates included.
    pub fn len(&self) -> usize {
        self.queue.len()
    }

    /// Whether nothing is tabu.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Forgets every entry.
    pub fn clear(&mut self) {
        self.spare.extend(self.queue.drain(..));
        self.spare.extend(self.counts.drain().map(|(key, _)| key));
    }

    fn buffer(&mut self, keys: &[K]) -> Vec<K> {
        let mut buffer = self.spare.pop().unwrap_or_default();
        buffer.clear();
        buffer.extend_from_slice(keys);
        buffer
    }

    fn evict_to(&mut self, len: usize) {
        while self.queue.len() > len {
            let Some(oldest) = self.queue.pop_front() else {
                break;
            };
            if let Some(count) = self.counts.get_mut(&oldest) {
                *count -= 1;
                if *count == 0 {
                    if let Some((key, _)) = self.counts.remove_entry(&oldest) {
                        self.spare.push(key);
                    }
                }
            }
            self.spare.push(oldest);
        }
    }
}

/// Override that lets a tabu candidate through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Aspiration {
    /// A tabu candidate is admissible when it is strictly better than the
    /// best cost seen so far.
    #[default]
    BestEver,
    /// Tabu candidates are never admissible.
    Disabled,
}

impl Aspiration {
    /// Whether a tabu candidate of cost `cost` is admissible.
    pub fn admits(&self, cost: Cost, best_seen: Cost) -> bool {
        match self {
            Aspiration::BestEver => cost < best_seen,
            Aspiration::Disabled => false,
        }
    }
}
