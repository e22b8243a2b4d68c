//! Bounded history of settlement digits

use std::collections::VecDeque;

/// Default number of digits retained
pub const DEFAULT_HISTORY_CAPACITY: usize = 100;

/// Last observed settlement digits, oldest first
///
/// Holds at most `capacity` digits; pushing onto a full history evicts
/// the oldest entry.
#[derive(Debug, Clone)]
pub struct DigitHistory {
    digits: VecDeque<u8>,
    capacity: usize,
}

impl DigitHistory {
    /// Create an empty history. A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            digits: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a digit, returning the evicted one if the history was full
    ///
    /// Values above 9 are not digits and are ignored.
    pub fn push(&mut self, digit: u8) -> Option<u8> {
        if digit > 9 {
            tracing::warn!(digit, "Ignoring out-of-range digit");
            return None;
        }

        let evicted = if self.digits.len() == self.capacity {
            self.digits.pop_front()
        } else {
            None
        };
        self.digits.push_back(digit);
        evicted
    }

    pub fn len(&self) -> usize {
        self.digits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.digits.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Digits, oldest first
    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.digits.iter().copied()
    }

    pub fn last(&self) -> Option<u8> {
        self.digits.back().copied()
    }

    /// Occurrences of each digit, indexed by digit
    pub fn counts(&self) -> [usize; 10] {
        let mut counts = [0usize; 10];
        for digit in self.iter() {
            counts[digit as usize] += 1;
        }
        counts
    }

    pub fn to_vec(&self) -> Vec<u8> {
        self.iter().collect()
    }
}

impl Default for DigitHistory {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAPACITY)
    }
}

impl Extend<u8> for DigitHistory {
    fn extend<I: IntoIterator<Item = u8>>(&mut self, iter: I) {
        for digit in iter {
            self.push(digit);
        }
    }
}
