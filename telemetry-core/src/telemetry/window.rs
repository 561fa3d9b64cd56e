//! Bounded rolling history for charts

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Default number of points kept per chart series
pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// FIFO of the most recent entries, oldest evicted first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollingWindow<T> {
    items: VecDeque<T>,
    capacity: usize,
}

impl<T> Default for RollingWindow<T> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

impl<T> RollingWindow<T> {
    /// Create a window holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            items: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append `item`, returning the evicted entry once the cap is exceeded
    pub fn push(&mut self, item: T) -> Option<T> {
        self.items.push_back(item);
        if self.items.len() > self.capacity {
            self.items.pop_front()
        } else {
            None
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.items.len() == self.capacity
    }

    pub fn latest(&self) -> Option<&T> {
        self.items.back()
    }

    pub fn oldest(&self) -> Option<&T> {
        self.items.front()
    }

    /// Entries oldest first
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T: Clone> RollingWindow<T> {
    pub fn to_vec(&self) -> Vec<T> {
        self.items.iter().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evicts_oldest_past_capacity() {
        let mut window = RollingWindow::new(3);
        assert_eq!(window.push(1), None);
        assert_eq!(window.push(2), None);
        assert_eq!(window.push(3), None);
        assert!(window.is_full());

        assert_eq!(window.push(4), Some(1));
        assert_eq!(window.to_vec(), vec![2, 3, 4]);
        assert_eq!(window.oldest(), Some(&2));
        assert_eq!(window.latest(), Some(&4));
    }

    #[test]
    fn test_keeps_duplicates_in_order() {
        let mut window = RollingWindow::new(4);
        for v in [5, 5, 1, 5] {
            window.push(v);
        }
        assert_eq!(window.to_vec(), vec![5, 5, 1, 5]);
    }

    #[test]
    fn test_default_capacity_and_zero_capacity() {
        assert_eq!(RollingWindow::<f64>::default().capacity(), DEFAULT_WINDOW_CAPACITY);

        let mut window = RollingWindow::new(0);
        window.push("a");
        window.push("b");
        assert_eq!(window.len(), 1);
        assert_eq!(window.latest(), Some(&"b"));
    }
}
