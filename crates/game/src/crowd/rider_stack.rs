//! People stacked on the otter's back, bottom to top.

/// Person indices in riding order. A rider's slot is its position here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RiderStack {
    riders: Vec<usize>,
}

impl RiderStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount `person` on top. Returns its slot.
    pub fn push(&mut self, person: usize) -> usize {
        self.riders.push(person);
        self.riders.len() - 1
    }

    /// Take the top rider off.
    pub fn pop(&mut self) -> Option<usize> {
        self.riders.pop()
    }

    /// Remove `person` wherever it sits; riders above it shift down one slot.
    /// Returns false if the person was not riding.
    pub fn remove(&mut self, person: usize) -> bool {
        match self.slot_of(person) {
            Some(slot) => {
                self.riders.remove(slot);
                true
            }
            None => false,
        }
    }

    pub fn slot_of(&self, person: usize) -> Option<usize> {
        self.riders.iter().position(|&p| p == person)
    }

    pub fn len(&self) -> usize {
        self.riders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.riders.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.riders
    }

    /// `(slot, person)` pairs, bottom first.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.riders.iter().copied().enumerate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_follow_push_order() {
        let mut s = RiderStack::new();
        assert_eq!(s.push(7), 0);
        assert_eq!(s.push(3), 1);
        assert_eq!(s.push(9), 2);
        assert_eq!(s.slot_of(3), Some(1));
    }

    #[test]
    fn removal_compacts() {
        let mut s = RiderStack::new();
        for p in [4, 5, 6, 7] {
            s.push(p);
        }
        assert!(s.remove(5));
        assert_eq!(s.as_slice(), &[4, 6, 7]);
        assert_eq!(s.slot_of(6), Some(1));
        assert_eq!(s.iter().collect::<Vec<_>>(), vec![(0, 4), (1, 6), (2, 7)]);
    }

    #[test]
    fn removing_absent_rider_is_noop() {
        let mut s = RiderStack::new();
        s.push(1);
        assert!(!s.remove(42));
        assert_eq!(s.as_slice(), &[1]);
    }

    #[test]
    fn pop_drains_top_down() {
        let mut s = RiderStack::new();
        s.push(1);
        s.push(2);
        assert_eq!(s.pop(), Some(2));
        assert_eq!(s.pop(), Some(1));
        assert_eq!(s.pop(), None);
        assert!(s.is_empty());
    }
}
