//! Batch evaluation over independent lanes.
//!
//! Every scalar routine in this crate takes an `active` flag; these helpers
//! lift such a routine to a set of lanes with a per-lane mask. Inactive lanes
//! are never evaluated and hold `T::default()` in the output.

use std::ops::{Deref, Index};

/// Per-lane activity mask.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Mask {
    lanes: Vec<bool>,
}

impl Mask {
    /// Returns a mask with all `n` lanes active.
    ///
    /// * `n` - Number of lanes.
    pub fn all(n: usize) -> Self {
        Self { lanes: vec![true; n] }
    }

    /// Returns a mask with all `n` lanes inactive.
    ///
    /// * `n` - Number of lanes.
    pub fn none(n: usize) -> Self {
        Self { lanes: vec![false; n] }
    }

    /// Number of lanes.
    pub fn len(&self) -> usize {
        self.lanes.len()
    }

    /// Returns `true` if there are no lanes.
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    /// Returns whether lane `i` is active.
    ///
    /// * `i` - Lane index.
    pub fn get(&self, i: usize) -> bool {
        self.lanes[i]
    }

    /// Enables or disables lane `i`.
    ///
    /// * `i`      - Lane index.
    /// * `active` - New state.
    pub fn set(&mut self, i: usize, active: bool) {
        self.lanes[i] = active;
    }

    /// Number of active lanes.
    pub fn count(&self) -> usize {
        self.lanes.iter().filter(|&&b| b).count()
    }

    /// Returns `true` if any lane is active.
    pub fn any(&self) -> bool {
        self.lanes.iter().any(|&b| b)
    }

    /// Lane-wise conjunction with another mask of the same width.
    ///
    /// * `other` - The other mask.
    pub fn and(&self, other: &Self) -> Self {
        assert_eq!(self.len(), other.len());
        Self {
            lanes: self.lanes.iter().zip(other.lanes.iter()).map(|(&a, &b)| a && b).collect(),
        }
    }

    /// Iterates over lane states.
    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.lanes.iter().copied()
    }
}

impl From<Vec<bool>> for Mask {
    fn from(lanes: Vec<bool>) -> Self {
        Self { lanes }
    }
}

impl From<&[bool]> for Mask {
    fn from(lanes: &[bool]) -> Self {
        Self { lanes: lanes.to_vec() }
    }
}

/// One value per lane.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Packet<T> {
    lanes: Vec<T>,
}

impl<T> Packet<T> {
    /// Returns the lane values.
    pub fn into_vec(self) -> Vec<T> {
        self.lanes
    }
}

impl<T> From<Vec<T>> for Packet<T> {
    fn from(lanes: Vec<T>) -> Self {
        Self { lanes }
    }
}

impl<T> Deref for Packet<T> {
    type Target = [T];

    fn deref(&self) -> &Self::Target {
        &self.lanes
    }
}

impl<T> Index<usize> for Packet<T> {
    type Output = T;

    fn index(&self, i: usize) -> &Self::Output {
        &self.lanes[i]
    }
}

/// Evaluates a scalar routine for every active lane.
///
/// * `inputs` - One input per lane.
/// * `mask`   - Active lanes; must have the same width as `inputs`.
/// * `f`      - The scalar routine.
pub fn vectorize<I, T, F>(inputs: &[I], mask: &Mask, mut f: F) -> Packet<T>
where
    T: Default,
    F: FnMut(&I) -> T,
{
    assert_eq!(inputs.len(), mask.len(), "input and mask widths differ");
    inputs
        .iter()
        .zip(mask.iter())
        .map(|(input, active)| if active { f(input) } else { T::default() })
        .collect::<Vec<T>>()
        .into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inactive_lanes_are_not_evaluated() {
        let mask = Mask::from(vec![true, false, true]);
        let mut calls = 0;
        let out = vectorize(&[1, 2, 3], &mask, |&x| {
            calls += 1;
            x * 10
        });
        assert_eq!(calls, 2);
        assert_eq!(out.into_vec(), vec![10, 0, 30]);
    }

    #[test]
    fn mask_combinators() {
        let a = Mask::from(vec![true, true, false]);
        let b = Mask::from(vec![false, true, true]);
        assert_eq!(a.and(&b), Mask::from(vec![false, true, false]));
        assert_eq!(a.count(), 2);
        assert!(!Mask::none(4).any());
        assert!(Mask::all(4).any());
    }
}
