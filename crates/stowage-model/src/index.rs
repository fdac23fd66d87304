// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

//! # Strongly Typed Identifiers
//!
//! Phantom-tagged wrappers that keep the different identifier spaces of the
//! loading domain apart: pallet ids, order ids, positions inside a ledger and
//! lane indices. Mixing them up is a compile error rather than a silent
//! mis-assignment.
//!
//! `LaneIndex` is zero-based internally but displays one-based, matching how
//! lanes are numbered on the loading sheet. `LaneAssignment` models the raw
//! lane column of a pallet record where `0` means "not assigned".

use crate::error::LaneError;

/// A trait to tag typed identifiers with a name for debugging and display purposes.
pub trait TypedIdTag: Clone {
    const NAME: &'static str;
}

/// A stable `u64` identifier tagged with its domain.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypedId<T> {
    value: u64,
    _marker: std::marker::PhantomData<T>,
}

impl<T> TypedId<T> {
    /// Creates a new identifier from its raw value.
    #[inline(always)]
    pub const fn new(value: u64) -> Self {
        Self {
            value,
            _marker: std::marker::PhantomData,
        }
    }

    /// Returns the raw value.
    #[inline(always)]
    pub const fn get(&self) -> u64 {
        self.value
    }
}

impl<T> std::fmt::Debug for TypedId<T>
where
    T: TypedIdTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.value)
    }
}

impl<T> std::fmt::Display for TypedId<T>
where
    T: TypedIdTag,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}({})", T::NAME, self.value)
    }
}

impl<T> From<u64> for TypedId<T> {
    fn from(value: u64) -> Self {
        Self::new(value)
    }
}

impl<T> From<TypedId<T>> for u64 {
    fn from(id: TypedId<T>) -> Self {
        id.value
    }
}

/// A tag type for pallet identifiers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct PalletIdTag;

impl TypedIdTag for PalletIdTag {
    const NAME: &'static str = "PalletId";
}

/// The immutable identity of a pallet record.
pub type PalletId = TypedId<PalletIdTag>;

/// A tag type for order identifiers.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct OrderIdTag;

impl TypedIdTag for OrderIdTag {
    const NAME: &'static str = "OrderId";
}

/// The identity of a shipment order.
pub type OrderId = TypedId<OrderIdTag>;

/// The position of a pallet inside a `PalletLedger`.
///
/// Ledger indices are only meaningful for the ledger that handed them out.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PalletIndex(usize);

impl PalletIndex {
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl std::fmt::Debug for PalletIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PalletIndex({})", self.0)
    }
}

impl std::fmt::Display for PalletIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PalletIndex({})", self.0)
    }
}

/// A zero-based lane index.
///
/// Lane `LaneIndex::new(0)` is the first lane of the vehicle, written as
/// "Lane 1" on every report.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LaneIndex(usize);

impl LaneIndex {
    #[inline(always)]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the zero-based index.
    #[inline(always)]
    pub const fn get(&self) -> usize {
        self.0
    }

    /// Returns the one-based lane number used in raw records.
    #[inline(always)]
    pub const fn number(&self) -> usize {
        self.0 + 1
    }
}

impl std::fmt::Debug for LaneIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "LaneIndex({})", self.0)
    }
}

impl std::fmt::Display for LaneIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lane {}", self.number())
    }
}

/// The lane column of a pallet record.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum LaneAssignment {
    /// The pallet is not placed in any lane (raw value `0`).
    #[default]
    Unassigned,
    /// The pallet occupies the given lane.
    Lane(LaneIndex),
}

impl LaneAssignment {
    /// Converts a raw lane column value, where `0` is unassigned and
    /// `1..=num_lanes` are the lanes.
    ///
    /// # Errors
    ///
    /// Returns `LaneError::OutOfRange` if `raw > num_lanes`.
    pub fn from_raw(raw: u8, num_lanes: usize) -> Result<Self, LaneError> {
        match raw as usize {
            0 => Ok(Self::Unassigned),
            n if n <= num_lanes => Ok(Self::Lane(LaneIndex::new(n - 1))),
            _ => Err(LaneError::OutOfRange { raw, num_lanes }),
        }
    }

    /// Returns the raw lane column value.
    #[inline]
    pub fn raw(&self) -> usize {
        match self {
            Self::Unassigned => 0,
            Self::Lane(lane) => lane.number(),
        }
    }

    /// Returns the lane, if any.
    #[inline]
    pub fn lane(&self) -> Option<LaneIndex> {
        match self {
            Self::Unassigned => None,
            Self::Lane(lane) => Some(*lane),
        }
    }

    #[inline]
    pub fn is_assigned(&self) -> bool {
        matches!(self, Self::Lane(_))
    }
}

impl From<LaneIndex> for LaneAssignment {
    fn from(lane: LaneIndex) -> Self {
        Self::Lane(lane)
    }
}

impl std::fmt::Display for LaneAssignment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unassigned => write!(f, "Unassigned"),
            Self::Lane(lane) => write!(f, "{}", lane),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_id_display_uses_tag_name() {
        let id = PalletId::new(7);
        assert_eq!(format!("{}", id), "PalletId(7)");
        assert_eq!(format!("{:?}", OrderId::new(3)), "OrderId(3)");
    }

    #[test]
    fn test_typed_id_conversions() {
        let id: PalletId = 42.into();
        assert_eq!(id.get(), 42);
        let raw: u64 = id.into();
        assert_eq!(raw, 42);
    }

    #[test]
    fn test_lane_index_is_displayed_one_based() {
        let lane = LaneIndex::new(0);
        assert_eq!(lane.number(), 1);
        assert_eq!(format!("{}", lane), "Lane 1");
    }

    #[test]
    fn test_lane_assignment_from_raw() {
        assert_eq!(
            LaneAssignment::from_raw(0, 3).unwrap(),
            LaneAssignment::Unassigned
        );
        assert_eq!(
            LaneAssignment::from_raw(3, 3).unwrap(),
            LaneAssignment::Lane(LaneIndex::new(2))
        );
        assert_eq!(
            LaneAssignment::from_raw(4, 3),
            Err(LaneError::OutOfRange {
                raw: 4,
                num_lanes: 3
            })
        );
    }

    #[test]
    fn test_lane_assignment_raw_round_trip() {
        for raw in 0..=3u8 {
            let lane = LaneAssignment::from_raw(raw, 3).unwrap();
            assert_eq!(lane.raw(), raw as usize);
        }
        assert!(!LaneAssignment::Unassigned.is_assigned());
        assert_eq!(LaneAssignment::Unassigned.lane(), None);
    }
}
