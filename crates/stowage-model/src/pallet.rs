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

//! Pallet records.
//!
//! A `Pallet` is one freight unit of an order. Identity, order, group code,
//! length and weight are fixed once the record exists; lane, sequence and the
//! loaded flag are the fields the engine and the loading workflow rewrite.
//!
//! The sequence doubles as the ordering key inside a lane: it starts out as
//! the arrival sequence handed over at ingestion and is only changed by manual
//! repositioning (or by a renumbering, which keeps every relative order).

use crate::{
    error::PalletError,
    index::{LaneAssignment, OrderId, PalletId},
};

/// Lengths closer than this are considered equal when checking lane capacity.
pub const LENGTH_TOLERANCE: f64 = 1e-9;

#[derive(Clone, Debug, PartialEq)]
pub struct Pallet {
    id: PalletId,
    order_id: OrderId,
    group_code: String,
    length: f64,
    weight: f64,
    sequence: i64,
    lane: LaneAssignment,
    loaded: bool,
}

impl Pallet {
    /// Creates a new, unassigned and not loaded pallet.
    ///
    /// # Errors
    ///
    /// Returns `PalletError::InvalidLength` if `length` is not positive and finite,
    /// and `PalletError::InvalidWeight` if `weight` is negative or not finite.
    pub fn new(
        id: PalletId,
        order_id: OrderId,
        group_code: impl Into<String>,
        length: f64,
        weight: f64,
        sequence: i64,
    ) -> Result<Self, PalletError> {
        if !(length.is_finite() && length > 0.0) {
            return Err(PalletError::InvalidLength(length));
        }
        if !(weight.is_finite() && weight >= 0.0) {
            return Err(PalletError::InvalidWeight(weight));
        }

        Ok(Self {
            id,
            order_id,
            group_code: group_code.into(),
            length,
            weight,
            sequence,
            lane: LaneAssignment::Unassigned,
            loaded: false,
        })
    }

    /// Returns this pallet placed in `lane`.
    #[inline]
    pub fn with_lane(mut self, lane: LaneAssignment) -> Self {
        self.lane = lane;
        self
    }

    /// Returns this pallet with the loaded flag set to `loaded`.
    #[inline]
    pub fn with_loaded(mut self, loaded: bool) -> Self {
        self.loaded = loaded;
        self
    }

    #[inline]
    pub fn id(&self) -> PalletId {
        self.id
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    #[inline]
    pub fn group_code(&self) -> &str {
        &self.group_code
    }

    /// The length in meters.
    #[inline]
    pub fn length(&self) -> f64 {
        self.length
    }

    #[inline]
    pub fn weight(&self) -> f64 {
        self.weight
    }

    /// The arrival sequence / ordering key.
    #[inline]
    pub fn sequence(&self) -> i64 {
        self.sequence
    }

    #[inline]
    pub fn lane(&self) -> LaneAssignment {
        self.lane
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    #[inline]
    pub fn set_lane(&mut self, lane: LaneAssignment) {
        self.lane = lane;
    }

    #[inline]
    pub fn set_sequence(&mut self, sequence: i64) {
        self.sequence = sequence;
    }

    #[inline]
    pub fn set_loaded(&mut self, loaded: bool) {
        self.loaded = loaded;
    }

    /// Applies the mutable fields of `update` to this pallet.
    #[inline]
    pub fn apply(&mut self, update: &PalletUpdate) {
        debug_assert_eq!(
            update.pallet_id, self.id,
            "called `Pallet::apply` with an update for {} on {}",
            update.pallet_id, self.id
        );

        self.lane = update.lane;
        self.sequence = update.sequence;
        self.loaded = update.loaded;
    }
}

impl std::fmt::Display for Pallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Pallet({}, group: {}, length: {:.2} m, lane: {}, seq: {})",
            self.id.get(),
            self.group_code,
            self.length,
            self.lane,
            self.sequence
        )
    }
}

/// The final state of the mutable fields of one pallet after an operation.
///
/// A batch of updates is what a store commits atomically.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PalletUpdate {
    pub pallet_id: PalletId,
    pub lane: LaneAssignment,
    pub sequence: i64,
    pub loaded: bool,
}

impl PalletUpdate {
    /// Captures the mutable fields of `pallet`.
    #[inline]
    pub fn of(pallet: &Pallet) -> Self {
        Self {
            pallet_id: pallet.id(),
            lane: pallet.lane(),
            sequence: pallet.sequence(),
            loaded: pallet.is_loaded(),
        }
    }
}

/// A pallet as delivered by the ingestion collaborator, before it has an id.
#[derive(Clone, Debug, PartialEq)]
pub struct PalletDraft {
    pub group_code: String,
    pub length: f64,
    pub weight: f64,
    /// The arrival sequence. `None` lets the store append after the last one.
    pub sequence: Option<i64>,
}

impl PalletDraft {
    pub fn new(group_code: impl Into<String>, length: f64, weight: f64) -> Self {
        Self {
            group_code: group_code.into(),
            length,
            weight,
            sequence: None,
        }
    }

    pub fn with_sequence(mut self, sequence: i64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::LaneIndex;

    fn pallet(length: f64, weight: f64) -> Result<Pallet, PalletError> {
        Pallet::new(PalletId::new(1), OrderId::new(1), "LSA-1", length, weight, 1)
    }

    #[test]
    fn test_new_pallet_is_unassigned_and_not_loaded() {
        let p = pallet(1.2, 300.0).unwrap();
        assert_eq!(p.lane(), LaneAssignment::Unassigned);
        assert!(!p.is_loaded());
        assert_eq!(p.group_code(), "LSA-1");
        assert_eq!(p.length(), 1.2);
        assert_eq!(p.sequence(), 1);
    }

    #[test]
    fn test_rejects_invalid_length() {
        assert_eq!(pallet(0.0, 1.0), Err(PalletError::InvalidLength(0.0)));
        assert_eq!(pallet(-1.0, 1.0), Err(PalletError::InvalidLength(-1.0)));
        assert!(matches!(
            pallet(f64::NAN, 1.0),
            Err(PalletError::InvalidLength(_))
        ));
    }

    #[test]
    fn test_rejects_invalid_weight() {
        assert_eq!(pallet(1.0, -0.5), Err(PalletError::InvalidWeight(-0.5)));
        assert!(pallet(1.0, 0.0).is_ok());
    }

    #[test]
    fn test_apply_update_rewrites_mutable_fields_only() {
        let mut p = pallet(2.4, 10.0).unwrap();
        let update = PalletUpdate {
            pallet_id: p.id(),
            lane: LaneAssignment::Lane(LaneIndex::new(1)),
            sequence: 99,
            loaded: true,
        };
        p.apply(&update);

        assert_eq!(p.lane(), LaneAssignment::Lane(LaneIndex::new(1)));
        assert_eq!(p.sequence(), 99);
        assert!(p.is_loaded());
        assert_eq!(p.length(), 2.4);
        assert_eq!(PalletUpdate::of(&p), update);
    }

    #[test]
    fn test_display() {
        let p = pallet(1.2, 0.0)
            .unwrap()
            .with_lane(LaneAssignment::Lane(LaneIndex::new(0)));
        assert_eq!(
            format!("{}", p),
            "Pallet(1, group: LSA-1, length: 1.20 m, lane: Lane 1, seq: 1)"
        );
    }
}
