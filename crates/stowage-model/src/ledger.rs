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

//! # Pallet Ledger
//!
//! The order-scoped collection every engine operation works on. A ledger
//! holds all pallets of exactly one order and guards the invariants the
//! engine relies on:
//!
//! - every pallet belongs to the ledger's order,
//! - pallet ids are unique,
//! - sequences (ordering keys) are unique within the order,
//! - lane assignments name lanes the vehicle actually has.
//!
//! Pallets are stored in insertion order and addressed by `PalletIndex`.
//! Rewriting a sequence never moves a pallet inside the ledger, so indices
//! stay valid for the whole lifetime of an operation. Ordered views
//! (`ordered`, `lane_members`, `groups`) sort by `(sequence, id)` on demand.

use crate::{
    error::LedgerError,
    index::{LaneAssignment, LaneIndex, OrderId, PalletId, PalletIndex},
    lane::LaneTotals,
    pallet::Pallet,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// The pallets of one group code, in sequence order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PalletGroup<'a> {
    code: &'a str,
    members: Vec<PalletIndex>,
}

impl<'a> PalletGroup<'a> {
    #[inline]
    pub fn code(&self) -> &'a str {
        self.code
    }

    #[inline]
    pub fn members(&self) -> &[PalletIndex] {
        &self.members
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct PalletLedger {
    order_id: OrderId,
    num_lanes: usize,
    pallets: Vec<Pallet>,
    by_id: FxHashMap<PalletId, PalletIndex>,
}

impl PalletLedger {
    /// Creates an empty ledger for `order_id` on a vehicle with `num_lanes` lanes.
    #[inline]
    pub fn new(order_id: OrderId, num_lanes: usize) -> Self {
        Self {
            order_id,
            num_lanes,
            pallets: Vec::new(),
            by_id: FxHashMap::default(),
        }
    }

    /// Builds a ledger from the pallets of one order.
    ///
    /// # Errors
    ///
    /// Fails on the first pallet that violates a ledger invariant.
    pub fn from_pallets<I>(order_id: OrderId, num_lanes: usize, pallets: I) -> Result<Self, LedgerError>
    where
        I: IntoIterator<Item = Pallet>,
    {
        let iter = pallets.into_iter();
        let mut ledger = Self::new(order_id, num_lanes);
        ledger.pallets.reserve(iter.size_hint().0);
        for pallet in iter {
            ledger.push(pallet)?;
        }
        Ok(ledger)
    }

    /// Adds a pallet to the ledger.
    ///
    /// # Errors
    ///
    /// Returns a `LedgerError` if the pallet belongs to another order, its id or
    /// sequence is already present, or its lane does not exist.
    pub fn push(&mut self, pallet: Pallet) -> Result<PalletIndex, LedgerError> {
        if pallet.order_id() != self.order_id {
            return Err(LedgerError::ForeignPallet {
                pallet: pallet.id(),
                expected: self.order_id,
                actual: pallet.order_id(),
            });
        }
        if self.by_id.contains_key(&pallet.id()) {
            return Err(LedgerError::DuplicatePallet(pallet.id()));
        }
        if self.is_sequence_taken(pallet.sequence(), None) {
            return Err(LedgerError::DuplicateSequence {
                pallet: pallet.id(),
                sequence: pallet.sequence(),
            });
        }
        if let Some(lane) = pallet.lane().lane()
            && lane.get() >= self.num_lanes
        {
            return Err(LedgerError::LaneOutOfRange {
                pallet: pallet.id(),
                lane: lane.number(),
                num_lanes: self.num_lanes,
            });
        }

        let index = PalletIndex::new(self.pallets.len());
        self.by_id.insert(pallet.id(), index);
        self.pallets.push(pallet);
        Ok(index)
    }

    #[inline]
    pub fn order_id(&self) -> OrderId {
        self.order_id
    }

    #[inline]
    pub fn num_lanes(&self) -> usize {
        self.num_lanes
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pallets.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pallets.is_empty()
    }

    /// Returns the pallet at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` was not handed out by this ledger.
    #[inline]
    pub fn get(&self, index: PalletIndex) -> &Pallet {
        debug_assert!(
            index.get() < self.len(),
            "called `PalletLedger::get` with pallet index out of bounds: the len is {} but the index is {}",
            self.len(),
            index.get()
        );

        &self.pallets[index.get()]
    }

    /// Looks up the ledger index of a pallet id.
    #[inline]
    pub fn index_of(&self, id: PalletId) -> Option<PalletIndex> {
        self.by_id.get(&id).copied()
    }

    /// Pallets in insertion order.
    #[inline]
    pub fn pallets(&self) -> &[Pallet] {
        &self.pallets
    }

    /// All ledger indices in `(sequence, id)` order.
    pub fn ordered(&self) -> Vec<PalletIndex> {
        let mut indices: Vec<PalletIndex> = (0..self.len()).map(PalletIndex::new).collect();
        self.sort_by_sequence(&mut indices);
        indices
    }

    /// The members of `lane` in `(sequence, id)` order.
    pub fn lane_members(&self, lane: LaneAssignment) -> Vec<PalletIndex> {
        let mut indices: Vec<PalletIndex> = self
            .pallets
            .iter()
            .enumerate()
            .filter(|(_, p)| p.lane() == lane)
            .map(|(i, _)| PalletIndex::new(i))
            .collect();
        self.sort_by_sequence(&mut indices);
        indices
    }

    /// Partitions the ledger by group code.
    ///
    /// Groups appear in the order their first member is met when walking the
    /// ledger in sequence order; members keep sequence order.
    pub fn groups(&self) -> Vec<PalletGroup<'_>> {
        let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
        let mut groups: Vec<PalletGroup<'_>> = Vec::new();

        for index in self.ordered() {
            let code = self.get(index).group_code();
            let slot = *slots.entry(code).or_insert_with(|| {
                groups.push(PalletGroup {
                    code,
                    members: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].members.push(index);
        }

        groups
    }

    /// The current total length per lane.
    pub fn lane_totals(&self) -> LaneTotals {
        let mut totals = LaneTotals::zeroed(self.num_lanes);
        for pallet in &self.pallets {
            if let Some(lane) = pallet.lane().lane() {
                totals.add(lane, pallet.length());
            }
        }
        totals
    }

    /// Total length of all pallets, assigned or not.
    #[inline]
    pub fn total_length(&self) -> f64 {
        self.pallets.iter().map(Pallet::length).sum()
    }

    #[inline]
    pub fn total_weight(&self) -> f64 {
        self.pallets.iter().map(Pallet::weight).sum()
    }

    /// Whether a pallet other than `except` holds `sequence`.
    pub fn is_sequence_taken(&self, sequence: i64, except: Option<PalletIndex>) -> bool {
        self.pallets
            .iter()
            .enumerate()
            .any(|(i, p)| p.sequence() == sequence && Some(PalletIndex::new(i)) != except)
    }

    /// All sequences held by pallets other than `except`.
    pub fn sequences_except(&self, except: Option<PalletIndex>) -> FxHashSet<i64> {
        self.pallets
            .iter()
            .enumerate()
            .filter(|&(i, _)| Some(PalletIndex::new(i)) != except)
            .map(|(_, p)| p.sequence())
            .collect()
    }

    /// One past the highest sequence in the ledger (`1` when empty).
    #[inline]
    pub fn next_sequence(&self) -> i64 {
        self.pallets
            .iter()
            .map(Pallet::sequence)
            .max()
            .map_or(1, |max| max.saturating_add(1))
    }

    /// Places the pallet at `index` into `lane` and returns the previous assignment.
    ///
    /// # Panics
    ///
    /// Panics if `lane` names a lane the vehicle does not have.
    #[inline]
    pub fn set_lane(&mut self, index: PalletIndex, lane: LaneAssignment) -> LaneAssignment {
        assert!(
            lane.lane().is_none_or(|l: LaneIndex| l.get() < self.num_lanes),
            "called `PalletLedger::set_lane` with {} on a vehicle with {} lanes",
            lane,
            self.num_lanes
        );

        let pallet = &mut self.pallets[index.get()];
        let old = pallet.lane();
        pallet.set_lane(lane);
        old
    }

    /// Rewrites the sequence of the pallet at `index` and returns the previous one.
    ///
    /// The caller is responsible for keeping sequences unique.
    #[inline]
    pub fn set_sequence(&mut self, index: PalletIndex, sequence: i64) -> i64 {
        let pallet = &mut self.pallets[index.get()];
        let old = pallet.sequence();
        pallet.set_sequence(sequence);
        old
    }

    /// Sets the loaded flag and returns the previous value.
    #[inline]
    pub fn set_loaded(&mut self, index: PalletIndex, loaded: bool) -> bool {
        let pallet = &mut self.pallets[index.get()];
        let old = pallet.is_loaded();
        pallet.set_loaded(loaded);
        old
    }

    /// Ledger indices of every pallet with `group_code`, in sequence order.
    pub fn group_members(&self, group_code: &str) -> Vec<PalletIndex> {
        let mut indices: Vec<PalletIndex> = self
            .pallets
            .iter()
            .enumerate()
            .filter(|(_, p)| p.group_code() == group_code)
            .map(|(i, _)| PalletIndex::new(i))
            .collect();
        self.sort_by_sequence(&mut indices);
        indices
    }

    #[inline]
    fn sort_by_sequence(&self, indices: &mut [PalletIndex]) {
        indices.sort_by_key(|&i| {
            let p = &self.pallets[i.get()];
            (p.sequence(), p.id())
        });
    }
}
