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

//! Change journal for ledger mutations.
//!
//! Every engine operation mutates a `PalletLedger` exclusively through a
//! `ChangeJournal`. The journal applies the change and pushes the previous
//! value onto a LIFO stack, which gives two things:
//!
//! - `rollback` walks the stack backwards and restores the ledger to the state
//!   it had before the first recorded change,
//! - `updates` folds the stack into the net per-pallet changes, which is the
//!   batch a store commits atomically. Pallets whose fields ended up where
//!   they started are left out.
//!
//! Recording a change that does not change anything is a no-op, so a pass
//! that re-derives most of an assignment produces a short journal.

use rustc_hash::FxHashMap;
use stowage_model::{
    index::{LaneAssignment, PalletIndex},
    ledger::PalletLedger,
    pallet::PalletUpdate,
};

/// One reversible change, holding the value before the change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalEntry {
    Lane { index: PalletIndex, old: LaneAssignment },
    Sequence { index: PalletIndex, old: i64 },
    Loaded { index: PalletIndex, old: bool },
}

impl JournalEntry {
    #[inline]
    pub fn index(&self) -> PalletIndex {
        match *self {
            Self::Lane { index, .. } | Self::Sequence { index, .. } | Self::Loaded { index, .. } => {
                index
            }
        }
    }
}

impl std::fmt::Display for JournalEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Lane { index, old } => write!(f, "Lane({}, was {})", index, old),
            Self::Sequence { index, old } => write!(f, "Sequence({}, was {})", index, old),
            Self::Loaded { index, old } => write!(f, "Loaded({}, was {})", index, old),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangeJournal {
    entries: Vec<JournalEntry>, // LIFO stack of applied changes
}

impl ChangeJournal {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a journal sized for a ledger of `num_pallets` pallets.
    ///
    /// A full reassignment records up to two lane changes per pallet.
    #[inline]
    pub fn preallocated(num_pallets: usize) -> Self {
        Self {
            entries: Vec::with_capacity(num_pallets.saturating_mul(2).max(16)),
        }
    }

    #[inline]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Places the pallet at `index` into `lane` and returns its previous lane.
    #[inline]
    pub fn set_lane(
        &mut self,
        ledger: &mut PalletLedger,
        index: PalletIndex,
        lane: LaneAssignment,
    ) -> LaneAssignment {
        let old = ledger.get(index).lane();
        if old != lane {
            ledger.set_lane(index, lane);
            self.entries.push(JournalEntry::Lane { index, old });
        }
        old
    }

    /// Rewrites the sequence of the pallet at `index` and returns the previous one.
    #[inline]
    pub fn set_sequence(&mut self, ledger: &mut PalletLedger, index: PalletIndex, sequence: i64) -> i64 {
        let old = ledger.get(index).sequence();
        if old != sequence {
            ledger.set_sequence(index, sequence);
            self.entries.push(JournalEntry::Sequence { index, old });
        }
        old
    }

    /// Sets the loaded flag of the pallet at `index` and returns the previous value.
    #[inline]
    pub fn set_loaded(&mut self, ledger: &mut PalletLedger, index: PalletIndex, loaded: bool) -> bool {
        let old = ledger.get(index).is_loaded();
        if old != loaded {
            ledger.set_loaded(index, loaded);
            self.entries.push(JournalEntry::Loaded { index, old });
        }
        old
    }

    /// Restores every recorded change in reverse order and empties the journal.
    pub fn rollback(&mut self, ledger: &mut PalletLedger) {
        while let Some(entry) = self.entries.pop() {
            match entry {
                JournalEntry::Lane { index, old } => {
                    ledger.set_lane(index, old);
                }
                JournalEntry::Sequence { index, old } => {
                    ledger.set_sequence(index, old);
                }
                JournalEntry::Loaded { index, old } => {
                    ledger.set_loaded(index, old);
                }
            }
        }
    }

    /// The net changes of the journal, one update per changed pallet in ledger order.
    pub fn updates(&self, ledger: &PalletLedger) -> Vec<PalletUpdate> {
        // Walking backwards leaves the oldest recorded value in every slot.
        let mut original: FxHashMap<PalletIndex, PalletUpdate> = FxHashMap::default();
        for entry in self.entries.iter().rev() {
            let index = entry.index();
            let slot = original
                .entry(index)
                .or_insert_with(|| PalletUpdate::of(ledger.get(index)));
            match *entry {
                JournalEntry::Lane { old, .. } => slot.lane = old,
                JournalEntry::Sequence { old, .. } => slot.sequence = old,
                JournalEntry::Loaded { old, .. } => slot.loaded = old,
            }
        }

        let mut updates: Vec<(PalletIndex, PalletUpdate)> = original
            .into_iter()
            .filter_map(|(index, before)| {
                let after = PalletUpdate::of(ledger.get(index));
                (after != before).then_some((index, after))
            })
            .collect();
        updates.sort_unstable_by_key(|&(index, _)| index);
        updates.into_iter().map(|(_, update)| update).collect()
    }
}

impl<'a> IntoIterator for &'a ChangeJournal {
    type Item = &'a JournalEntry;
    type IntoIter = std::slice::Iter<'a, JournalEntry>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_model::{
        index::{LaneIndex, OrderId, PalletId},
        pallet::Pallet,
    };

    fn ledger() -> PalletLedger {
        let pallets = (1..=3).map(|i| {
            Pallet::new(PalletId::new(i), OrderId::new(1), "A", 1.0, 0.0, i as i64).unwrap()
        });
        PalletLedger::from_pallets(OrderId::new(1), 3, pallets).unwrap()
    }

    fn lane(i: usize) -> LaneAssignment {
        LaneAssignment::Lane(LaneIndex::new(i))
    }

    fn pi(i: usize) -> PalletIndex {
        PalletIndex::new(i)
    }

    #[test]
    fn test_unchanged_values_are_not_recorded() {
        let mut l = ledger();
        let mut journal = ChangeJournal::new();
        journal.set_lane(&mut l, pi(0), LaneAssignment::Unassigned);
        journal.set_sequence(&mut l, pi(0), 1);
        journal.set_loaded(&mut l, pi(0), false);
        assert!(journal.is_empty());
    }

    #[test]
    fn test_rollback_restores_original_state() {
        let mut l = ledger();
        let before = l.clone();
        let mut journal = ChangeJournal::preallocated(l.len());

        journal.set_lane(&mut l, pi(0), lane(0));
        journal.set_lane(&mut l, pi(0), lane(2));
        journal.set_sequence(&mut l, pi(1), 10);
        journal.set_loaded(&mut l, pi(2), true);
        assert_eq!(journal.len(), 4);

        journal.rollback(&mut l);
        assert!(journal.is_empty());
        assert_eq!(l, before);
    }

    #[test]
    fn test_updates_are_net_changes() {
        let mut l = ledger();
        let mut journal = ChangeJournal::new();

        // Pallet 1 moves away and back: no net change.
        journal.set_lane(&mut l, pi(0), lane(1));
        journal.set_lane(&mut l, pi(0), LaneAssignment::Unassigned);
        // Pallet 3 changes twice: one update with the final state.
        journal.set_lane(&mut l, pi(2), lane(0));
        journal.set_sequence(&mut l, pi(2), 7);
        journal.set_lane(&mut l, pi(2), lane(1));
        // Pallet 2 changes once.
        journal.set_loaded(&mut l, pi(1), true);

        let updates = journal.updates(&l);
        assert_eq!(
            updates,
            vec![
                PalletUpdate {
                    pallet_id: PalletId::new(2),
                    lane: LaneAssignment::Unassigned,
                    sequence: 2,
                    loaded: true,
                },
                PalletUpdate {
                    pallet_id: PalletId::new(3),
                    lane: lane(1),
                    sequence: 7,
                    loaded: false,
                },
            ]
        );
    }

    #[test]
    fn test_iterates_entries_in_recording_order() {
        let mut l = ledger();
        let mut journal = ChangeJournal::new();
        journal.set_lane(&mut l, pi(1), lane(0));
        journal.set_sequence(&mut l, pi(1), 5);

        let entries: Vec<&JournalEntry> = (&journal).into_iter().collect();
        assert_eq!(
            *entries[0],
            JournalEntry::Lane {
                index: pi(1),
                old: LaneAssignment::Unassigned
            }
        );
        assert_eq!(entries[1].index(), pi(1));
    }
}
