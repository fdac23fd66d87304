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

//! # Position Manager
//!
//! Moves a single pallet to an ordinal position inside a lane without touching
//! the relative order of any other pallet. Only the moved pallet gets a new
//! ordering key (its `sequence`), computed from its future neighbours:
//!
//! | Position          | Key                                               |
//! |-------------------|---------------------------------------------------|
//! | `0` (first)       | one below the first key of the lane               |
//! | `-1` (last)       | one above the last key of the lane                |
//! | `1..=N`           | midpoint of the neighbours, rounded down          |
//! | `> N`             | as last                                           |
//! | empty lane        | `1`                                               |
//!
//! Keys stay unique within the order. A front or back key that is already
//! held by a pallet in another lane keeps stepping outwards. A midpoint that
//! is taken falls back to the nearest free key strictly between the
//! neighbours. When the neighbours are adjacent integers there is no such key;
//! the order is then renumbered to `(rank + 1) * step` in key order, which
//! keeps every relative order, and the key is computed once more.

use crate::{error::EngineError, journal::ChangeJournal, monitor::engine_monitor::EngineMonitor};
use rustc_hash::FxHashSet;
use stowage_model::{
    index::{LaneAssignment, PalletId, PalletIndex},
    ledger::PalletLedger,
};

/// A target position inside a lane.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Position {
    First,
    Last,
    /// One-based ordinal among the other pallets of the lane.
    At(usize),
}

impl Position {
    /// Converts the raw position of a move request.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidPosition` for values below `-1`.
    pub fn from_raw(raw: i64) -> Result<Self, EngineError> {
        match raw {
            0 => Ok(Self::First),
            -1 => Ok(Self::Last),
            n if n > 0 => usize::try_from(n)
                .map(Self::At)
                .map_err(|_| EngineError::InvalidPosition(raw)),
            _ => Err(EngineError::InvalidPosition(raw)),
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Position::First => write!(f, "First"),
            Position::Last => write!(f, "Last"),
            Position::At(n) => write!(f, "At({})", n),
        }
    }
}

/// The result of a manual move.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MoveOutcome {
    pub pallet_id: PalletId,
    pub old_lane: LaneAssignment,
    pub new_lane: LaneAssignment,
    /// The new ordering key of the pallet.
    pub sequence: i64,
    /// Whether the keys of the order had to be renumbered to make room.
    pub renumbered: bool,
}

impl std::fmt::Display for MoveOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MoveOutcome({}, {} -> {}, seq: {}{})",
            self.pallet_id,
            self.old_lane,
            self.new_lane,
            self.sequence,
            if self.renumbered { ", renumbered" } else { "" }
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionManager {
    renumber_step: i64,
}

impl Default for PositionManager {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl PositionManager {
    /// Creates a manager that spaces keys `renumber_step` apart when renumbering.
    ///
    /// # Panics
    ///
    /// Panics if `renumber_step < 2`; a smaller step leaves no room between keys.
    #[inline]
    pub fn new(renumber_step: i64) -> Self {
        assert!(
            renumber_step >= 2,
            "called `PositionManager::new` with renumber step {}: the step must be at least 2",
            renumber_step
        );
        Self { renumber_step }
    }

    #[inline]
    pub fn renumber_step(&self) -> i64 {
        self.renumber_step
    }

    /// Moves `pallet_id` into raw lane `lane` (`0` = unassigned) at raw `position`.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::InvalidLane` or `EngineError::InvalidPosition` for
    /// bad arguments and `EngineError::PalletNotFound` if the pallet is not in
    /// `ledger`. Nothing is changed on error.
    pub fn move_pallet<M>(
        &self,
        ledger: &mut PalletLedger,
        pallet_id: PalletId,
        lane: u8,
        position: i64,
        journal: &mut ChangeJournal,
        monitor: &mut M,
    ) -> Result<MoveOutcome, EngineError>
    where
        M: EngineMonitor + ?Sized,
    {
        let target = LaneAssignment::from_raw(lane, ledger.num_lanes())?;
        let position = Position::from_raw(position)?;
        let index = ledger
            .index_of(pallet_id)
            .ok_or(EngineError::PalletNotFound(pallet_id))?;

        Ok(self.move_to(ledger, index, target, position, journal, monitor))
    }

    /// Moves the pallet at `index` into `target` at `position`.
    pub fn move_to<M>(
        &self,
        ledger: &mut PalletLedger,
        index: PalletIndex,
        target: LaneAssignment,
        position: Position,
        journal: &mut ChangeJournal,
        monitor: &mut M,
    ) -> MoveOutcome
    where
        M: EngineMonitor + ?Sized,
    {
        let mut renumbered = false;
        let sequence = match LaneKeys::collect(ledger, index, target).propose(position) {
            Some(key) => key,
            None => {
                self.renumber(ledger, journal, monitor);
                renumbered = true;
                let keys = LaneKeys::collect(ledger, index, target);
                let key = keys.propose(position);
                debug_assert!(
                    key.is_some(),
                    "called `PositionManager::move_to` and found no free key after renumbering with step {}",
                    self.renumber_step
                );
                key.unwrap_or_else(|| keys.back())
            }
        };

        journal.set_sequence(ledger, index, sequence);
        let old_lane = journal.set_lane(ledger, index, target);

        let outcome = MoveOutcome {
            pallet_id: ledger.get(index).id(),
            old_lane,
            new_lane: target,
            sequence,
            renumbered,
        };
        monitor.on_moved(ledger.get(index), &outcome);
        outcome
    }

    /// Rewrites every key of the order to `(rank + 1) * step`, keeping key order.
    pub fn renumber<M>(&self, ledger: &mut PalletLedger, journal: &mut ChangeJournal, monitor: &mut M)
    where
        M: EngineMonitor + ?Sized,
    {
        let order = ledger.ordered();
        for (rank, &index) in order.iter().enumerate() {
            let key = (rank as i64 + 1).saturating_mul(self.renumber_step);
            journal.set_sequence(ledger, index, key);
        }
        monitor.on_renumber(ledger.order_id(), self.renumber_step, order.len());
    }
}

/// The keys around a pallet that is about to enter a lane.
struct LaneKeys {
    /// Keys of the other pallets of the target lane, ascending.
    keys: Vec<i64>,
    /// Keys held by every other pallet of the order.
    taken: FxHashSet<i64>,
}

impl LaneKeys {
    fn collect(ledger: &PalletLedger, index: PalletIndex, target: LaneAssignment) -> Self {
        let keys = ledger
            .lane_members(target)
            .into_iter()
            .filter(|&i| i != index)
            .map(|i| ledger.get(i).sequence())
            .collect();
        Self {
            keys,
            taken: ledger.sequences_except(Some(index)),
        }
    }

    /// The key for `position`, or `None` if the neighbours leave no free key between them.
    fn propose(&self, position: Position) -> Option<i64> {
        let Some(&first) = self.keys.first() else {
            return Some(step_up(&self.taken, 1));
        };

        match position {
            Position::First | Position::At(0) | Position::At(1) => {
                Some(step_down(&self.taken, first.saturating_sub(1)))
            }
            Position::Last => Some(self.back()),
            Position::At(n) if n > self.keys.len() => Some(self.back()),
            Position::At(n) => between(&self.taken, self.keys[n - 2], self.keys[n - 1]),
        }
    }

    /// The first free key behind the lane.
    fn back(&self) -> i64 {
        match self.keys.last() {
            Some(&last) => step_up(&self.taken, last.saturating_add(1)),
            None => step_up(&self.taken, 1),
        }
    }
}

#[inline]
fn step_up(taken: &FxHashSet<i64>, mut key: i64) -> i64 {
    while taken.contains(&key) {
        key = key.saturating_add(1);
    }
    key
}

#[inline]
fn step_down(taken: &FxHashSet<i64>, mut key: i64) -> i64 {
    while taken.contains(&key) {
        key = key.saturating_sub(1);
    }
    key
}

/// The free key strictly between `prev` and `next` closest to their midpoint.
fn between(taken: &FxHashSet<i64>, prev: i64, next: i64) -> Option<i64> {
    debug_assert!(
        prev < next,
        "called `between` with unordered neighbours: prev is {} but next is {}",
        prev,
        next
    );

    let mut mid = prev + (next - prev).div_euclid(2);
    if mid == prev {
        mid = prev + 1;
    }
    if mid >= next {
        return None;
    }

    let mut offset = 0;
    loop {
        let below = mid - offset;
        let above = mid + offset;
        let below_open = below > prev;
        let above_open = above < next;
        if !below_open && !above_open {
            return None;
        }
        if below_open && !taken.contains(&below) {
            return Some(below);
        }
        if above_open && !taken.contains(&above) {
            return Some(above);
        }
        offset += 1;
    }
}
