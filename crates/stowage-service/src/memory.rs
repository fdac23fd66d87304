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

//! An in-memory `PalletStore`.
//!
//! Orders and pallets live in hash maps behind a single `parking_lot::RwLock`.
//! Commits validate the whole batch against the current state before the
//! first record is written, which makes them atomic with respect to every
//! other reader and writer of the store.

use crate::{error::StoreError, store::PalletStore};
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use stowage_model::{
    index::{LaneAssignment, OrderId, PalletId},
    pallet::{Pallet, PalletDraft, PalletUpdate},
    terms::{EngineConfig, OrderTerms},
};

#[derive(Debug)]
struct OrderRecord {
    terms: OrderTerms,
    pallets: Vec<PalletId>,
}

#[derive(Debug, Default)]
struct Tables {
    orders: FxHashMap<OrderId, OrderRecord>,
    pallets: FxHashMap<PalletId, Pallet>,
    next_order: u64,
    next_pallet: u64,
}

impl Tables {
    fn order(&self, order_id: OrderId) -> Result<&OrderRecord, StoreError> {
        self.orders
            .get(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))
    }

    fn max_sequence(&self, record: &OrderRecord) -> Option<i64> {
        record
            .pallets
            .iter()
            .filter_map(|id| self.pallets.get(id))
            .map(Pallet::sequence)
            .max()
    }
}

#[derive(Debug)]
pub struct InMemoryStore {
    config: EngineConfig,
    tables: RwLock<Tables>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl InMemoryStore {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            tables: RwLock::new(Tables::default()),
        }
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Creates an order on a standard trailer.
    pub fn create_order(&self) -> OrderId {
        let terms = self.config.default_terms();
        self.insert_order(terms)
    }

    /// Creates an order with explicit terms.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::InvalidTerms` if the terms do not validate.
    pub fn create_order_with_terms(&self, terms: OrderTerms) -> Result<OrderId, StoreError> {
        terms.validate()?;
        Ok(self.insert_order(terms))
    }

    /// Replaces the terms of an existing order.
    pub fn set_terms(&self, order_id: OrderId, terms: OrderTerms) -> Result<(), StoreError> {
        terms.validate()?;
        let mut tables = self.tables.write();
        let record = tables
            .orders
            .get_mut(&order_id)
            .ok_or(StoreError::OrderNotFound(order_id))?;
        record.terms = terms;
        Ok(())
    }

    /// Adds freshly delivered pallets to an order, unassigned and not loaded.
    ///
    /// Drafts without a sequence are appended after the last one. Explicit
    /// sequences must keep increasing past every sequence already in the order.
    /// Either all drafts are ingested or none.
    pub fn ingest<I>(&self, order_id: OrderId, drafts: I) -> Result<Vec<PalletId>, StoreError>
    where
        I: IntoIterator<Item = PalletDraft>,
    {
        let mut tables = self.tables.write();
        let record = tables.order(order_id)?;
        let mut previous = tables.max_sequence(record).unwrap_or(0);
        let mut next_pallet = tables.next_pallet;

        let mut staged = Vec::new();
        for draft in drafts {
            let sequence = match draft.sequence {
                Some(sequence) if sequence <= previous => {
                    return Err(StoreError::SequenceNotIncreasing {
                        order: order_id,
                        previous,
                        sequence,
                    });
                }
                Some(sequence) => sequence,
                None => previous.saturating_add(1),
            };
            next_pallet += 1;
            let pallet = Pallet::new(
                PalletId::new(next_pallet),
                order_id,
                draft.group_code,
                draft.length,
                draft.weight,
                sequence,
            )?;
            previous = sequence;
            staged.push(pallet);
        }

        tables.next_pallet = next_pallet;
        let ids: Vec<PalletId> = staged.iter().map(Pallet::id).collect();
        if let Some(record) = tables.orders.get_mut(&order_id) {
            record.pallets.extend_from_slice(&ids);
        }
        for pallet in staged {
            tables.pallets.insert(pallet.id(), pallet);
        }
        Ok(ids)
    }

    /// Returns a copy of a single pallet record.
    pub fn pallet(&self, pallet_id: PalletId) -> Option<Pallet> {
        self.tables.read().pallets.get(&pallet_id).cloned()
    }

    fn insert_order(&self, terms: OrderTerms) -> OrderId {
        let mut tables = self.tables.write();
        tables.next_order += 1;
        let order_id = OrderId::new(tables.next_order);
        tables.orders.insert(
            order_id,
            OrderRecord {
                terms,
                pallets: Vec::new(),
            },
        );
        order_id
    }
}

impl PalletStore for InMemoryStore {
    fn order_terms(&self, order_id: OrderId) -> Result<OrderTerms, StoreError> {
        Ok(self.tables.read().order(order_id)?.terms)
    }

    fn fetch_pallets(&self, order_id: OrderId) -> Result<Vec<Pallet>, StoreError> {
        let tables = self.tables.read();
        let record = tables.order(order_id)?;
        Ok(record
            .pallets
            .iter()
            .filter_map(|id| tables.pallets.get(id).cloned())
            .collect())
    }

    fn find_pallet(&self, pallet_id: PalletId) -> Result<Option<Pallet>, StoreError> {
        Ok(self.pallet(pallet_id))
    }

    fn commit(&self, order_id: OrderId, updates: &[PalletUpdate]) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        let record = tables.order(order_id)?;
        let num_lanes = self.config.num_lanes;

        let mut staged: FxHashMap<PalletId, &PalletUpdate> = FxHashMap::default();
        for update in updates {
            let pallet = tables
                .pallets
                .get(&update.pallet_id)
                .ok_or(StoreError::PalletNotFound(update.pallet_id))?;
            if pallet.order_id() != order_id {
                return Err(StoreError::ForeignPallet {
                    pallet: update.pallet_id,
                    order: order_id,
                });
            }
            if let LaneAssignment::Lane(lane) = update.lane
                && lane.get() >= num_lanes
            {
                return Err(StoreError::LaneOutOfRange {
                    pallet: update.pallet_id,
                    lane: lane.number(),
                    num_lanes,
                });
            }
            staged.insert(update.pallet_id, update);
        }

        let mut sequences: FxHashSet<i64> = FxHashSet::default();
        for id in &record.pallets {
            let sequence = match staged.get(id) {
                Some(update) => update.sequence,
                None => match tables.pallets.get(id) {
                    Some(pallet) => pallet.sequence(),
                    None => continue,
                },
            };
            if !sequences.insert(sequence) {
                return Err(StoreError::DuplicateSequence {
                    order: order_id,
                    sequence,
                });
            }
        }

        for update in staged.into_values() {
            if let Some(pallet) = tables.pallets.get_mut(&update.pallet_id) {
                pallet.apply(update);
            }
        }
        Ok(())
    }
}
