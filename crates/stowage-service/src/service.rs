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

//! # Loading Service
//!
//! The order-scoped entry point of the engine. Every mutating operation runs
//! one cycle under the order's lock:
//!
//! 1. fetch the order's terms and pallets from the store into a `PalletLedger`,
//! 2. run the engine against the ledger, recording changes in a `ChangeJournal`,
//! 3. commit the journal's net updates in a single atomic `PalletStore::commit`.
//!
//! Any error before or during the commit leaves the store untouched.

use crate::{
    error::ServiceError,
    lock::OrderLocks,
    store::PalletStore,
};
use stowage_engine::{
    assign::AutoAssigner,
    journal::ChangeJournal,
    monitor::log::LogMonitor,
    optimize::SequenceOptimizer,
    position::{MoveOutcome, Position, PositionManager},
    pricing::{PriceList, Quote},
    report::AssignmentReport,
};
use stowage_model::{
    index::{LaneAssignment, OrderId, PalletId},
    lane::LaneTotals,
    ledger::PalletLedger,
    pallet::Pallet,
    summary::{GroupSummary, LoadingStatus, group_summaries},
    terms::{EngineConfig, OrderTerms},
};
use tracing::{debug, info, warn};

#[derive(Debug)]
pub struct LoadingService<S> {
    store: S,
    config: EngineConfig,
    locks: OrderLocks,
    positions: PositionManager,
}

impl<S> LoadingService<S>
where
    S: PalletStore,
{
    /// Creates a service over `store`.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::Config` if `config` does not validate.
    pub fn new(store: S, config: EngineConfig) -> Result<Self, ServiceError> {
        config.validate()?;
        Ok(Self {
            store,
            positions: PositionManager::new(config.renumber_step),
            config,
            locks: OrderLocks::new(),
        })
    }

    #[inline]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[inline]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Reassigns every pallet of the order round-robin and rebalances.
    ///
    /// Lanes that stay over capacity are logged, not refused.
    pub fn auto_assign(&self, order_id: OrderId) -> Result<(), ServiceError> {
        let _guard = self.locks.lock(order_id);
        let (terms, mut ledger) = self.load(order_id)?;

        let mut journal = ChangeJournal::preallocated(ledger.len());
        let report = AutoAssigner::new(terms.capacity).assign(
            &mut ledger,
            &mut journal,
            &mut LogMonitor::new(),
        );
        self.commit(&ledger, &journal)?;
        log_report(order_id, &report);
        Ok(())
    }

    /// Places every pallet group by group and returns the final lane totals.
    pub fn optimize(&self, order_id: OrderId) -> Result<LaneTotals, ServiceError> {
        let _guard = self.locks.lock(order_id);
        let (terms, mut ledger) = self.load(order_id)?;

        let mut journal = ChangeJournal::preallocated(ledger.len());
        let report = SequenceOptimizer::new(terms.capacity).optimize(
            &mut ledger,
            &mut journal,
            &mut LogMonitor::new(),
        );
        self.commit(&ledger, &journal)?;
        log_report(order_id, &report);
        Ok(report.into_totals())
    }

    /// Moves one pallet into raw lane `lane` (`0` = unassigned) at raw `position`
    /// (`0` first, `-1` last, `n > 0` before the `n`-th pallet of the lane).
    ///
    /// # Errors
    ///
    /// `PalletNotFound` for an unknown pallet, `InvalidArgument` for a bad lane
    /// or position. Both are reported before anything changes.
    pub fn move_pallet(
        &self,
        pallet_id: PalletId,
        lane: u8,
        position: i64,
    ) -> Result<MoveOutcome, ServiceError> {
        LaneAssignment::from_raw(lane, self.config.num_lanes)?;
        Position::from_raw(position)?;

        let order_id = self.order_of(pallet_id)?;
        let _guard = self.locks.lock(order_id);
        // The ledger is fetched under the lock, so a pallet that changed orders
        // in between is reported as not found.
        let (_, mut ledger) = self.load(order_id)?;

        let mut journal = ChangeJournal::new();
        let outcome = self.positions.move_pallet(
            &mut ledger,
            pallet_id,
            lane,
            position,
            &mut journal,
            &mut LogMonitor::new(),
        )?;
        self.commit(&ledger, &journal)?;
        Ok(outcome)
    }

    /// Puts a pallet into raw lane `lane` without touching its ordering key.
    /// Returns the previous lane.
    pub fn assign_lane(&self, pallet_id: PalletId, lane: u8) -> Result<LaneAssignment, ServiceError> {
        let target = LaneAssignment::from_raw(lane, self.config.num_lanes)?;

        let order_id = self.order_of(pallet_id)?;
        let _guard = self.locks.lock(order_id);
        let (_, mut ledger) = self.load(order_id)?;
        let index = ledger
            .index_of(pallet_id)
            .ok_or(ServiceError::PalletNotFound(pallet_id))?;

        let mut journal = ChangeJournal::new();
        let old = journal.set_lane(&mut ledger, index, target);
        self.commit(&ledger, &journal)?;
        debug!(
            order = order_id.get(),
            pallet = pallet_id.get(),
            from = %old,
            to = %target,
            "lane assigned"
        );
        Ok(old)
    }

    /// Prices the order's current lane totals with the order's own terms.
    pub fn quote(&self, order_id: OrderId) -> Result<Quote, ServiceError> {
        let (terms, ledger) = self.load(order_id)?;
        self.price_ledger(&terms, &ledger)
    }

    /// Prices the order for closing it, refusing while a lane is over capacity.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::CapacityExceeded` for the first lane over capacity.
    pub fn close_out_check(&self, order_id: OrderId) -> Result<Quote, ServiceError> {
        let (terms, ledger) = self.load(order_id)?;
        let totals = ledger.lane_totals();

        if let Some(&lane) = totals.over_capacity(terms.capacity).first() {
            let total = totals.get(lane);
            warn!(
                order = order_id.get(),
                lane = lane.number(),
                total,
                capacity = terms.capacity,
                "order cannot be closed, lane over capacity"
            );
            return Err(ServiceError::CapacityExceeded {
                lane,
                total,
                capacity: terms.capacity,
            });
        }
        self.price_ledger(&terms, &ledger)
    }

    pub fn group_summary(&self, order_id: OrderId) -> Result<Vec<GroupSummary>, ServiceError> {
        let (_, ledger) = self.load(order_id)?;
        Ok(group_summaries(&ledger))
    }

    pub fn loading_status(&self, order_id: OrderId) -> Result<LoadingStatus, ServiceError> {
        let (_, ledger) = self.load(order_id)?;
        Ok(LoadingStatus::of(&ledger))
    }

    /// Sets the loaded flag of every pallet of `group_code` and returns the
    /// size of the group.
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::GroupNotFound` if the order has no pallet of the group.
    pub fn mark_group_loaded(
        &self,
        order_id: OrderId,
        group_code: &str,
        loaded: bool,
    ) -> Result<usize, ServiceError> {
        let _guard = self.locks.lock(order_id);
        let (_, mut ledger) = self.load(order_id)?;

        let members = ledger.group_members(group_code);
        if members.is_empty() {
            return Err(ServiceError::GroupNotFound {
                order: order_id,
                group: group_code.to_owned(),
            });
        }

        let mut journal = ChangeJournal::preallocated(members.len());
        for &index in &members {
            journal.set_loaded(&mut ledger, index, loaded);
        }
        self.commit(&ledger, &journal)?;
        debug!(
            order = order_id.get(),
            group = group_code,
            loaded,
            pallets = members.len(),
            "group loading flag set"
        );
        Ok(members.len())
    }

    /// Clears every loaded flag of the order and returns how many were set.
    pub fn reset_loaded(&self, order_id: OrderId) -> Result<usize, ServiceError> {
        let _guard = self.locks.lock(order_id);
        let (_, mut ledger) = self.load(order_id)?;

        let mut journal = ChangeJournal::new();
        for index in ledger.ordered() {
            journal.set_loaded(&mut ledger, index, false);
        }
        self.commit(&ledger, &journal)
    }

    /// The pallets of raw lane `lane` in loading order.
    pub fn lane_manifest(&self, order_id: OrderId, lane: u8) -> Result<Vec<Pallet>, ServiceError> {
        let lane = LaneAssignment::from_raw(lane, self.config.num_lanes)?;
        Ok(self.store.fetch_lane(order_id, lane)?)
    }

    fn order_of(&self, pallet_id: PalletId) -> Result<OrderId, ServiceError> {
        self.store
            .find_pallet(pallet_id)?
            .map(|pallet| pallet.order_id())
            .ok_or(ServiceError::PalletNotFound(pallet_id))
    }

    fn load(&self, order_id: OrderId) -> Result<(OrderTerms, PalletLedger), ServiceError> {
        let terms = self.store.order_terms(order_id)?;
        let pallets = self.store.fetch_pallets(order_id)?;
        let ledger = PalletLedger::from_pallets(order_id, self.config.num_lanes, pallets)?;
        Ok((terms, ledger))
    }

    /// Writes the journal's net changes back and returns how many pallets changed.
    fn commit(&self, ledger: &PalletLedger, journal: &ChangeJournal) -> Result<usize, ServiceError> {
        let updates = journal.updates(ledger);
        if updates.is_empty() {
            return Ok(0);
        }
        self.store.commit(ledger.order_id(), &updates)?;
        debug!(
            order = ledger.order_id().get(),
            updates = updates.len(),
            "changes committed"
        );
        Ok(updates.len())
    }

    fn price_ledger(&self, terms: &OrderTerms, ledger: &PalletLedger) -> Result<Quote, ServiceError> {
        let prices = PriceList::from_terms(terms, self.config.place_length)?;
        Ok(prices.quote(&ledger.lane_totals()))
    }
}

fn log_report(order_id: OrderId, report: &AssignmentReport) {
    if report.is_feasible() {
        info!(
            order = order_id.get(),
            operation = %report.operation(),
            totals = %report.totals(),
            "lanes committed"
        );
    } else {
        warn!(
            order = order_id.get(),
            operation = %report.operation(),
            totals = %report.totals(),
            over_capacity = report.over_capacity().len(),
            "lanes committed with lanes over capacity"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{error::StoreError, memory::InMemoryStore};
    use stowage_model::{
        index::LaneIndex,
        pallet::{PalletDraft, PalletUpdate},
    };

    fn service() -> LoadingService<InMemoryStore> {
        LoadingService::new(InMemoryStore::default(), EngineConfig::default()).unwrap()
    }

    fn draft(code: &str, length: f64) -> PalletDraft {
        PalletDraft::new(code, length, 250.0)
    }

    fn lane(raw: u8) -> LaneAssignment {
        LaneAssignment::from_raw(raw, 3).unwrap()
    }

    fn keys_of(service: &LoadingService<InMemoryStore>, order: OrderId, raw: u8) -> Vec<i64> {
        service
            .lane_manifest(order, raw)
            .unwrap()
            .iter()
            .map(Pallet::sequence)
            .collect()
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let config = EngineConfig {
            renumber_step: 1,
            ..EngineConfig::default()
        };
        let err = LoadingService::new(InMemoryStore::default(), config).unwrap_err();
        assert!(matches!(err, ServiceError::Config(_)));
    }

    #[test]
    fn test_auto_assign_then_quote_full_truck() {
        let service = service();
        let order = service.store().create_order();
        service
            .store()
            .ingest(order, vec![draft("A", 13.6), draft("B", 13.6), draft("C", 13.6)])
            .unwrap();

        service.auto_assign(order).unwrap();
        for raw in 1..=3 {
            assert_eq!(service.lane_manifest(order, raw).unwrap().len(), 1);
        }

        let quote = service.quote(order).unwrap();
        assert_eq!(quote.places, 34.0);
        assert_eq!(quote.price, 25600.0);
        assert!(quote.is_full);
        assert_eq!(service.close_out_check(order).unwrap(), quote);
    }

    #[test]
    fn test_optimize_keeps_groups_together() {
        let service = service();
        let order = service.store().create_order();
        service
            .store()
            .ingest(
                order,
                vec![
                    draft("A", 1.2),
                    draft("B", 2.4),
                    draft("A", 1.2),
                    draft("B", 2.4),
                    draft("C", 0.8),
                ],
            )
            .unwrap();

        let totals = service.optimize(order).unwrap();
        assert!((totals.sum() - 8.0).abs() < 1e-9);
        assert!(totals.is_within(13.6));

        let pallets = service.store().fetch_pallets(order).unwrap();
        assert!(pallets.iter().all(|p| p.lane().is_assigned()));
        for code in ["A", "B", "C"] {
            let lanes: Vec<LaneAssignment> = pallets
                .iter()
                .filter(|p| p.group_code() == code)
                .map(Pallet::lane)
                .collect();
            assert!(lanes.windows(2).all(|w| w[0] == w[1]), "group {} was split", code);
        }
    }

    #[test]
    fn test_over_capacity_is_committed_but_refused_at_close_out() {
        let service = service();
        let order = service.store().create_order();
        service
            .store()
            .ingest(order, (0..4).map(|i| draft(&format!("G{}", i), 13.6)))
            .unwrap();

        service.auto_assign(order).unwrap();
        let quote = service.quote(order).unwrap();
        assert!(quote.is_full);

        match service.close_out_check(order) {
            Err(ServiceError::CapacityExceeded {
                lane,
                total,
                capacity,
            }) => {
                assert_eq!(lane, LaneIndex::new(0));
                assert!((total - 27.2).abs() < 1e-9);
                assert_eq!(capacity, 13.6);
            }
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
    }

    #[test]
    fn test_move_to_front_takes_key_below_first() {
        let service = service();
        let order = service.store().create_order();
        let ids = service
            .store()
            .ingest(
                order,
                vec![
                    draft("A", 1.2).with_sequence(5),
                    draft("A", 1.2).with_sequence(6),
                    draft("A", 1.2).with_sequence(9),
                    draft("B", 1.2).with_sequence(20),
                ],
            )
            .unwrap();
        for &id in &ids[..3] {
            service.assign_lane(id, 2).unwrap();
        }

        let outcome = service.move_pallet(ids[3], 2, 0).unwrap();
        assert_eq!(outcome.pallet_id, ids[3]);
        assert_eq!(outcome.old_lane, LaneAssignment::Unassigned);
        assert_eq!(outcome.new_lane, lane(2));
        assert_eq!(outcome.sequence, 4);
        assert!(!outcome.renumbered);

        assert_eq!(keys_of(&service, order, 2), vec![4, 5, 6, 9]);
        let manifest: Vec<PalletId> = service
            .lane_manifest(order, 2)
            .unwrap()
            .iter()
            .map(Pallet::id)
            .collect();
        assert_eq!(manifest, vec![ids[3], ids[0], ids[1], ids[2]]);
    }

    #[test]
    fn test_move_between_neighbours_and_to_back() {
        let service = service();
        let order = service.store().create_order();
        let ids = service
            .store()
            .ingest(
                order,
                vec![
                    draft("A", 1.2).with_sequence(10),
                    draft("A", 1.2).with_sequence(20),
                    draft("B", 1.2).with_sequence(30),
                ],
            )
            .unwrap();
        service.assign_lane(ids[0], 1).unwrap();
        service.assign_lane(ids[1], 1).unwrap();

        let outcome = service.move_pallet(ids[2], 1, 2).unwrap();
        assert!(outcome.sequence > 10 && outcome.sequence < 20);

        let outcome = service.move_pallet(ids[0], 1, -1).unwrap();
        assert!(outcome.sequence > 20);
        let manifest: Vec<PalletId> = service
            .lane_manifest(order, 1)
            .unwrap()
            .iter()
            .map(Pallet::id)
            .collect();
        assert_eq!(manifest, vec![ids[2], ids[1], ids[0]]);
    }

    #[test]
    fn test_bad_arguments_change_nothing() {
        let service = service();
        let order = service.store().create_order();
        let ids = service.store().ingest(order, vec![draft("A", 1.2)]).unwrap();
        let before = service.store().fetch_pallets(order).unwrap();

        assert!(service.move_pallet(ids[0], 4, 0).unwrap_err().is_invalid_argument());
        assert!(service.move_pallet(ids[0], 1, -2).unwrap_err().is_invalid_argument());
        assert!(service.assign_lane(ids[0], 9).unwrap_err().is_invalid_argument());
        assert!(matches!(
            service.move_pallet(PalletId::new(999), 1, 0),
            Err(ServiceError::PalletNotFound(_))
        ));
        assert!(service.lane_manifest(order, 4).unwrap_err().is_invalid_argument());
        assert!(matches!(
            service.optimize(OrderId::new(999)),
            Err(ServiceError::OrderNotFound(_))
        ));

        assert_eq!(service.store().fetch_pallets(order).unwrap(), before);
    }

    #[test]
    fn test_group_loading_flow() {
        let service = service();
        let order = service.store().create_order();
        service
            .store()
            .ingest(
                order,
                vec![draft("A", 1.2), draft("A", 1.24), draft("B", 2.4), draft("C", 0.8)],
            )
            .unwrap();
        service.auto_assign(order).unwrap();

        assert_eq!(service.mark_group_loaded(order, "A", true).unwrap(), 2);
        let status = service.loading_status(order).unwrap();
        assert!(status.group("A").unwrap().is_complete());
        assert_eq!(status.overall.loaded, 2);
        assert_eq!(status.overall.total, 4);
        assert_eq!(status.overall.percentage, 50.0);

        let summary = service.group_summary(order).unwrap();
        let a = summary.iter().find(|s| s.group_code == "A").unwrap();
        assert_eq!(a.count, 2);
        assert_eq!(a.total_weight, 500.0);

        assert!(matches!(
            service.mark_group_loaded(order, "Z", true),
            Err(ServiceError::GroupNotFound { .. })
        ));

        assert_eq!(service.reset_loaded(order).unwrap(), 2);
        assert_eq!(service.loading_status(order).unwrap().overall.loaded, 0);
        assert_eq!(service.reset_loaded(order).unwrap(), 0);
    }

    #[test]
    fn test_orders_use_their_own_terms() {
        let service = service();
        let order = service.store().create_order();
        let long = service.config().alternative_terms();
        service.store().set_terms(order, long).unwrap();
        service
            .store()
            .ingest(order, vec![draft("A", 7.7), draft("A", 7.7)])
            .unwrap();

        // 15.4 m fits one lane of the long trailer.
        let totals = service.optimize(order).unwrap();
        assert_eq!(totals.max(), 15.4);
        assert!(service.close_out_check(order).is_ok());
    }

    /// Delegates to an in-memory store but refuses every commit.
    struct FailingStore(InMemoryStore);

    impl PalletStore for FailingStore {
        fn order_terms(&self, order_id: OrderId) -> Result<OrderTerms, StoreError> {
            self.0.order_terms(order_id)
        }

        fn fetch_pallets(&self, order_id: OrderId) -> Result<Vec<Pallet>, StoreError> {
            self.0.fetch_pallets(order_id)
        }

        fn find_pallet(&self, pallet_id: PalletId) -> Result<Option<Pallet>, StoreError> {
            self.0.find_pallet(pallet_id)
        }

        fn commit(&self, _: OrderId, _: &[PalletUpdate]) -> Result<(), StoreError> {
            Err(StoreError::Unavailable("connection reset".to_owned()))
        }
    }

    #[test]
    fn test_failed_commit_leaves_store_untouched() {
        let inner = InMemoryStore::default();
        let order = inner.create_order();
        let ids = inner
            .ingest(order, vec![draft("A", 5.0), draft("A", 5.0), draft("B", 5.0)])
            .unwrap();
        let service = LoadingService::new(FailingStore(inner), EngineConfig::default()).unwrap();
        let before = service.store().fetch_pallets(order).unwrap();

        for result in [
            service.auto_assign(order),
            service.optimize(order).map(|_| ()),
            service.move_pallet(ids[0], 1, 0).map(|_| ()),
            service.mark_group_loaded(order, "A", true).map(|_| ()),
        ] {
            assert!(matches!(
                result,
                Err(ServiceError::Store(StoreError::Unavailable(_)))
            ));
        }
        assert_eq!(service.store().fetch_pallets(order).unwrap(), before);
    }

    #[test]
    fn test_service_over_borrowed_store() {
        let store = InMemoryStore::default();
        let order = store.create_order();
        store.ingest(order, vec![draft("A", 2.0)]).unwrap();

        let service = LoadingService::new(&store, EngineConfig::default()).unwrap();
        service.auto_assign(order).unwrap();
        assert_eq!(store.fetch_lane(order, lane(1)).unwrap().len(), 1);
    }

    #[test]
    fn test_concurrent_moves_keep_keys_unique() {
        let service = service();
        let order = service.store().create_order();
        let ids = service
            .store()
            .ingest(order, (0..12).map(|i| draft(&format!("G{}", i % 4), 1.0)))
            .unwrap();
        service.auto_assign(order).unwrap();

        std::thread::scope(|s| {
            for (t, chunk) in ids.chunks(3).enumerate() {
                let service = &service;
                s.spawn(move || {
                    for round in 0..20u8 {
                        for (i, &id) in chunk.iter().enumerate() {
                            let raw = (t as u8 + round + i as u8) % 3 + 1;
                            let position = if round % 2 == 0 { 0 } else { -1 };
                            service.move_pallet(id, raw, position).unwrap();
                        }
                    }
                });
            }
        });

        let pallets = service.store().fetch_pallets(order).unwrap();
        assert_eq!(pallets.len(), 12);
        let mut keys: Vec<i64> = pallets.iter().map(Pallet::sequence).collect();
        keys.sort_unstable();
        keys.dedup();
        assert_eq!(keys.len(), 12);
        assert!(pallets.iter().all(|p| p.lane().is_assigned()));
    }

    #[test]
    fn test_lock_registry_is_empty_between_operations() {
        let service = service();
        let order = service.store().create_order();
        let ids = service
            .store()
            .ingest(order, vec![draft("A", 2.0), draft("B", 3.0)])
            .unwrap();

        service.auto_assign(order).unwrap();
        service.optimize(order).unwrap();
        service.move_pallet(ids[0], 2, -1).unwrap();
        service.assign_lane(ids[1], 0).unwrap();
        assert!(service.locks.is_empty());

        assert!(service.move_pallet(ids[0], 9, 0).is_err());
        assert!(service.optimize(OrderId::new(999)).is_err());
        assert!(service.locks.is_empty());
    }

    #[test]
    fn test_tracing_subscriber_sees_operations() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("stowage=debug"))
            .with_test_writer()
            .try_init();

        let service = service();
        let order = service.store().create_order();
        service
            .store()
            .ingest(order, vec![draft("A", 14.0)])
            .unwrap();
        service.optimize(order).unwrap();
        assert!(service.close_out_check(order).is_err());
    }
}
