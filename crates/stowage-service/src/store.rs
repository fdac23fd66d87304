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

//! The storage capability the service runs against.
//!
//! A store owns pallet records and order terms. The service only ever reads
//! whole orders and writes back batches of `PalletUpdate`s; a batch is applied
//! completely or not at all.

use crate::error::StoreError;
use stowage_model::{
    index::{LaneAssignment, OrderId, PalletId},
    pallet::{Pallet, PalletUpdate},
    terms::OrderTerms,
};

pub trait PalletStore: Send + Sync {
    /// Returns the terms of `order_id`.
    fn order_terms(&self, order_id: OrderId) -> Result<OrderTerms, StoreError>;

    /// Returns every pallet of `order_id`, in no particular order.
    fn fetch_pallets(&self, order_id: OrderId) -> Result<Vec<Pallet>, StoreError>;

    /// Returns the pallets of `order_id` in `lane`, ordered by `(sequence, id)`.
    fn fetch_lane(&self, order_id: OrderId, lane: LaneAssignment) -> Result<Vec<Pallet>, StoreError> {
        let mut pallets: Vec<Pallet> = self
            .fetch_pallets(order_id)?
            .into_iter()
            .filter(|p| p.lane() == lane)
            .collect();
        pallets.sort_by_key(|p| (p.sequence(), p.id()));
        Ok(pallets)
    }

    /// Looks up a single pallet.
    fn find_pallet(&self, pallet_id: PalletId) -> Result<Option<Pallet>, StoreError>;

    /// Applies `updates` to pallets of `order_id` atomically.
    ///
    /// # Errors
    ///
    /// On error no update has been applied.
    fn commit(&self, order_id: OrderId, updates: &[PalletUpdate]) -> Result<(), StoreError>;
}

impl<S> PalletStore for &S
where
    S: PalletStore + ?Sized,
{
    fn order_terms(&self, order_id: OrderId) -> Result<OrderTerms, StoreError> {
        (**self).order_terms(order_id)
    }

    fn fetch_pallets(&self, order_id: OrderId) -> Result<Vec<Pallet>, StoreError> {
        (**self).fetch_pallets(order_id)
    }

    fn fetch_lane(&self, order_id: OrderId, lane: LaneAssignment) -> Result<Vec<Pallet>, StoreError> {
        (**self).fetch_lane(order_id, lane)
    }

    fn find_pallet(&self, pallet_id: PalletId) -> Result<Option<Pallet>, StoreError> {
        (**self).find_pallet(pallet_id)
    }

    fn commit(&self, order_id: OrderId, updates: &[PalletUpdate]) -> Result<(), StoreError> {
        (**self).commit(order_id, updates)
    }
}
