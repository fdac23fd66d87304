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

//! Error types of the service layer.

use stowage_engine::{error::EngineError, pricing::PricingError};
use stowage_model::{
    error::{ConfigError, LaneError, LedgerError, PalletError},
    index::{LaneIndex, OrderId, PalletId},
};
use thiserror::Error;

/// Errors reported by a `PalletStore`.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0} not found")]
    OrderNotFound(OrderId),
    #[error("{0} not found")]
    PalletNotFound(PalletId),
    /// An update names a pallet of another order.
    #[error("{pallet} does not belong to {order}")]
    ForeignPallet { pallet: PalletId, order: OrderId },
    /// A commit would leave two pallets of the order with the same sequence.
    #[error("sequence {sequence} would be held twice in {order}")]
    DuplicateSequence { order: OrderId, sequence: i64 },
    /// Ingested sequences must keep increasing.
    #[error("sequence {sequence} does not follow sequence {previous} in {order}")]
    SequenceNotIncreasing {
        order: OrderId,
        previous: i64,
        sequence: i64,
    },
    #[error("{pallet} is assigned to lane {lane} but the vehicle has {num_lanes} lanes")]
    LaneOutOfRange {
        pallet: PalletId,
        lane: usize,
        num_lanes: usize,
    },
    #[error(transparent)]
    InvalidPallet(#[from] PalletError),
    #[error(transparent)]
    InvalidTerms(#[from] ConfigError),
    /// The backend could not serve the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors reported by the `LoadingService`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    OrderNotFound(OrderId),
    #[error("{0} not found")]
    PalletNotFound(PalletId),
    #[error("group `{group}` not found in {order}")]
    GroupNotFound { order: OrderId, group: String },
    /// A lane or position argument was rejected before anything changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(EngineError),
    /// The order cannot be closed while a lane exceeds its capacity.
    #[error("{lane} holds {total:.2} m but the capacity is {capacity:.2} m")]
    CapacityExceeded {
        lane: LaneIndex,
        total: f64,
        capacity: f64,
    },
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Store(StoreError),
}

impl ServiceError {
    #[inline]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::OrderNotFound(_) | Self::PalletNotFound(_) | Self::GroupNotFound { .. }
        )
    }

    #[inline]
    pub fn is_invalid_argument(&self) -> bool {
        matches!(self, Self::InvalidArgument(_))
    }
}

impl From<StoreError> for ServiceError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::OrderNotFound(order) => Self::OrderNotFound(order),
            StoreError::PalletNotFound(pallet) => Self::PalletNotFound(pallet),
            other => Self::Store(other),
        }
    }
}

impl From<EngineError> for ServiceError {
    fn from(error: EngineError) -> Self {
        match error {
            EngineError::PalletNotFound(pallet) => Self::PalletNotFound(pallet),
            other => Self::InvalidArgument(other),
        }
    }
}

impl From<LaneError> for ServiceError {
    fn from(error: LaneError) -> Self {
        Self::InvalidArgument(EngineError::InvalidLane(error))
    }
}
