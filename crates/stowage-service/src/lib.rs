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

//! # Stowage Service
//!
//! **Order-scoped access to the lane allocation engine.**
//!
//! `LoadingService` turns engine passes into transactions against a
//! `PalletStore`: it locks the order, loads its pallets into a ledger, runs
//! the engine and commits the resulting updates in one atomic store call.
//!
//! ## Modules
//!
//! * **`store`**: the `PalletStore` capability.
//! * **`memory`**: `InMemoryStore`, a `PalletStore` backed by hash maps, with order creation and pallet ingestion.
//! * **`lock`**: `OrderLocks`, one mutex per order.
//! * **`service`**: `LoadingService`.
//! * **`error`**: `StoreError` and `ServiceError`.
//!
//! ## Usage
//!
//! ```rust
//! use stowage_model::{pallet::PalletDraft, terms::EngineConfig};
//! use stowage_service::{memory::InMemoryStore, service::LoadingService};
//!
//! let service = LoadingService::new(InMemoryStore::default(), EngineConfig::default()).unwrap();
//! let order = service.store().create_order();
//! service
//!     .store()
//!     .ingest(order, vec![PalletDraft::new("LSA-1", 1.2, 300.0); 4])
//!     .unwrap();
//!
//! let totals = service.optimize(order).unwrap();
//! assert!((totals.sum() - 4.8).abs() < 1e-9);
//! let quote = service.close_out_check(order).unwrap();
//! assert_eq!(quote.places, 4.0);
//! ```

pub mod error;
pub mod lock;
pub mod memory;
pub mod service;
pub mod store;
