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

//! Read-only summaries of an order for the loading sheet and the loading dock.
//!
//! Both summaries only look at pallets that are assigned to a lane; pallets
//! still waiting for a lane are not going onto the vehicle yet.

use crate::{decimal::round_to, ledger::PalletLedger, pallet::Pallet};
use rustc_hash::FxHashMap;
use serde::Serialize;

/// Counts of one group on the loading sheet.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GroupSummary {
    pub group_code: String,
    pub count: usize,
    pub total_weight: f64,
    /// Pallet counts by length label (`"1.2m"`), labels in first-seen order.
    pub lengths: Vec<(String, usize)>,
}

impl GroupSummary {
    fn new(group_code: &str) -> Self {
        Self {
            group_code: group_code.to_owned(),
            count: 0,
            total_weight: 0.0,
            lengths: Vec::new(),
        }
    }

    fn record(&mut self, pallet: &Pallet) {
        self.count += 1;
        self.total_weight += pallet.weight();

        let label = length_label(pallet.length());
        match self.lengths.iter_mut().find(|(l, _)| *l == label) {
            Some((_, n)) => *n += 1,
            None => self.lengths.push((label, 1)),
        }
    }
}

/// Summarizes the assigned pallets of `ledger` per group, in first-seen order.
pub fn group_summaries(ledger: &PalletLedger) -> Vec<GroupSummary> {
    collect_by_group(ledger, GroupSummary::new, GroupSummary::record)
}

/// Loading progress of a set of pallets.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct LoadingProgress {
    pub total: usize,
    pub loaded: usize,
    /// `loaded / total` in percent, rounded to one decimal; `0.0` when empty.
    pub percentage: f64,
}

impl LoadingProgress {
    pub fn new(total: usize, loaded: usize) -> Self {
        let percentage = if total > 0 {
            round1(loaded as f64 / total as f64 * 100.0)
        } else {
            0.0
        };
        Self {
            total,
            loaded,
            percentage,
        }
    }

    #[inline]
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.loaded == self.total
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LoadingStatus {
    /// Progress per group code, groups in first-seen order.
    pub groups: Vec<(String, LoadingProgress)>,
    pub overall: LoadingProgress,
}

impl LoadingStatus {
    pub fn of(ledger: &PalletLedger) -> Self {
        let counts = collect_by_group(
            ledger,
            |code| (code.to_owned(), 0usize, 0usize),
            |(_, total, loaded): &mut (String, usize, usize), pallet| {
                *total += 1;
                if pallet.is_loaded() {
                    *loaded += 1;
                }
            },
        );

        let (total, loaded) = counts
            .iter()
            .fold((0, 0), |(t, l), (_, total, loaded)| (t + total, l + loaded));
        let groups = counts
            .into_iter()
            .map(|(code, total, loaded)| (code, LoadingProgress::new(total, loaded)))
            .collect();

        Self {
            groups,
            overall: LoadingProgress::new(total, loaded),
        }
    }

    /// Progress of one group, if it has assigned pallets.
    pub fn group(&self, group_code: &str) -> Option<&LoadingProgress> {
        self.groups
            .iter()
            .find(|(code, _)| code == group_code)
            .map(|(_, progress)| progress)
    }
}

fn collect_by_group<T>(
    ledger: &PalletLedger,
    mut init: impl FnMut(&str) -> T,
    mut record: impl FnMut(&mut T, &Pallet),
) -> Vec<T> {
    let mut slots: FxHashMap<&str, usize> = FxHashMap::default();
    let mut out = Vec::new();

    for index in ledger.ordered() {
        let pallet = ledger.get(index);
        if !pallet.lane().is_assigned() {
            continue;
        }
        let slot = *slots.entry(pallet.group_code()).or_insert_with(|| {
            out.push(init(pallet.group_code()));
            out.len() - 1
        });
        record(&mut out[slot], pallet);
    }

    out
}

#[inline]
fn length_label(length: f64) -> String {
    format!("{:.1}m", length)
}

#[inline]
fn round1(value: f64) -> f64 {
    round_to(value, 1)
}
