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

use std::time::Duration;

/// Statistics collected while an engine operation runs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EngineStatistics {
    /// Pallets placed into a lane by the main pass.
    pub pallets_placed: u64,
    /// Groups placed whole into a single lane.
    pub groups_whole: u64,
    /// Groups that had to be split across lanes.
    pub groups_split: u64,
    /// Pallets that fit nowhere and went to the least loaded lane anyway.
    pub overflow_placements: u64,
    /// Pallets moved out of an overloaded lane by the rebalance pass.
    pub rebalance_moves: u64,
    pub time_total: Duration,
}

impl EngineStatistics {
    #[inline]
    pub fn on_pallet_placed(&mut self) {
        self.pallets_placed = self.pallets_placed.saturating_add(1);
    }

    #[inline]
    pub fn on_group_whole(&mut self) {
        self.groups_whole = self.groups_whole.saturating_add(1);
    }

    #[inline]
    pub fn on_group_split(&mut self) {
        self.groups_split = self.groups_split.saturating_add(1);
    }

    #[inline]
    pub fn on_overflow(&mut self) {
        self.overflow_placements = self.overflow_placements.saturating_add(1);
    }

    #[inline]
    pub fn on_rebalance_move(&mut self) {
        self.rebalance_moves = self.rebalance_moves.saturating_add(1);
    }

    #[inline]
    pub fn set_total_time(&mut self, duration: Duration) {
        self.time_total = duration;
    }
}

impl std::fmt::Display for EngineStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Stowage Engine Statistics:")?;
        writeln!(f, "  Pallets placed:       {}", self.pallets_placed)?;
        writeln!(f, "  Groups (whole):       {}", self.groups_whole)?;
        writeln!(f, "  Groups (split):       {}", self.groups_split)?;
        writeln!(f, "  Overflow placements:  {}", self.overflow_placements)?;
        writeln!(f, "  Rebalance moves:      {}", self.rebalance_moves)?;
        writeln!(f, "  Total time:           {:.2?}", self.time_total)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_and_display_cover_every_counter() {
        let mut stats = EngineStatistics::default();
        stats.on_pallet_placed();
        stats.on_pallet_placed();
        stats.on_group_whole();
        stats.on_group_split();
        stats.on_overflow();
        stats.on_rebalance_move();
        stats.set_total_time(Duration::from_millis(3));

        assert_eq!(stats.pallets_placed, 2);
        assert_eq!((stats.groups_whole, stats.groups_split), (1, 1));
        assert_eq!(stats.overflow_placements, 1);
        assert_eq!(stats.rebalance_moves, 1);

        let text = stats.to_string();
        assert_eq!(text.lines().count(), 7);
        assert!(text.contains("Pallets placed:       2"));
        assert!(text.contains("Rebalance moves:      1"));
    }
}
