//! Intra-group reduction strategies
//!
//! All strategies reduce the `group_size` loaded registers of one group to a
//! single value and differ only in how they synchronise:
//!
//! | Strategy           | Shared-memory rounds        | Final rounds          |
//! |--------------------|-----------------------------|-----------------------|
//! | `SharedTree`       | all, barrier after each     | -                     |
//! | `LaneSynchronized` | while active > lane width   | shared, lane-synced   |
//! | `RegisterShuffle`  | while active > lane width   | XOR shuffle           |
//! | `WarpShuffle`      | over lane-group partials    | XOR shuffle           |
//! | `SequentialFold`   | none                        | left fold, no barrier |

use serde::{Deserialize, Serialize};
use simt_core::Element;

use crate::group::GroupContext;
use crate::op::ReduceOp;

/// How a group combines its threads' values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockStrategy {
    /// Halving tree in shared memory with a full barrier after every round
    ///
    /// Portable fallback for targets without lane-group primitives.
    SharedTree,
    /// Full barriers until one lane-group remains, then lane-synchronised
    /// shared-memory rounds
    LaneSynchronized,
    /// Full barriers until one lane-group remains, then register shuffles
    #[default]
    RegisterShuffle,
    /// Every lane-group shuffles first; the per-lane-group partials are then
    /// staged and reduced behind a single barrier
    WarpShuffle,
    /// The group collapses to a sequential fold over its registers
    ///
    /// For task-based execution where a group has no real concurrency and
    /// barriers are meaningless.
    SequentialFold,
}

impl BlockStrategy {
    /// All strategies, in declaration order
    pub const ALL: [BlockStrategy; 5] = [
        BlockStrategy::SharedTree,
        BlockStrategy::LaneSynchronized,
        BlockStrategy::RegisterShuffle,
        BlockStrategy::WarpShuffle,
        BlockStrategy::SequentialFold,
    ];

    /// True if the strategy needs a lane-group exchange primitive
    pub fn uses_shuffle(self) -> bool {
        matches!(self, BlockStrategy::RegisterShuffle | BlockStrategy::WarpShuffle)
    }
}

/// Reduce a group's loaded registers to the group's partial result
///
/// Expects every lane's register to have been loaded. On return lane 0 (or
/// staging slot 0 for the shared-memory strategies) holds the result.
pub fn block_reduce<T: Element, O: ReduceOp<T>>(
    ctx: &mut GroupContext<'_, T>,
    strategy: BlockStrategy,
    op: &O,
) -> T {
    match strategy {
        BlockStrategy::SharedTree => shared_tree(ctx, op),
        BlockStrategy::LaneSynchronized => lane_synchronized(ctx, op),
        BlockStrategy::RegisterShuffle => register_shuffle(ctx, op),
        BlockStrategy::WarpShuffle => warp_shuffle(ctx, op),
        BlockStrategy::SequentialFold => sequential_fold(ctx, op),
    }
}

fn shared_tree<T: Element, O: ReduceOp<T>>(ctx: &mut GroupContext<'_, T>, op: &O) -> T {
    ctx.store_registers();
    ctx.sync_threads();
    ctx.tree_until(ctx.group_size(), 1, op);
    ctx.shared()[0]
}

fn lane_synchronized<T: Element, O: ReduceOp<T>>(ctx: &mut GroupContext<'_, T>, op: &O) -> T {
    ctx.store_registers();
    ctx.sync_threads();

    // Rounds at offset <= lane width touch only the first lane-group.
    let mut active = ctx.tree_until(ctx.group_size(), 2 * ctx.lane_width(), op);
    while active > 1 {
        active /= 2;
        ctx.shared_step(active, op);
        ctx.sync_lanes();
    }
    ctx.shared()[0]
}

fn register_shuffle<T: Element, O: ReduceOp<T>>(ctx: &mut GroupContext<'_, T>, op: &O) -> T {
    let width = ctx.lane_width();
    if ctx.group_size() == width {
        return ctx.shuffle_reduce(0, op);
    }

    ctx.store_registers();
    ctx.sync_threads();
    let active = ctx.tree_until(ctx.group_size(), width, op);
    ctx.reload_lanes(active, op);
    ctx.shuffle_reduce(0, op)
}

fn warp_shuffle<T: Element, O: ReduceOp<T>>(ctx: &mut GroupContext<'_, T>, op: &O) -> T {
    let width = ctx.lane_width();
    let warps = ctx.group_size() / width;
    if warps == 1 {
        return ctx.shuffle_reduce(0, op);
    }

    ctx.shuffle_each_lane_group(op);
    ctx.sync_threads();

    let active = ctx.tree_until(warps, width, op);
    ctx.reload_lanes(active, op);
    ctx.shuffle_reduce(0, op)
}

fn sequential_fold<T: Element, O: ReduceOp<T>>(ctx: &mut GroupContext<'_, T>, op: &O) -> T {
    ctx.registers()
        .iter()
        .fold(op.identity(), |acc, &x| op.combine(acc, x))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::DeviceSlice;
    use crate::group::GroupStats;
    use crate::load::LoadWidth;
    use crate::op::{Max, Min, Sum};
    use simt_core::ScratchPool;

    fn run<O: ReduceOp<f64>>(
        data: &[f64],
        group_size: usize,
        lane_width: usize,
        strategy: BlockStrategy,
        op: O,
    ) -> (f64, GroupStats) {
        let pool = ScratchPool::new(4);
        let mut ctx = GroupContext::new(&pool, 0, group_size, lane_width).unwrap();
        ctx.load(&DeviceSlice::from(data), LoadWidth::Scalar, &op);
        let value = block_reduce(&mut ctx, strategy, &op);
        (value, ctx.finish())
    }

    #[test]
    fn test_four_element_tree_takes_two_rounds() {
        let (value, stats) = run(&[1.0, 2.0, 3.0, 4.0], 4, 32, BlockStrategy::SharedTree, Sum);
        assert_eq!(value, 10.0);
        assert_eq!(stats.tree_rounds, 2);
        assert_eq!(stats.barriers, 3);
    }

    #[test]
    fn test_all_strategies_agree() {
        let data: Vec<f64> = (0..256).map(|i| (i as f64) * 0.25 - 20.0).collect();
        let expected_sum: f64 = data.iter().sum();
        for strategy in BlockStrategy::ALL {
            for lane_width in [1, 4, 32, 64] {
                let (sum, _) = run(&data, 256, lane_width, strategy, Sum);
                assert_eq!(sum, expected_sum, "{strategy:?} lane_width {lane_width}");
                let (max, _) = run(&data, 256, lane_width, strategy, Max);
                assert_eq!(max, 43.75, "{strategy:?} lane_width {lane_width}");
                let (min, _) = run(&data, 256, lane_width, strategy, Min);
                assert_eq!(min, -20.0, "{strategy:?} lane_width {lane_width}");
            }
        }
    }

    #[test]
    fn test_partial_group_excludes_missing_lanes() {
        // 5 valid elements in a 16-lane group
        let data = [-3.0, -1.0, -4.0, -1.0, -5.0];
        for strategy in BlockStrategy::ALL {
            assert_eq!(run(&data, 16, 4, strategy, Sum).0, -14.0, "{strategy:?}");
            assert_eq!(run(&data, 16, 4, strategy, Max).0, -1.0, "{strategy:?}");
        }
    }

    #[test]
    fn test_synchronisation_counts() {
        let data = vec![1.0; 256];

        let (_, shared) = run(&data, 256, 32, BlockStrategy::SharedTree, Sum);
        assert_eq!(shared.barriers, 9);
        assert_eq!(shared.tree_rounds, 8);

        let (_, lane_synced) = run(&data, 256, 32, BlockStrategy::LaneSynchronized, Sum);
        assert_eq!(lane_synced.barriers, 3);
        assert_eq!(lane_synced.lane_syncs, 6);
        assert_eq!(lane_synced.tree_rounds, 8);

        let (_, shuffle) = run(&data, 256, 32, BlockStrategy::RegisterShuffle, Sum);
        assert_eq!(shuffle.barriers, 4);
        assert_eq!(shuffle.tree_rounds, 3);
        assert_eq!(shuffle.shuffle_rounds, 5);

        let (_, warp) = run(&data, 256, 32, BlockStrategy::WarpShuffle, Sum);
        assert_eq!(warp.barriers, 1);
        assert_eq!(warp.tree_rounds, 0);
        assert_eq!(warp.shuffle_rounds, 10);

        let (_, fold) = run(&data, 256, 32, BlockStrategy::SequentialFold, Sum);
        assert_eq!(fold, GroupStats::default());
    }

    #[test]
    fn test_single_lane_group_needs_no_barrier() {
        let data = [1.0; 32];
        let (value, stats) = run(&data, 32, 32, BlockStrategy::RegisterShuffle, Sum);
        assert_eq!(value, 32.0);
        assert_eq!(stats.barriers, 0);
        assert_eq!(stats.shuffle_rounds, 5);
    }

    #[test]
    fn test_warp_partials_wider_than_lane_group() {
        // 1024 lanes of width 8 leave 128 partials, more than one lane-group.
        let data = vec![0.5; 1024];
        let (value, stats) = run(&data, 1024, 8, BlockStrategy::WarpShuffle, Sum);
        assert_eq!(value, 512.0);
        assert_eq!(stats.tree_rounds, 4);
        assert_eq!(stats.shuffle_rounds, 6);
    }

    #[test]
    fn test_strategy_serde() {
        let json = serde_json::to_string(&BlockStrategy::LaneSynchronized).unwrap();
        assert_eq!(json, "\"lane_synchronized\"");
        assert!(BlockStrategy::WarpShuffle.uses_shuffle());
        assert!(!BlockStrategy::SharedTree.uses_shuffle());
    }
}
