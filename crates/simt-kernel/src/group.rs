//! Execution group state
//!
//! A group is simulated in lockstep: every instruction reads the operands of
//! all active lanes before any lane writes its result. Registers (one per
//! lane) and the staging buffer are checked out of the launch's scratch pool
//! when the group starts and returned when it completes, so no two groups
//! ever share a staging buffer.

use std::ops::{Add, AddAssign};

use simt_core::{Element, Result, ScratchGuard, ScratchPool};

use crate::device::DeviceSlice;
use crate::lane::LaneGroup;
use crate::load::LoadWidth;
use crate::op::ReduceOp;

/// Synchronisation performed by one group
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStats {
    /// Full group barriers
    pub barriers: usize,
    /// Lane-group synchronisations
    pub lane_syncs: usize,
    /// Shared-memory halving rounds
    pub tree_rounds: usize,
    /// Register shuffle rounds
    pub shuffle_rounds: usize,
}

impl Add for GroupStats {
    type Output = GroupStats;

    fn add(self, other: GroupStats) -> GroupStats {
        GroupStats {
            barriers: self.barriers + other.barriers,
            lane_syncs: self.lane_syncs + other.lane_syncs,
            tree_rounds: self.tree_rounds + other.tree_rounds,
            shuffle_rounds: self.shuffle_rounds + other.shuffle_rounds,
        }
    }
}

impl AddAssign for GroupStats {
    fn add_assign(&mut self, other: GroupStats) {
        *self = *self + other;
    }
}

/// Registers, staging buffer and counters of one running group
pub struct GroupContext<'p, T: Element> {
    group_index: usize,
    lane_width: usize,
    registers: ScratchGuard<'p, T>,
    shared: ScratchGuard<'p, T>,
    stats: GroupStats,
}

impl<'p, T: Element> GroupContext<'p, T> {
    /// Start group `group_index` with `group_size` lanes
    ///
    /// `lane_width` is clamped to the group size.
    pub fn new(
        pool: &'p ScratchPool<T>,
        group_index: usize,
        group_size: usize,
        lane_width: usize,
    ) -> Result<Self> {
        let registers = pool.checkout(group_size)?;
        let shared = pool.checkout(group_size)?;
        Ok(Self {
            group_index,
            lane_width: lane_width.min(group_size),
            registers,
            shared,
            stats: GroupStats::default(),
        })
    }

    #[inline]
    pub fn group_index(&self) -> usize {
        self.group_index
    }

    #[inline]
    pub fn group_size(&self) -> usize {
        self.registers.len()
    }

    #[inline]
    pub fn lane_width(&self) -> usize {
        self.lane_width
    }

    /// Global thread index of local lane `local`
    #[inline]
    pub fn global_thread(&self, local: usize) -> usize {
        self.group_index * self.group_size() + local
    }

    #[inline]
    pub fn registers(&self) -> &[T] {
        &self.registers
    }

    #[inline]
    pub fn registers_mut(&mut self) -> &mut [T] {
        &mut self.registers
    }

    /// The staging buffer
    #[inline]
    pub fn shared(&self) -> &[T] {
        &self.shared
    }

    #[inline]
    pub fn stats(&self) -> GroupStats {
        self.stats
    }

    /// Every lane loads its register through the boundary guard
    pub fn load<O: ReduceOp<T>>(&mut self, input: &DeviceSlice<'_, T>, width: LoadWidth, op: &O) {
        let base = self.group_index * self.registers.len();
        for (local, register) in self.registers.iter_mut().enumerate() {
            *register = width.load(input, base + local, op);
        }
    }

    /// Every lane writes its register to its own staging slot
    ///
    /// Must be followed by [`sync_threads`](Self::sync_threads) before any
    /// lane reads another lane's slot.
    pub fn store_registers(&mut self) {
        self.shared.copy_from_slice(&self.registers);
    }

    /// Full group barrier
    #[inline]
    pub fn sync_threads(&mut self) {
        self.stats.barriers += 1;
    }

    /// Lane-group synchronisation
    #[inline]
    pub fn sync_lanes(&mut self) {
        self.stats.lane_syncs += 1;
    }

    /// One halving round: lanes below `offset` combine `s[l + offset]` into `s[l]`
    ///
    /// The written half and the read half are disjoint, so no lane can
    /// observe a slot another lane wrote this round.
    pub fn shared_step<O: ReduceOp<T>>(&mut self, offset: usize, op: &O) {
        debug_assert!(offset > 0 && 2 * offset <= self.shared.len());
        let (low, high) = self.shared.split_at_mut(offset);
        for (dst, &src) in low.iter_mut().zip(&high[..offset]) {
            *dst = op.combine(*dst, src);
        }
        self.stats.tree_rounds += 1;
    }

    /// Halve the staged values from `active` slots down to `floor`
    ///
    /// A barrier follows every round.
    pub fn tree_until<O: ReduceOp<T>>(&mut self, active: usize, floor: usize, op: &O) -> usize {
        let mut active = active;
        while active > floor.max(1) {
            active /= 2;
            self.shared_step(active, op);
            self.sync_threads();
        }
        active
    }

    /// Lanes `0..lane_width` reload the first `active` staged values
    ///
    /// Lanes at or past `active` take the neutral element.
    pub fn reload_lanes<O: ReduceOp<T>>(&mut self, active: usize, op: &O) {
        let width = self.lane_width;
        for (lane, register) in self.registers[..width].iter_mut().enumerate() {
            *register = if lane < active {
                self.shared[lane]
            } else {
                op.identity()
            };
        }
    }

    /// Lane-group `warp` of the registers finishes by XOR shuffle
    ///
    /// Returns the value its lane 0 ends up holding.
    pub fn shuffle_reduce<O: ReduceOp<T>>(&mut self, warp: usize, op: &O) -> T {
        let width = self.lane_width;
        let lanes = &mut self.registers[warp * width..(warp + 1) * width];
        let mut group = LaneGroup::new(lanes);
        let value = group.reduce(op);
        self.stats.shuffle_rounds += group.rounds();
        value
    }

    /// Every lane-group shuffles its own registers, then lane 0 of each
    /// publishes the lane-group's partial to staging slot `warp`
    ///
    /// Lane-groups run concurrently, so the shuffle rounds are counted once.
    /// Returns the number of staged partials.
    pub fn shuffle_each_lane_group<O: ReduceOp<T>>(&mut self, op: &O) -> usize {
        let width = self.lane_width;
        let mut rounds = 0;
        for (warp, lanes) in self.registers.chunks_exact_mut(width).enumerate() {
            let mut group = LaneGroup::new(lanes);
            self.shared[warp] = group.reduce(op);
            rounds = group.rounds();
        }
        self.stats.shuffle_rounds += rounds;
        self.registers.len() / width
    }

    /// Release the group's scratch and report its synchronisation
    pub fn finish(self) -> GroupStats {
        self.stats
    }
}
