//! Cross-group combine
//!
//! Groups cannot synchronise with each other, so each group hands its partial
//! to a [`PartialSink`] exactly once, from local lane 0. The default sink
//! merges it into a single [`GlobalAccumulator`] with one atomic
//! read-modify-write; [`PartialsBuffer`] instead records every partial and
//! folds them on the host after all groups finished.

use log::trace;
use serde::{Deserialize, Serialize};
use simt_core::{AtomicElement, Element};

use crate::op::ReduceOp;

/// How group partials are merged into the final value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalCombine {
    /// One atomic combine per group into the shared accumulator
    #[default]
    Atomic,
    /// One slot per group, folded single-threaded after the launch
    Partials,
}

/// The single result cell shared by all groups
///
/// Every mutation goes through an indivisible read-modify-write; there is no
/// plain load-modify-store path.
#[derive(Debug)]
pub struct GlobalAccumulator<T: Element> {
    cell: T::Atomic,
}

impl<T: Element> GlobalAccumulator<T> {
    /// Accumulator pre-set to `initial`
    pub fn new(initial: T) -> Self {
        Self {
            cell: <T::Atomic as AtomicElement<T>>::from_value(initial),
        }
    }

    /// Accumulator pre-set to the identity of `op`
    pub fn for_op<O: ReduceOp<T>>(op: &O) -> Self {
        Self::new(op.identity())
    }

    /// Overwrite the value; only valid while no group is running
    pub fn reset(&self, value: T) {
        self.cell.store_value(value);
    }

    /// Current value
    pub fn load(&self) -> T {
        self.cell.load_value()
    }

    /// Atomically replace the value `v` with `op.combine(v, value)`
    ///
    /// Returns the value observed before the update.
    pub fn combine<O: ReduceOp<T>>(&self, op: &O, value: T) -> T {
        self.cell.fetch_combine(|current| op.combine(current, value))
    }
}

/// Destination of each group's partial result
pub trait PartialSink<T: Element>: Sync {
    /// Called exactly once per group, by its lane 0
    fn contribute(&self, group: usize, partial: T);
}

/// Merges every partial into a [`GlobalAccumulator`] with one atomic combine
#[derive(Debug)]
pub struct AtomicSink<'a, T: Element, O> {
    accumulator: &'a GlobalAccumulator<T>,
    op: O,
}

impl<'a, T: Element, O: ReduceOp<T>> AtomicSink<'a, T, O> {
    pub fn new(accumulator: &'a GlobalAccumulator<T>, op: O) -> Self {
        Self { accumulator, op }
    }
}

impl<'a, T: Element, O: ReduceOp<T>> PartialSink<T> for AtomicSink<'a, T, O> {
    fn contribute(&self, group: usize, partial: T) {
        let previous = self.accumulator.combine(&self.op, partial);
        trace!("group {group} combined {partial} into accumulator (was {previous})");
    }
}

/// One result slot per group, folded after the launch
///
/// For operators or element types without a usable atomic combine.
#[derive(Debug)]
pub struct PartialsBuffer<T: Element> {
    slots: Vec<T::Atomic>,
}

impl<T: Element> PartialsBuffer<T> {
    /// `group_count` slots, each pre-set to `fill`
    pub fn new(group_count: usize, fill: T) -> Self {
        Self {
            slots: (0..group_count)
                .map(|_| <T::Atomic as AtomicElement<T>>::from_value(fill))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Snapshot of every group's partial, by group index
    pub fn partials(&self) -> Vec<T> {
        self.slots.iter().map(|slot| slot.load_value()).collect()
    }

    /// Fold all partials in group order
    pub fn finalize<O: ReduceOp<T>>(&self, op: &O) -> T {
        self.slots
            .iter()
            .fold(op.identity(), |acc, slot| op.combine(acc, slot.load_value()))
    }
}

impl<T: Element> PartialSink<T> for PartialsBuffer<T> {
    fn contribute(&self, group: usize, partial: T) {
        match self.slots.get(group) {
            Some(slot) => slot.store_value(partial),
            None => debug_assert!(false, "group {group} has no partial slot"),
        }
    }
}
