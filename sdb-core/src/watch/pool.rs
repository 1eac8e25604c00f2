//! Fixed-capacity watchpoint pool
//!
//! Slots are allocated once. The free list is a stack whose top is the next
//! slot handed out, starting in ascending id order; the active list keeps
//! creation order.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::WatchError;
use crate::expr::{Evaluator, Word};

/// Slot index, fixed for the life of the pool
pub type WatchpointId = usize;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Watchpoint {
    pub id: WatchpointId,
    pub expr: String,
    /// Value seen at the last check
    pub value: Word,
    /// Number of reported changes
    pub hits: u64,
}

impl Watchpoint {
    fn empty(id: WatchpointId) -> Self {
        Self {
            id,
            expr: String::new(),
            value: 0,
            hits: 0,
        }
    }

    fn clear(&mut self) {
        self.expr.clear();
        self.value = 0;
        self.hits = 0;
    }
}

/// A value change observed on one watchpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct WatchpointChange {
    pub id: WatchpointId,
    pub expr: String,
    pub old: Word,
    pub new: Word,
}

impl fmt::Display for WatchpointChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Hardware watchpoint {}: {}", self.id, self.expr)?;
        writeln!(f, "Old value = {:#x}", self.old)?;
        write!(f, "New value = {:#x}", self.new)
    }
}

#[derive(Debug, Clone)]
pub struct WatchpointPool {
    slots: Vec<Watchpoint>,
    /// Free slot ids; the last element is the head
    free: Vec<WatchpointId>,
    /// Active slot ids in creation order
    active: Vec<WatchpointId>,
}

impl WatchpointPool {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(Watchpoint::empty).collect(),
            free: (0..capacity).rev().collect(),
            active: Vec::with_capacity(capacity),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of active watchpoints
    pub fn len(&self) -> usize {
        self.active.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active.is_empty()
    }

    pub fn free_count(&self) -> usize {
        self.free.len()
    }

    /// Take the free-list head and append it to the active list.
    ///
    /// Returns `None` when every slot is in use. The slot's value is cleared;
    /// the caller sets its expression with [`WatchpointPool::set_expression`].
    pub fn allocate(&mut self) -> Option<WatchpointId> {
        let id = self.free.pop()?;
        self.slots[id].clear();
        self.active.push(id);
        Some(id)
    }

    /// Store the expression and its current value on an active slot
    pub fn set_expression(
        &mut self,
        id: WatchpointId,
        expr: impl Into<String>,
        value: Word,
    ) -> Result<(), WatchError> {
        if !self.active.contains(&id) {
            return Err(WatchError::NotActive { id });
        }
        let slot = &mut self.slots[id];
        slot.expr = expr.into();
        slot.value = value;
        Ok(())
    }

    /// Evaluate `expr` and, if it is valid, store it in a new slot
    pub fn create(
        &mut self,
        expr: &str,
        evaluator: &Evaluator<'_>,
    ) -> Result<&Watchpoint, WatchError> {
        let value = evaluator
            .eval_str(expr)
            .map_err(|source| WatchError::InvalidExpression {
                expr: expr.to_string(),
                source,
            })?;
        let id = self.allocate().ok_or(WatchError::PoolExhausted {
            capacity: self.capacity(),
        })?;
        self.set_expression(id, expr, value)?;

        log::info!("added watchpoint {}: {} = {:#x}", id, expr, value);
        Ok(&self.slots[id])
    }

    /// Move an active slot back to the head of the free list
    pub fn release(&mut self, id: WatchpointId) -> Result<(), WatchError> {
        let position = self
            .active
            .iter()
            .position(|&a| a == id)
            .ok_or(WatchError::NotActive { id })?;
        self.active.remove(position);
        self.slots[id].clear();
        self.free.push(id);

        log::info!("deleted watchpoint {}", id);
        Ok(())
    }

    /// Active watchpoint by id
    pub fn get(&self, id: WatchpointId) -> Option<&Watchpoint> {
        self.active.contains(&id).then(|| &self.slots[id])
    }

    /// Active watchpoints in creation order
    pub fn iter(&self) -> impl Iterator<Item = &Watchpoint> + '_ {
        self.active.iter().map(move |&id| &self.slots[id])
    }

    /// Re-evaluate every active watchpoint in order and record new values.
    ///
    /// All expressions are evaluated before any value is stored, so a failure
    /// leaves the pool exactly as it was. An empty result means nothing changed.
    pub fn reevaluate_all(
        &mut self,
        evaluator: &Evaluator<'_>,
    ) -> Result<Vec<WatchpointChange>, WatchError> {
        let mut fresh = Vec::with_capacity(self.active.len());
        for wp in self.iter() {
            let value = evaluator
                .eval_str(&wp.expr)
                .map_err(|source| WatchError::Evaluation {
                    id: wp.id,
                    expr: wp.expr.clone(),
                    source,
                })?;
            fresh.push((wp.id, value));
        }

        let mut changes = Vec::new();
        for (id, value) in fresh {
            let slot = &mut self.slots[id];
            if slot.value == value {
                continue;
            }
            let change = WatchpointChange {
                id,
                expr: slot.expr.clone(),
                old: slot.value,
                new: value,
            };
            log::info!(
                "watchpoint {} ({}) changed: {:#x} -> {:#x}",
                id,
                change.expr,
                change.old,
                change.new
            );
            slot.value = value;
            slot.hits += 1;
            changes.push(change);
        }
        Ok(changes)
    }
}

impl Default for WatchpointPool {
    fn default() -> Self {
        Self::new(32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::EvalError;
    use crate::machine::MachineSnapshot;

    fn machine() -> MachineSnapshot {
        let mut m = MachineSnapshot::new();
        m.set_register("a0", 1);
        m.map(0x8000_0000, vec![0; 8]);
        m
    }

    fn ids(pool: &WatchpointPool) -> Vec<WatchpointId> {
        pool.iter().map(|wp| wp.id).collect()
    }

    #[test]
    fn test_allocate_in_ascending_order() {
        let mut pool = WatchpointPool::new(4);
        assert_eq!(pool.allocate(), Some(0));
        assert_eq!(pool.allocate(), Some(1));
        assert_eq!(pool.allocate(), Some(2));
        assert_eq!(ids(&pool), vec![0, 1, 2]);
        assert_eq!(pool.free_count(), 1);
    }

    #[test]
    fn test_capacity_exhausted() {
        let mut pool = WatchpointPool::default();
        for expected in 0..32 {
            assert_eq!(pool.allocate(), Some(expected));
        }
        assert_eq!(pool.allocate(), None);
        assert_eq!(pool.len(), 32);
    }

    #[test]
    fn test_release_reuses_id_first() {
        let mut pool = WatchpointPool::new(4);
        for _ in 0..3 {
            pool.allocate();
        }
        pool.release(1).unwrap();
        assert_eq!(ids(&pool), vec![0, 2]);

        // Most recently released slot comes back first, at the active tail
        assert_eq!(pool.allocate(), Some(1));
        assert_eq!(ids(&pool), vec![0, 2, 1]);
        assert_eq!(pool.allocate(), Some(3));
        assert_eq!(pool.allocate(), None);
    }

    #[test]
    fn test_full_pool_release_then_allocate() {
        let mut pool = WatchpointPool::default();
        while pool.allocate().is_some() {}
        pool.release(17).unwrap();
        assert_eq!(pool.allocate(), Some(17));
        assert_eq!(pool.allocate(), None);
    }

    #[test]
    fn test_release_clears_slot() {
        let mut pool = WatchpointPool::new(2);
        let id = pool.allocate().unwrap();
        pool.set_expression(id, "$a0", 9).unwrap();
        pool.release(id).unwrap();

        assert!(pool.get(id).is_none());
        let id = pool.allocate().unwrap();
        let wp = pool.get(id).unwrap();
        assert_eq!(wp.expr, "");
        assert_eq!(wp.value, 0);
    }

    #[test]
    fn test_release_inactive_fails() {
        let mut pool = WatchpointPool::new(2);
        assert_eq!(pool.release(0), Err(WatchError::NotActive { id: 0 }));
        assert_eq!(pool.release(7), Err(WatchError::NotActive { id: 7 }));
        assert!(pool.set_expression(1, "1", 1).is_err());
    }

    #[test]
    fn test_create_checks_expression_first() {
        let m = machine();
        let evaluator = Evaluator::new(&m);
        let mut pool = WatchpointPool::new(1);

        let err = pool.create("$nope", &evaluator).unwrap_err();
        assert!(matches!(err, WatchError::InvalidExpression { .. }));
        assert_eq!(err.code(), "unknown_register");
        assert_eq!(pool.free_count(), 1);

        let wp = pool.create("$a0 + 1", &evaluator).unwrap().clone();
        assert_eq!((wp.id, wp.value, wp.expr.as_str()), (0, 2, "$a0 + 1"));
        assert_eq!(pool.get(wp.id), Some(&wp));

        assert_eq!(
            pool.create("$a0", &evaluator),
            Err(WatchError::PoolExhausted { capacity: 1 })
        );
    }

    #[test]
    fn test_reevaluate_empty_pool() {
        let m = machine();
        let mut pool = WatchpointPool::default();
        assert_eq!(pool.reevaluate_all(&Evaluator::new(&m)), Ok(vec![]));
    }

    #[test]
    fn test_reevaluate_reports_changes() {
        let mut m = machine();
        let mut pool = WatchpointPool::default();
        {
            let evaluator = Evaluator::new(&m);
            pool.create("$a0", &evaluator).unwrap();
            pool.create("*0x80000004", &evaluator).unwrap();
            pool.create("$a0 == 1", &evaluator).unwrap();
        }

        assert!(pool.reevaluate_all(&Evaluator::new(&m)).unwrap().is_empty());

        m.set_register("a0", 5);
        m.write_word(0x8000_0004, 0xcafe).unwrap();
        let changes = pool.reevaluate_all(&Evaluator::new(&m)).unwrap();
        assert_eq!(
            changes,
            vec![
                WatchpointChange {
                    id: 0,
                    expr: "$a0".to_string(),
                    old: 1,
                    new: 5
                },
                WatchpointChange {
                    id: 1,
                    expr: "*0x80000004".to_string(),
                    old: 0,
                    new: 0xcafe
                },
                WatchpointChange {
                    id: 2,
                    expr: "$a0 == 1".to_string(),
                    old: 1,
                    new: 0
                },
            ]
        );
        assert_eq!(pool.get(0).unwrap().value, 5);
        assert_eq!(pool.get(0).unwrap().hits, 1);

        // Values were stored, so a second check is quiet
        assert!(pool.reevaluate_all(&Evaluator::new(&m)).unwrap().is_empty());
    }

    #[test]
    fn test_reevaluate_follows_creation_order() {
        let mut m = machine();
        let mut pool = WatchpointPool::new(3);
        {
            let evaluator = Evaluator::new(&m);
            pool.create("$a0", &evaluator).unwrap();
            pool.create("$a0 + 1", &evaluator).unwrap();
            pool.release(0).unwrap();
            pool.create("$a0 + 2", &evaluator).unwrap();
        }

        m.set_register("a0", 10);
        let changes = pool.reevaluate_all(&Evaluator::new(&m)).unwrap();
        let order: Vec<WatchpointId> = changes.iter().map(|c| c.id).collect();
        assert_eq!(order, vec![1, 0]);
    }

    #[test]
    fn test_reevaluate_failure_leaves_values() {
        let mut m = machine();
        let mut pool = WatchpointPool::default();
        {
            let evaluator = Evaluator::new(&m);
            pool.create("$a0", &evaluator).unwrap();
            pool.create("*0x80000000", &evaluator).unwrap();
        }

        m.set_register("a0", 2);
        m.memory.clear();
        let err = pool.reevaluate_all(&Evaluator::new(&m)).unwrap_err();
        assert!(matches!(
            err,
            WatchError::Evaluation {
                id: 1,
                source: EvalError::Memory(_),
                ..
            }
        ));
        assert_eq!(pool.get(0).unwrap().value, 1);
    }

    #[test]
    fn test_change_display() {
        let change = WatchpointChange {
            id: 3,
            expr: "$pc".to_string(),
            old: 0x10,
            new: 0x14,
        };
        assert_eq!(
            change.to_string(),
            "Hardware watchpoint 3: $pc\nOld value = 0x10\nNew value = 0x14"
        );
    }
}
