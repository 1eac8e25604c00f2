//! Debug session
//!
//! Owns the configuration and the watchpoint pool for one debugger. Machine
//! state is borrowed per call, since the simulator keeps stepping between calls.

use crate::config::SessionConfig;
use crate::expr::{EvalError, Evaluator, Word, WORD_BYTES};
use crate::machine::Machine;
use crate::watch::{WatchError, Watchpoint, WatchpointChange, WatchpointId, WatchpointPool};

/// One word of an examine dump
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct MemoryWord {
    pub address: Word,
    pub value: Word,
}

pub struct DebugSession {
    config: SessionConfig,
    watchpoints: WatchpointPool,
}

impl DebugSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            watchpoints: WatchpointPool::new(config.watchpoint_capacity),
            config,
        }
    }

    fn evaluator<'m>(&self, machine: &'m dyn Machine) -> Evaluator<'m> {
        Evaluator::with_limits(machine, self.config.lex_limits())
    }

    /// Evaluate an expression against the current machine state
    pub fn evaluate(&self, expr: &str, machine: &dyn Machine) -> Result<Word, EvalError> {
        self.evaluator(machine).eval_str(expr)
    }

    /// Read `count` consecutive words starting at the value of `expr`
    pub fn examine(
        &self,
        count: usize,
        expr: &str,
        machine: &dyn Machine,
    ) -> Result<Vec<MemoryWord>, EvalError> {
        let start = self.evaluate(expr, machine)?;
        (0..count)
            .map(|i| -> Result<MemoryWord, EvalError> {
                let address = start.wrapping_add((i * WORD_BYTES) as Word);
                let value = machine.read_memory(address, WORD_BYTES)?;
                Ok(MemoryWord { address, value })
            })
            .collect()
    }

    /// Add a watchpoint on `expr`, recording its current value
    pub fn watch(&mut self, expr: &str, machine: &dyn Machine) -> Result<&Watchpoint, WatchError> {
        let evaluator = self.evaluator(machine);
        self.watchpoints.create(expr.trim(), &evaluator)
    }

    pub fn unwatch(&mut self, id: WatchpointId) -> Result<(), WatchError> {
        self.watchpoints.release(id)
    }

    /// Active watchpoints in creation order
    pub fn watchpoints(&self) -> Vec<Watchpoint> {
        self.watchpoints.iter().cloned().collect()
    }

    /// Re-check every watchpoint; called by the stepper after each step
    pub fn check_watchpoints(
        &mut self,
        machine: &dyn Machine,
    ) -> Result<Vec<WatchpointChange>, WatchError> {
        let evaluator = self.evaluator(machine);
        self.watchpoints.reevaluate_all(&evaluator)
    }
}

impl Default for DebugSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
