//! Machine state consumed by the evaluator
//!
//! The register file and the address space belong to the simulator; the
//! evaluator only sees them through [`Machine`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::expr::{Word, WORD_BYTES};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Cannot read {width} bytes at address {address:#010x}")]
pub struct MemoryFault {
    pub address: Word,
    pub width: usize,
}

/// Live state of the simulated processor
pub trait Machine {
    /// Current value of a register, by name without the leading `$`
    fn register(&self, name: &str) -> Option<Word>;

    /// Read `width` bytes at `address` as a little-endian word
    fn read_memory(&self, address: Word, width: usize) -> Result<Word, MemoryFault>;
}

/// A named register and its current value
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RegisterValue {
    pub name: String,
    pub value: Word,
}

/// A contiguous piece of guest memory
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryRegion {
    pub base: Word,
    #[serde(default)]
    pub bytes: Vec<u8>,
}

impl MemoryRegion {
    fn slice(&self, address: Word, width: usize) -> Option<&[u8]> {
        let offset = address.checked_sub(self.base)? as usize;
        let end = offset.checked_add(width)?;
        self.bytes.get(offset..end)
    }
}

/// Machine state captured by a front end and sent over the wire
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MachineSnapshot {
    /// Program counter, also reachable as `$pc`
    #[serde(default)]
    pub pc: Word,
    #[serde(default)]
    pub registers: Vec<RegisterValue>,
    #[serde(default)]
    pub memory: Vec<MemoryRegion>,
}

impl MachineSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or update a register
    pub fn set_register(&mut self, name: impl Into<String>, value: Word) {
        let name = name.into();
        match self.registers.iter_mut().find(|r| r.name == name) {
            Some(reg) => reg.value = value,
            None => self.registers.push(RegisterValue { name, value }),
        }
    }

    /// Map `bytes` at `base`
    pub fn map(&mut self, base: Word, bytes: Vec<u8>) {
        self.memory.push(MemoryRegion { base, bytes });
    }

    /// Store one word at `address`, which must fall inside a mapped region
    pub fn write_word(&mut self, address: Word, value: Word) -> Result<(), MemoryFault> {
        let fault = MemoryFault {
            address,
            width: WORD_BYTES,
        };
        let region = self
            .memory
            .iter_mut()
            .find(|r| r.slice(address, WORD_BYTES).is_some())
            .ok_or(fault)?;
        let offset = (address - region.base) as usize;
        region.bytes[offset..offset + WORD_BYTES].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

impl Machine for MachineSnapshot {
    fn register(&self, name: &str) -> Option<Word> {
        if name == "pc" {
            return Some(self.pc);
        }
        self.registers
            .iter()
            .find(|r| r.name == name)
            .map(|r| r.value)
    }

    fn read_memory(&self, address: Word, width: usize) -> Result<Word, MemoryFault> {
        let fault = MemoryFault { address, width };
        if width == 0 || width > WORD_BYTES {
            return Err(fault);
        }
        let bytes = self
            .memory
            .iter()
            .find_map(|r| r.slice(address, width))
            .ok_or(fault)?;

        let mut word = [0u8; WORD_BYTES];
        word[..width].copy_from_slice(bytes);
        Ok(Word::from_le_bytes(word))
    }
}
