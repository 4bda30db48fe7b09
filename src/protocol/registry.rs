//! Opcode registry mapping wire opcodes to packet constructors.
//!
//! Populated once at startup, read-only afterwards. Lookups for an
//! unregistered opcode return `None`, never an error: unknown opcodes are
//! forward-compatible no-ops that the receive path discards.

use crate::core::packet::Packet;
use crate::error::{constants, ProtocolError, Result};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type PacketFactory = Box<dyn Fn() -> Box<dyn Packet> + Send + Sync + 'static>;

/// Opcode-keyed packet factory table.
///
/// Cheap to clone; clones share the same underlying table.
#[derive(Clone)]
pub struct Registry {
    factories: Arc<RwLock<HashMap<u8, PacketFactory>>>,
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

impl Registry {
    pub fn new() -> Self {
        Self {
            factories: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a variant under the opcode its `Default` instance reports.
    pub fn register<P>(&self) -> Result<()>
    where
        P: Packet + Default + 'static,
    {
        let opcode = P::default().opcode();
        self.register_with(opcode, || Box::new(P::default()))
    }

    /// Register an explicit factory for an opcode. Rejects an opcode that is
    /// already taken; registration happens once per variant, at startup.
    pub fn register_with<F>(&self, opcode: u8, factory: F) -> Result<()>
    where
        F: Fn() -> Box<dyn Packet> + Send + Sync + 'static,
    {
        let mut factories = self
            .factories
            .write()
            .map_err(|_| ProtocolError::Custom(constants::ERR_REGISTRY_WRITE_LOCK.to_string()))?;

        if factories.contains_key(&opcode) {
            return Err(ProtocolError::DuplicateOpcode(opcode));
        }

        factories.insert(opcode, Box::new(factory));
        Ok(())
    }

    /// Construct a fresh instance of the variant registered for `opcode`,
    /// or `None` when the opcode is unknown.
    pub fn create(&self, opcode: u8) -> Result<Option<Box<dyn Packet>>> {
        let factories = self
            .factories
            .read()
            .map_err(|_| ProtocolError::Custom(constants::ERR_REGISTRY_READ_LOCK.to_string()))?;

        Ok(factories.get(&opcode).map(|factory| factory()))
    }

    /// Whether a variant is registered for `opcode`.
    pub fn contains(&self, opcode: u8) -> bool {
        self.factories
            .read()
            .map(|factories| factories.contains_key(&opcode))
            .unwrap_or(false)
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let count = self.factories.read().map(|m| m.len()).unwrap_or(0);
        f.debug_struct("Registry").field("variants", &count).finish()
    }
}
