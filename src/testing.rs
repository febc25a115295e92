//! Test doubles shared by the unit tests

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::actor::{Actor, ActorField};
use crate::memory::{Address, MemoryError, ProcessMemory};

/// Sparse fake process memory that records every write.
///
/// Unset bytes read as zero.
#[derive(Default)]
pub(crate) struct RecordingMemory {
    /// Current contents
    bytes: Mutex<BTreeMap<Address, u8>>,
    /// Every successful write, in order
    writes: Mutex<Vec<(Address, Vec<u8>)>>,
    /// Addresses whose writes fail
    failing: Mutex<BTreeSet<Address>>,
    /// Fail every write
    fail_writes: AtomicBool,
    /// Fail every read
    fail_reads: AtomicBool,
}

impl RecordingMemory {
    /// Creates empty memory
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates memory with `bytes` already resident at `address`, without recording a write
    pub(crate) fn with_bytes(address: Address, bytes: &[u8]) -> Self {
        let memory = Self::new();
        memory.poke(address, bytes);
        memory
    }

    /// Sets memory contents without recording a write
    pub(crate) fn poke(&self, address: Address, bytes: &[u8]) {
        let mut contents = self.bytes.lock().unwrap();
        for (offset, byte) in bytes.iter().enumerate() {
            contents.insert(address + offset, *byte);
        }
    }

    /// Reads memory contents without going through [`ProcessMemory`]
    pub(crate) fn peek(&self, address: Address, len: usize) -> Vec<u8> {
        let contents = self.bytes.lock().unwrap();
        (0..len)
            .map(|offset| contents.get(&(address + offset)).copied().unwrap_or(0))
            .collect()
    }

    /// Every successful write so far, in order
    pub(crate) fn writes(&self) -> Vec<(Address, Vec<u8>)> {
        self.writes.lock().unwrap().clone()
    }

    /// Number of writes that started at `address`
    pub(crate) fn writes_to(&self, address: Address) -> usize {
        self.writes
            .lock()
            .unwrap()
            .iter()
            .filter(|(at, _)| *at == address)
            .count()
    }

    /// Forgets the recorded writes, keeping the contents
    pub(crate) fn clear_writes(&self) {
        self.writes.lock().unwrap().clear();
    }

    /// Makes every write fail, or stop failing
    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Makes every read fail, or stop failing
    pub(crate) fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Makes writes starting at `address` fail
    pub(crate) fn fail_writes_at(&self, address: Address) {
        self.failing.lock().unwrap().insert(address);
    }
}

impl ProcessMemory for RecordingMemory {
    fn read(&self, address: Address, buf: &mut [u8]) -> Result<(), MemoryError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(MemoryError::Read {
                address,
                len: buf.len(),
            });
        }
        buf.copy_from_slice(&self.peek(address, buf.len()));
        Ok(())
    }

    fn write(&self, address: Address, bytes: &[u8]) -> Result<(), MemoryError> {
        if self.fail_writes.load(Ordering::SeqCst)
            || self.failing.lock().unwrap().contains(&address)
        {
            return Err(MemoryError::Write {
                address,
                len: bytes.len(),
            });
        }
        self.poke(address, bytes);
        self.writes.lock().unwrap().push((address, bytes.to_vec()));
        Ok(())
    }
}

/// Actor whose fields live in a [`RecordingMemory`]
pub(crate) struct TestActor {
    /// Memory holding the actor's fields
    memory: Arc<RecordingMemory>,
    /// Start of the actor
    base: Address,
}

impl TestActor {
    /// Offset of the animation speed
    pub(crate) const SPEED_OFFSET: Address = 0x0;
    /// Offset of the animation override
    pub(crate) const OVERRIDE_OFFSET: Address = 0x4;
    /// Offset of the target animation
    pub(crate) const TARGET_OFFSET: Address = 0x6;

    /// Creates an actor at `base` and seeds its fields without recording writes
    pub(crate) fn new(
        memory: Arc<RecordingMemory>,
        base: Address,
        speed: f32,
        animation_override: u16,
        target: u16,
    ) -> Self {
        memory.poke(base + Self::SPEED_OFFSET, &speed.to_ne_bytes());
        memory.poke(base + Self::OVERRIDE_OFFSET, &animation_override.to_ne_bytes());
        memory.poke(base + Self::TARGET_OFFSET, &target.to_ne_bytes());
        Self { memory, base }
    }
}

impl Actor for TestActor {
    fn address_of(&self, field: ActorField) -> Address {
        self.base
            + match field {
                ActorField::AnimationSpeed => Self::SPEED_OFFSET,
                ActorField::AnimationOverride => Self::OVERRIDE_OFFSET,
                ActorField::TargetAnimation => Self::TARGET_OFFSET,
            }
    }

    fn animation_speed(&self) -> f32 {
        self.memory
            .read_value(self.address_of(ActorField::AnimationSpeed))
            .unwrap()
    }

    fn animation_override(&self) -> u16 {
        self.memory
            .read_value(self.address_of(ActorField::AnimationOverride))
            .unwrap()
    }

    fn target_animation(&self) -> u16 {
        self.memory
            .read_value(self.address_of(ActorField::TargetAnimation))
            .unwrap()
    }
}
