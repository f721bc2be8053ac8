//! Store-native identifier generation.
//!
//! `timestamp(4) | process(5) | counter(3)`: unique within a process and
//! roughly ordered by creation time.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::LazyLock;
use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, RngCore};
use warden_core::EntityId;

const COUNTER_MASK: u32 = 0x00ff_ffff;

static PROCESS_UNIQUE: LazyLock<[u8; 5]> = LazyLock::new(|| {
    let mut bytes = [0u8; 5];
    rand::thread_rng().fill_bytes(&mut bytes);
    bytes
});

static COUNTER: LazyLock<AtomicU32> =
    LazyLock::new(|| AtomicU32::new(rand::thread_rng().gen::<u32>() & COUNTER_MASK));

/// Returns a fresh identifier.
pub fn next_id() -> EntityId {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    let counter = COUNTER.fetch_add(1, Ordering::Relaxed) & COUNTER_MASK;
    EntityId::from_parts(secs, *PROCESS_UNIQUE, counter)
}
