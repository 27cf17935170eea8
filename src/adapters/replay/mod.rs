//! Replay guard adapters.

mod in_memory;

pub use in_memory::{
    InMemoryReplayGuard, ReplaySweeper, DEFAULT_REPLAY_TTL, DEFAULT_SWEEP_INTERVAL,
    MAX_REPLAY_TTL, MAX_SWEEP_INTERVAL,
};
