//! Runtime adapters.

pub mod spawner;

pub use spawner::{Spawn, TokioSpawner};
