//! Produces the `MagicTables` used by the rest of the engine.
//!
//! With the `load_magic` feature, a pre-baked table is deserialized from disk
//! via `bincode` so start-up doesn't pay the magic search cost. Otherwise the
//! tables are regenerated in-process (deterministically under
//! `deterministic_magic`, from OS randomness otherwise).

use super::precompute::{MagicTableSeed, generate_magic_tables};
use super::structs::MagicTables;

#[cfg(feature = "load_magic")]
const MAGIC_TABLE_BYTES: &[u8] = include_bytes!("../../../magic_tables.bin");

/// Builds (or loads) the magic tables used by the engine for its lifetime.
///
/// # Panics
/// Panics if table generation fails, which only happens if the magic search
/// exhausts its attempt budget — this should never occur in practice.
pub fn load_magic_tables() -> MagicTables {
    #[cfg(feature = "load_magic")]
    {
        bincode::deserialize(MAGIC_TABLE_BYTES).expect("failed to deserialize magic_tables.bin")
    }

    #[cfg(not(feature = "load_magic"))]
    {
        let seed = if cfg!(feature = "deterministic_magic") {
            MagicTableSeed::Fixed(0x45)
        } else {
            MagicTableSeed::Random
        };
        generate_magic_tables(seed).expect("failed to generate magic tables")
    }
}
