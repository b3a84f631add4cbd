//! Builds the rook/bishop magic tables from scratch by enumerating every
//! blocker subset of each square's relevant-occupancy mask and searching for
//! a collision-free magic multiplier.

use rand::SeedableRng;
use rand::rngs::StdRng;

use super::attacks::{
    bishop_attacks_per_square, get_bishop_attack_bitboards, get_rook_attack_bitboards,
    rook_attacks_per_square,
};
use super::search::find_magic_number_for_square;
use super::structs::{BishopMagicTables, MagicEntry, MagicTables, RookMagicTables};

/// How the magic search should be seeded.
pub enum MagicTableSeed {
    /// Deterministic seed, used by tests and the `deterministic_magic` feature.
    Fixed(u64),
    /// Seed pulled from the OS RNG.
    Random,
}

fn make_rng(seed: &MagicTableSeed) -> StdRng {
    match seed {
        MagicTableSeed::Fixed(s) => StdRng::seed_from_u64(*s),
        MagicTableSeed::Random => StdRng::from_rng(&mut rand::rng()),
    }
}

/// Relevant-occupancy mask for a rook on `square` (edges excluded, since an
/// edge occupant doesn't change whether the ray is blocked before it).
fn rook_relevant_mask(square: usize) -> u64 {
    let rank = square / 8;
    let file = square % 8;
    let mut mask = 0u64;

    for r in (rank + 1)..7 {
        mask |= 1u64 << (r * 8 + file);
    }
    for r in 1..rank {
        mask |= 1u64 << (r * 8 + file);
    }
    for f in (file + 1)..7 {
        mask |= 1u64 << (rank * 8 + f);
    }
    for f in 1..file {
        mask |= 1u64 << (rank * 8 + f);
    }
    mask
}

fn bishop_relevant_mask(square: usize) -> u64 {
    let rank = square as isize / 8;
    let file = square as isize % 8;
    let mut mask = 0u64;

    let dirs: [(isize, isize); 4] = [(1, 1), (1, -1), (-1, 1), (-1, -1)];
    for (dr, df) in dirs {
        let mut r = rank + dr;
        let mut f = file + df;
        while (1..7).contains(&r) && (1..7).contains(&f) {
            mask |= 1u64 << (r * 8 + f);
            r += dr;
            f += df;
        }
    }
    mask
}

/// Enumerates every subset of `mask` using the standard "carry-rippler" trick.
fn enumerate_subsets(mask: u64) -> Vec<u64> {
    let mut subsets = Vec::with_capacity(1 << mask.count_ones());
    let mut subset = 0u64;
    loop {
        subsets.push(subset);
        if subset == mask {
            break;
        }
        subset = subset.wrapping_sub(mask) & mask;
    }
    subsets
}

fn build_rook_entry(square: usize, rng: &mut StdRng) -> Result<MagicEntry, String> {
    let mask = rook_relevant_mask(square);
    let blockers = enumerate_subsets(mask);
    let attacks = get_rook_attack_bitboards(square, &blockers);
    let shift = 64 - mask.count_ones();

    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let table_size = 1usize << mask.count_ones();
    let mut table = vec![0u64; table_size].into_boxed_slice();
    for (&b, &a) in blockers.iter().zip(attacks.iter()) {
        let index = ((b.wrapping_mul(magic)) >> shift) as usize;
        table[index] = a;
    }

    debug_assert_eq!(
        rook_attacks_per_square(square, 0),
        table[((0u64.wrapping_mul(magic)) >> shift) as usize]
    );

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table,
    })
}

fn build_bishop_entry(square: usize, rng: &mut StdRng) -> Result<MagicEntry, String> {
    let mask = bishop_relevant_mask(square);
    let blockers = enumerate_subsets(mask);
    let attacks = get_bishop_attack_bitboards(square, &blockers);
    let shift = 64 - mask.count_ones();

    let magic = find_magic_number_for_square(&blockers, &attacks, shift, rng)?;

    let table_size = 1usize << mask.count_ones();
    let mut table = vec![0u64; table_size].into_boxed_slice();
    for (&b, &a) in blockers.iter().zip(attacks.iter()) {
        let index = ((b.wrapping_mul(magic)) >> shift) as usize;
        table[index] = a;
    }

    debug_assert_eq!(
        bishop_attacks_per_square(square, 0),
        table[((0u64.wrapping_mul(magic)) >> shift) as usize]
    );

    Ok(MagicEntry {
        magic,
        shift,
        mask,
        table,
    })
}

/// Generates full rook+bishop magic tables for all 64 squares.
pub fn generate_magic_tables(seed: MagicTableSeed) -> Result<MagicTables, String> {
    let mut rng = make_rng(&seed);

    let mut rook_entries = Vec::with_capacity(64);
    let mut bishop_entries = Vec::with_capacity(64);

    for square in 0..64 {
        rook_entries.push(build_rook_entry(square, &mut rng)?);
        bishop_entries.push(build_bishop_entry(square, &mut rng)?);
    }

    Ok(MagicTables {
        rook: RookMagicTables {
            entries: rook_entries,
        },
        bishop: BishopMagicTables {
            entries: bishop_entries,
        },
    })
}
