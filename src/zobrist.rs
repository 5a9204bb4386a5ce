//! Implements `ZobristKeys` -- the tables for calculating position
//! hashes.

use lazy_static::lazy_static;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};


/// Tables for calculating Zobrist hashes.
///
/// Zobrist hashing is a technique to transform a board position into
/// a number of a fixed length, with an equal distribution over all
/// possible numbers, invented by Albert Zobrist. The key property of
/// this method is that two similar positions generate entirely
/// different hash numbers.
///
/// The keys are produced by a pseudo-random number generator with a
/// fixed seed, so that every run of the program sees the same keys.
pub struct ZobristKeys {
    /// Constants with which the hash value should be XOR-ed when a
    /// piece of a given color and type on a given square
    /// appears/disappears.
    pub pieces: [[[u64; 64]; 6]; 2],

    /// Constants with which the hash value should be XOR-ed, for the
    /// old and the new en-passant file on each move.
    pub enpassant_file: [u64; 8],

    /// Constants with which the hash value should be XOR-ed, for the
    /// old and the new castling rights on each move.
    pub castling_rights: [u64; 16],

    /// The constant with which the hash value should be XOR-ed when
    /// black is to move.
    pub to_move: u64,
}

impl ZobristKeys {
    /// Returns a reference to the initialized `ZobristKeys` object.
    ///
    /// The object is created only during the first call. All next
    /// calls will return a reference to the same object. This is done
    /// in a thread-safe manner.
    #[inline]
    pub fn get() -> &'static ZobristKeys {
        lazy_static! {
            static ref KEYS: ZobristKeys = ZobristKeys::new();
        }
        &KEYS
    }

    /// Creates and initializes a new instance.
    fn new() -> ZobristKeys {
        let mut rng = StdRng::seed_from_u64(0x123456789abcdef0);
        let mut keys = ZobristKeys {
            pieces: [[[0; 64]; 6]; 2],
            enpassant_file: [0; 8],
            castling_rights: [0; 16],
            to_move: 0,
        };
        for color in 0..2 {
            for piece in 0..6 {
                for square in 0..64 {
                    keys.pieces[color][piece][square] = rng.gen();
                }
            }
        }
        for file in 0..8 {
            keys.enpassant_file[file] = rng.gen();
        }
        for rights in 0..16 {
            keys.castling_rights[rights] = rng.gen();
        }
        keys.to_move = rng.gen();
        keys
    }
}
