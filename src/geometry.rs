//! Implements `BoardGeometry` -- the global attack and line tables.

use lazy_static::lazy_static;
use crate::basetypes::*;
use crate::bitsets::*;


/// An object that for a particular slider (bishop or rook) at a
/// particular square, can "magically" find the corresponding attack
/// set, for all possible board occupations.
///
/// The "magic bitboards" technique consists of four steps:
///
/// 1. Mask the relevant occupancy bits to form a key. For example if
///    you had a rook on A1, the relevant occupancy bits will be from
///    A2-A7 and B1-G1.
///
/// 2. Multiply the key by a "magic number" to obtain an index
///    mapping.
///
/// 3. Right shift the index mapping by `64 - n` bits to create an
///    index, where `n` is the number of bits in the key.
///
/// 4. Use the index to reference a preinitialized attacks database.
#[derive(Copy, Clone)]
struct AttacksMagic {
    offset: usize,
    mask: Bitboard,
    magic: u64,
    shift: u32,
}

impl AttacksMagic {
    /// Returns the index into the shared attacks database for the
    /// given board occupation.
    #[inline(always)]
    fn index(&self, occupied: Bitboard) -> usize {
        let index = self.magic.wrapping_mul(occupied & self.mask) >> self.shift;
        self.offset.wrapping_add(index as usize)
    }
}


/// The size of the shared slider attacks database (all rook entries
/// followed by all bishop entries).
const SLIDER_ATTACKS_SIZE: usize = 107_648;


/// Tables and methods useful for move generation and position
/// evaluation.
///
/// The instance is created only once, before any position exists (see
/// `BoardGeometry::get`). It contains:
///
/// * Attack sets for kings, knights, and pawns on every square.
///
/// * Magic look-up tables giving rook and bishop attack sets for
///   every square and every relevant board occupation.
///
/// * Line and "in between" tables used for pin detection and x-ray
///   reasoning.
pub struct BoardGeometry {
    king_attacks: [Bitboard; 64],
    knight_attacks: [Bitboard; 64],
    pawn_attacks: [[Bitboard; 64]; 2],

    /// For every pair of aligned squares -- the full line determined
    /// by them (including the two squares). Empty for unaligned
    /// pairs.
    squares_at_line: [[Bitboard; 64]; 64],

    /// For every pair of aligned squares -- the squares strictly
    /// between them. Empty for unaligned or adjacent pairs.
    squares_between: [[Bitboard; 64]; 64],

    rook_map: [AttacksMagic; 64],
    bishop_map: [AttacksMagic; 64],
    slider_attacks: Vec<Bitboard>,
}

impl BoardGeometry {
    /// Returns a reference to the initialized `BoardGeometry` object.
    ///
    /// The object is created only during the first call. All next
    /// calls will return a reference to the same object. This is done
    /// in a thread-safe manner.
    #[inline]
    pub fn get() -> &'static BoardGeometry {
        lazy_static! {
            static ref GEOMETRY: BoardGeometry = BoardGeometry::new();
        }
        &GEOMETRY
    }

    /// Returns the set of squares that are attacked by a piece from a
    /// given square.
    ///
    /// This function returns the set of squares that are attacked by
    /// a piece of type `piece` from the square `from_square`, on a
    /// board which is occupied with pieces according to the
    /// `occupied` bitboard. `piece` **must not** be `PAWN`. It does
    /// not matter if `from_square` is occupied or not.
    #[inline]
    pub fn attacks_from(&self, piece: PieceType, from_square: Square, occupied: Bitboard) -> Bitboard {
        debug_assert!(piece > PAWN && piece <= KING);
        debug_assert!(from_square <= 63);
        match piece {
            KNIGHT => self.knight_attacks[from_square],
            BISHOP => self.slider_attacks[self.bishop_map[from_square].index(occupied)],
            ROOK => self.slider_attacks[self.rook_map[from_square].index(occupied)],
            QUEEN => {
                self.slider_attacks[self.bishop_map[from_square].index(occupied)] |
                self.slider_attacks[self.rook_map[from_square].index(occupied)]
            }
            _ => self.king_attacks[from_square],
        }
    }

    /// Returns the set of squares that are attacked by a pawn of a
    /// given color from a given square.
    #[inline]
    pub fn pawn_attacks_from(&self, color: Color, from_square: Square) -> Bitboard {
        debug_assert!(color <= 1);
        debug_assert!(from_square <= 63);
        self.pawn_attacks[color][from_square]
    }

    /// Returns the set of squares lying strictly between two aligned
    /// squares (the empty set if the squares are not aligned).
    #[inline]
    pub fn between(&self, sq1: Square, sq2: Square) -> Bitboard {
        debug_assert!(sq1 <= 63 && sq2 <= 63);
        self.squares_between[sq1][sq2]
    }

    /// Returns the full line (rank, file, diagonal, or anti-diagonal)
    /// determined by two aligned squares, including the squares
    /// themselves (the empty set if the squares are not aligned).
    #[inline]
    pub fn line(&self, sq1: Square, sq2: Square) -> Bitboard {
        debug_assert!(sq1 <= 63 && sq2 <= 63);
        self.squares_at_line[sq1][sq2]
    }

    /// Returns whether three squares lie on a single line.
    #[inline]
    pub fn aligned(&self, sq1: Square, sq2: Square, sq3: Square) -> bool {
        self.squares_at_line[sq1][sq2] & (1 << sq3) != 0
    }

    /// Creates and initializes a new instance.
    fn new() -> BoardGeometry {
        let mut bg = BoardGeometry {
            king_attacks: [0; 64],
            knight_attacks: [0; 64],
            pawn_attacks: [[0; 64]; 2],
            squares_at_line: [[0; 64]; 64],
            squares_between: [[0; 64]; 64],
            rook_map: [AttacksMagic {
                offset: 0,
                mask: 0,
                magic: 0,
                shift: 0,
            }; 64],
            bishop_map: [AttacksMagic {
                offset: 0,
                mask: 0,
                magic: 0,
                shift: 0,
            }; 64],
            slider_attacks: vec![0; SLIDER_ATTACKS_SIZE],
        };

        // Fill the king and knight attack tables, stepping from each
        // square along the piece's offsets. Steps whose file-or-rank
        // delta exceeds the piece's legal step would wrap around a
        // board edge and are rejected.
        const KING_OFFSETS: [(isize, isize); 8] = [(1, -1), (1, 0), (1, 1), (0, -1), (0, 1),
                                                   (-1, -1), (-1, 0), (-1, 1)];
        const KNIGHT_OFFSETS: [(isize, isize); 8] = [(-1, -2), (-2, -1), (-2, 1), (-1, 2),
                                                     (1, -2), (2, -1), (2, 1), (1, 2)];
        for sq in 0..64 {
            let (r, c) = ((sq / 8) as isize, (sq % 8) as isize);
            for &(dr, dc) in KING_OFFSETS.iter() {
                if r + dr >= 0 && c + dc >= 0 && r + dr < 8 && c + dc < 8 {
                    bg.king_attacks[sq] |= 1 << ((r + dr) * 8 + c + dc);
                }
            }
            for &(dr, dc) in KNIGHT_OFFSETS.iter() {
                if r + dr >= 0 && c + dc >= 0 && r + dr < 8 && c + dc < 8 {
                    bg.knight_attacks[sq] |= 1 << ((r + dr) * 8 + c + dc);
                }
            }
        }

        // Fill the pawn attack tables.
        for us in 0..2 {
            for sq in 0..64 {
                bg.pawn_attacks[us][sq] = bb_pawn_attacks(us, 1 << sq);
            }
        }

        // Fill the line table.
        for a in 0..64 {
            let lines = [bb_file(a), bb_rank(a), bb_diag(a), bb_anti_diag(a)];
            for b in a + 1..64 {
                for line in lines.iter() {
                    if *line & (1 << b) != 0 {
                        bg.squares_at_line[a][b] = *line;
                        bg.squares_at_line[b][a] = *line;
                        break;
                    }
                }
            }
        }

        // Fill the "in between" table.
        for a in 0..64 {
            for b in 0..64 {
                bg.squares_between[a][b] = bb_between_including(a, b) & !(1 << a) & !(1 << b);
            }
        }

        // Fill the slider look-up tables (rook entries first, then
        // bishop entries).
        let total = init_slider_map(ROOK, &mut bg.rook_map, &mut bg.slider_attacks, 0);
        let total = init_slider_map(BISHOP, &mut bg.bishop_map, &mut bg.slider_attacks, total);
        assert_eq!(total, SLIDER_ATTACKS_SIZE);

        bg
    }
}


/// A helper function for `BoardGeometry::new`. It initializes the
/// look-up table for a particular slider (bishop or rook), returning
/// the offset at which the next table should begin.
fn init_slider_map(piece: PieceType,
                   piece_map: &mut [AttacksMagic; 64],
                   slider_attacks: &mut [Bitboard],
                   mut offset: usize)
                   -> usize {
    assert!(piece == BISHOP || piece == ROOK);
    let attacks: fn(Square, Bitboard) -> Bitboard = if piece == BISHOP {
        bb_bishop_attacks
    } else {
        bb_rook_attacks
    };

    for (sq, entry) in piece_map.iter_mut().enumerate() {
        // The relevant occupancy mask excludes the board edges --
        // pieces there can not block anything behind them.
        let edges = ((BB_RANK_1 | BB_RANK_8) & !bb_rank(sq)) |
                    ((BB_FILE_A | BB_FILE_H) & !bb_file(sq));
        let mask = attacks(sq, 1 << sq) & !edges;
        let num_ones = mask.count_ones();
        let shift = 64 - num_ones;
        let magic = if piece == BISHOP {
            BISHOP_MAGICS[sq]
        } else {
            ROOK_MAGICS[sq]
        };

        // Enumerate all subsets of the relevant occupancy mask,
        // computing the true attack set for each by ray-walking, and
        // write it at the magic index.
        let size = 1usize << num_ones;
        let mut occ: Bitboard = 0;
        loop {
            let index = (magic.wrapping_mul(occ) >> shift) as usize;
            let reference = attacks(sq, occ | (1 << sq));
            let stored = &mut slider_attacks[offset + index];
            assert!(*stored == 0 || *stored == reference,
                    "precalculated magic is incorrect for square {}",
                    sq);
            *stored = reference;
            occ = occ.wrapping_sub(mask) & mask;
            if occ == 0 {
                // All relevant occupancies have been tried.
                break;
            }
        }

        *entry = AttacksMagic {
            offset,
            mask,
            magic,
            shift,
        };
        offset += size;
    }
    offset
}


/// Pre-calculated bishop magic constants.
const BISHOP_MAGICS: [u64; 64] = [306397059236266368,
                                  6638343277122827280,
                                  10377420549504106496,
                                  9193021019258913,
                                  2306408226914042898,
                                  10379110636817760276,
                                  27167319028441088,
                                  7566153073497751552,
                                  1513227076520969216,
                                  301917653126479936,
                                  72075465430409232,
                                  2343002121441460228,
                                  36033212782477344,
                                  9223373154083475456,
                                  6935629192638251008,
                                  72621648200664064,
                                  2310506081245267984,
                                  2533291987569153,
                                  146934404644733024,
                                  1838417834950912,
                                  579856052833622016,
                                  1729946448243595776,
                                  705208029025040,
                                  2886877732040869888,
                                  10092575566416331020,
                                  5635409948247040,
                                  738739924278198804,
                                  4648849515743289408,
                                  9233786889293807616,
                                  1155253577929753088,
                                  435164712050360592,
                                  3026700562025580641,
                                  4612284839965491969,
                                  10448650511900137472,
                                  571823356120080,
                                  40569782189687936,
                                  148620986995048708,
                                  4901113822871308288,
                                  4612077461748908288,
                                  10204585674276944,
                                  2534512027246592,
                                  5766297627561820676,
                                  13809969191200768,
                                  1153062656578422784,
                                  9318235838682899712,
                                  11533824475839595776,
                                  433770548762247233,
                                  92326036501692936,
                                  9227053213059129360,
                                  577024872779350852,
                                  108087561569959936,
                                  582151826703646856,
                                  81404176367767,
                                  316415319130374273,
                                  9113856212762624,
                                  145453328103440392,
                                  441392350330618400,
                                  1126492748710916,
                                  2309220790581891072,
                                  3026423624667006980,
                                  18019391702696464,
                                  4516931289817600,
                                  1450317422841301124,
                                  9246488805123342592];


/// Pre-calculated rook magic constants.
const ROOK_MAGICS: [u64; 64] = [36028867955671040,
                                2395917338224361536,
                                936757656041832464,
                                648535942831284356,
                                36037595259731970,
                                13943151043426386048,
                                432349966580056576,
                                4683745813775001856,
                                1191624314978336800,
                                4611756662317916160,
                                4625338105090543616,
                                140806208356480,
                                1688987371057664,
                                9288708641522688,
                                153403870897537280,
                                281550411726850,
                                2401883155071024,
                                1206964838111645696,
                                166705754384925184,
                                36039792408011264,
                                10376580514281768960,
                                9148486532465664,
                                578787319189340418,
                                398007816633254020,
                                2341872150903791616,
                                2314850762536009728,
                                297238127310798880,
                                2251868801728768,
                                2594082183614301184,
                                820222482337235456,
                                37717655469424904,
                                577596144088011012,
                                1152991874030502016,
                                3171026856472219648,
                                20415869351890944,
                                4611844348286345472,
                                2455605323386324224,
                                140754676613632,
                                1740713828645089416,
                                58361257132164,
                                70370893791232,
                                9227880322828615684,
                                72092778695295040,
                                577023839834341392,
                                4723150143565660416,
                                563087661073408,
                                651083773116450,
                                72128789630550047,
                                153192758223054976,
                                869194865525653568,
                                4972009250306933248,
                                1031325449119138048,
                                1297041090863464576,
                                580401419157405824,
                                1657992643584,
                                306245066729521664,
                                15206439601351819394,
                                14143290885479661953,
                                1688988407201810,
                                18065251325837538,
                                1152927311403745429,
                                162411078742050817,
                                334255838724676,
                                27323018585852550];


#[cfg(test)]
mod tests {
    use super::*;
    use crate::squares::*;

    #[test]
    fn line_and_between_tables() {
        let g = BoardGeometry::get();
        assert_eq!(g.line(B1, C3), 0);
        assert_eq!(g.line(B1, G1), 0b11111111);
        assert_eq!(g.line(G8, B8), 0b11111111 << 56);
        assert_eq!(g.between(B1, C3), 0);
        assert_eq!(g.between(B1, G1), 0b00111100);
        assert_eq!(g.between(A1, D4), 1 << B2 | 1 << C3);
        assert_eq!(g.between(D4, A1), 1 << B2 | 1 << C3);
        assert_eq!(g.between(D4, D5), 0);
        assert!(g.aligned(A1, D4, C3));
        assert!(g.aligned(A1, D4, H8));
        assert!(!g.aligned(A1, D4, C4));
    }

    #[test]
    fn attack_table_symmetry() {
        let g = BoardGeometry::get();
        for a in 0..64 {
            for b in 0..64 {
                assert_eq!(g.attacks_from(KNIGHT, a, 0) & (1 << b) != 0,
                           g.attacks_from(KNIGHT, b, 0) & (1 << a) != 0);
                assert_eq!(g.attacks_from(KING, a, 0) & (1 << b) != 0,
                           g.attacks_from(KING, b, 0) & (1 << a) != 0);
            }
        }
    }

    #[test]
    fn slider_attack_counts() {
        let g = BoardGeometry::get();
        for sq in 0..64 {
            assert_eq!(pop_count(g.attacks_from(ROOK, sq, 0)), 14);
            let bishops = pop_count(g.attacks_from(BISHOP, sq, 0));
            assert!(bishops >= 7 && bishops <= 13);
            assert_eq!(g.attacks_from(QUEEN, sq, 0),
                       g.attacks_from(ROOK, sq, 0) | g.attacks_from(BISHOP, sq, 0));
        }
        assert_eq!(pop_count(g.attacks_from(BISHOP, E4, 0)), 13);
        assert_eq!(pop_count(g.attacks_from(QUEEN, E4, 0)), 27);
    }

    #[test]
    fn magic_attacks_match_slow_attacks() {
        let g = BoardGeometry::get();
        // A simple deterministic occupancy scatter.
        let mut occupied: Bitboard = 0x1234_5678_9abc_def0;
        for sq in 0..64 {
            occupied = occupied.rotate_left(11) ^ (1 << sq);
            assert_eq!(g.attacks_from(ROOK, sq, occupied),
                       bb_rook_attacks(sq, occupied));
            assert_eq!(g.attacks_from(BISHOP, sq, occupied),
                       bb_bishop_attacks(sq, occupied));
            // The occupancy of the origin square itself is irrelevant.
            assert_eq!(g.attacks_from(ROOK, sq, occupied & !(1 << sq)),
                       g.attacks_from(ROOK, sq, occupied | (1 << sq)));
        }
    }

    #[test]
    fn no_wrap_around_the_edges() {
        let g = BoardGeometry::get();
        let occupied = 1 << E6 | 1 << G7;
        let attacks = g.attacks_from(BISHOP, F8, occupied);
        assert_eq!(attacks & (1 << H1), 0);
        assert_ne!(attacks & (1 << G7), 0);
        assert_eq!(g.attacks_from(ROOK, H4, 0) & (1 << A5), 0);
    }

    #[test]
    fn blockers_stop_the_rays() {
        let g = BoardGeometry::get();
        let attacks = g.attacks_from(ROOK, E4, 1 << E6);
        assert_ne!(attacks & (1 << E5), 0);
        assert_ne!(attacks & (1 << E6), 0);
        assert_eq!(attacks & (1 << E7), 0);
    }

    #[test]
    fn pawn_attack_tables() {
        let g = BoardGeometry::get();
        assert_eq!(g.pawn_attacks_from(WHITE, F6), 1 << E7 | 1 << G7);
        assert_eq!(g.pawn_attacks_from(BLACK, H8), 1 << G7);
        assert_eq!(g.pawn_attacks_from(BLACK, A7), 1 << B6);
    }
}
