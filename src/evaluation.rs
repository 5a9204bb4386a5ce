//! Implements the static position evaluator.
//!
//! The evaluator computes a deterministic, side-to-move-relative
//! score in centipawns. Every feature is calculated as a white minus
//! black difference; the total is interpolated between a separate
//! opening and endgame weighting according to the remaining material
//! (tapered evaluation), and finally negated if black is to move.

use crate::basetypes::*;
use crate::bitsets::*;
use crate::files::{file, FILE_C, FILE_F};
use crate::position::Position;
use crate::ranks::*;
use crate::squares::*;
use crate::value::{Value, PIECE_VALUES};


/// Statically evaluates a position.
///
/// Returns the score in centipawns from the point of view of the
/// side to move.
pub fn evaluate(position: &Position) -> Value {
    let material = material(position, WHITE) - material(position, BLACK);
    let positional = piece_squares(position, WHITE) - piece_squares(position, BLACK);
    let pawn_structure = pawn_structure(position, WHITE) - pawn_structure(position, BLACK);
    let king_safety = king_safety(position, WHITE) - king_safety(position, BLACK);
    let mobility = mobility(position, WHITE) - mobility(position, BLACK);
    let development = development(position, WHITE) - development(position, BLACK);
    let rooks = rooks(position, WHITE) - rooks(position, BLACK);
    let bishops = bishops(position, WHITE) - bishops(position, BLACK);
    let knights = knights(position, WHITE) - knights(position, BLACK);

    // In the opening all features count with full weight --
    // development most of all. In the endgame positional terms and
    // mobility lose half of their weight, king safety three quarters,
    // development disappears, while pawn structure and rook activity
    // gain.
    let opening = material + positional + mobility + king_safety + pawn_structure +
                  development + rooks + bishops + knights;
    let endgame = material + positional / 2 + mobility / 2 + king_safety / 4 +
                  pawn_structure * 3 / 2 + rooks * 3 / 2 + bishops + knights;
    let phase = game_phase(position);
    let score = (opening * phase + endgame * (256 - phase)) / 256;

    if position.to_move() == WHITE {
        score
    } else {
        -score
    }
}


/// Returns the game phase as a number between 0 (endgame) and 256
/// (opening), derived from the minor and major pieces still on the
/// board.
pub fn game_phase(position: &Position) -> Value {
    const TOTAL_PHASE: Value = 24;
    let mut phase = 0;
    for color in 0..2 {
        phase += pop_count(position.pieces(color, KNIGHT)) as Value;
        phase += pop_count(position.pieces(color, BISHOP)) as Value;
        phase += 2 * pop_count(position.pieces(color, ROOK)) as Value;
        phase += 4 * pop_count(position.pieces(color, QUEEN)) as Value;
    }
    ((phase * 256 + TOTAL_PHASE / 2) / TOTAL_PHASE).min(256)
}


fn material(position: &Position, us: Color) -> Value {
    let mut material = 0;
    for piece_type in PAWN..KING {
        material += pop_count(position.pieces(us, piece_type)) as Value *
                    PIECE_VALUES[piece_type];
    }
    material
}


fn piece_squares(position: &Position, us: Color) -> Value {
    let mut score = 0;
    for &(piece_type, table) in [(PAWN, &PST_PAWN),
                                 (KNIGHT, &PST_KNIGHT),
                                 (BISHOP, &PST_BISHOP),
                                 (ROOK, &PST_ROOK),
                                 (KING, &PST_KING_MIDDLE)]
        .iter()
    {
        let mut pieces = position.pieces(us, piece_type);
        while pieces != 0 {
            let square = bsf_reset(&mut pieces);
            // Black squares are mirrored by flipping the rank.
            score += table[if us == WHITE { square } else { square ^ 56 }];
        }
    }
    score
}


fn pawn_structure(position: &Position, us: Color) -> Value {
    let them = 1 ^ us;
    let our_pawns = position.pieces(us, PAWN);
    let enemy_pawns = position.pieces(them, PAWN);
    let mut score = 0;
    let mut pawns = our_pawns;
    while pawns != 0 {
        let square = bsf_reset(&mut pawns);
        let f = file(square);
        let r = rank(square);

        if pop_count(our_pawns & bb_file(square)) > 1 {
            score -= 10; // doubled
        }

        let mut adjacent_files = 0;
        if f > 0 {
            adjacent_files |= bb_file_number(f - 1);
        }
        if f < 7 {
            adjacent_files |= bb_file_number(f + 1);
        }
        let isolated = our_pawns & adjacent_files == 0;
        if isolated {
            score -= 15;
        }

        // The front span (own file plus adjacent files, all ranks
        // ahead) must be free of enemy pawns for the pawn to be
        // passed.
        let ranks_ahead: Bitboard = if us == WHITE {
            BB_UNIVERSAL_SET << 8 << (8 * r)
        } else {
            BB_UNIVERSAL_SET >> 8 >> (8 * (7 - r))
        };
        let front_span = ranks_ahead & (bb_file(square) | adjacent_files);
        if enemy_pawns & front_span == 0 {
            let advancement = (if us == WHITE { r - 1 } else { 6 - r }) as Value;
            score += 20 + 10 * advancement;
        } else {
            // Not passed. A pawn with no adjacent-file support from
            // behind (nor on its own rank) is backward.
            let ranks_behind: Bitboard = if us == WHITE {
                !(BB_UNIVERSAL_SET << 8 << (8 * r))
            } else {
                !(BB_UNIVERSAL_SET >> 8 >> (8 * (7 - r)))
            };
            let support = ranks_behind & adjacent_files;
            if our_pawns & support == 0 && isolated {
                score -= 12;
            }
        }

        // A pawn defended by an own pawn is part of a chain.
        if position.geometry().pawn_attacks_from(them, square) & our_pawns != 0 {
            score += 5;
        }
    }
    score
}


/// Evaluates the pawn shelter and the files around the king.
///
/// The shelter squares are checked at ranks 2 and 3 for white (7 and
/// 6 for black) regardless of where the king actually stands.
fn king_safety(position: &Position, us: Color) -> Value {
    let king_file = file(position.king_square(us));
    let our_pawns = position.pieces(us, PAWN);
    let all_pawns = position.pieces_of_type(PAWN);
    let mut score = 0;
    for f in king_file.saturating_sub(1)..=(king_file + 1).min(7) {
        let (near_rank, far_rank) = if us == WHITE {
            (RANK_2, RANK_3)
        } else {
            (RANK_7, RANK_6)
        };
        if our_pawns & (1 << square(f, near_rank)) != 0 {
            score += 10;
        }
        if our_pawns & (1 << square(f, far_rank)) != 0 {
            score += 5;
        }
        if all_pawns & bb_file_number(f) == 0 {
            score -= 20; // open file near the king
        }
    }
    score
}


/// Counts the pseudo-legal destination squares of the knights,
/// bishops, rooks, and queens, at 2 centipawns each.
fn mobility(position: &Position, us: Color) -> Value {
    let geometry = position.geometry();
    let occupied = position.occupied();
    let not_ours = !position.occupied_by(us);
    let mut mobility = 0;
    for piece_type in KNIGHT..KING {
        let mut pieces = position.pieces(us, piece_type);
        while pieces != 0 {
            let square = bsf_reset(&mut pieces);
            mobility += pop_count(geometry.attacks_from(piece_type, square, occupied) &
                                  not_ours) as Value;
        }
    }
    2 * mobility
}


/// Penalizes undeveloped pieces and premature queen sorties, rewards
/// castling and central pawns.
fn development(position: &Position, us: Color) -> Value {
    let (minor_homes, rook_homes, queen_home) = if us == WHITE {
        ([(B1, KNIGHT, 20), (G1, KNIGHT, 20), (C1, BISHOP, 15), (F1, BISHOP, 15)],
         [A1, H1],
         D1)
    } else {
        ([(B8, KNIGHT, 20), (G8, KNIGHT, 20), (C8, BISHOP, 15), (F8, BISHOP, 15)],
         [A8, H8],
         D8)
    };
    let mut score = 0;
    let mut minors_developed = 0;
    for &(sq, piece_type, penalty) in minor_homes.iter() {
        if position.piece_at(sq) == piece(us, piece_type) {
            score -= penalty;
        } else {
            minors_developed += 1;
        }
    }
    for &sq in rook_homes.iter() {
        if position.piece_at(sq) == piece(us, ROOK) {
            score -= 5;
        }
    }

    // A queen that has left its square before two minor pieces were
    // developed is out too early.
    let queens = position.pieces(us, QUEEN);
    if queens != 0 && queens & (1 << queen_home) == 0 && minors_developed < 2 {
        score -= 30;
    }

    // A castled king.
    let king_square = position.king_square(us);
    if (us == WHITE && (king_square == G1 || king_square == C1)) ||
       (us == BLACK && (king_square == G8 || king_square == C8)) {
        score += 40;
    }

    // Pawns occupying the center.
    for &sq in (if us == WHITE { [D4, E4] } else { [D5, E5] }).iter() {
        if position.piece_at(sq) == piece(us, PAWN) {
            score += 50;
        }
    }
    score
}


fn rooks(position: &Position, us: Color) -> Value {
    let our_pawns = position.pieces(us, PAWN);
    let enemy_pawns = position.pieces(1 ^ us, PAWN);
    let seventh_rank = if us == WHITE { RANK_7 } else { RANK_2 };
    let mut score = 0;
    let mut rooks = position.pieces(us, ROOK);
    while rooks != 0 {
        let square = bsf_reset(&mut rooks);
        let file_mask = bb_file(square);
        if our_pawns & file_mask == 0 {
            score += if enemy_pawns & file_mask == 0 {
                25 // open file
            } else {
                15 // semi-open file
            };
        }
        if rank(square) == seventh_rank {
            score += 20;
        }
    }
    score
}


fn bishops(position: &Position, us: Color) -> Value {
    if pop_count(position.pieces(us, BISHOP)) >= 2 {
        30 // the bishop pair
    } else {
        0
    }
}


/// Detects knight outposts: a knight on ranks 4-6 (3-5 for black),
/// defended by an own pawn, that no enemy pawn on an adjacent file
/// can ever attack.
fn knights(position: &Position, us: Color) -> Value {
    let them = 1 ^ us;
    let our_pawns = position.pieces(us, PAWN);
    let enemy_pawns = position.pieces(them, PAWN);
    let mut score = 0;
    let mut knights = position.pieces(us, KNIGHT);
    while knights != 0 {
        let square = bsf_reset(&mut knights);
        let f = file(square);
        let r = rank(square);
        let outpost_rank = if us == WHITE {
            r >= RANK_4 && r <= RANK_6
        } else {
            r >= RANK_3 && r <= RANK_5
        };
        if !outpost_rank {
            continue;
        }
        if position.geometry().pawn_attacks_from(them, square) & our_pawns == 0 {
            continue; // not defended by a pawn
        }

        // Enemy pawns on adjacent files, on the knight's rank or
        // ahead of it, could eventually advance and kick the knight.
        let ranks_from_here: Bitboard = if us == WHITE {
            BB_UNIVERSAL_SET << (8 * r)
        } else {
            BB_UNIVERSAL_SET >> (8 * (7 - r))
        };
        let mut adjacent_files = 0;
        if f > 0 {
            adjacent_files |= bb_file_number(f - 1);
        }
        if f < 7 {
            adjacent_files |= bb_file_number(f + 1);
        }
        if enemy_pawns & adjacent_files & ranks_from_here == 0 {
            score += if f >= FILE_C && f <= FILE_F {
                35 // a central outpost
            } else {
                25
            };
        }
    }
    score
}


// Piece-square tables, from white's point of view (A1 is the first
// entry). Pawns are pushed hard towards the center and promotion;
// knights and bishops prefer the center; the middlegame king table
// rewards staying castled.

#[rustfmt::skip]
const PST_PAWN: [Value; 64] = [
     0,   0,   0,   0,   0,   0,   0,   0,
     5,  10,  10, -20, -20,  10,  10,   5,
     5,  10,  20,  40,  40,  20,  10,   5,
    10,  15,  30,  70,  70,  30,  15,  10,
    15,  20,  35,  80,  80,  35,  20,  15,
    20,  25,  30,  35,  35,  30,  25,  20,
    50,  50,  50,  50,  50,  50,  50,  50,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PST_KNIGHT: [Value; 64] = [
   -50, -40, -30, -25, -25, -30, -40, -50,
   -40, -20,   0,   5,   5,   0, -20, -40,
   -30,   5,  10,  15,  15,  10,   5, -30,
   -25,   5,  15,  20,  20,  15,   5, -25,
   -25,   5,  15,  20,  20,  15,   5, -25,
   -30,   5,  10,  15,  15,  10,   5, -30,
   -40, -20,   0,   5,   5,   0, -20, -40,
   -50, -40, -30, -25, -25, -30, -40, -50,
];

#[rustfmt::skip]
const PST_BISHOP: [Value; 64] = [
   -20, -10, -10, -10, -10, -10, -10, -20,
   -10,   5,   0,   0,   0,   0,   5, -10,
   -10,  10,  10,  10,  10,  10,  10, -10,
   -10,   0,  10,  15,  15,  10,   0, -10,
   -10,   5,   5,  15,  15,   5,   5, -10,
   -10,   0,   5,  10,  10,   5,   0, -10,
   -10,   5,   0,   0,   0,   0,   5, -10,
   -20, -10, -10, -10, -10, -10, -10, -20,
];

#[rustfmt::skip]
const PST_ROOK: [Value; 64] = [
     0,   0,   0,   5,   5,   0,   0,   0,
    20,  20,  20,  20,  20,  20,  20,  20,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
    -5,   0,   0,   0,   0,   0,   0,  -5,
     0,   0,   0,   0,   0,   0,   0,   0,
];

#[rustfmt::skip]
const PST_KING_MIDDLE: [Value; 64] = [
    20,  30,  10,   0,   0,  10,  30,  20,
   -10, -20, -20, -20, -20, -20, -20, -10,
   -20, -30, -30, -40, -40, -30, -30, -20,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
   -30, -40, -40, -50, -50, -40, -40, -30,
];


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn startpos_is_balanced() {
        let p = Position::new();
        assert_eq!(evaluate(&p), 0);
        assert_eq!(game_phase(&p), 256);
    }

    #[test]
    fn phase_tapers_to_endgame() {
        let p = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(game_phase(&p), 0);
        let p = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        assert!(game_phase(&p) > 0);
    }

    #[test]
    fn material_advantage_dominates() {
        let p = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 w - - 0 1").unwrap();
        assert!(evaluate(&p) > 500);
        // The same position from black's point of view.
        let p = Position::from_fen("4k3/8/8/8/8/8/8/Q3K3 b - - 0 1").unwrap();
        assert!(evaluate(&p) < -500);
    }

    #[test]
    fn bishop_pair_bonus() {
        let one = Position::from_fen("4k3/8/8/8/8/8/8/2B1K3 w - - 0 1").unwrap();
        let two = Position::from_fen("4k3/8/8/8/8/8/8/2BBK3 w - - 0 1").unwrap();
        assert!(evaluate(&two) > evaluate(&one) + PIECE_VALUES[BISHOP] / 2);
    }

    #[test]
    fn passed_pawn_is_rewarded() {
        // A white pawn on e5 with no black pawns in its way, versus
        // the same pawn facing a blocking enemy pawn.
        let passed = Position::from_fen("4k3/8/8/4P3/8/8/8/4K3 w - - 0 1").unwrap();
        let blocked = Position::from_fen("4k3/4p3/8/4P3/8/8/8/4K3 w - - 0 1").unwrap();
        assert!(evaluate(&passed) > evaluate(&blocked));
    }

    #[test]
    fn rook_likes_open_files() {
        // On a1 the rook sits behind its own pawn; on d1 its file is
        // open.
        let behind_pawn = Position::from_fen("4k3/8/8/8/8/8/P7/R3K3 w - - 0 1").unwrap();
        let open_file = Position::from_fen("4k3/8/8/8/8/8/P7/3RK3 w - - 0 1").unwrap();
        assert!(evaluate(&open_file) > evaluate(&behind_pawn));
    }

    #[test]
    fn development_counts_in_the_opening() {
        // After 1. e4 white has a center pawn and a half-open
        // diagonal; the evaluation must not favor black.
        let mut p = Position::new();
        assert!(crate::movegen::try_move(&mut p, "e2e4"));
        assert!(evaluate(&p) < 0); // black to move, white is better
    }
}
