//! Implements `Position` -- the chess board state machine.

use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;
use crate::basetypes::*;
use crate::bitsets::*;
use crate::files::file;
use crate::geometry::BoardGeometry;
use crate::moves::*;
use crate::ranks::{rank, RANK_3, RANK_6};
use crate::squares::*;
use crate::value::{Value, PIECE_VALUES};
use crate::zobrist::ZobristKeys;


/// The starting position.
pub const START_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

/// The set of light squares (B1, D1, ..., G8).
const BB_LIGHT_SQUARES: Bitboard = 0x55aa55aa55aa55aa;


/// An error signalling that a FEN string can not be parsed, or
/// describes an impossible board.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IllegalPosition;


/// Everything that has to be remembered in order to take a move back.
///
/// One record is pushed by every (null-)move done, and popped by the
/// corresponding undo. This stack is the sole source of truth for
/// reversibility.
struct StateRecord {
    mv: Move,
    captured: Piece,
    castling: CastlingRights,
    enpassant_square: Option<Square>,
    halfmove_clock: u32,
    hash: u64,
}


/// Represents a complete chess position.
///
/// `Position` holds bitboards indexed by piece type and by color, a
/// parallel 64-entry mailbox for constant-time piece-at-square
/// queries, the side to move, the castling rights, the en-passant
/// target square, the two move counters, an incrementally maintained
/// Zobrist hash, and the stack of state records used for taking moves
/// back.
///
/// A position is created empty and populated by FEN parsing. After
/// that it is mutated only by `do_move`/`undo_move` (and their null
/// move siblings).
pub struct Position {
    geometry: &'static BoardGeometry,
    zobrist: &'static ZobristKeys,
    by_type: [Bitboard; 6],
    by_color: [Bitboard; 2],
    board: [Piece; 64],
    to_move: Color,
    castling: CastlingRights,
    enpassant_square: Option<Square>,
    halfmove_clock: u32,
    fullmove_number: u32,
    hash: u64,
    history: Vec<StateRecord>,
}

impl Position {
    /// Creates a new instance, set to the starting position.
    pub fn new() -> Position {
        Position::from_fen(START_FEN).unwrap()
    }

    /// Creates a new instance from a FEN string.
    ///
    /// Returns `Err(IllegalPosition)` when the string is not a valid
    /// six-field FEN, or when one of the sides does not have exactly
    /// one king. On failure no partially populated position escapes.
    pub fn from_fen(fen: &str) -> Result<Position, IllegalPosition> {
        let fields: Vec<_> = fen.split_whitespace().collect();
        if fields.len() != 6 {
            return Err(IllegalPosition);
        }
        let mut p = Position {
            geometry: BoardGeometry::get(),
            zobrist: ZobristKeys::get(),
            by_type: [0; 6],
            by_color: [0; 2],
            board: [NO_PIECE; 64],
            to_move: WHITE,
            castling: NO_CASTLING,
            enpassant_square: None,
            halfmove_clock: 0,
            fullmove_number: 1,
            hash: 0,
            history: Vec::new(),
        };
        p.parse_piece_placement(fields[0])?;
        p.to_move = match fields[1] {
            "w" => WHITE,
            "b" => BLACK,
            _ => return Err(IllegalPosition),
        };
        p.castling = parse_castling_rights(fields[2])?;
        p.enpassant_square = match fields[3] {
            "-" => None,
            s => {
                let square = parse_square(s)?;
                match p.to_move {
                    WHITE if rank(square) == RANK_6 => Some(square),
                    BLACK if rank(square) == RANK_3 => Some(square),
                    _ => return Err(IllegalPosition),
                }
            }
        };
        p.halfmove_clock = fields[4].parse::<u32>().map_err(|_| IllegalPosition)?;
        p.fullmove_number = fields[5].parse::<u32>().map_err(|_| IllegalPosition)?;
        if p.fullmove_number < 1 || p.fullmove_number > 9000 {
            return Err(IllegalPosition);
        }
        if pop_count(p.pieces(WHITE, KING)) != 1 || pop_count(p.pieces(BLACK, KING)) != 1 {
            return Err(IllegalPosition);
        }

        // The piece-square keys have been XOR-ed in while the pieces
        // were being put on the board.
        if p.to_move == BLACK {
            p.hash ^= p.zobrist.to_move;
        }
        p.hash ^= p.zobrist.castling_rights[p.castling];
        p.hash ^= p.enpassant_hash(p.enpassant_square, p.to_move);
        Ok(p)
    }

    /// Returns the position in Forsyth-Edwards Notation.
    pub fn to_fen(&self) -> String {
        let mut fen = String::new();
        for rank in (0..8).rev() {
            let mut empty = 0;
            for file in 0..8 {
                let piece = self.board[square(file, rank)];
                if piece == NO_PIECE {
                    empty += 1;
                } else {
                    if empty > 0 {
                        fen.push_str(&empty.to_string());
                        empty = 0;
                    }
                    let c = b"pnbrqk"[type_of(piece)] as char;
                    fen.push(if color_of(piece) == WHITE {
                        c.to_ascii_uppercase()
                    } else {
                        c
                    });
                }
            }
            if empty > 0 {
                fen.push_str(&empty.to_string());
            }
            if rank > 0 {
                fen.push('/');
            }
        }
        fen.push_str(if self.to_move == WHITE { " w " } else { " b " });
        if self.castling == NO_CASTLING {
            fen.push('-');
        } else {
            for (right, c) in [(WHITE_OO, 'K'), (WHITE_OOO, 'Q'), (BLACK_OO, 'k'),
                               (BLACK_OOO, 'q')]
                .iter()
            {
                if self.castling & right != 0 {
                    fen.push(*c);
                }
            }
        }
        fen.push(' ');
        fen.push_str(&self.enpassant_square
            .map_or("-".to_string(), square_to_string));
        fen.push_str(&format!(" {} {}", self.halfmove_clock, self.fullmove_number));
        fen
    }

    /// Returns the piece on a given square (`NO_PIECE` for an empty
    /// square).
    #[inline]
    pub fn piece_at(&self, square: Square) -> Piece {
        debug_assert!(square <= 63);
        self.board[square]
    }

    /// Returns the set of squares occupied by pieces of a given color
    /// and type.
    #[inline]
    pub fn pieces(&self, color: Color, piece_type: PieceType) -> Bitboard {
        self.by_color[color] & self.by_type[piece_type]
    }

    /// Returns the set of squares occupied by pieces of a given type
    /// (both colors).
    #[inline]
    pub fn pieces_of_type(&self, piece_type: PieceType) -> Bitboard {
        self.by_type[piece_type]
    }

    /// Returns the set of squares occupied by a given color.
    #[inline]
    pub fn occupied_by(&self, color: Color) -> Bitboard {
        self.by_color[color]
    }

    /// Returns the set of all occupied squares.
    #[inline]
    pub fn occupied(&self) -> Bitboard {
        self.by_color[WHITE] | self.by_color[BLACK]
    }

    #[inline]
    pub fn to_move(&self) -> Color {
        self.to_move
    }

    #[inline]
    pub fn castling_rights(&self) -> CastlingRights {
        self.castling
    }

    #[inline]
    pub fn enpassant_square(&self) -> Option<Square> {
        self.enpassant_square
    }

    #[inline]
    pub fn halfmove_clock(&self) -> u32 {
        self.halfmove_clock
    }

    #[inline]
    pub fn fullmove_number(&self) -> u32 {
        self.fullmove_number
    }

    /// Returns the Zobrist hash of the position.
    #[inline]
    pub fn hash(&self) -> u64 {
        self.hash
    }

    /// Returns the global board geometry tables.
    #[inline]
    pub fn geometry(&self) -> &'static BoardGeometry {
        self.geometry
    }

    /// Returns the number of state records on the history stack.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Returns the square of the king of a given color.
    #[inline]
    pub fn king_square(&self, color: Color) -> Square {
        debug_assert!(self.pieces(color, KING) != 0);
        bsf(self.pieces(color, KING))
    }

    /// Returns the summed value of the pieces (pawns to queens) of a
    /// given color.
    pub fn material_count(&self, color: Color) -> Value {
        let mut material = 0;
        for piece_type in PAWN..KING {
            material += pop_count(self.pieces(color, piece_type)) as Value *
                        PIECE_VALUES[piece_type];
        }
        material
    }

    /// Plays a move on the board.
    ///
    /// The move **must** have been generated for this exact position.
    /// A state record is pushed so that `undo_move` can take the move
    /// back.
    pub fn do_move(&mut self, mv: Move) {
        let orig_square = mv.orig_square();
        let dest_square = mv.dest_square();
        let us = self.to_move;
        let piece_type = type_of(self.board[orig_square]);
        self.history.push(StateRecord {
            mv,
            captured: NO_PIECE,
            castling: self.castling,
            enpassant_square: self.enpassant_square,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });

        // Remove the old en-passant file and castling rights from the
        // hash.
        self.hash ^= self.enpassant_hash(self.enpassant_square, us);
        self.hash ^= self.zobrist.castling_rights[self.castling];
        self.enpassant_square = None;
        self.halfmove_clock += 1;

        match mv.move_type() {
            MOVE_NORMAL => {
                if self.board[dest_square] != NO_PIECE {
                    self.history.last_mut().unwrap().captured = self.board[dest_square];
                    self.remove_piece(dest_square);
                    self.halfmove_clock = 0;
                }
                if piece_type == PAWN {
                    self.halfmove_clock = 0;
                    if dest_square.wrapping_sub(orig_square) == 16 {
                        self.enpassant_square = Some(orig_square + 8);
                    } else if orig_square.wrapping_sub(dest_square) == 16 {
                        self.enpassant_square = Some(orig_square - 8);
                    }
                }
                self.move_piece(orig_square, dest_square);
            }
            MOVE_PROMOTION => {
                if self.board[dest_square] != NO_PIECE {
                    self.history.last_mut().unwrap().captured = self.board[dest_square];
                    self.remove_piece(dest_square);
                }
                self.remove_piece(orig_square);
                self.put_piece(piece(us, mv.promoted_piece_type()), dest_square);
                self.halfmove_clock = 0;
            }
            MOVE_ENPASSANT => {
                let captured_square = if us == WHITE {
                    dest_square - 8
                } else {
                    dest_square + 8
                };
                self.history.last_mut().unwrap().captured = self.board[captured_square];
                self.remove_piece(captured_square);
                self.move_piece(orig_square, dest_square);
                self.halfmove_clock = 0;
            }
            _ => {
                // Castling: move the king, then move the rook from
                // its corner to the adjacent square.
                self.move_piece(orig_square, dest_square);
                let home_rank = rank(orig_square);
                if dest_square > orig_square {
                    self.move_piece(square(7, home_rank), square(5, home_rank));
                } else {
                    self.move_piece(square(0, home_rank), square(3, home_rank));
                }
            }
        }

        // Update the castling rights. A king move clears both of its
        // side's rights; any move from or to a corner square clears
        // the corresponding right.
        if piece_type == KING {
            self.castling &= if us == WHITE {
                !(WHITE_OO | WHITE_OOO)
            } else {
                !(BLACK_OO | BLACK_OOO)
            };
        }
        for &(corner, right) in [(A1, WHITE_OOO), (H1, WHITE_OO), (A8, BLACK_OOO),
                                 (H8, BLACK_OO)]
            .iter()
        {
            if orig_square == corner || dest_square == corner {
                self.castling &= !right;
            }
        }

        // XOR the new castling rights and en-passant file into the
        // hash, and flip the side to move.
        self.hash ^= self.zobrist.castling_rights[self.castling];
        self.to_move = 1 ^ us;
        self.hash ^= self.zobrist.to_move;
        self.hash ^= self.enpassant_hash(self.enpassant_square, self.to_move);
        if self.to_move == WHITE {
            self.fullmove_number += 1;
        }
    }

    /// Takes the last played move back.
    pub fn undo_move(&mut self) {
        let record = self.history.pop().expect("no move to undo");
        let mv = record.mv;
        let orig_square = mv.orig_square();
        let dest_square = mv.dest_square();
        self.to_move ^= 1;
        let us = self.to_move;
        if us == BLACK {
            self.fullmove_number -= 1;
        }

        match mv.move_type() {
            MOVE_NORMAL => {
                let piece = self.board[dest_square];
                self.remove_piece(dest_square);
                self.put_piece(piece, orig_square);
                if record.captured != NO_PIECE {
                    self.put_piece(record.captured, dest_square);
                }
            }
            MOVE_PROMOTION => {
                self.remove_piece(dest_square);
                self.put_piece(piece(us, PAWN), orig_square);
                if record.captured != NO_PIECE {
                    self.put_piece(record.captured, dest_square);
                }
            }
            MOVE_ENPASSANT => {
                let pawn = self.board[dest_square];
                self.remove_piece(dest_square);
                self.put_piece(pawn, orig_square);
                let captured_square = if us == WHITE {
                    dest_square - 8
                } else {
                    dest_square + 8
                };
                self.put_piece(record.captured, captured_square);
            }
            _ => {
                let king = self.board[dest_square];
                self.remove_piece(dest_square);
                self.put_piece(king, orig_square);
                let home_rank = rank(orig_square);
                let (rook_orig, rook_dest) = if dest_square > orig_square {
                    (square(7, home_rank), square(5, home_rank))
                } else {
                    (square(0, home_rank), square(3, home_rank))
                };
                let rook = self.board[rook_dest];
                self.remove_piece(rook_dest);
                self.put_piece(rook, rook_orig);
            }
        }

        // Restore the rest of the state, including the hash, from the
        // record. (The piece shuffling above has XOR-ed piece-square
        // keys into the hash; the assignment makes that irrelevant.)
        self.castling = record.castling;
        self.enpassant_square = record.enpassant_square;
        self.halfmove_clock = record.halfmove_clock;
        self.hash = record.hash;
    }

    /// Passes the turn to the opponent without playing a move.
    ///
    /// Used by the search for null move pruning, and nowhere else.
    pub fn do_null_move(&mut self) {
        self.history.push(StateRecord {
            mv: Move::invalid(),
            captured: NO_PIECE,
            castling: self.castling,
            enpassant_square: self.enpassant_square,
            halfmove_clock: self.halfmove_clock,
            hash: self.hash,
        });
        self.hash ^= self.enpassant_hash(self.enpassant_square, self.to_move);
        self.enpassant_square = None;
        self.halfmove_clock += 1;
        self.to_move ^= 1;
        self.hash ^= self.zobrist.to_move;
        if self.to_move == WHITE {
            self.fullmove_number += 1;
        }
    }

    /// Takes the last null move back.
    pub fn undo_null_move(&mut self) {
        let record = self.history.pop().expect("no move to undo");
        debug_assert!(record.mv.is_invalid());
        self.to_move ^= 1;
        if self.to_move == BLACK {
            self.fullmove_number -= 1;
        }
        self.castling = record.castling;
        self.enpassant_square = record.enpassant_square;
        self.halfmove_clock = record.halfmove_clock;
        self.hash = record.hash;
    }

    /// Returns the set of pieces of both colors that attack a given
    /// square directly (no x-rays).
    pub fn attacks_to(&self, square: Square) -> Bitboard {
        let geometry = self.geometry;
        let occupied = self.occupied();
        geometry.pawn_attacks_from(WHITE, square) & self.pieces(BLACK, PAWN) |
        geometry.pawn_attacks_from(BLACK, square) & self.pieces(WHITE, PAWN) |
        geometry.attacks_from(KNIGHT, square, occupied) & self.by_type[KNIGHT] |
        geometry.attacks_from(KING, square, occupied) & self.by_type[KING] |
        geometry.attacks_from(BISHOP, square, occupied) &
        (self.by_type[BISHOP] | self.by_type[QUEEN]) |
        geometry.attacks_from(ROOK, square, occupied) &
        (self.by_type[ROOK] | self.by_type[QUEEN])
    }

    /// Returns whether a given square is attacked by at least one
    /// piece of a given color.
    pub fn is_attacked(&self, square: Square, attacker: Color) -> bool {
        let geometry = self.geometry;
        if geometry.pawn_attacks_from(1 ^ attacker, square) & self.pieces(attacker, PAWN) != 0 {
            return true;
        }
        if geometry.attacks_from(KNIGHT, square, 0) & self.pieces(attacker, KNIGHT) != 0 {
            return true;
        }
        if geometry.attacks_from(KING, square, 0) & self.pieces(attacker, KING) != 0 {
            return true;
        }
        let occupied = self.occupied();
        if geometry.attacks_from(BISHOP, square, occupied) &
           (self.pieces(attacker, BISHOP) | self.pieces(attacker, QUEEN)) != 0 {
            return true;
        }
        geometry.attacks_from(ROOK, square, occupied) &
        (self.pieces(attacker, ROOK) | self.pieces(attacker, QUEEN)) != 0
    }

    /// Returns whether the king of the side to move is in check.
    #[inline]
    pub fn in_check(&self) -> bool {
        self.is_attacked(self.king_square(self.to_move), 1 ^ self.to_move)
    }

    /// Returns the set of pieces of a given color whose removal would
    /// expose their own king to an enemy slider.
    ///
    /// The calculation casts x-ray attacks from the king outward: a
    /// rook ray (respectively bishop ray) that, with own blockers
    /// removed, would hit an enemy rook-or-queen (respectively
    /// bishop-or-queen), pins the single own piece standing between
    /// the king and the attacker.
    pub fn pinned_pieces(&self, color: Color) -> Bitboard {
        let king_square = self.king_square(color);
        let occupied = self.occupied();
        let blockers = self.by_color[color];
        let them = 1 ^ color;
        let mut pinned = 0;
        for &slider in [ROOK, BISHOP].iter() {
            let mut pinners = self.xray_attacks(slider, king_square, blockers, occupied) &
                              (self.pieces(them, slider) | self.pieces(them, QUEEN));
            while pinners != 0 {
                let pinner_square = bsf_reset(&mut pinners);
                let between = self.geometry.between(king_square, pinner_square) & blockers;
                if pop_count(between) == 1 {
                    pinned |= between;
                }
            }
        }
        pinned
    }

    /// Returns whether the piece on a given square is pinned to its
    /// king.
    #[inline]
    pub fn is_pinned(&self, square: Square, color: Color) -> bool {
        self.pinned_pieces(color) & (1 << square) != 0
    }

    /// Statically evaluates the exchange initiated by a capture.
    ///
    /// The method examines the consequence of a series of exchanges
    /// on the destination square after the given move, and calculates
    /// the likely material to be lost or gained -- the swap-off
    /// value. A positive result indicates a "winning" capture. For
    /// example, PxQ will always be a win, since the pawn side can
    /// choose to stop the exchange after its pawn is recaptured, and
    /// still be ahead.
    ///
    /// The algorithm builds a swap-list of best case material gains
    /// by traversing the attacked/defended square in least valuable
    /// attacker order, with alternating sides, and negamaxes the list
    /// for the final evaluation. X-ray attacks uncovered by departing
    /// pieces are added as the occupancy shrinks.
    ///
    /// Returns `0` for non-captures.
    pub fn see(&self, mv: Move) -> Value {
        let orig_square = mv.orig_square();
        let dest_square = mv.dest_square();
        let attacker = self.board[orig_square];
        debug_assert!(attacker != NO_PIECE);
        let captured = if mv.move_type() == MOVE_ENPASSANT {
            piece(1 ^ color_of(attacker), PAWN)
        } else {
            self.board[dest_square]
        };
        if captured == NO_PIECE {
            return 0;
        }

        let geometry = self.geometry;
        let may_xray = self.by_type[PAWN] | self.by_type[BISHOP] | self.by_type[ROOK] |
                       self.by_type[QUEEN];
        let mut occupied = self.occupied();
        let mut attackers = self.attacks_to(dest_square) & occupied;
        let mut from_set = 1u64 << orig_square;
        let mut side = color_of(attacker);
        let mut attacker_type = type_of(attacker);
        let mut gain: [Value; 33] = [0; 33];
        let mut depth = 0;
        gain[0] = PIECE_VALUES[type_of(captured)];

        loop {
            depth += 1;
            side ^= 1;
            // Speculative store, assuming the capturer is recaptured.
            gain[depth] = PIECE_VALUES[attacker_type] - gain[depth - 1];
            if gain[depth].max(-gain[depth - 1]) < 0 {
                break;
            }
            attackers ^= from_set;
            occupied ^= from_set;
            if from_set & may_xray != 0 {
                attackers |= geometry.attacks_from(BISHOP, dest_square, occupied) &
                             (self.by_type[BISHOP] | self.by_type[QUEEN]) &
                             occupied;
                attackers |= geometry.attacks_from(ROOK, dest_square, occupied) &
                             (self.by_type[ROOK] | self.by_type[QUEEN]) &
                             occupied;
            }
            attackers &= occupied;

            // Find the least valuable attacker for the side to
            // recapture.
            from_set = 0;
            for piece_type in PAWN..=KING {
                let candidates = attackers & self.pieces(side, piece_type);
                if candidates != 0 {
                    attacker_type = piece_type;
                    from_set = lsb(candidates);
                    break;
                }
            }
            if from_set == 0 {
                break;
            }
        }

        // Discard the last speculative store, then negamax the swap
        // list.
        depth -= 1;
        while depth > 0 {
            gain[depth - 1] = -gain[depth].max(-gain[depth - 1]);
            depth -= 1;
        }
        gain[0]
    }

    /// Returns how many times the current position has occurred,
    /// counting the present occurrence.
    ///
    /// Only positions since the last irreversible move (a capture, a
    /// pawn move, or a castling-rights change accompanied by a clock
    /// reset) can repeat, so the scan is bounded by the halfmove
    /// clock.
    pub fn repetition_count(&self) -> usize {
        1 +
        self.history
            .iter()
            .rev()
            .take(self.halfmove_clock as usize)
            .filter(|record| record.hash == self.hash)
            .count()
    }

    /// Returns whether the current position has occurred at least
    /// three times.
    pub fn is_threefold_repetition(&self) -> bool {
        self.repetition_count() >= 3
    }

    /// Returns whether neither side has enough material to deliver a
    /// checkmate.
    ///
    /// Covered: king against king, king and one minor piece against
    /// king, and king and bishop against king and bishop with both
    /// bishops on squares of the same color. Two knights are not
    /// considered insufficient.
    pub fn is_insufficient_material(&self) -> bool {
        if self.by_type[PAWN] | self.by_type[ROOK] | self.by_type[QUEEN] != 0 {
            return false;
        }
        let minors = self.by_type[KNIGHT] | self.by_type[BISHOP];
        match pop_count(minors) {
            0 | 1 => true,
            2 => {
                let bishops = self.by_type[BISHOP];
                pop_count(self.pieces(WHITE, BISHOP)) == 1 &&
                pop_count(self.pieces(BLACK, BISHOP)) == 1 &&
                (bishops & BB_LIGHT_SQUARES == bishops || bishops & BB_LIGHT_SQUARES == 0)
            }
            _ => false,
        }
    }

    /// Returns whether the position is a draw by insufficient
    /// material, by the fifty-move rule, or by threefold repetition.
    ///
    /// Checkmate takes precedence over the fifty-move rule, but that
    /// is for the caller to verify.
    pub fn is_draw(&self) -> bool {
        self.is_insufficient_material() || self.halfmove_clock >= 100 ||
        self.is_threefold_repetition()
    }

    /// Recomputes the Zobrist hash from scratch.
    ///
    /// The result must always be equal to the incrementally
    /// maintained hash -- used by sanity checks in the tests.
    pub fn compute_hash(&self) -> u64 {
        let mut hash = 0;
        for square in 0..64 {
            let piece = self.board[square];
            if piece != NO_PIECE {
                hash ^= self.zobrist.pieces[color_of(piece)][type_of(piece)][square];
            }
        }
        if self.to_move == BLACK {
            hash ^= self.zobrist.to_move;
        }
        hash ^= self.zobrist.castling_rights[self.castling];
        hash ^ self.enpassant_hash(self.enpassant_square, self.to_move)
    }

    /// Returns the en-passant hash contribution for a given target
    /// square.
    ///
    /// The en-passant file key participates in the hash only when a
    /// pawn of the capturing side (`capturer`) stands ready to take
    /// on the target square. Positions that differ only in a
    /// non-capturable en-passant square therefore hash identically.
    fn enpassant_hash(&self, enpassant_square: Option<Square>, capturer: Color) -> u64 {
        match enpassant_square {
            Some(square) if self.geometry.pawn_attacks_from(1 ^ capturer, square) &
                            self.pieces(capturer, PAWN) != 0 => {
                self.zobrist.enpassant_file[file(square)]
            }
            _ => 0,
        }
    }

    /// A helper method for `pinned_pieces`. It returns the set of
    /// squares attacked by a slider from a given square, pretending
    /// that the given blockers are transparent.
    fn xray_attacks(&self,
                    slider: PieceType,
                    square: Square,
                    blockers: Bitboard,
                    occupied: Bitboard)
                    -> Bitboard {
        let attacks = self.geometry.attacks_from(slider, square, occupied);
        self.geometry.attacks_from(slider, square, occupied ^ (blockers & attacks))
    }

    fn put_piece(&mut self, piece: Piece, square: Square) {
        debug_assert!(self.board[square] == NO_PIECE);
        let color = color_of(piece);
        let piece_type = type_of(piece);
        self.by_type[piece_type] |= 1 << square;
        self.by_color[color] |= 1 << square;
        self.board[square] = piece;
        self.hash ^= self.zobrist.pieces[color][piece_type][square];
    }

    fn remove_piece(&mut self, square: Square) {
        let piece = self.board[square];
        debug_assert!(piece != NO_PIECE);
        let color = color_of(piece);
        let piece_type = type_of(piece);
        self.by_type[piece_type] &= !(1 << square);
        self.by_color[color] &= !(1 << square);
        self.board[square] = NO_PIECE;
        self.hash ^= self.zobrist.pieces[color][piece_type][square];
    }

    fn move_piece(&mut self, orig_square: Square, dest_square: Square) {
        let piece = self.board[orig_square];
        self.remove_piece(orig_square);
        self.put_piece(piece, dest_square);
    }

    /// A helper method for `from_fen`. It parses the piece placement
    /// field, putting the pieces on the (empty) board.
    fn parse_piece_placement(&mut self, s: &str) -> Result<(), IllegalPosition> {
        // FEN describes the board starting from A8 and going toward
        // H1.
        let mut file = 0;
        let mut rank = 7;
        for c in s.chars() {
            match c {
                '/' => {
                    if file != 8 || rank == 0 {
                        return Err(IllegalPosition);
                    }
                    file = 0;
                    rank -= 1;
                }
                '1'..='8' => {
                    file += c.to_digit(9).unwrap() as usize;
                    if file > 8 {
                        return Err(IllegalPosition);
                    }
                }
                _ => {
                    let color = if c.is_uppercase() { WHITE } else { BLACK };
                    let piece_type = match c.to_ascii_lowercase() {
                        'p' => PAWN,
                        'n' => KNIGHT,
                        'b' => BISHOP,
                        'r' => ROOK,
                        'q' => QUEEN,
                        'k' => KING,
                        _ => return Err(IllegalPosition),
                    };
                    if file > 7 {
                        return Err(IllegalPosition);
                    }
                    self.put_piece(piece(color, piece_type), square(file, rank));
                    file += 1;
                }
            }
        }
        // Make sure that all squares were initialized.
        if file != 8 || rank != 0 {
            return Err(IllegalPosition);
        }
        Ok(())
    }
}

impl fmt::Display for Position {
    /// Renders an ASCII diagram of the board, and the FEN below it.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for rank in (0..8).rev() {
            write!(f, "{} ", rank + 1)?;
            for file in 0..8 {
                let piece = self.board[square(file, rank)];
                if piece == NO_PIECE {
                    write!(f, ". ")?;
                } else {
                    let c = b"PNBRQK"[type_of(piece)] as char;
                    write!(f,
                           "{} ",
                           if color_of(piece) == BLACK {
                               c.to_ascii_lowercase()
                           } else {
                               c
                           })?;
                }
            }
            writeln!(f)?;
        }
        writeln!(f, "  a b c d e f g h")?;
        write!(f, "FEN: {}", self.to_fen())
    }
}


/// Parses a square in algebraic notation (lowercase only).
pub fn parse_square(s: &str) -> Result<Square, IllegalPosition> {
    lazy_static! {
        static ref RE: Regex = Regex::new(r"^[a-h][1-8]$").unwrap();
    }
    if RE.is_match(s) {
        let mut chars = s.chars();
        let file = (chars.next().unwrap().to_digit(18).unwrap() - 10) as usize;
        let rank = (chars.next().unwrap().to_digit(9).unwrap() - 1) as usize;
        Ok(square(file, rank))
    } else {
        Err(IllegalPosition)
    }
}


/// A helper function for `Position::from_fen`. It parses the castling
/// rights field.
fn parse_castling_rights(s: &str) -> Result<CastlingRights, IllegalPosition> {
    let mut rights = NO_CASTLING;
    if s != "-" {
        for c in s.chars() {
            let right = match c {
                'K' => WHITE_OO,
                'Q' => WHITE_OOO,
                'k' => BLACK_OO,
                'q' => BLACK_OOO,
                _ => return Err(IllegalPosition),
            };
            if rights & right != 0 {
                return Err(IllegalPosition);
            }
            rights |= right;
        }
    }
    Ok(rights)
}
