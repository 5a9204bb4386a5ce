//! Defines the endgame tablebase bridge.

use crate::basetypes::NO_CASTLING;
use crate::bitsets::pop_count;
use crate::moves::Move;
use crate::position::Position;
use crate::value::{Value, VALUE_MATE};


/// A win/draw/loss verdict from the tablebases, from the point of
/// view of the side to move.
///
/// "Cursed" wins and "blessed" losses are positions whose theoretical
/// outcome is spoiled by the fifty-move rule.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Wdl {
    Loss,
    BlessedLoss,
    Draw,
    CursedWin,
    Win,
}


/// The outcome of a successful root probe.
#[derive(Clone, Copy, Debug)]
pub struct ProbeResult {
    pub wdl: Wdl,

    /// Distance (in plies) to the next zeroing move -- a capture or
    /// a pawn move.
    pub dtz: i32,

    /// The best move according to the tablebases.
    pub best_move: Move,
}


/// The interface the search expects from a tablebase provider.
///
/// The search invokes `probe_root` only when `can_probe` answers
/// `true`, which requires that the number of men on the board is
/// within the provider's reach and that no castling rights remain.
/// A probe miss is a perfectly normal result; the search simply
/// proceeds on its own.
pub trait TablebaseProbe {
    /// Returns whether any tablebase files have been found.
    fn available(&self) -> bool;

    /// Returns the largest number of men the loaded tablebases cover.
    fn max_pieces(&self) -> usize;

    /// Probes the tables for the position at the root of the search.
    fn probe_root(&self, position: &mut Position) -> Option<ProbeResult>;

    /// Returns whether the given position can be probed at all.
    fn can_probe(&self, position: &Position) -> bool {
        self.available() && pop_count(position.occupied()) <= self.max_pieces() &&
        position.castling_rights() == NO_CASTLING
    }
}


/// A tablebase provider with no tablebases behind it.
///
/// Used when no tablebase path has been configured (the normal case);
/// every probe misses.
pub struct NullTablebase;

impl TablebaseProbe for NullTablebase {
    fn available(&self) -> bool {
        false
    }

    fn max_pieces(&self) -> usize {
        0
    }

    fn probe_root(&self, _position: &mut Position) -> Option<ProbeResult> {
        None
    }
}


/// Converts a win/draw/loss verdict to a score in centipawns.
///
/// Wins and losses carry the distance from the root, so that among
/// several winning positions the search prefers the quicker win.
pub fn wdl_to_score(wdl: Wdl, ply: i32) -> Value {
    match wdl {
        Wdl::Win => VALUE_MATE - ply,
        Wdl::CursedWin => 1,
        Wdl::Draw => 0,
        Wdl::BlessedLoss => -1,
        Wdl::Loss => -VALUE_MATE + ply,
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_conversion() {
        assert_eq!(wdl_to_score(Wdl::Win, 0), VALUE_MATE);
        assert_eq!(wdl_to_score(Wdl::Win, 3), VALUE_MATE - 3);
        assert_eq!(wdl_to_score(Wdl::CursedWin, 5), 1);
        assert_eq!(wdl_to_score(Wdl::Draw, 7), 0);
        assert_eq!(wdl_to_score(Wdl::BlessedLoss, 5), -1);
        assert_eq!(wdl_to_score(Wdl::Loss, 3), -VALUE_MATE + 3);
    }

    #[test]
    fn null_tablebase_never_probes() {
        let tb = NullTablebase;
        assert!(!tb.available());
        assert!(!tb.can_probe(&Position::new()));
        assert!(tb.probe_root(&mut Position::new()).is_none());
    }
}
