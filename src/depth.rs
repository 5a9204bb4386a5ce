//! Defines the `Depth` type and its related constants.


/// Remaining search depth in half-moves.
///
/// The remaining search depth tells how many half-moves should be
/// added to the current line of play before a leaf node is reached.
/// Searches are started with some positive number as their remaining
/// search depth. This number is decreased when a move is tried, and
/// the search routine is called recursively. When the remaining depth
/// becomes zero, a quiescence search is performed to obtain a
/// reliable evaluation. Depth reductions applied to less interesting
/// moves may make the remaining depth negative near the leaves; such
/// values are clamped to zero before descending.
pub type Depth = i8;

pub const DEPTH_MAX: Depth = 20;

/// The maximum reachable ply (bounds all per-ply search tables).
pub const MAX_PLY: usize = 64;
