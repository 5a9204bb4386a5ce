//! Perft -- exhaustive move-generation correctness suite.
//!
//! Each test verifies that the number of leaf nodes at a given depth
//! matches known-correct values for standard positions. If perft is
//! wrong at any depth, there is a bug in move generation, make/undo,
//! or legality filtering.
//!
//! Reference: <https://www.chessprogramming.org/Perft_Results>
//!
//! The deepest checks walk millions of nodes and are `#[ignore]`d by
//! default; run them with `cargo test --release -- --ignored`.

use lysander::{perft, Position};

// =====================================================================
// Position 1 -- Starting position
// =====================================================================

#[test]
fn perft_start_depth_1() {
    assert_eq!(perft(&mut Position::new(), 1), 20);
}

#[test]
fn perft_start_depth_2() {
    assert_eq!(perft(&mut Position::new(), 2), 400);
}

#[test]
fn perft_start_depth_3() {
    assert_eq!(perft(&mut Position::new(), 3), 8_902);
}

#[test]
fn perft_start_depth_4() {
    assert_eq!(perft(&mut Position::new(), 4), 197_281);
}

#[test]
#[ignore]
fn perft_start_depth_5() {
    assert_eq!(perft(&mut Position::new(), 5), 4_865_609);
}

// =====================================================================
// Position 2 -- "Kiwipete" (tricky: castling, EP, pins, promotions)
// =====================================================================

fn kiwipete() -> Position {
    Position::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq - 0 1")
        .unwrap()
}

#[test]
fn perft_kiwipete_depth_1() {
    assert_eq!(perft(&mut kiwipete(), 1), 48);
}

#[test]
fn perft_kiwipete_depth_2() {
    assert_eq!(perft(&mut kiwipete(), 2), 2_039);
}

#[test]
fn perft_kiwipete_depth_3() {
    assert_eq!(perft(&mut kiwipete(), 3), 97_862);
}

#[test]
#[ignore]
fn perft_kiwipete_depth_4() {
    assert_eq!(perft(&mut kiwipete(), 4), 4_085_603);
}

// =====================================================================
// Position 3
// =====================================================================

fn position_3() -> Position {
    Position::from_fen("8/2p5/3p4/KP5r/1R3p1k/8/4P1P1/8 w - - 0 1").unwrap()
}

#[test]
fn perft_pos3_depth_1() {
    assert_eq!(perft(&mut position_3(), 1), 14);
}

#[test]
fn perft_pos3_depth_2() {
    assert_eq!(perft(&mut position_3(), 2), 191);
}

#[test]
fn perft_pos3_depth_3() {
    assert_eq!(perft(&mut position_3(), 3), 2_812);
}

#[test]
fn perft_pos3_depth_4() {
    assert_eq!(perft(&mut position_3(), 4), 43_238);
}

// =====================================================================
// Position 4
// =====================================================================

fn position_4() -> Position {
    Position::from_fen("r3k2r/Pppp1ppp/1b3nbN/nP6/BBP1P3/q4N2/Pp1P2PP/R2Q1RK1 w kq - 0 1")
        .unwrap()
}

#[test]
fn perft_pos4_depth_1() {
    assert_eq!(perft(&mut position_4(), 1), 6);
}

#[test]
fn perft_pos4_depth_2() {
    assert_eq!(perft(&mut position_4(), 2), 264);
}

#[test]
fn perft_pos4_depth_3() {
    assert_eq!(perft(&mut position_4(), 3), 9_467);
}

// =====================================================================
// Position 5
// =====================================================================

fn position_5() -> Position {
    Position::from_fen("rnbq1k1r/pp1Pbppp/2p5/8/2B5/8/PPP1NnPP/RNBQK2R w KQ - 1 8").unwrap()
}

#[test]
fn perft_pos5_depth_1() {
    assert_eq!(perft(&mut position_5(), 1), 44);
}

#[test]
fn perft_pos5_depth_2() {
    assert_eq!(perft(&mut position_5(), 2), 1_486);
}

#[test]
fn perft_pos5_depth_3() {
    assert_eq!(perft(&mut position_5(), 3), 62_379);
}

// =====================================================================
// Position 6 -- Edwards2
// =====================================================================

fn position_6() -> Position {
    Position::from_fen("r4rk1/1pp1qppp/p1np1n2/2b1p1B1/2B1P1b1/P1NP1N2/1PP1QPPP/R4RK1 w - - 0 \
                        10")
        .unwrap()
}

#[test]
fn perft_pos6_depth_1() {
    assert_eq!(perft(&mut position_6(), 1), 46);
}

#[test]
fn perft_pos6_depth_2() {
    assert_eq!(perft(&mut position_6(), 2), 2_079);
}

#[test]
fn perft_pos6_depth_3() {
    assert_eq!(perft(&mut position_6(), 3), 89_890);
}
