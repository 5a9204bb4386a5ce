//! Implements the opening book adapter.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::io::{BufRead, BufReader};
use std::path::Path;
use rand::Rng;
use crate::movegen::parse_move;
use crate::moves::Move;
use crate::position::Position;


/// A map from positions to known good opening moves.
///
/// The book is stored in a simple text format, one position per
/// line:
///
/// ```text
/// # lines starting with '#' are comments
/// <FEN> | <move 1> <move 2> ...
/// ```
///
/// Moves are in UCI long algebraic notation, ordered by preference.
/// Entries are validated at load time against the legal moves of the
/// position; lines that do not parse are skipped. Probing a position
/// that is not in the book is a perfectly normal miss, not an error.
pub struct OpeningBook {
    entries: HashMap<String, Vec<Move>>,
}

impl OpeningBook {
    /// Creates a new, empty instance.
    pub fn new() -> OpeningBook {
        OpeningBook { entries: HashMap::new() }
    }

    /// Loads the book from a text file, replacing the current
    /// contents. Returns the number of loaded positions.
    pub fn load<P: AsRef<Path>>(&mut self, path: P) -> io::Result<usize> {
        self.entries.clear();
        let file = File::open(path)?;
        for line in BufReader::new(file).lines() {
            let line = line?;
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '|');
            let fen = parts.next().unwrap().trim();
            let moves_str = match parts.next() {
                Some(s) => s,
                None => continue,
            };
            let mut position = match Position::from_fen(fen) {
                Ok(p) => p,
                Err(_) => continue,
            };
            let moves: Vec<Move> = moves_str
                .split_whitespace()
                .filter_map(|s| parse_move(&mut position, s))
                .collect();
            if !moves.is_empty() {
                // Key by the re-emitted FEN, so that probing is
                // insensitive to formatting quirks in the file.
                self.entries.insert(position.to_fen(), moves);
            }
        }
        Ok(self.entries.len())
    }

    /// Returns whether the book holds at least one position.
    #[inline]
    pub fn is_loaded(&self) -> bool {
        !self.entries.is_empty()
    }

    /// Returns the number of positions in the book.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns a book move for the given position, if there is one.
    ///
    /// To add some variety to the play, the move is picked at random
    /// among the first few (at most three) listed moves, which are
    /// ordered by preference. Every returned move is legal in the
    /// given position.
    pub fn probe(&self, position: &Position) -> Option<Move> {
        let moves = self.entries.get(&position.to_fen())?;
        let limit = moves.len().min(3);
        Some(moves[rand::thread_rng().gen_range(0..limit)])
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use crate::position::START_FEN;

    fn temp_book(contents: &str) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("lysander-book-test-{}.txt", std::process::id()));
        let mut file = File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn probe_unloaded_book() {
        let book = OpeningBook::new();
        assert!(!book.is_loaded());
        assert_eq!(book.probe(&Position::new()), None);
    }

    #[test]
    fn load_missing_file() {
        let mut book = OpeningBook::new();
        assert!(book.load("/nonexistent/path/book.txt").is_err());
        assert!(!book.is_loaded());
    }

    #[test]
    fn load_and_probe() {
        let path = temp_book(&format!("# a tiny book\n\
                                       {} | e2e4 d2d4\n\
                                       not a fen | e2e4\n\
                                       {} | e9e4\n",
                                      START_FEN,
                                      "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR b KQkq - 0 1"));
        let mut book = OpeningBook::new();
        assert_eq!(book.load(&path).unwrap(), 1);
        assert!(book.is_loaded());
        assert_eq!(book.len(), 1);
        let mv = book.probe(&Position::new()).unwrap();
        assert!(mv.to_string() == "e2e4" || mv.to_string() == "d2d4");
        // A position that is not in the book misses.
        let other = Position::from_fen("4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(book.probe(&other), None);
        std::fs::remove_file(path).ok();
    }
}
