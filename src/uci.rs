//! Implements the UCI protocol server.
//!
//! The Universal Chess Interface (UCI) is a text protocol spoken over
//! standard input/output, by which chess GUIs drive chess engines.
//! Only the commands the engine actually understands are implemented;
//! unknown commands are reported when the `Debug` option is on, and
//! ignored otherwise.

use std::io;
use std::io::{BufRead, Write};
use crate::basetypes::WHITE;
use crate::depth::{Depth, DEPTH_MAX};
use crate::movegen::try_move;
use crate::position::Position;
use crate::search::{allocate_time, Searcher};
use crate::value::{Value, VALUE_MATE};


const ENGINE_NAME: &str = "Lysander 0.1";
const ENGINE_AUTHOR: &str = "the Lysander authors";
const DEFAULT_DEPTH: Depth = 6;

/// Candidate locations for the opening book, relative to the working
/// directory.
const BOOK_PATHS: [&str; 3] = ["book.txt", "../book.txt", "../../book.txt"];


/// The UCI server: reads commands, mutates the game state, and writes
/// replies.
pub struct Server<W: Write> {
    writer: W,
    position: Position,
    searcher: Searcher,
    search_depth: Depth,
    debug: bool,
}

impl<W: Write> Server<W> {
    /// Creates a new instance writing its replies to `writer`.
    ///
    /// The opening book is looked for in a few conventional places;
    /// its absence is not an error.
    pub fn new(writer: W) -> Server<W> {
        let mut searcher = Searcher::new(DEFAULT_DEPTH);
        for path in BOOK_PATHS.iter() {
            if searcher.load_opening_book(path).is_ok() {
                break;
            }
        }
        Server::with_searcher(writer, searcher)
    }

    /// Creates a new instance around an already configured searcher.
    pub fn with_searcher(writer: W, searcher: Searcher) -> Server<W> {
        Server {
            writer,
            position: Position::new(),
            searcher,
            search_depth: DEFAULT_DEPTH,
            debug: false,
        }
    }

    /// Executes a single UCI command. Returns `false` when the server
    /// should exit.
    pub fn handle_command(&mut self, line: &str) -> io::Result<bool> {
        let line = line.trim();
        let (command, args) = match line.find(' ') {
            Some(i) => (&line[..i], line[i + 1..].trim_start()),
            None => (line, ""),
        };
        match command {
            "uci" => {
                writeln!(self.writer, "id name {}", ENGINE_NAME)?;
                writeln!(self.writer, "id author {}", ENGINE_AUTHOR)?;
                writeln!(self.writer, "option name Debug type check default false")?;
                writeln!(self.writer,
                         "option name Depth type spin default {} min 1 max {}",
                         DEFAULT_DEPTH,
                         DEPTH_MAX)?;
                writeln!(self.writer, "uciok")?;
            }
            "isready" => {
                writeln!(self.writer, "readyok")?;
            }
            "ucinewgame" => {
                // The position and the heuristic tables are reset;
                // the opening book survives.
                self.position = Position::new();
                self.searcher.new_game();
                self.searcher.set_depth(self.search_depth);
            }
            "position" => self.handle_position(args)?,
            "go" => self.handle_go(args)?,
            "stop" => {
                // The search is synchronous -- by the time this
                // command is read, it has already finished.
            }
            "setoption" => self.handle_setoption(args),
            "d" | "display" => {
                writeln!(self.writer, "{}", self.position)?;
            }
            "quit" => return Ok(false),
            "" => {}
            _ => {
                if self.debug {
                    writeln!(self.writer, "info string Unknown command: {}", command)?;
                }
            }
        }
        Ok(true)
    }

    fn handle_position(&mut self, args: &str) -> io::Result<()> {
        let mut tokens = args.split_whitespace().peekable();
        match tokens.next() {
            Some("startpos") => {
                self.position = Position::new();
            }
            Some("fen") => {
                let fen: Vec<_> = tokens.by_ref().take_while(|&t| t != "moves").collect();
                match Position::from_fen(&fen.join(" ")) {
                    Ok(p) => self.position = p,
                    Err(_) => {
                        if self.debug {
                            writeln!(self.writer,
                                     "info string Failed to parse FEN: {}",
                                     fen.join(" "))?;
                        }
                        return Ok(());
                    }
                }
            }
            _ => return Ok(()),
        }
        if tokens.peek() == Some(&"moves") {
            tokens.next();
        }
        for move_str in tokens {
            if !try_move(&mut self.position, move_str) {
                if self.debug {
                    writeln!(self.writer, "info string Illegal move: {}", move_str)?;
                }
                return Ok(());
            }
        }
        Ok(())
    }

    fn handle_go(&mut self, args: &str) -> io::Result<()> {
        let mut depth = self.search_depth;
        let mut depth_specified = false;
        let mut movetime: Option<u64> = None;
        let mut wtime: Option<u64> = None;
        let mut btime: Option<u64> = None;
        let mut winc: u64 = 0;
        let mut binc: u64 = 0;
        let mut movestogo: Option<u64> = None;
        let mut infinite = false;

        let mut tokens = args.split_whitespace();
        while let Some(token) = tokens.next() {
            let mut number = || tokens.next().and_then(|t| t.parse::<u64>().ok());
            match token {
                "depth" => {
                    if let Some(d) = number() {
                        depth = d.min(DEPTH_MAX as u64) as Depth;
                        depth_specified = true;
                    }
                }
                "movetime" => movetime = number(),
                "wtime" => wtime = number(),
                "btime" => btime = number(),
                "winc" => winc = number().unwrap_or(0),
                "binc" => binc = number().unwrap_or(0),
                "movestogo" => movestogo = number(),
                "infinite" => infinite = true,
                _ => {}
            }
        }

        // Compute the time budget for this move (zero means none: the
        // search is bounded by depth alone).
        let mut time_for_move = 0;
        if !infinite && !depth_specified {
            if let Some(ms) = movetime {
                time_for_move = ms.saturating_sub(50).max(1);
            } else {
                let (our_time, our_inc) = if self.position.to_move() == WHITE {
                    (wtime, winc)
                } else {
                    (btime, binc)
                };
                if let Some(remaining) = our_time {
                    time_for_move = allocate_time(remaining, our_inc, movestogo);
                    if self.debug {
                        writeln!(self.writer,
                                 "info string Time control: {} ms remaining, {} ms increment, \
                                  using {} ms",
                                 remaining,
                                 our_inc,
                                 time_for_move)?;
                    }
                }
            }
        }

        self.searcher.set_depth(depth);
        self.searcher.set_time_limit(time_for_move);
        let best_move = self.searcher.find_best_move(&mut self.position);
        self.searcher.set_time_limit(0);

        if self.searcher.last_depth() > 0 {
            let pv: Vec<_> = self.searcher
                .principal_variation()
                .iter()
                .map(|mv| mv.to_string())
                .collect();
            writeln!(self.writer,
                     "info depth {} score {} nodes {} pv {}",
                     self.searcher.last_depth(),
                     format_score(self.searcher.last_value()),
                     self.searcher.nodes(),
                     pv.join(" "))?;
        }
        writeln!(self.writer, "bestmove {}", best_move)?;
        Ok(())
    }

    fn handle_setoption(&mut self, args: &str) {
        let mut tokens = args.split_whitespace();
        if tokens.next() != Some("name") {
            return;
        }
        let name = match tokens.next() {
            Some(name) => name,
            None => return,
        };
        if tokens.next() != Some("value") {
            return;
        }
        let value = match tokens.next() {
            Some(value) => value,
            None => return,
        };
        match name {
            "Debug" => {
                self.debug = value == "true";
            }
            "Depth" => {
                if let Ok(depth) = value.parse::<Depth>() {
                    self.search_depth = depth.max(1).min(DEPTH_MAX);
                    self.searcher.set_depth(self.search_depth);
                }
            }
            _ => {}
        }
    }
}


/// Formats a value the UCI way: `cp <centipawns>`, or `mate <moves>`
/// when a forced mate has been found.
fn format_score(value: Value) -> String {
    if value.abs() > VALUE_MATE - 1000 {
        let plies = VALUE_MATE - value.abs();
        let moves = (plies + 1) / 2;
        format!("mate {}", if value > 0 { moves } else { -moves })
    } else {
        format!("cp {}", value)
    }
}


/// Runs the UCI server on standard input/output until `quit` is
/// received or the input dries up.
pub fn run_server() -> io::Result<()> {
    let stdin = io::stdin();
    let stdout = io::stdout();
    let mut server = Server::new(stdout.lock());
    for line in stdin.lock().lines() {
        if !server.handle_command(&line?)? {
            break;
        }
    }
    Ok(())
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::position::START_FEN;

    fn server() -> Server<Vec<u8>> {
        Server::with_searcher(Vec::new(), Searcher::with_tt_size(DEFAULT_DEPTH, 16))
    }

    fn output(server: &mut Server<Vec<u8>>) -> String {
        let text = String::from_utf8(server.writer.clone()).unwrap();
        server.writer.clear();
        text
    }

    #[test]
    fn uci_handshake() {
        let mut server = server();
        assert!(server.handle_command("uci").unwrap());
        let reply = output(&mut server);
        assert!(reply.contains("id name"));
        assert!(reply.contains("option name Debug type check default false"));
        assert!(reply.ends_with("uciok\n"));
        assert!(server.handle_command("isready").unwrap());
        assert_eq!(output(&mut server), "readyok\n");
        assert!(!server.handle_command("quit").unwrap());
    }

    #[test]
    fn position_command() {
        let mut server = server();
        server.handle_command("position startpos moves e2e4 c7c5").unwrap();
        assert_eq!(server.position.to_fen(),
                   "rnbqkbnr/pp1ppppp/8/2p5/4P3/8/PPPP1PPP/RNBQKBNR w KQkq c6 0 2");
        server.handle_command("position fen 4k3/8/8/8/8/8/8/4K3 w - - 0 1").unwrap();
        assert_eq!(server.position.to_fen(), "4k3/8/8/8/8/8/8/4K3 w - - 0 1");
        // An illegal move stops the processing, leaving the moves
        // played so far.
        server.handle_command("position startpos moves e2e4 e2e4").unwrap();
        assert_eq!(server.position.to_fen(),
                   "rnbqkbnr/pppppppp/8/8/4P3/8/PPPP1PPP/RNBQKBNR b KQkq e3 0 1");
    }

    #[test]
    fn position_equivalence_with_direct_moves() {
        let mut server = server();
        server.handle_command("ucinewgame").unwrap();
        server.handle_command("position startpos moves e2e4 e7e5 g1f3 b8c6 f1b5").unwrap();
        let mut position = Position::new();
        for mv in ["e2e4", "e7e5", "g1f3", "b8c6", "f1b5"].iter() {
            assert!(try_move(&mut position, mv));
        }
        assert_eq!(server.position.to_fen(), position.to_fen());
        assert_eq!(server.position.hash(), position.hash());
    }

    #[test]
    fn go_depth_produces_a_bestmove() {
        let mut server = server();
        server.handle_command("position startpos").unwrap();
        server.handle_command("go depth 2").unwrap();
        let reply = output(&mut server);
        assert!(reply.contains("info depth 2"));
        assert!(reply.contains("bestmove "));
        assert!(!reply.contains("bestmove 0000"));
    }

    #[test]
    fn go_reports_mate_scores() {
        let mut server = server();
        server.handle_command("position fen 6k1/5ppp/8/8/8/8/5PPP/R5K1 w - - 0 1").unwrap();
        server.handle_command("go depth 2").unwrap();
        let reply = output(&mut server);
        assert!(reply.contains("score mate 1"), "{}", reply);
        assert!(reply.contains("bestmove a1a8"), "{}", reply);
    }

    #[test]
    fn mated_position_yields_null_move() {
        let mut server = server();
        // A checkmated position: black to move, no legal moves.
        server.handle_command("position fen R6k/6pp/8/8/8/8/8/K7 b - - 0 1").unwrap();
        server.handle_command("go depth 2").unwrap();
        let reply = output(&mut server);
        assert!(reply.contains("bestmove 0000"), "{}", reply);
    }

    #[test]
    fn setoption_depth() {
        let mut server = server();
        server.handle_command("setoption name Depth value 3").unwrap();
        assert_eq!(server.search_depth, 3);
        server.handle_command("setoption name Depth value 99").unwrap();
        assert_eq!(server.search_depth, DEPTH_MAX);
        server.handle_command("setoption name Debug value true").unwrap();
        assert!(server.debug);
        server.handle_command("bogus").unwrap();
        assert!(output(&mut server).contains("Unknown command"));
    }

    #[test]
    fn ucinewgame_resets_the_position() {
        let mut server = server();
        server.handle_command("position startpos moves e2e4").unwrap();
        server.handle_command("ucinewgame").unwrap();
        assert_eq!(server.position.to_fen(), START_FEN);
    }

    #[test]
    fn display_command() {
        let mut server = server();
        server.handle_command("d").unwrap();
        let reply = output(&mut server);
        assert!(reply.contains("a b c d e f g h"));
        assert!(reply.contains(&format!("FEN: {}", START_FEN)));
    }

    #[test]
    fn score_formatting() {
        assert_eq!(format_score(123), "cp 123");
        assert_eq!(format_score(-50), "cp -50");
        assert_eq!(format_score(VALUE_MATE - 1), "mate 1");
        assert_eq!(format_score(VALUE_MATE - 3), "mate 2");
        assert_eq!(format_score(-(VALUE_MATE - 2)), "mate -1");
    }
}
