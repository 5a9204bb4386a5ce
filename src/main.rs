use std::process::exit;
use lysander::uci::run_server;

fn main() {
    exit(match run_server() {
        Ok(_) => 0,
        Err(_) => 1,
    })
}
