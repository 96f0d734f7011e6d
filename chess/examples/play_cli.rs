// Simple command-line application to play chess against yourself

use rookery::{board::PrettyStyle, Color, Game};
use std::io::{self, BufRead, Write};
use tracing_subscriber::EnvFilter;

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let mut stdin = io::stdin().lock();
    let mut game = Game::new_initial();

    loop {
        println!("{}", game.board().pretty(PrettyStyle::Utf8));
        if let Some(outcome) = game.outcome() {
            println!("Game finished: {}", outcome);
            let moves: Vec<_> = game.iter().map(|a| a.mv.to_string()).collect();
            println!("Moves: {}", moves.join(" "));
            return Ok(());
        }
        if let Some(king) = game.board().checked() {
            println!("Check to the king on {}", king);
        }

        let side = match game.side() {
            Color::White => "White",
            Color::Black => "Black",
        };
        print!("{} move (e.g. e2e4, \"undo\" or \"moves\"): ", side);
        io::stdout().flush()?;
        let mut s = String::new();
        if stdin.read_line(&mut s)? == 0 {
            return Ok(());
        }

        match s.trim() {
            "undo" => {
                if game.pop().is_none() {
                    println!("Nothing to undo");
                }
            }
            "moves" => {
                for (src, dsts) in game.legal_moves().iter() {
                    let dsts: Vec<_> = dsts.into_iter().map(|d| d.to_string()).collect();
                    println!("{}: {}", src, dsts.join(" "));
                }
            }
            mv => match game.push_str(mv) {
                Ok(applied) => {
                    if let Some(captured) = applied.captured {
                        println!("Captured {}", captured);
                    }
                }
                Err(e) => println!("Bad move: {}", e),
            },
        }
        println!();
    }
}
