//! Chess rules engine
//!
//! Keeps a chess position, generates pseudo-legal and legal moves, detects check, checkmate
//! and stalemate, and applies moves including castling, en passant and promotion to a queen.
//!
//! # Example
//!
//! ```
//! use rookery::{Board, Color, Coord, Outcome, legal, moves};
//!
//! let mut b = Board::initial();
//! assert_eq!(legal::moves_for(&b, Color::White).move_count(), 20);
//!
//! for mv in ["f2f3", "e7e5", "g2g4", "d8h4"] {
//!     let src: Coord = mv[0..2].parse().unwrap();
//!     let dst: Coord = mv[2..4].parse().unwrap();
//!     assert!(legal::playable(&b, src).has(dst));
//!     moves::apply(&mut b, src, dst);
//! }
//!
//! let king = b.checked().unwrap();
//! assert_eq!(king, "e1".parse::<Coord>().unwrap());
//! assert!(b.is_checkmate(king));
//! assert_eq!(b.calc_outcome(), Some(Outcome::Checkmate { winner: Color::Black }));
//! ```

pub mod board;
pub mod check;
pub mod game;
pub mod legal;
pub mod movegen;
pub mod moves;

pub use rookery_base::{bitboard, geometry, types};

pub use bitboard::Bitboard;
pub use board::{Board, Unit};
pub use check::CheckStatus;
pub use game::{Game, MoveError};
pub use legal::{Annotations, MoveMap};
pub use moves::{Applied, Move, MoveKind};
pub use types::{CastlingSide, Cell, Color, Coord, File, Outcome, Piece, Rank};
