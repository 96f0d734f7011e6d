//! Game session on top of the rules engine

use crate::board::Board;
use crate::legal::{self, MoveMap};
use crate::moves::{self, Applied};
use crate::types::{Color, Coord, CoordParseError, Outcome};

use thiserror::Error;
use tracing::{info, trace};

/// Error parsing a move written as source and destination squares, like `e2e4`
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveParseError {
    #[error("bad string length")]
    BadLength,
    #[error("bad source: {0}")]
    BadSrc(CoordParseError),
    #[error("bad destination: {0}")]
    BadDst(CoordParseError),
    #[error("bad promote char {0:?}")]
    BadPromote(char),
}

/// Error making a move in a [`Game`]
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum MoveError {
    #[error("no piece on {0}")]
    EmptySource(Coord),
    #[error("piece on {0} belongs to {1}, who is not to move")]
    NotOwnPiece(Coord, Color),
    #[error("move {0}{1} is not legal")]
    Illegal(Coord, Coord),
    #[error("game is already finished: {0}")]
    Finished(Outcome),
    #[error("cannot parse move #{}: {}", .pos + 1, .source)]
    Parse { pos: usize, source: MoveParseError },
}

/// Parses a move written as source and destination squares, like `e2e4`
///
/// A trailing `q` is accepted, as pawns always promote to a queen.
pub fn parse_move(s: &str) -> Result<(Coord, Coord), MoveParseError> {
    let bytes = s.as_bytes();
    if !s.is_ascii() || !matches!(bytes.len(), 4 | 5) {
        return Err(MoveParseError::BadLength);
    }
    let src = s[0..2].parse().map_err(MoveParseError::BadSrc)?;
    let dst = s[2..4].parse().map_err(MoveParseError::BadDst)?;
    if let Some(&p) = bytes.get(4) {
        if p != b'q' {
            return Err(MoveParseError::BadPromote(p as char));
        }
    }
    Ok((src, dst))
}

/// Sequence of moves played from some position, with the legal moves for the side to move
///
/// The game keeps the board of every ply played so far, so moves can be taken back.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    legal: MoveMap,
    history: Vec<(Board, Applied)>,
    outcome: Option<Outcome>,
}

impl Game {
    pub fn new(board: Board) -> Game {
        let mut res = Game {
            board,
            legal: MoveMap::new(),
            history: Vec::new(),
            outcome: None,
        };
        res.refresh();
        res
    }

    pub fn new_initial() -> Game {
        Game::new(Board::initial())
    }

    /// Creates a game from `board` and plays the space-separated moves in `list`
    pub fn from_move_list(board: Board, list: &str) -> Result<Game, MoveError> {
        let mut res = Game::new(board);
        res.push_list(list)?;
        Ok(res)
    }

    fn refresh(&mut self) {
        let side = self.board.side();
        self.legal = legal::moves_for(&self.board, side);
        self.outcome = None;
        if self.legal.is_empty() {
            let outcome = self.board.outcome_when_stuck();
            info!(%outcome, "game finished");
            self.outcome = Some(outcome);
        }
    }

    /// Returns the current position
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns the side to move
    pub fn side(&self) -> Color {
        self.board.side()
    }

    /// Returns legal moves for the side to move
    pub fn legal_moves(&self) -> &MoveMap {
        &self.legal
    }

    /// Returns the number of moves played
    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    /// Iterates over the moves played so far
    pub fn iter(&self) -> impl Iterator<Item = &Applied> + '_ {
        self.history.iter().map(|(_, applied)| applied)
    }

    /// Returns the last move played
    pub fn last(&self) -> Option<&Applied> {
        self.history.last().map(|(_, applied)| applied)
    }

    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Returns `true` if the side to move is checkmated or stalemated
    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// Plays the move from `src` to `dst` by the side to move
    pub fn try_move(&mut self, src: Coord, dst: Coord) -> Result<&Applied, MoveError> {
        if let Some(outcome) = self.outcome {
            return Err(MoveError::Finished(outcome));
        }
        let color = self
            .board
            .get(src)
            .color()
            .ok_or(MoveError::EmptySource(src))?;
        if color != self.board.side() {
            return Err(MoveError::NotOwnPiece(src, color));
        }
        if !self.legal.contains(src, dst) {
            trace!(%src, %dst, "illegal move requested");
            return Err(MoveError::Illegal(src, dst));
        }

        let prev = self.board.clone();
        let applied = moves::apply(&mut self.board, src, dst);
        self.history.push((prev, applied));
        self.refresh();
        Ok(&self.history[self.history.len() - 1].1)
    }

    /// Parses the move string, like `e2e4`, and plays it
    pub fn push_str(&mut self, s: &str) -> Result<&Applied, MoveError> {
        let (src, dst) = parse_move(s).map_err(|source| MoveError::Parse { pos: 0, source })?;
        self.try_move(src, dst)
    }

    /// Plays all the space-separated moves from `list`
    ///
    /// Stops at the first bad move. The moves before it remain played.
    pub fn push_list(&mut self, list: &str) -> Result<(), MoveError> {
        for (pos, token) in list.split_ascii_whitespace().enumerate() {
            let (src, dst) = parse_move(token).map_err(|source| MoveError::Parse { pos, source })?;
            self.try_move(src, dst)?;
        }
        Ok(())
    }

    /// Takes back the last move
    ///
    /// Returns `None` if no moves were played.
    pub fn pop(&mut self) -> Option<Applied> {
        let (prev, applied) = self.history.pop()?;
        self.board = prev;
        self.refresh();
        Some(applied)
    }
}

impl Default for Game {
    fn default() -> Game {
        Game::new_initial()
    }
}
