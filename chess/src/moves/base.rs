use crate::board::Board;
use crate::types::{CastlingSide, Color, Coord, File, Piece};
use crate::{geometry, legal, movegen};

use std::fmt;

use thiserror::Error;

/// Move kind
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Non-pawn move or capture (except castling)
    Simple,
    /// Single pawn move (either non-capture or capture), not reaching the last rank
    PawnSimple,
    /// Double pawn move
    PawnDouble,
    /// Enpassant
    Enpassant,
    /// Pawn move to the last rank. The pawn is always promoted to a queen
    Promote,
    /// Kingside castling
    CastlingKingside,
    /// Queenside castling
    CastlingQueenside,
}

impl From<CastlingSide> for MoveKind {
    #[inline]
    fn from(side: CastlingSide) -> Self {
        match side {
            CastlingSide::King => Self::CastlingKingside,
            CastlingSide::Queen => Self::CastlingQueenside,
        }
    }
}

impl TryFrom<MoveKind> for CastlingSide {
    type Error = ();

    #[inline]
    fn try_from(kind: MoveKind) -> Result<Self, Self::Error> {
        match kind {
            MoveKind::CastlingKingside => Ok(Self::King),
            MoveKind::CastlingQueenside => Ok(Self::Queen),
            _ => Err(()),
        }
    }
}

impl MoveKind {
    /// Returns the piece after promote if this move kind represents a promote
    #[inline]
    pub fn promote(self) -> Option<Piece> {
        match self {
            MoveKind::Promote => Some(Piece::Queen),
            _ => None,
        }
    }

    /// Returns the castling side if this move kind represents castling
    #[inline]
    pub fn castling(self) -> Option<CastlingSide> {
        self.try_into().ok()
    }
}

/// Chess move
///
/// A move is identified by its source and destination squares. Its kind is derived from the
/// board on which the move is made, so a `Move` is only meaningful for that board.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Move {
    kind: MoveKind,
    src: Coord,
    dst: Coord,
    side: Color,
}

/// Error indicating that move is invalid
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ValidateError {
    /// There is no piece on the source square
    #[error("no piece on {0}")]
    EmptySource(Coord),
    /// Destination cannot be reached by the piece, ignoring king safety
    #[error("move is not reachable")]
    NotReachable,
    /// Move leaves the king under attack
    #[error("move is not legal")]
    NotLegal,
}

impl Move {
    /// Determines the kind of the move from `src` to `dst` on board `b`
    ///
    /// Returns `None` if `src` is empty. The move is **not** checked for validity.
    pub fn classify(b: &Board, src: Coord, dst: Coord) -> Option<Move> {
        let (side, piece) = b.get(src).parts()?;
        let kind = match piece {
            Piece::Pawn => {
                let rank_delta = dst.rank().index() as isize - src.rank().index() as isize;
                if dst.rank() == geometry::promote_rank(side) {
                    MoveKind::Promote
                } else if rank_delta.abs() == 2 {
                    MoveKind::PawnDouble
                } else if src.file() != dst.file() && b.get(dst).is_empty() {
                    MoveKind::Enpassant
                } else {
                    MoveKind::PawnSimple
                }
            }
            Piece::King => {
                let file_delta = dst.file().index() as isize - src.file().index() as isize;
                match (file_delta, dst.file()) {
                    (2, File::G) => MoveKind::CastlingKingside,
                    (-2, File::C) => MoveKind::CastlingQueenside,
                    _ => MoveKind::Simple,
                }
            }
            _ => MoveKind::Simple,
        };
        Some(Move {
            kind,
            src,
            dst,
            side,
        })
    }

    /// Creates a castling move made by `color` with side `side`
    #[inline]
    pub fn from_castling(color: Color, side: CastlingSide) -> Move {
        let rank = geometry::castling_rank(color);
        Move {
            kind: MoveKind::from(side),
            src: Coord::from_parts(File::E, rank),
            dst: Coord::from_parts(side.king_dst(), rank),
            side: color,
        }
    }

    /// Classifies the move from `src` to `dst` and validates that it is legal on `b`
    pub fn new_legal(b: &Board, src: Coord, dst: Coord) -> Result<Move, ValidateError> {
        let mv = Move::classify(b, src, dst).ok_or(ValidateError::EmptySource(src))?;
        mv.validate(b)?;
        Ok(mv)
    }

    /// Returns the move kind
    #[inline]
    pub const fn kind(&self) -> MoveKind {
        self.kind
    }

    /// Returns the move source square
    #[inline]
    pub const fn src(&self) -> Coord {
        self.src
    }

    /// Returns the move destination square
    #[inline]
    pub const fn dst(&self) -> Coord {
        self.dst
    }

    /// Returns the color of the moving piece
    #[inline]
    pub const fn side(&self) -> Color {
        self.side
    }

    /// Returns the square of the pawn captured en passant
    ///
    /// The captured pawn shares the rank with the source square and the file with the
    /// destination square.
    #[inline]
    pub fn enpassant_victim(&self) -> Option<Coord> {
        match self.kind {
            MoveKind::Enpassant => Some(Coord::from_parts(self.dst.file(), self.src.rank())),
            _ => None,
        }
    }

    /// Returns `true` if the move is valid by the rules, except that the king can remain
    /// under attack after it
    pub fn is_pseudo_legal(&self, b: &Board) -> bool {
        b.get(self.src).color() == Some(self.side) && movegen::reachable(b, self.src).has(self.dst)
    }

    /// Validates whether this move is legal from position `b`
    pub fn validate(&self, b: &Board) -> Result<(), ValidateError> {
        if b.get(self.src).is_empty() {
            return Err(ValidateError::EmptySource(self.src));
        }
        if !self.is_pseudo_legal(b) {
            return Err(ValidateError::NotReachable);
        }
        if !legal::Checker::new(b).is_safe(self.src, self.dst) {
            return Err(ValidateError::NotLegal);
        }
        Ok(())
    }

    /// Returns `true` if the move is legal from position `b`
    #[inline]
    pub fn is_legal(&self, b: &Board) -> bool {
        self.validate(b).is_ok()
    }
}

impl fmt::Display for Move {
    /// Formats the move as source and destination, followed by `q` for promotions
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.src, self.dst)?;
        if self.kind == MoveKind::Promote {
            write!(f, "q")?;
        }
        Ok(())
    }
}
