use std::fmt::{self, Display};
use std::hint;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CoordParseError {
    #[error("unexpected file char {0:?}")]
    UnexpectedFileChar(char),
    #[error("unexpected rank char {0:?}")]
    UnexpectedRankChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum CellParseError {
    #[error("unexpected cell char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorParseError {
    #[error("unexpected color char {0:?}")]
    UnexpectedChar(char),
    #[error("invalid string length")]
    BadLength,
}

/// Board file, from `a` to `h`
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum File {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
}

impl File {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => File::A,
            1 => File::B,
            2 => File::C,
            3 => File::D,
            4 => File::E,
            5 => File::F,
            6 => File::G,
            7 => File::H,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "file index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    /// Returns the file to the right (towards `h`), or `None` on the `h` file
    pub const fn next(self) -> Option<Self> {
        match self {
            File::H => None,
            _ => Some(unsafe { Self::from_index_unchecked(self.index() + 1) }),
        }
    }

    /// Returns the file to the left (towards `a`), or `None` on the `a` file
    pub const fn prev(self) -> Option<Self> {
        match self {
            File::A => None,
            _ => Some(unsafe { Self::from_index_unchecked(self.index() - 1) }),
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            'a'..='h' => Some(unsafe {
                Self::from_index_unchecked((u32::from(c) - u32::from('a')) as usize)
            }),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'a' + *self as u8) as char
    }
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Board rank, from `1` to `8`
///
/// Ranks are numbered from White's side, so `R1` has index 0.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Debug, Hash)]
#[repr(u8)]
pub enum Rank {
    R1 = 0,
    R2 = 1,
    R3 = 2,
    R4 = 3,
    R5 = 4,
    R6 = 5,
    R7 = 6,
    R8 = 7,
}

impl Rank {
    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    const unsafe fn from_index_unchecked(val: usize) -> Self {
        match val {
            0 => Rank::R1,
            1 => Rank::R2,
            2 => Rank::R3,
            3 => Rank::R4,
            4 => Rank::R5,
            5 => Rank::R6,
            6 => Rank::R7,
            7 => Rank::R8,
            _ => hint::unreachable_unchecked(),
        }
    }

    pub const fn from_index(val: usize) -> Self {
        assert!(val < 8, "rank index must be between 0 and 7");
        unsafe { Self::from_index_unchecked(val) }
    }

    pub fn iter() -> impl DoubleEndedIterator<Item = Self> {
        (0..8).map(|x| unsafe { Self::from_index_unchecked(x) })
    }

    /// Returns the rank above (towards `8`), or `None` on the 8th rank
    pub const fn next(self) -> Option<Self> {
        match self {
            Rank::R8 => None,
            _ => Some(unsafe { Self::from_index_unchecked(self.index() + 1) }),
        }
    }

    /// Returns the rank below (towards `1`), or `None` on the 1st rank
    pub const fn prev(self) -> Option<Self> {
        match self {
            Rank::R1 => None,
            _ => Some(unsafe { Self::from_index_unchecked(self.index() - 1) }),
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '1'..='8' => Some(unsafe {
                Self::from_index_unchecked((u32::from(c) - u32::from('1')) as usize)
            }),
            _ => None,
        }
    }

    pub fn as_char(&self) -> char {
        (b'1' + *self as u8) as char
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

/// Square on the board
///
/// There is a total bijection between `(file, rank)` pairs and indices in `0..64`, with
/// `index = rank * 8 + file`, so `a1` has index 0 and `h8` has index 63.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Coord(u8);

impl Coord {
    pub const fn from_index(val: usize) -> Coord {
        assert!(val < 64, "coord must be between 0 and 63");
        Coord(val as u8)
    }

    pub(crate) const unsafe fn from_index_unchecked(val: usize) -> Coord {
        Coord(val as u8)
    }

    pub const fn from_parts(file: File, rank: Rank) -> Coord {
        Coord(((rank as u8) << 3) | file as u8)
    }

    pub const fn file(&self) -> File {
        unsafe { File::from_index_unchecked((self.0 & 7) as usize) }
    }

    pub const fn rank(&self) -> Rank {
        unsafe { Rank::from_index_unchecked((self.0 >> 3) as usize) }
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    /// Returns the color of the square itself
    ///
    /// `a1` is a dark square. The color is always derived from the coordinate and never stored.
    pub const fn color(&self) -> Color {
        if (self.file().index() + self.rank().index()) % 2 == 0 {
            Color::Black
        } else {
            Color::White
        }
    }

    /// Shifts the coordinate by the given number of files and ranks
    ///
    /// Returns `None` if the result falls off the board. Never wraps around.
    pub fn try_shift(self, delta_file: isize, delta_rank: isize) -> Option<Coord> {
        let new_file = self.file().index().wrapping_add(delta_file as usize);
        let new_rank = self.rank().index().wrapping_add(delta_rank as usize);
        if new_file >= 8 || new_rank >= 8 {
            return None;
        }
        unsafe {
            Some(Coord::from_parts(
                File::from_index_unchecked(new_file),
                Rank::from_index_unchecked(new_rank),
            ))
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0_u8..64_u8).map(Coord)
    }
}

impl fmt::Debug for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if self.0 < 64 {
            return write!(f, "Coord({})", self);
        }
        write!(f, "Coord(?{:?})", self.0)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}{}", self.file().as_char(), self.rank().as_char())
    }
}

impl FromStr for Coord {
    type Err = CoordParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (file_ch, rank_ch) = match (chars.next(), chars.next(), chars.next()) {
            (Some(file_ch), Some(rank_ch), None) => (file_ch, rank_ch),
            _ => return Err(CoordParseError::BadLength),
        };
        Ok(Coord::from_parts(
            File::from_char(file_ch).ok_or(CoordParseError::UnexpectedFileChar(file_ch))?,
            Rank::from_char(rank_ch).ok_or(CoordParseError::UnexpectedRankChar(rank_ch))?,
        ))
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Color {
    White = 0,
    Black = 1,
}

impl Color {
    pub const fn inv(&self) -> Color {
        match *self {
            Color::White => Color::Black,
            Color::Black => Color::White,
        }
    }

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn as_char(&self) -> char {
        match *self {
            Color::White => 'w',
            Color::Black => 'b',
        }
    }

    pub fn from_char(c: char) -> Option<Color> {
        match c {
            'w' => Some(Color::White),
            'b' => Some(Color::Black),
            _ => None,
        }
    }
}

impl Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Color {
    type Err = ColorParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Color::from_char(ch).ok_or(ColorParseError::UnexpectedChar(ch)),
            _ => Err(ColorParseError::BadLength),
        }
    }
}

/// Kind of a chess piece
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Piece {
    Pawn = 0,
    Knight = 1,
    Bishop = 2,
    Rook = 3,
    Queen = 4,
    King = 5,
}

impl Piece {
    pub const COUNT: usize = 6;

    pub const fn index(&self) -> usize {
        *self as u8 as usize
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        [
            Piece::Pawn,
            Piece::Knight,
            Piece::Bishop,
            Piece::Rook,
            Piece::Queen,
            Piece::King,
        ]
        .into_iter()
    }

    /// Human-readable name of the piece
    pub fn name(&self) -> &'static str {
        match *self {
            Piece::Pawn => "Pawn",
            Piece::Knight => "Knight",
            Piece::Bishop => "Bishop",
            Piece::Rook => "Rook",
            Piece::Queen => "Queen",
            Piece::King => "King",
        }
    }
}

/// Contents of a square: either empty or one of twelve colored pieces
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Cell(u8);

impl Cell {
    pub const EMPTY: Cell = Cell(0);
    pub const COUNT: usize = 13;

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_occupied(&self) -> bool {
        self.0 != 0
    }

    pub const fn from_index(val: usize) -> Cell {
        assert!(val < Self::COUNT, "index too large");
        Cell(val as u8)
    }

    pub const fn index(&self) -> usize {
        self.0 as usize
    }

    pub const fn from_parts(c: Color, p: Piece) -> Cell {
        Cell(match c {
            Color::White => 1 + p as u8,
            Color::Black => 7 + p as u8,
        })
    }

    pub const fn color(&self) -> Option<Color> {
        match self.0 {
            0 => None,
            1..=6 => Some(Color::White),
            _ => Some(Color::Black),
        }
    }

    pub const fn piece(&self) -> Option<Piece> {
        match self.0 {
            0 => None,
            1 | 7 => Some(Piece::Pawn),
            2 | 8 => Some(Piece::Knight),
            3 | 9 => Some(Piece::Bishop),
            4 | 10 => Some(Piece::Rook),
            5 | 11 => Some(Piece::Queen),
            6 | 12 => Some(Piece::King),
            _ => unsafe { hint::unreachable_unchecked() },
        }
    }

    /// Returns both the color and the kind of the piece, or `None` for an empty cell
    pub const fn parts(&self) -> Option<(Color, Piece)> {
        match (self.color(), self.piece()) {
            (Some(c), Some(p)) => Some((c, p)),
            _ => None,
        }
    }

    pub fn iter() -> impl Iterator<Item = Self> {
        (0..Self::COUNT).map(|x| Cell(x as u8))
    }

    pub fn as_char(&self) -> char {
        b".PNBRQKpnbrqk"[self.0 as usize] as char
    }

    pub fn as_utf8_char(&self) -> char {
        [
            '.', '♙', '♘', '♗', '♖', '♕', '♔', '♟', '♞', '♝', '♜', '♛', '♚',
        ][self.0 as usize]
    }

    pub fn from_char(c: char) -> Option<Self> {
        if c == '.' {
            return Some(Cell::EMPTY);
        }
        let color = if c.is_ascii_uppercase() {
            Color::White
        } else {
            Color::Black
        };
        let piece = match c.to_ascii_lowercase() {
            'p' => Piece::Pawn,
            'n' => Piece::Knight,
            'b' => Piece::Bishop,
            'r' => Piece::Rook,
            'q' => Piece::Queen,
            'k' => Piece::King,
            _ => return None,
        };
        Some(Cell::from_parts(color, piece))
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        if (self.0 as usize) < Self::COUNT {
            return write!(f, "Cell({})", self.as_char());
        }
        write!(f, "Cell(?{:?})", self.0)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "{}", self.as_char())
    }
}

impl FromStr for Cell {
    type Err = CellParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => Cell::from_char(ch).ok_or(CellParseError::UnexpectedChar(ch)),
            _ => Err(CellParseError::BadLength),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CastlingSide {
    Queen = 0,
    King = 1,
}

impl CastlingSide {
    /// File on which the rook starts
    pub const fn rook_src(&self) -> File {
        match *self {
            CastlingSide::Queen => File::A,
            CastlingSide::King => File::H,
        }
    }

    /// File on which the rook lands after castling
    pub const fn rook_dst(&self) -> File {
        match *self {
            CastlingSide::Queen => File::D,
            CastlingSide::King => File::F,
        }
    }

    /// File on which the king lands after castling
    pub const fn king_dst(&self) -> File {
        match *self {
            CastlingSide::Queen => File::C,
            CastlingSide::King => File::G,
        }
    }
}

/// Final result of the game, as far as the board alone can tell
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// The side to move has no legal moves and its king is attacked
    Checkmate { winner: Color },
    /// The side to move has no legal moves, but its king is safe
    Stalemate,
}

impl Outcome {
    pub fn winner(&self) -> Option<Color> {
        match *self {
            Outcome::Checkmate { winner } => Some(winner),
            Outcome::Stalemate => None,
        }
    }
}

impl Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match *self {
            Outcome::Checkmate {
                winner: Color::White,
            } => write!(f, "White wins by checkmate"),
            Outcome::Checkmate {
                winner: Color::Black,
            } => write!(f, "Black wins by checkmate"),
            Outcome::Stalemate => write!(f, "Draw by stalemate"),
        }
    }
}
