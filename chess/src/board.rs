//! Board and related things

use crate::bitboard::Bitboard;
use crate::types::{Cell, Color, Coord, File, Outcome, Piece, Rank};
use crate::{check, geometry, legal};

use std::fmt;

/// A piece together with its per-piece flags
///
/// This is a read-only view; the flags themselves are stored in [`Board`] and travel with
/// the piece when it moves.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Unit {
    pub color: Color,
    pub piece: Piece,
    /// The piece has made at least one move. Never reset.
    pub has_moved: bool,
    /// The piece is a king which was attacked after the last applied move
    pub in_check: bool,
}

/// Chess position
///
/// Always contains exactly 64 squares, each either empty or holding one piece. Apart from
/// the pieces, the board remembers which pieces have already moved, the square which can
/// be captured onto en passant during the next ply, the side to move, the king currently
/// in check and the pieces captured so far.
///
/// The board is not validated. The rules engine only behaves correctly when each side has
/// exactly one king, which always holds for positions reachable from [`Board::initial()`].
///
/// Cloning a board produces a fully independent copy.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Board {
    pub(crate) cells: [Cell; 64],
    pub(crate) moved: Bitboard,
    pub(crate) ep_target: Option<Coord>,
    pub(crate) side: Color,
    pub(crate) checked: Option<Coord>,
    pub(crate) captured: [Vec<Cell>; 2],
}

/// Previous contents of the squares touched by [`Board::relocate()`]
#[derive(Debug, Copy, Clone)]
pub(crate) struct Relocation {
    src: Cell,
    dst: Cell,
}

impl Board {
    /// Returns a board without any pieces, with White to move
    pub const fn empty() -> Board {
        Board {
            cells: [Cell::EMPTY; 64],
            moved: Bitboard::EMPTY,
            ep_target: None,
            side: Color::White,
            checked: None,
            captured: [Vec::new(), Vec::new()],
        }
    }

    /// Returns a board with the initial position
    pub fn initial() -> Board {
        let mut res = Board::empty();
        for file in File::iter() {
            res.put2(file, Rank::R2, Cell::from_parts(Color::White, Piece::Pawn));
            res.put2(file, Rank::R7, Cell::from_parts(Color::Black, Piece::Pawn));
        }
        for (color, rank) in [(Color::White, Rank::R1), (Color::Black, Rank::R8)] {
            res.put2(File::A, rank, Cell::from_parts(color, Piece::Rook));
            res.put2(File::B, rank, Cell::from_parts(color, Piece::Knight));
            res.put2(File::C, rank, Cell::from_parts(color, Piece::Bishop));
            res.put2(File::D, rank, Cell::from_parts(color, Piece::Queen));
            res.put2(File::E, rank, Cell::from_parts(color, Piece::King));
            res.put2(File::F, rank, Cell::from_parts(color, Piece::Bishop));
            res.put2(File::G, rank, Cell::from_parts(color, Piece::Knight));
            res.put2(File::H, rank, Cell::from_parts(color, Piece::Rook));
        }
        res
    }

    /// Returns the contents of the square with coordinate `c`
    #[inline]
    pub fn get(&self, c: Coord) -> Cell {
        self.cells[c.index()]
    }

    /// Returns the contents of the square with file `file` and rank `rank`
    #[inline]
    pub fn get2(&self, file: File, rank: Rank) -> Cell {
        self.get(Coord::from_parts(file, rank))
    }

    /// Puts `cell` to the square with coordinate `c`
    ///
    /// The new piece is considered unmoved. Use [`Board::set_moved()`] to change it.
    pub fn put(&mut self, c: Coord, cell: Cell) {
        self.cells[c.index()] = cell;
        self.moved.unset(c);
    }

    /// Puts `cell` to the square with file `file` and rank `rank`
    #[inline]
    pub fn put2(&mut self, file: File, rank: Rank, cell: Cell) {
        self.put(Coord::from_parts(file, rank), cell);
    }

    /// Marks the piece on `c` as moved or unmoved
    ///
    /// # Panics
    ///
    /// Panics if the square is empty.
    pub fn set_moved(&mut self, c: Coord, moved: bool) {
        assert!(self.get(c).is_occupied(), "no piece on {}", c);
        if moved {
            self.moved.set(c);
        } else {
            self.moved.unset(c);
        }
    }

    /// Returns `true` if there is a piece on `c` and it has already moved
    #[inline]
    pub fn has_moved(&self, c: Coord) -> bool {
        self.moved.has(c)
    }

    /// Returns the piece on `c` together with its flags
    pub fn unit(&self, c: Coord) -> Option<Unit> {
        let (color, piece) = self.get(c).parts()?;
        Some(Unit {
            color,
            piece,
            has_moved: self.has_moved(c),
            in_check: self.checked == Some(c),
        })
    }

    /// Returns side to move
    #[inline]
    pub fn side(&self) -> Color {
        self.side
    }

    pub fn set_side(&mut self, side: Color) {
        self.side = side;
    }

    /// Returns the square skipped by the last double pawn move, if the previous ply was one
    #[inline]
    pub fn ep_target(&self) -> Option<Coord> {
        self.ep_target
    }

    /// Sets the square that can be captured onto en passant during the next ply
    ///
    /// # Panics
    ///
    /// Panics if the square is not on the 3rd or the 6th rank.
    pub fn set_ep_target(&mut self, target: Option<Coord>) {
        if let Some(t) = target {
            assert!(
                matches!(t.rank(), Rank::R3 | Rank::R6),
                "invalid en passant square {}",
                t
            );
        }
        self.ep_target = target;
    }

    /// Returns `true` if a pawn may capture onto `c` en passant
    #[inline]
    pub fn allows_en_passant(&self, c: Coord) -> bool {
        self.ep_target == Some(c)
    }

    /// Returns the en passant square which pawns of color `c` are allowed to capture onto
    #[inline]
    pub(crate) fn ep_target_for(&self, c: Color) -> Option<Coord> {
        self.ep_target
            .filter(|t| t.rank() == geometry::enpassant_dst_rank(c))
    }

    /// Returns the square of the king which is currently in check
    ///
    /// The value is recomputed after each move applied via [`moves::apply()`](crate::moves::apply).
    #[inline]
    pub fn checked(&self) -> Option<Coord> {
        self.checked
    }

    /// Returns `true` if the king of color `c` was found in check after the last move
    pub fn in_check(&self, c: Color) -> bool {
        self.checked
            .map_or(false, |k| self.get(k).color() == Some(c))
    }

    /// Returns the pieces of color `c` captured so far, in order of capture
    pub fn captured(&self, c: Color) -> &[Cell] {
        &self.captured[c.index()]
    }

    /// Returns the set of squares occupied by pieces of color `c`
    pub fn color(&self, c: Color) -> Bitboard {
        Coord::iter()
            .filter(|&sq| self.get(sq).color() == Some(c))
            .collect()
    }

    /// Returns the set of squares occupied by any piece
    pub fn occupied(&self) -> Bitboard {
        Coord::iter().filter(|&sq| self.get(sq).is_occupied()).collect()
    }

    /// Returns the set of squares occupied by pieces of color `c` and kind `p`
    pub fn piece2(&self, c: Color, p: Piece) -> Bitboard {
        let cell = Cell::from_parts(c, p);
        Coord::iter().filter(|&sq| self.get(sq) == cell).collect()
    }

    /// Returns the position of the king of color `c`
    ///
    /// If there are several such kings, the one with the lowest square index is returned.
    pub fn king_pos(&self, c: Color) -> Option<Coord> {
        self.piece2(c, Piece::King).into_iter().next()
    }

    /// Removes the piece from `c` and returns it
    pub(crate) fn take(&mut self, c: Coord) -> Cell {
        let cell = self.get(c);
        self.cells[c.index()] = Cell::EMPTY;
        self.moved.unset(c);
        cell
    }

    /// Puts `cell` on `c`, marking it as moved if `moved` is set
    pub(crate) fn place(&mut self, c: Coord, cell: Cell, moved: bool) {
        self.cells[c.index()] = cell;
        if moved && cell.is_occupied() {
            self.moved.set(c);
        } else {
            self.moved.unset(c);
        }
    }

    /// Moves the piece from `src` to `dst`, overwriting anything on `dst`
    ///
    /// Only the cells are changed. Flags and side effects of special moves are left as is,
    /// so the operation is cheap to revert with [`Board::unrelocate()`].
    pub(crate) fn relocate(&mut self, src: Coord, dst: Coord) -> Relocation {
        let undo = Relocation {
            src: self.get(src),
            dst: self.get(dst),
        };
        self.cells[dst.index()] = undo.src;
        self.cells[src.index()] = Cell::EMPTY;
        undo
    }

    pub(crate) fn unrelocate(&mut self, src: Coord, dst: Coord, undo: Relocation) {
        self.cells[src.index()] = undo.src;
        self.cells[dst.index()] = undo.dst;
    }

    /// Returns `true` if the side of color `c` has at least one legal move
    pub fn has_legal_moves(&self, c: Color) -> bool {
        let mut checker = legal::Checker::new(self);
        self.color(c)
            .into_iter()
            .any(|src| checker.playable(src).is_nonempty())
    }

    fn king_color(&self, king: Coord) -> Color {
        match self.get(king).parts() {
            Some((color, Piece::King)) => color,
            _ => panic!("no king on {}", king),
        }
    }

    /// Returns `true` if the side owning `king` is checkmated
    ///
    /// The side must have no legal moves and `king` must be attacked.
    ///
    /// # Panics
    ///
    /// Panics if there is no king on `king`.
    pub fn is_checkmate(&self, king: Coord) -> bool {
        let color = self.king_color(king);
        check::is_attacked(self, king, color.inv()) && !self.has_legal_moves(color)
    }

    /// Returns `true` if the side owning `king` is stalemated
    ///
    /// The side must have no legal moves while `king` is not attacked.
    ///
    /// # Panics
    ///
    /// Panics if there is no king on `king`.
    pub fn is_stalemate(&self, king: Coord) -> bool {
        let color = self.king_color(king);
        !check::is_attacked(self, king, color.inv()) && !self.has_legal_moves(color)
    }

    /// Returns the outcome for the side to move assuming it has no legal moves
    pub(crate) fn outcome_when_stuck(&self) -> Outcome {
        let side = self.side;
        let attacked = self
            .king_pos(side)
            .map_or(false, |k| check::is_attacked(self, k, side.inv()));
        if attacked {
            Outcome::Checkmate { winner: side.inv() }
        } else {
            Outcome::Stalemate
        }
    }

    /// Calculates the current outcome on the board
    ///
    /// Returns `None` if the side to move still has legal moves. This function can be
    /// computationally expensive, as it runs the full legality filter.
    pub fn calc_outcome(&self) -> Option<Outcome> {
        if self.has_legal_moves(self.side) {
            return None;
        }
        Some(self.outcome_when_stuck())
    }

    /// Wraps the board to allow pretty-printing with the given style `Style`
    ///
    /// The resulting wrapper implements [`fmt::Display`], so can be used with
    /// `write!()`, `println!()`, or `ToString::to_string`.
    ///
    /// # Example
    ///
    /// ```
    /// # use rookery::{Board, board::PrettyStyle};
    /// #
    /// let b = Board::initial();
    ///
    /// let res = r#"
    /// 8|rnbqkbnr
    /// 7|pppppppp
    /// 6|........
    /// 5|........
    /// 4|........
    /// 3|........
    /// 2|PPPPPPPP
    /// 1|RNBQKBNR
    /// -+--------
    /// W|abcdefgh
    /// "#;
    /// assert_eq!(b.pretty(PrettyStyle::Ascii).to_string().trim(), res.trim());
    /// ```
    #[inline]
    pub fn pretty(&self, style: PrettyStyle) -> Pretty<'_> {
        Pretty { board: self, style }
    }

    #[cfg(feature = "selftest")]
    pub(crate) fn self_check(&self) {
        for color in [Color::White, Color::Black] {
            assert_eq!(
                self.piece2(color, Piece::King).len(),
                1,
                "expected exactly one king of color {:?}",
                color
            );
        }
        assert!(
            (self.moved & !self.occupied()).is_empty(),
            "moved flag set on an empty square"
        );
        if let Some(t) = self.ep_target {
            assert!(self.get(t).is_empty(), "en passant square {} is occupied", t);
            assert_eq!(
                t.rank(),
                geometry::enpassant_dst_rank(self.side),
                "en passant square {} is not capturable by the side to move",
                t
            );
        }
        if let Some(k) = self.checked {
            assert_eq!(self.get(k).piece(), Some(Piece::King), "no king in check on {}", k);
        }
    }
}

impl Default for Board {
    #[inline]
    fn default() -> Board {
        Board::empty()
    }
}

/// Style for [`Board::pretty()`]
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PrettyStyle {
    /// Print pieces and frames as ASCII characters
    Ascii,
    /// Print pieces and frames as fancy Unicode characters
    Utf8,
}

/// Wrapper to pretty-print the board
///
/// See docs for [`Board::pretty()`] for more details.
pub struct Pretty<'a> {
    board: &'a Board,
    style: PrettyStyle,
}

trait StyleTable {
    const HORZ_FRAME: char;
    const VERT_FRAME: char;
    const ANGLE_FRAME: char;
    const WHITE_INDICATOR: char;
    const BLACK_INDICATOR: char;

    fn cell(c: Cell) -> char;

    fn indicator(c: Color) -> char {
        match c {
            Color::White => Self::WHITE_INDICATOR,
            Color::Black => Self::BLACK_INDICATOR,
        }
    }

    fn fmt(b: &Board, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            write!(f, "{}{}", rank, Self::VERT_FRAME)?;
            for file in File::iter() {
                write!(f, "{}", Self::cell(b.get2(file, rank)))?;
            }
            writeln!(f)?;
        }
        write!(f, "{}{}", Self::HORZ_FRAME, Self::ANGLE_FRAME)?;
        for _ in File::iter() {
            write!(f, "{}", Self::HORZ_FRAME)?;
        }
        writeln!(f)?;
        write!(f, "{}{}", Self::indicator(b.side), Self::VERT_FRAME)?;
        for file in File::iter() {
            write!(f, "{}", file)?;
        }
        writeln!(f)?;
        Ok(())
    }
}

struct AsciiStyleTable;
struct Utf8StyleTable;

impl StyleTable for AsciiStyleTable {
    const HORZ_FRAME: char = '-';
    const VERT_FRAME: char = '|';
    const ANGLE_FRAME: char = '+';
    const WHITE_INDICATOR: char = 'W';
    const BLACK_INDICATOR: char = 'B';

    fn cell(c: Cell) -> char {
        c.as_char()
    }
}

impl StyleTable for Utf8StyleTable {
    const HORZ_FRAME: char = '─';
    const VERT_FRAME: char = '│';
    const ANGLE_FRAME: char = '┼';
    const WHITE_INDICATOR: char = '○';
    const BLACK_INDICATOR: char = '●';

    fn cell(c: Cell) -> char {
        c.as_utf8_char()
    }
}

impl<'a> fmt::Display for Pretty<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        match self.style {
            PrettyStyle::Ascii => AsciiStyleTable::fmt(self.board, f),
            PrettyStyle::Utf8 => Utf8StyleTable::fmt(self.board, f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    #[test]
    fn test_initial() {
        let b = Board::initial();
        assert_eq!(b.occupied().len(), 32);
        assert_eq!(b.color(Color::White).len(), 16);
        assert_eq!(b.color(Color::Black).len(), 16);
        for rank in [Rank::R3, Rank::R4, Rank::R5, Rank::R6] {
            for file in File::iter() {
                assert!(b.get2(file, rank).is_empty());
            }
        }
        assert_eq!(
            b.get(c("d1")),
            Cell::from_parts(Color::White, Piece::Queen)
        );
        assert_eq!(
            b.get(c("e8")),
            Cell::from_parts(Color::Black, Piece::King)
        );
        assert_eq!(b.king_pos(Color::White), Some(c("e1")));
        assert_eq!(b.king_pos(Color::Black), Some(c("e8")));
        assert_eq!(b.side(), Color::White);
        assert_eq!(b.ep_target(), None);
        assert_eq!(b.checked(), None);
        assert_eq!(b.moved, Bitboard::EMPTY);
    }

    #[test]
    fn test_unit() {
        let mut b = Board::initial();
        assert_eq!(b.unit(c("e4")), None);
        assert_eq!(
            b.unit(c("g1")),
            Some(Unit {
                color: Color::White,
                piece: Piece::Knight,
                has_moved: false,
                in_check: false,
            })
        );
        moves::apply(&mut b, c("g1"), c("f3"));
        assert_eq!(b.unit(c("g1")), None);
        assert!(b.unit(c("f3")).unwrap().has_moved);
    }

    #[test]
    fn test_put_resets_moved() {
        let mut b = Board::empty();
        let e4 = c("e4");
        b.put(e4, Cell::from_parts(Color::White, Piece::Rook));
        b.set_moved(e4, true);
        assert!(b.has_moved(e4));
        b.put(e4, Cell::from_parts(Color::Black, Piece::Rook));
        assert!(!b.has_moved(e4));
    }

    #[test]
    #[should_panic]
    fn test_set_moved_empty() {
        let mut b = Board::empty();
        b.set_moved(c("a1"), true);
    }

    #[test]
    fn test_relocate() {
        let mut b = Board::initial();
        let copy = b.clone();
        let u = b.relocate(c("d1"), c("d7"));
        assert_eq!(b.get(c("d1")), Cell::EMPTY);
        assert_eq!(
            b.get(c("d7")),
            Cell::from_parts(Color::White, Piece::Queen)
        );
        b.unrelocate(c("d1"), c("d7"), u);
        assert_eq!(b, copy);
    }

    #[test]
    fn test_clone_is_independent() {
        let b = Board::initial();
        let mut copy = b.clone();
        moves::apply(&mut copy, c("e2"), c("e4"));
        assert_eq!(b, Board::initial());
        assert_ne!(b, copy);
    }

    #[test]
    fn test_outcome() {
        assert_eq!(Board::initial().calc_outcome(), None);

        // Black king cornered by a queen with no escape
        let mut b = Board::empty();
        b.put(c("h8"), Cell::from_parts(Color::Black, Piece::King));
        b.put(c("g7"), Cell::from_parts(Color::White, Piece::Queen));
        b.put(c("g6"), Cell::from_parts(Color::White, Piece::King));
        b.set_side(Color::Black);
        assert!(b.is_checkmate(c("h8")));
        assert!(!b.is_stalemate(c("h8")));
        assert_eq!(
            b.calc_outcome(),
            Some(Outcome::Checkmate {
                winner: Color::White
            })
        );

        // Same king, not attacked, but without moves
        let mut b = Board::empty();
        b.put(c("h8"), Cell::from_parts(Color::Black, Piece::King));
        b.put(c("f7"), Cell::from_parts(Color::White, Piece::Queen));
        b.put(c("g6"), Cell::from_parts(Color::White, Piece::King));
        b.set_side(Color::Black);
        assert!(!b.is_checkmate(c("h8")));
        assert!(b.is_stalemate(c("h8")));
        assert_eq!(b.calc_outcome(), Some(Outcome::Stalemate));
    }

    #[test]
    #[should_panic(expected = "no king on e4")]
    fn test_checkmate_requires_king() {
        Board::initial().is_checkmate(c("e4"));
    }

    #[test]
    fn test_pretty_utf8() {
        let res = r#"
8│♜♞♝♛♚♝♞♜
7│♟♟♟♟♟♟♟♟
6│........
5│........
4│........
3│........
2│♙♙♙♙♙♙♙♙
1│♖♘♗♕♔♗♘♖
─┼────────
○│abcdefgh
"#;
        assert_eq!(
            Board::initial().pretty(PrettyStyle::Utf8).to_string().trim(),
            res.trim()
        );
    }
}
