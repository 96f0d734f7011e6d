//! Check detection

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::movegen;
use crate::types::{Color, Coord, Piece};

use std::iter;

/// King under attack together with the pieces attacking it
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct CheckStatus {
    /// Square of the attacked king
    pub king: Coord,
    /// Squares of all enemy pieces attacking the king. Never empty.
    pub attackers: Bitboard,
}

impl CheckStatus {
    /// Returns the color of the side being in check
    pub fn color(&self, b: &Board) -> Option<Color> {
        b.get(self.king).color()
    }

    /// Iterates over the king square first, then over the attackers in increasing index order
    pub fn squares(&self) -> impl Iterator<Item = Coord> {
        iter::once(self.king).chain(self.attackers)
    }
}

/// Returns all pieces of color `by` which can reach `coord`
///
/// Reachability is pseudo-legal, so a pinned piece is still considered an attacker.
pub fn attackers(b: &Board, coord: Coord, by: Color) -> Bitboard {
    b.color(by)
        .into_iter()
        .filter(|&src| movegen::reachable_no_castling(b, src).has(coord))
        .collect()
}

/// Returns `true` if any piece of color `by` can reach `coord`
pub fn is_attacked(b: &Board, coord: Coord, by: Color) -> bool {
    b.color(by)
        .into_iter()
        .any(|src| movegen::reachable_no_castling(b, src).has(coord))
}

/// Returns `true` if any king of color `c` can be reached by the opponent
pub(crate) fn is_king_exposed(b: &Board, c: Color) -> bool {
    let kings = b.piece2(c, Piece::King);
    if kings.is_empty() {
        return false;
    }
    b.color(c.inv())
        .into_iter()
        .any(|src| (movegen::reachable_no_castling(b, src) & kings).is_nonempty())
}

/// Finds a king under attack
///
/// Pieces are scanned in increasing square index order, and the first king found in the
/// reach of some enemy piece is reported, together with all of its attackers. Only one
/// king is reported even if both are attacked.
pub fn find_checks(b: &Board) -> Option<CheckStatus> {
    for src in b.occupied() {
        let color = match b.get(src).color() {
            Some(color) => color,
            None => continue,
        };
        let kings = movegen::reachable_no_castling(b, src) & b.piece2(color.inv(), Piece::King);
        if let Some(king) = kings.into_iter().next() {
            return Some(CheckStatus {
                king,
                attackers: attackers(b, king, color),
            });
        }
    }
    None
}
