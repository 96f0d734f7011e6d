//! Legality filter
//!
//! A pseudo-legal move is legal if, after relocating the moving piece, no king of the mover
//! can be reached by the opponent. Only the relocation itself is simulated: the pawn removed
//! by an en passant capture and the rook moved by castling are not taken into account.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::types::{Color, Coord};
use crate::{check, movegen};

use std::iter::FusedIterator;

use arrayvec::ArrayVec;
use tracing::trace;

/// Filters pseudo-legal moves using make/unmake on a scratch copy of the board
///
/// The checker clones the board once, then each candidate move is made on the copy, tested
/// and reverted.
pub struct Checker {
    board: Board,
}

impl Checker {
    pub fn new(b: &Board) -> Checker {
        Checker { board: b.clone() }
    }

    /// Returns the board the checker works on
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Returns `true` if moving the piece from `src` to `dst` keeps its king safe
    ///
    /// Returns `false` if `src` is empty. `dst` is not verified to be reachable from `src`.
    pub fn is_safe(&mut self, src: Coord, dst: Coord) -> bool {
        let color = match self.board.get(src).color() {
            Some(color) => color,
            None => return false,
        };
        let undo = self.board.relocate(src, dst);
        let exposed = check::is_king_exposed(&self.board, color);
        self.board.unrelocate(src, dst, undo);
        if exposed {
            trace!(%src, %dst, "move rejected: king left under attack");
        }
        !exposed
    }

    /// Keeps only the destinations from `candidates` which keep the king safe
    pub fn filter(&mut self, src: Coord, candidates: Bitboard) -> Bitboard {
        candidates
            .into_iter()
            .filter(|&dst| self.is_safe(src, dst))
            .collect()
    }

    /// Returns legal destinations of the piece on `src`
    pub fn playable(&mut self, src: Coord) -> Bitboard {
        let candidates = movegen::reachable(&self.board, src);
        self.filter(src, candidates)
    }
}

/// Returns legal destinations of the piece on `src`
///
/// For an empty square, returns an empty set.
pub fn playable(b: &Board, src: Coord) -> Bitboard {
    if b.get(src).is_empty() {
        return Bitboard::EMPTY;
    }
    Checker::new(b).playable(src)
}

/// Returns `true` if the piece on `src` can legally move to `dst`
pub fn is_legal(b: &Board, src: Coord, dst: Coord) -> bool {
    movegen::reachable(b, src).has(dst) && Checker::new(b).is_safe(src, dst)
}

/// Legal destinations grouped by source square
///
/// Only sources with at least one legal destination are stored. Sources are kept in
/// increasing index order.
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct MoveMap(ArrayVec<(Coord, Bitboard), 64>);

impl MoveMap {
    pub fn new() -> MoveMap {
        MoveMap::default()
    }

    fn insert(&mut self, src: Coord, dsts: Bitboard) {
        if dsts.is_nonempty() {
            self.0.push((src, dsts));
        }
    }

    /// Returns legal destinations for `src`
    pub fn get(&self, src: Coord) -> Bitboard {
        self.0
            .iter()
            .find(|(s, _)| *s == src)
            .map_or(Bitboard::EMPTY, |&(_, dsts)| dsts)
    }

    /// Returns `true` if moving from `src` to `dst` is legal
    pub fn contains(&self, src: Coord, dst: Coord) -> bool {
        self.get(src).has(dst)
    }

    /// Iterates over sources with their legal destinations
    pub fn iter(&self) -> impl Iterator<Item = (Coord, Bitboard)> + '_ {
        self.0.iter().copied()
    }

    /// Iterates over all legal moves as `(src, dst)` pairs
    pub fn moves(&self) -> Moves<'_> {
        Moves {
            sources: self.0.iter(),
            cur: None,
        }
    }

    /// Returns the total number of legal moves
    pub fn move_count(&self) -> usize {
        self.0.iter().map(|(_, dsts)| dsts.len() as usize).sum()
    }

    /// Returns `true` if there are no legal moves
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the union of all legal destinations
    pub fn destinations(&self) -> Bitboard {
        self.0
            .iter()
            .fold(Bitboard::EMPTY, |acc, &(_, dsts)| acc | dsts)
    }
}

/// Iterator over moves in [`MoveMap`]
pub struct Moves<'a> {
    sources: std::slice::Iter<'a, (Coord, Bitboard)>,
    cur: Option<(Coord, crate::bitboard::Iter)>,
}

impl<'a> Iterator for Moves<'a> {
    type Item = (Coord, Coord);

    fn next(&mut self) -> Option<(Coord, Coord)> {
        loop {
            if let Some((src, dsts)) = &mut self.cur {
                if let Some(dst) = dsts.next() {
                    return Some((*src, dst));
                }
            }
            let &(src, dsts) = self.sources.next()?;
            self.cur = Some((src, dsts.into_iter()));
        }
    }
}

impl<'a> FusedIterator for Moves<'a> {}

/// Per-color summary of pseudo-legal and legal destinations
///
/// Annotations are computed alongside the legal moves and never stored in the board.
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Annotations {
    reachable: [Bitboard; 2],
    playable: [Bitboard; 2],
}

impl Annotations {
    /// Returns the union of pseudo-legal destinations of color `c`
    ///
    /// For the color whose moves were generated, all pieces are included. For the opponent,
    /// kings are excluded, as for the castling safety check.
    pub fn reachable_by(&self, c: Color) -> Bitboard {
        self.reachable[c.index()]
    }

    /// Returns the union of legal destinations of color `c`
    ///
    /// Empty for the color whose moves were not generated.
    pub fn playable_by(&self, c: Color) -> Bitboard {
        self.playable[c.index()]
    }
}

/// Returns legal moves for color `c`, together with the annotations
pub fn moves_with_annotations(b: &Board, c: Color) -> (MoveMap, Annotations) {
    let mut checker = Checker::new(b);
    let mut map = MoveMap::new();
    let mut ann = Annotations::default();
    for src in b.color(c) {
        let candidates = movegen::reachable(b, src);
        let dsts = checker.filter(src, candidates);
        ann.reachable[c.index()] |= candidates;
        ann.playable[c.index()] |= dsts;
        map.insert(src, dsts);
    }
    ann.reachable[c.inv().index()] = movegen::reachable_by(b, c.inv(), false);
    (map, ann)
}

/// Returns legal moves for color `c`
///
/// Moves are generated regardless of the side to move stored in the board.
pub fn moves_for(b: &Board, c: Color) -> MoveMap {
    let mut checker = Checker::new(b);
    let mut map = MoveMap::new();
    for src in b.color(c) {
        let dsts = checker.playable(src);
        map.insert(src, dsts);
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::{self, MoveKind};
    use crate::types::{Cell, Piece};

    use rand::rngs::StdRng;
    use rand::seq::IteratorRandom;
    use rand::SeedableRng;

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn bb(squares: &[&str]) -> Bitboard {
        squares.iter().map(|s| c(s)).collect()
    }

    #[test]
    fn test_initial() {
        let mut b = Board::initial();
        let white = moves_for(&b, Color::White);
        assert_eq!(white.move_count(), 20);
        assert_eq!(white.iter().count(), 10);
        assert_eq!(white.moves().count(), 20);
        assert!(white.contains(c("g1"), c("f3")));
        assert!(!white.contains(c("g1"), c("e2")));
        assert_eq!(white.get(c("e1")), Bitboard::EMPTY);

        b.set_side(Color::Black);
        assert_eq!(moves_for(&b, Color::Black).move_count(), 20);
    }

    #[test]
    fn test_empty_square() {
        let b = Board::initial();
        assert_eq!(playable(&b, c("e4")), Bitboard::EMPTY);
        assert!(!is_legal(&b, c("e4"), c("e5")));
    }

    #[test]
    fn test_pinned() {
        let mut b = Board::empty();
        b.put(c("e1"), Cell::from_parts(Color::White, Piece::King));
        b.put(c("e2"), Cell::from_parts(Color::White, Piece::Rook));
        b.put(c("e8"), Cell::from_parts(Color::Black, Piece::Rook));
        b.put(c("a8"), Cell::from_parts(Color::Black, Piece::King));

        assert_eq!(
            playable(&b, c("e2")),
            bb(&["e3", "e4", "e5", "e6", "e7", "e8"])
        );
        assert!(is_legal(&b, c("e2"), c("e8")));
        assert!(!is_legal(&b, c("e2"), c("d2")));
        assert_eq!(playable(&b, c("e1")), bb(&["d1", "d2", "f1", "f2"]));
    }

    #[test]
    fn test_king_cannot_step_into_attack() {
        let mut b = Board::empty();
        b.put(c("e4"), Cell::from_parts(Color::White, Piece::King));
        b.put(c("e6"), Cell::from_parts(Color::Black, Piece::King));
        b.put(c("c5"), Cell::from_parts(Color::Black, Piece::Pawn));
        b.set_moved(c("c5"), true);
        assert_eq!(playable(&b, c("e4")), bb(&["d3", "e3", "f3", "f4"]));
    }

    #[test]
    fn test_annotations() {
        let b = Board::initial();
        let (map, ann) = moves_with_annotations(&b, Color::White);
        assert_eq!(map, moves_for(&b, Color::White));
        assert_eq!(ann.reachable_by(Color::White).len(), 16);
        assert_eq!(ann.playable_by(Color::White), map.destinations());
        assert_eq!(ann.reachable_by(Color::Black).len(), 16);
        assert_eq!(ann.playable_by(Color::Black), Bitboard::EMPTY);

        // Annotating never touches the board
        let copy = b.clone();
        let _ = moves_with_annotations(&b, Color::Black);
        assert_eq!(b, copy);
    }

    #[test]
    fn test_fools_mate() {
        let mut b = Board::initial();
        for (src, dst) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4"), ("d8", "h4")] {
            assert!(is_legal(&b, c(src), c(dst)));
            moves::apply(&mut b, c(src), c(dst));
        }
        assert!(moves_for(&b, Color::White).is_empty());
        assert_eq!(moves_for(&b, Color::White).move_count(), 0);
        assert!(b.is_checkmate(c("e1")));
    }

    #[test]
    fn test_random_playouts() {
        let mut rng = StdRng::seed_from_u64(0x600d_cafe);
        for _ in 0..4 {
            let mut b = Board::initial();
            for _ in 0..100 {
                let side = b.side();
                let map = moves_for(&b, side);
                if map.is_empty() {
                    assert!(b.calc_outcome().is_some());
                    break;
                }

                for (src, dst) in map.moves() {
                    let mut next = b.clone();
                    let applied = moves::apply(&mut next, src, dst);
                    if applied.mv.kind() == MoveKind::Enpassant {
                        continue;
                    }
                    assert!(
                        !check::is_king_exposed(&next, side),
                        "move {}{} leaves the king exposed:\n{}",
                        src,
                        dst,
                        b.pretty(crate::board::PrettyStyle::Ascii)
                    );
                }

                let (src, dst) = map.moves().choose(&mut rng).unwrap();
                let before = b.occupied().len();
                let applied = moves::apply(&mut b, src, dst);
                assert_eq!(b.side(), side.inv());
                assert_eq!(
                    b.occupied().len() + applied.captured.is_some() as u32,
                    before
                );
                match applied.mv.kind() {
                    MoveKind::PawnDouble => assert!(b.ep_target().is_some()),
                    _ => assert_eq!(b.ep_target(), None),
                }
            }
        }
    }
}
