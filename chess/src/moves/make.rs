use super::base::{Move, MoveKind, ValidateError};
use crate::board::Board;
use crate::check::{self, CheckStatus};
use crate::geometry;
use crate::types::{Cell, Coord, Piece, Rank};

use std::convert::Infallible;

use tracing::{debug, info};

/// Everything that happened when a move was applied
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Applied {
    /// The move itself
    pub mv: Move,
    /// The moving piece before promotion
    pub piece: Piece,
    /// Captured piece, including the pawn taken en passant
    pub captured: Option<Cell>,
    /// King attacked after the move, if any
    pub check: Option<CheckStatus>,
}

impl Applied {
    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    #[inline]
    pub fn is_promote(&self) -> bool {
        self.mv.kind() == MoveKind::Promote
    }
}

/// Applies the move from `src` to `dst` to the board
///
/// The move must be legal, as returned by [`legal::moves_for()`](crate::legal::moves_for)
/// for the piece on `src`. Otherwise, the board may end up in a position which cannot be
/// reached by the rules.
///
/// # Panics
///
/// Panics if `src` is empty.
pub fn apply(b: &mut Board, src: Coord, dst: Coord) -> Applied {
    match Move::classify(b, src, dst) {
        Some(mv) => apply_move(b, mv),
        None => panic!("no piece on {}", src),
    }
}

/// Applies a classified move to the board
///
/// Same as [`apply()`], but takes a move already classified on `b`.
pub fn apply_move(b: &mut Board, mv: Move) -> Applied {
    let (src, dst) = (mv.src(), mv.dst());
    let cell = b.get(src);
    let piece = match cell.piece() {
        Some(piece) => piece,
        None => panic!("no piece on {}", src),
    };
    let mut captured = None;

    if let Some(victim) = mv.enpassant_victim() {
        captured = Some(b.take(victim));
    }

    b.ep_target = None;
    if mv.kind() == MoveKind::PawnDouble {
        let mid = (src.rank().index() + dst.rank().index()) / 2;
        b.ep_target = Some(Coord::from_parts(src.file(), Rank::from_index(mid)));
    }

    let moving = match mv.kind().promote() {
        Some(promote) => Cell::from_parts(mv.side(), promote),
        None => cell,
    };

    if let Some(side) = mv.kind().castling() {
        let rank = geometry::castling_rank(mv.side());
        let rook = b.take(Coord::from_parts(side.rook_src(), rank));
        b.place(Coord::from_parts(side.rook_dst(), rank), rook, true);
    }

    if b.get(dst).is_occupied() {
        captured = Some(b.take(dst));
    }
    if let Some(victim) = captured {
        if let Some(color) = victim.color() {
            b.captured[color.index()].push(victim);
        }
    }

    b.take(src);
    b.place(dst, moving, true);

    let check = check::find_checks(b);
    b.checked = check.map(|st| st.king);
    b.side = b.side.inv();

    debug!(
        %src,
        %dst,
        kind = ?mv.kind(),
        captured = ?captured,
        "applied move"
    );
    if let Some(st) = &check {
        info!(king = %st.king, attackers = st.attackers.len(), "king in check");
    }

    #[cfg(feature = "selftest")]
    b.self_check();

    Applied {
        mv,
        piece,
        captured,
        check,
    }
}

/// Trait to apply move-like objects to the board
pub trait Make {
    type Err;

    /// Applies the move to `board` in place
    fn make_raw(&self, board: &mut Board) -> Result<Applied, Self::Err>;

    /// Returns a new board with the move applied, leaving `board` intact
    fn make(&self, board: &Board) -> Result<(Board, Applied), Self::Err> {
        let mut cloned = board.clone();
        let applied = self.make_raw(&mut cloned)?;
        Ok((cloned, applied))
    }
}

impl Make for Move {
    type Err = ValidateError;

    fn make_raw(&self, board: &mut Board) -> Result<Applied, Self::Err> {
        self.validate(board)?;
        Ok(apply_move(board, *self))
    }
}

/// Move which is applied without validation
pub struct Unchecked(pub Move);

impl Make for Unchecked {
    type Err = Infallible;

    #[inline]
    fn make_raw(&self, board: &mut Board) -> Result<Applied, Self::Err> {
        Ok(apply_move(board, self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitboard::Bitboard;
    use crate::types::{Color, File, Outcome};

    fn c(s: &str) -> Coord {
        s.parse().unwrap()
    }

    fn play(b: &mut Board, moves: &[(&str, &str)]) -> Vec<Applied> {
        moves
            .iter()
            .map(|&(src, dst)| {
                let mv = Move::new_legal(b, c(src), c(dst)).unwrap();
                apply_move(b, mv)
            })
            .collect()
    }

    #[test]
    fn test_simple() {
        let mut b = Board::initial();
        let applied = apply(&mut b, c("g1"), c("f3"));
        assert_eq!(applied.mv.kind(), MoveKind::Simple);
        assert_eq!(applied.piece, Piece::Knight);
        assert_eq!(applied.captured, None);
        assert_eq!(applied.check, None);
        assert_eq!(b.get(c("g1")), Cell::EMPTY);
        assert_eq!(b.get(c("f3")), Cell::from_parts(Color::White, Piece::Knight));
        assert!(b.has_moved(c("f3")));
        assert!(!b.has_moved(c("g1")));
        assert_eq!(b.side(), Color::Black);
    }

    #[test]
    fn test_round_trip() {
        let initial = Board::initial();
        let mut b = initial.clone();
        apply(&mut b, c("g1"), c("f3"));
        let mut back = b.clone();
        apply(&mut back, c("f3"), c("g1"));
        assert_eq!(back.occupied(), initial.occupied());
        for sq in Coord::iter() {
            assert_eq!(back.get(sq), initial.get(sq));
        }
        assert_eq!(back.side(), Color::White);
        assert!(back.has_moved(c("g1")));
    }

    #[test]
    fn test_enpassant() {
        let mut b = Board::initial();
        play(&mut b, &[("e2", "e4"), ("a7", "a6"), ("e4", "e5"), ("d7", "d5")]);
        assert_eq!(b.ep_target(), Some(c("d6")));
        assert!(b.allows_en_passant(c("d6")));

        let mut taken = b.clone();
        let applied = play(&mut taken, &[("e5", "d6")]).remove(0);
        assert_eq!(applied.mv.kind(), MoveKind::Enpassant);
        assert_eq!(
            applied.captured,
            Some(Cell::from_parts(Color::Black, Piece::Pawn))
        );
        assert_eq!(taken.get(c("d5")), Cell::EMPTY);
        assert_eq!(taken.get(c("e5")), Cell::EMPTY);
        assert_eq!(taken.get(c("d6")), Cell::from_parts(Color::White, Piece::Pawn));
        assert_eq!(
            taken.captured(Color::Black),
            &[Cell::from_parts(Color::Black, Piece::Pawn)]
        );
        assert_eq!(taken.ep_target(), None);

        // The right to capture lasts exactly one ply
        play(&mut b, &[("h2", "h3"), ("h7", "h6")]);
        assert_eq!(b.ep_target(), None);
        assert!(!Move::classify(&b, c("e5"), c("d6")).unwrap().is_legal(&b));
    }

    #[test]
    fn test_castling() {
        let mut b = Board::initial();
        play(
            &mut b,
            &[
                ("e2", "e4"),
                ("e7", "e5"),
                ("g1", "f3"),
                ("b8", "c6"),
                ("f1", "c4"),
                ("g8", "f6"),
            ],
        );
        let applied = play(&mut b, &[("e1", "g1")]).remove(0);
        assert_eq!(applied.mv.kind(), MoveKind::CastlingKingside);
        assert_eq!(b.get(c("g1")), Cell::from_parts(Color::White, Piece::King));
        assert_eq!(b.get(c("f1")), Cell::from_parts(Color::White, Piece::Rook));
        assert_eq!(b.get(c("h1")), Cell::EMPTY);
        assert_eq!(b.get(c("e1")), Cell::EMPTY);
        assert!(b.has_moved(c("g1")));
        assert!(b.has_moved(c("f1")));
    }

    #[test]
    fn test_castling_queenside_black() {
        let mut b = Board::empty();
        b.put(c("e1"), Cell::from_parts(Color::White, Piece::King));
        b.put(c("e8"), Cell::from_parts(Color::Black, Piece::King));
        b.put(c("a8"), Cell::from_parts(Color::Black, Piece::Rook));
        b.set_side(Color::Black);
        play(&mut b, &[("e8", "c8")]);
        assert_eq!(b.get2(File::C, Rank::R8), Cell::from_parts(Color::Black, Piece::King));
        assert_eq!(b.get2(File::D, Rank::R8), Cell::from_parts(Color::Black, Piece::Rook));
        assert_eq!(b.get2(File::A, Rank::R8), Cell::EMPTY);
    }

    #[test]
    fn test_promote() {
        let mut b = Board::empty();
        b.put(c("e1"), Cell::from_parts(Color::White, Piece::King));
        b.put(c("h1"), Cell::from_parts(Color::Black, Piece::King));
        b.put(c("a7"), Cell::from_parts(Color::White, Piece::Pawn));
        b.put(c("b8"), Cell::from_parts(Color::Black, Piece::Rook));
        b.set_moved(c("a7"), true);

        let mut pushed = b.clone();
        let applied = play(&mut pushed, &[("a7", "a8")]).remove(0);
        assert!(applied.is_promote());
        assert_eq!(applied.piece, Piece::Pawn);
        let unit = pushed.unit(c("a8")).unwrap();
        assert_eq!(unit.piece, Piece::Queen);
        assert_eq!(unit.color, Color::White);
        assert!(unit.has_moved);

        let applied = play(&mut b, &[("a7", "b8")]).remove(0);
        assert!(applied.is_promote());
        assert_eq!(applied.captured, Some(Cell::from_parts(Color::Black, Piece::Rook)));
        assert_eq!(b.get(c("b8")), Cell::from_parts(Color::White, Piece::Queen));
        assert_eq!(b.captured(Color::Black).len(), 1);
    }

    #[test]
    fn test_scholars_mate() {
        let mut b = Board::initial();
        let applied = play(
            &mut b,
            &[
                ("e2", "e4"),
                ("e7", "e5"),
                ("d1", "h5"),
                ("b8", "c6"),
                ("f1", "c4"),
                ("g8", "f6"),
                ("h5", "f7"),
            ],
        );
        let last = applied.last().unwrap();
        assert_eq!(
            last.captured,
            Some(Cell::from_parts(Color::Black, Piece::Pawn))
        );
        let st = last.check.unwrap();
        assert_eq!(st.king, c("e8"));
        assert_eq!(st.attackers, Bitboard::from_coord(c("f7")));
        assert_eq!(b.checked(), Some(c("e8")));
        assert!(b.unit(c("e8")).unwrap().in_check);
        assert!(b.is_checkmate(c("e8")));
        assert_eq!(
            b.calc_outcome(),
            Some(Outcome::Checkmate {
                winner: Color::White
            })
        );
    }

    #[test]
    fn test_check_cleared() {
        let mut b = Board::initial();
        play(&mut b, &[("e2", "e4"), ("d7", "d6"), ("f1", "b5")]);
        assert_eq!(b.checked(), Some(c("e8")));
        play(&mut b, &[("c7", "c6")]);
        assert_eq!(b.checked(), None);
    }

    #[test]
    fn test_make() {
        let b = Board::initial();
        let mv = Move::classify(&b, c("e2"), c("e5")).unwrap();
        assert_eq!(mv.make(&b), Err(ValidateError::NotReachable));

        let mv = Move::classify(&b, c("e2"), c("e4")).unwrap();
        let (next, applied) = mv.make(&b).unwrap();
        assert_eq!(applied.mv, mv);
        assert_eq!(next.ep_target(), Some(c("e3")));
        assert_eq!(b, Board::initial());

        let (unchecked, _) = Unchecked(mv).make(&b).unwrap();
        assert_eq!(unchecked, next);
    }
}
