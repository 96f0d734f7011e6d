//! Pseudo-legal move generation
//!
//! Destinations generated here respect piece movement and blocking, but ignore whether the
//! moving side's king is left attacked. Use [`legal`](crate::legal) to filter them.

use crate::bitboard::Bitboard;
use crate::board::Board;
use crate::types::{CastlingSide, Cell, Color, Coord, File, Piece};
use crate::geometry;

const KNIGHT_STEPS: [(isize, isize); 8] = [
    (-2, -1),
    (-2, 1),
    (-1, -2),
    (-1, 2),
    (1, -2),
    (1, 2),
    (2, -1),
    (2, 1),
];

const KING_STEPS: [(isize, isize); 8] = [
    (-1, -1),
    (-1, 0),
    (-1, 1),
    (0, -1),
    (0, 1),
    (1, -1),
    (1, 0),
    (1, 1),
];

const DIAG_RAYS: [(isize, isize); 4] = [(1, 1), (-1, 1), (1, -1), (-1, -1)];
const LINE_RAYS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

#[derive(Copy, Clone, PartialEq, Eq)]
enum Castling {
    Include,
    Skip,
}

#[inline]
fn is_free_for(b: &Board, dst: Coord, color: Color) -> bool {
    b.get(dst).color() != Some(color)
}

fn steps(b: &Board, src: Coord, color: Color, offsets: &[(isize, isize)]) -> Bitboard {
    offsets
        .iter()
        .filter_map(|&(df, dr)| src.try_shift(df, dr))
        .filter(|&dst| is_free_for(b, dst, color))
        .collect()
}

fn rays(b: &Board, src: Coord, color: Color, dirs: &[(isize, isize)]) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for &(df, dr) in dirs {
        let mut cur = src;
        while let Some(next) = cur.try_shift(df, dr) {
            match b.get(next).color() {
                None => res.set(next),
                Some(c) => {
                    if c != color {
                        res.set(next);
                    }
                    break;
                }
            }
            cur = next;
        }
    }
    res
}

fn pawn(b: &Board, src: Coord, color: Color) -> Bitboard {
    let fwd = geometry::pawn_forward_delta(color);
    let mut res = Bitboard::EMPTY;

    if let Some(single) = src.try_shift(0, fwd) {
        if b.get(single).is_empty() {
            res.set(single);
            if !b.has_moved(src) {
                if let Some(double) = single.try_shift(0, fwd) {
                    if b.get(double).is_empty() {
                        res.set(double);
                    }
                }
            }
        }
    }

    let ep = b.ep_target_for(color);
    for df in [-1, 1] {
        if let Some(dst) = src.try_shift(df, fwd) {
            if b.get(dst).color() == Some(color.inv()) || ep == Some(dst) {
                res.set(dst);
            }
        }
    }

    res
}

/// Squares which must be empty and squares which must not be reachable by the opponent
fn castling_squares(side: CastlingSide, color: Color) -> (Bitboard, Bitboard) {
    let rank = geometry::castling_rank(color);
    let sq = |file| Bitboard::from_coord(Coord::from_parts(file, rank));
    match side {
        CastlingSide::Queen => {
            let pass = sq(File::C) | sq(File::D);
            (pass | sq(File::B), pass)
        }
        CastlingSide::King => {
            let pass = sq(File::F) | sq(File::G);
            (pass, pass)
        }
    }
}

fn castling(b: &Board, king: Coord, color: Color) -> Bitboard {
    let rank = geometry::castling_rank(color);
    if b.has_moved(king) || king != Coord::from_parts(File::E, rank) {
        return Bitboard::EMPTY;
    }

    let occupied = b.occupied();
    let rook = Cell::from_parts(color, Piece::Rook);
    let mut threats = None;
    let mut res = Bitboard::EMPTY;
    for side in [CastlingSide::Queen, CastlingSide::King] {
        let rook_src = Coord::from_parts(side.rook_src(), rank);
        if b.get(rook_src) != rook || b.has_moved(rook_src) {
            continue;
        }
        let (path, pass) = castling_squares(side, color);
        if (path & occupied).is_nonempty() {
            continue;
        }
        let threats = *threats.get_or_insert_with(|| reachable_by(b, color.inv(), false));
        if threats.has(king) || (threats & pass).is_nonempty() {
            continue;
        }
        res.set(Coord::from_parts(side.king_dst(), rank));
    }
    res
}

fn do_reachable(b: &Board, src: Coord, castling_mode: Castling) -> Bitboard {
    let (color, piece) = match b.get(src).parts() {
        Some(parts) => parts,
        None => return Bitboard::EMPTY,
    };
    match piece {
        Piece::Pawn => pawn(b, src, color),
        Piece::Knight => steps(b, src, color, &KNIGHT_STEPS),
        Piece::Bishop => rays(b, src, color, &DIAG_RAYS),
        Piece::Rook => rays(b, src, color, &LINE_RAYS),
        Piece::Queen => rays(b, src, color, &DIAG_RAYS) | rays(b, src, color, &LINE_RAYS),
        Piece::King => {
            let mut res = steps(b, src, color, &KING_STEPS);
            if castling_mode == Castling::Include {
                res |= castling(b, src, color);
            }
            res
        }
    }
}

/// Returns pseudo-legal destinations of the piece on `src`
///
/// For an empty square, returns an empty set. Castling destinations are included for kings.
#[inline]
pub fn reachable(b: &Board, src: Coord) -> Bitboard {
    do_reachable(b, src, Castling::Include)
}

/// Same as [`reachable()`], but never includes castling destinations
///
/// Castling can never capture, so this is what attack detection uses.
#[inline]
pub(crate) fn reachable_no_castling(b: &Board, src: Coord) -> Bitboard {
    do_reachable(b, src, Castling::Skip)
}

/// Returns the union of pseudo-legal destinations over all pieces of color `color`
///
/// Kings are taken into account only if `include_king` is set.
pub fn reachable_by(b: &Board, color: Color, include_king: bool) -> Bitboard {
    let mut res = Bitboard::EMPTY;
    for src in b.color(color) {
        if !include_king && b.get(src).piece() == Some(Piece::King) {
            continue;
        }
        res |= reachable(b, src);
    }
    res
}
