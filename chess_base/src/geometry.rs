use crate::types::{Color, Rank};

/// Home rank of the king and the rooks
pub const fn castling_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R1,
        Color::Black => Rank::R8,
    }
}

/// Rank from which pawns are allowed to make a double move
pub const fn double_move_src_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R2,
        Color::Black => Rank::R7,
    }
}

/// Rank on which a pawn gets promoted
pub const fn promote_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R8,
        Color::Black => Rank::R1,
    }
}

/// Rank of the square skipped by an opponent's double pawn move, i.e. where a pawn of color
/// `c` lands when capturing en passant
pub const fn enpassant_dst_rank(c: Color) -> Rank {
    match c {
        Color::White => Rank::R6,
        Color::Black => Rank::R3,
    }
}

/// Rank delta of a single pawn step
pub const fn pawn_forward_delta(c: Color) -> isize {
    match c {
        Color::White => 1,
        Color::Black => -1,
    }
}
