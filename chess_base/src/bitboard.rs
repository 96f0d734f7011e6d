use crate::types::{Coord, File, Rank};
use derive_more::{BitAnd, BitAndAssign, BitOr, BitOrAssign, BitXor, BitXorAssign, Not};
use std::fmt;
use std::iter::{FromIterator, IntoIterator};

/// Set of squares
///
/// Bit `i` is set iff the square with index `i` belongs to the set. Iteration yields squares
/// in increasing index order, i.e. from `a1` to `h8` rank by rank.
#[derive(
    Default,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    BitAnd,
    BitAndAssign,
    BitOr,
    BitOrAssign,
    BitXor,
    BitXorAssign,
    Not,
)]
pub struct Bitboard(u64);

impl Bitboard {
    pub const EMPTY: Bitboard = Bitboard(0);
    pub const FULL: Bitboard = Bitboard(!0);

    pub const fn from_raw(val: u64) -> Bitboard {
        Bitboard(val)
    }

    pub const fn from_coord(coord: Coord) -> Bitboard {
        Bitboard(1_u64 << coord.index())
    }

    pub const fn with(self, coord: Coord) -> Bitboard {
        Bitboard(self.0 | (1_u64 << coord.index()))
    }

    pub const fn without(self, coord: Coord) -> Bitboard {
        Bitboard(self.0 & !(1_u64 << coord.index()))
    }

    pub fn set(&mut self, coord: Coord) {
        *self = self.with(coord);
    }

    pub fn unset(&mut self, coord: Coord) {
        *self = self.without(coord);
    }

    pub const fn has(&self, coord: Coord) -> bool {
        ((self.0 >> coord.index()) & 1) != 0
    }

    pub const fn as_raw(&self) -> u64 {
        self.0
    }

    pub const fn len(&self) -> u32 {
        self.0.count_ones()
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_nonempty(&self) -> bool {
        self.0 != 0
    }
}

impl From<Bitboard> for u64 {
    fn from(b: Bitboard) -> u64 {
        b.0
    }
}

impl From<u64> for Bitboard {
    fn from(u: u64) -> Bitboard {
        Bitboard(u)
    }
}

impl From<Coord> for Bitboard {
    fn from(c: Coord) -> Bitboard {
        Bitboard::from_coord(c)
    }
}

impl fmt::Debug for Bitboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        write!(f, "Bitboard({})", self)
    }
}

impl fmt::Display for Bitboard {
    /// Prints the set as eight groups of bits, from the 8th rank down to the 1st, each
    /// group going from file `a` to file `h`
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> Result<(), fmt::Error> {
        for rank in Rank::iter().rev() {
            if rank != Rank::R8 {
                write!(f, "/")?;
            }
            for file in File::iter() {
                let bit = if self.has(Coord::from_parts(file, rank)) {
                    '1'
                } else {
                    '0'
                };
                write!(f, "{}", bit)?;
            }
        }
        Ok(())
    }
}

pub struct Iter(u64);

impl Iterator for Iter {
    type Item = Coord;

    fn next(&mut self) -> Option<Coord> {
        if self.0 == 0 {
            return None;
        }
        let bit = self.0.trailing_zeros();
        self.0 &= self.0.wrapping_sub(1_u64);
        unsafe { Some(Coord::from_index_unchecked(bit as usize)) }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let len = self.0.count_ones() as usize;
        (len, Some(len))
    }
}

impl ExactSizeIterator for Iter {}

impl IntoIterator for Bitboard {
    type Item = Coord;
    type IntoIter = Iter;

    fn into_iter(self) -> Iter {
        Iter(self.0)
    }
}

impl FromIterator<Coord> for Bitboard {
    fn from_iter<I: IntoIterator<Item = Coord>>(iter: I) -> Bitboard {
        iter.into_iter().fold(Bitboard::EMPTY, Bitboard::with)
    }
}

impl Extend<Coord> for Bitboard {
    fn extend<I: IntoIterator<Item = Coord>>(&mut self, iter: I) {
        for c in iter {
            self.set(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Coord, File, Rank};

    #[test]
    fn test_iter() {
        let bb = Bitboard::EMPTY
            .with(Coord::from_parts(File::A, Rank::R4))
            .with(Coord::from_parts(File::E, Rank::R2))
            .with(Coord::from_parts(File::F, Rank::R3));
        assert_eq!(
            bb.into_iter().collect::<Vec<_>>(),
            vec![
                Coord::from_parts(File::E, Rank::R2),
                Coord::from_parts(File::F, Rank::R3),
                Coord::from_parts(File::A, Rank::R4),
            ],
        );
        assert_eq!(bb.into_iter().len(), 3);
        assert_eq!(bb.into_iter().collect::<Bitboard>(), bb);
    }

    #[test]
    fn test_bitops() {
        let ca = Coord::from_parts(File::A, Rank::R4);
        let cb = Coord::from_parts(File::E, Rank::R2);
        let cc = Coord::from_parts(File::F, Rank::R3);

        let bb1 = Bitboard::EMPTY.with(ca).with(cb);
        let bb2 = Bitboard::EMPTY.with(cb).with(cc);
        assert_eq!(bb1 & bb2, Bitboard::EMPTY.with(cb));
        assert_eq!(bb1 | bb2, Bitboard::EMPTY.with(ca).with(cb).with(cc));
        assert_eq!(bb1 ^ bb2, Bitboard::EMPTY.with(ca).with(cc));

        assert_eq!((!bb1).into_iter().count(), 62);
        assert_eq!((!bb1).len(), 62);
        assert!(bb1.has(ca));
        assert!(!bb1.has(cc));
        assert_eq!(bb1.without(ca).without(cb), Bitboard::EMPTY);
    }

    #[test]
    fn test_format() {
        let bb = Bitboard::EMPTY
            .with(Coord::from_parts(File::A, Rank::R4))
            .with(Coord::from_parts(File::E, Rank::R2))
            .with(Coord::from_parts(File::F, Rank::R3))
            .with(Coord::from_parts(File::H, Rank::R8));
        assert_eq!(
            bb.to_string(),
            "00000001/00000000/00000000/00000000/10000000/00000100/00001000/00000000"
        );
    }
}
