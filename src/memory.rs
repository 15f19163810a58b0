use num::PrimInt;
use std::fmt::{Debug, Display};
use std::iter::Sum;
use std::ops::AddAssign;
use std::str::FromStr;

/// Integer primitive usable as a coordinate type.
///
/// Distance and accumulation arithmetic never happens in `Self` directly:
/// squared differences and per-cluster coordinate sums are computed in the
/// associated [`Primitive::Wide`] type, which must be wide enough to hold
/// a sum of squared coordinate differences without overflowing.
pub trait Primitive:
    PrimInt + AddAssign + Sum + FromStr + Display + Debug + Default + Send + Sync + 'static
{
    /// Widened accumulator type (i32 -> i64, i64 -> i128).
    type Wide: PrimInt + AddAssign + Sum + Display + Debug + Default + Send + Sync + 'static;

    fn to_wide(self) -> Self::Wide;

    /// Narrows a wide value back into the coordinate type. Only called on
    /// values known to lie within the coordinate range (a cluster mean is
    /// bounded by the cluster's extreme coordinates).
    fn from_wide(wide: Self::Wide) -> Self;
}

impl Primitive for i32 {
    type Wide = i64;

    #[inline(always)]
    fn to_wide(self) -> i64 {
        self as i64
    }

    #[inline(always)]
    fn from_wide(wide: i64) -> i32 {
        wide as i32
    }
}

impl Primitive for i64 {
    type Wide = i128;

    #[inline(always)]
    fn to_wide(self) -> i128 {
        self as i128
    }

    #[inline(always)]
    fn from_wide(wide: i128) -> i64 {
        wide as i64
    }
}
