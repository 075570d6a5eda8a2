//! C5: masked permutations — share-wise reimplementations of the C4
//! permutations whose linear layer is a per-share fold and whose non-linear
//! layer routes every `&` through the ISW-refreshed masked AND of C3.

pub mod ascon_masked;
pub mod knot_masked;
