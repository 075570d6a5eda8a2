//! C4: the unmasked permutations shared by every AEAD/hash mode in this
//! suite — Ascon-p, KNOT-256/384/512, Shadow-384/512 (built from Clyde-128),
//! and GASCON-128/256. Each runs in time independent of its input; the only
//! data-dependent control is the round count, which is always a public
//! configuration parameter, never a key or plaintext bit.

pub mod ascon;
pub mod gascon;
pub mod keccak400;
pub mod knot;
pub mod masked;
pub mod shadow;
