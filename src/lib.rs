//! Reference and masked implementations of a family of NIST Lightweight
//! Cryptography candidates: the Ascon, KNOT, ISAP, DryGASCON and Spook AEAD
//! modes, their paired hash/XOF constructions, and side-channel-masked
//! variants of the Ascon and KNOT permutations parameterised over share
//! count (§1).
//!
//! Every algorithm is reached through the [`aead::Aead`] / [`hash::Hash`] /
//! [`hash::Xof`] traits; [`descriptors`] exposes table-driven metadata for
//! KAT harnesses and registration layers. No `unsafe`, and no data-dependent
//! branching or indexing on secret material anywhere in this crate.

#![forbid(unsafe_code)]

pub mod aead;
pub mod descriptors;
pub mod drygascon;
pub mod error;
pub mod hash;
pub mod isap;
pub mod mask_rng;
pub mod masking;
pub mod permutations;
pub mod util;

pub use error::{LwcError, Result};
