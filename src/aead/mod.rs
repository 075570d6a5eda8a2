//! C6: generic sponge/duplex AEAD engine shape, shared by every
//! byte-oriented duplex construction in this suite (Ascon-AEAD, KNOT-AEAD).
//! Spook (`spook.rs`) and DryGASCON (`crate::drygascon`) have a sufficiently
//! different session shape — a block-cipher MAC tail, and a bit-grouped
//! capacity-mixing absorb respectively — that they are built directly on
//! their own permutations instead of this shared duplex.

pub mod ascon_aead;
pub mod knot_aead;
pub mod masked_ascon;
pub mod spook;

use crate::error::{LwcError, Result};
use crate::util::xor_inplace;

/// A fixed-size permutation state that can be read/written as bytes and
/// advanced by a public, constant round count. This is the Rust encoding of
/// "two typed views (lane array and byte slice) with explicit conversion" —
/// REDESIGN FLAG #2 — rather than a union/transmute over the state memory.
pub trait SpongePermutation: Copy {
    const STATE_BYTES: usize;
    fn from_bytes(bytes: &[u8]) -> Self;
    fn write_bytes(&self, out: &mut [u8]);
    /// Run exactly `rounds` rounds of the permutation from its start.
    fn permute_rounds(&mut self, rounds: u32);
}

/// Absorb associated data into `state` at rate `rate`, permuting with
/// `r_a` rounds after every block (full or final/padded). A no-op when
/// `ad` is empty (§4.6 step 2).
pub fn absorb_ad<P: SpongePermutation>(state: &mut P, rate: usize, r_a: u32, ad: &[u8]) {
    if ad.is_empty() {
        return;
    }
    let mut buf = vec![0u8; P::STATE_BYTES];
    let full_blocks = ad.len() / rate;
    for i in 0..full_blocks {
        state.write_bytes(&mut buf);
        xor_inplace(&mut buf[..rate], &ad[i * rate..(i + 1) * rate]);
        *state = P::from_bytes(&buf);
        state.permute_rounds(r_a);
    }
    let rem = &ad[full_blocks * rate..];
    state.write_bytes(&mut buf);
    xor_inplace(&mut buf[..rem.len()], rem);
    buf[rem.len()] ^= 0x80;
    *state = P::from_bytes(&buf);
    state.permute_rounds(r_a);
}

/// XOR `bit` into the last byte of state (§4.6 step 3 / KNOT's post-AD
/// domain bit). Unconditional — unlike AD absorption, this runs even for
/// an empty associated-data input.
pub fn apply_domain_separator_bit<P: SpongePermutation>(state: &mut P, bit: u8) {
    let mut buf = vec![0u8; P::STATE_BYTES];
    state.write_bytes(&mut buf);
    let last = buf.len() - 1;
    buf[last] ^= bit;
    *state = P::from_bytes(&buf);
}

/// Ascon's message/AD domain separator: `0x01` XORed into the last state
/// byte (§4.6 step 3).
pub fn apply_message_domain_separator<P: SpongePermutation>(state: &mut P) {
    apply_domain_separator_bit(state, 0x01);
}

/// Encrypt `plaintext` under the duplex at rate `rate`, writing
/// `ciphertext` (same length) and leaving `state` ready for finalisation.
/// No permutation runs after the final (possibly empty) block (§4.6 step 4).
pub fn encrypt_message<P: SpongePermutation>(
    state: &mut P,
    rate: usize,
    r_a: u32,
    plaintext: &[u8],
    ciphertext: &mut [u8],
) {
    debug_assert_eq!(plaintext.len(), ciphertext.len());
    let mut buf = vec![0u8; P::STATE_BYTES];
    let full_blocks = plaintext.len() / rate;
    for i in 0..full_blocks {
        state.write_bytes(&mut buf);
        for j in 0..rate {
            let c = buf[j] ^ plaintext[i * rate + j];
            ciphertext[i * rate + j] = c;
            buf[j] = c;
        }
        *state = P::from_bytes(&buf);
        state.permute_rounds(r_a);
    }
    let off = full_blocks * rate;
    let rem = &plaintext[off..];
    state.write_bytes(&mut buf);
    for j in 0..rem.len() {
        let c = buf[j] ^ rem[j];
        ciphertext[off + j] = c;
        buf[j] = c;
    }
    buf[rem.len()] ^= 0x80;
    *state = P::from_bytes(&buf);
}

/// Decrypt `ciphertext` under the duplex, writing `plaintext`. The rate is
/// always refreshed from the *ciphertext* (not the recovered plaintext),
/// mirroring the encrypt-side "rate becomes the ciphertext block" rule so
/// both directions leave the same state for finalisation/tag comparison.
pub fn decrypt_message<P: SpongePermutation>(
    state: &mut P,
    rate: usize,
    r_a: u32,
    ciphertext: &[u8],
    plaintext: &mut [u8],
) {
    debug_assert_eq!(plaintext.len(), ciphertext.len());
    let mut buf = vec![0u8; P::STATE_BYTES];
    let full_blocks = ciphertext.len() / rate;
    for i in 0..full_blocks {
        state.write_bytes(&mut buf);
        for j in 0..rate {
            let m = buf[j] ^ ciphertext[i * rate + j];
            plaintext[i * rate + j] = m;
            buf[j] = ciphertext[i * rate + j];
        }
        *state = P::from_bytes(&buf);
        state.permute_rounds(r_a);
    }
    let off = full_blocks * rate;
    let rem = &ciphertext[off..];
    state.write_bytes(&mut buf);
    for j in 0..rem.len() {
        plaintext[off + j] = buf[j] ^ rem[j];
        buf[j] = rem[j];
    }
    buf[rem.len()] ^= 0x80;
    *state = P::from_bytes(&buf);
}

/// Finalisation (§4.6 step 5): XOR the key into `key_offset`, permute with
/// `r_f` rounds, XOR the key in again, and return the trailing `tag_len`
/// bytes as the tag.
pub fn finalize_tag<P: SpongePermutation>(
    state: &mut P,
    key: &[u8],
    key_offset: usize,
    r_f: u32,
    tag_len: usize,
) -> Vec<u8> {
    let mut buf = vec![0u8; P::STATE_BYTES];
    state.write_bytes(&mut buf);
    xor_inplace(&mut buf[key_offset..key_offset + key.len()], key);
    *state = P::from_bytes(&buf);
    state.permute_rounds(r_f);
    state.write_bytes(&mut buf);
    xor_inplace(&mut buf[key_offset..key_offset + key.len()], key);
    let tag_start = buf.len() - tag_len;
    buf[tag_start..].to_vec()
}

/// The external AEAD contract (§6): total functions over `(k, n, A, M)` /
/// `(k, n, A, C)`, returning ciphertext+tag or plaintext (or a failure).
pub trait Aead {
    const KEY_LEN: usize;
    const NONCE_LEN: usize;
    const TAG_LEN: usize;

    /// Encrypt `plaintext` with associated data `ad`; returns
    /// `ciphertext || tag`.
    fn encrypt(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>>;

    /// Decrypt `ciphertext_and_tag` (ciphertext followed by the tag) under
    /// `ad`. On authentication failure returns `Err` without writing a
    /// plaintext the caller could read.
    fn decrypt(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>>;
}

/// Shared key/nonce length validation used by every concrete `Aead` impl.
pub(crate) fn check_lengths(key: &[u8], nonce: &[u8], key_len: usize, nonce_len: usize) -> Result<()> {
    if key.len() != key_len {
        return Err(LwcError::InvalidKeyLength {
            expected: key_len,
            actual: key.len(),
        });
    }
    if nonce.len() != nonce_len {
        return Err(LwcError::InvalidNonceLength {
            expected: nonce_len,
            actual: nonce.len(),
        });
    }
    Ok(())
}
