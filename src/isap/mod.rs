//! C9: ISAP re-keying mode (§4.9) — per-packet session keys derived by
//! absorbing the nonce (then, for the tag, the partial MAC digest) one bit
//! at a time into the permutation, with three IV constants separating the
//! "encryption rekey," "tag rekey," and "direct MAC initialisation" domains.
//! Encryption is a pure keystream XOR against the rekeyed state (permute
//! before each block, including the first); authentication absorbs
//! `AD || C` directly against a nonce-seeded state (no rekey) before the
//! digest is rekeyed a second time to produce the tag.
//!
//! Round counts, rate, and the eight-byte IV header
//! (`[marker, key_bits, rate_bits, 1, sH, sB, sE, sK]`) are the published
//! per-variant values for the Ascon-p and Keccak-p[400] instantiations —
//! see DESIGN.md for where they're grounded.

use crate::aead::{absorb_ad, apply_domain_separator_bit, check_lengths, Aead, SpongePermutation};
use crate::error::{LwcError, Result};
use crate::permutations::ascon::AsconState;
use crate::permutations::keccak400::Keccak400State;
use crate::util::ct_eq;

impl SpongePermutation for Keccak400State {
    const STATE_BYTES: usize = crate::permutations::keccak400::STATE_BYTES;

    fn from_bytes(bytes: &[u8]) -> Self {
        Keccak400State::from_bytes(bytes)
    }

    fn write_bytes(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes());
    }

    fn permute_rounds(&mut self, rounds: u32) {
        self.permute(rounds);
    }
}

/// Ascon-p's `permute` takes an entry-round index into its fixed 12-round
/// schedule, not a round count; ISAP's round parameters are all counts, so
/// this wrapper does the `12 - rounds` translation once, at the boundary.
#[derive(Clone, Copy)]
struct IsapAsconState(AsconState);

impl SpongePermutation for IsapAsconState {
    const STATE_BYTES: usize = crate::permutations::ascon::STATE_BYTES;

    fn from_bytes(bytes: &[u8]) -> Self {
        let mut arr = [0u8; crate::permutations::ascon::STATE_BYTES];
        arr.copy_from_slice(bytes);
        IsapAsconState(AsconState::from_bytes(&arr))
    }

    fn write_bytes(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.0.to_bytes());
    }

    fn permute_rounds(&mut self, rounds: u32) {
        self.0.permute(12 - rounds);
    }
}

/// Fixed round schedule, rate, and domain IVs for one ISAP instantiation.
/// `iv_a`/`iv_ka`/`iv_ke` are each the published eight-byte header
/// zero-padded out to `STATE_BYTES - 16` (ISAP's key and nonce are both
/// 16 bytes in the `-128A` variants this crate implements).
struct IsapParams {
    rate: usize,
    s_k: u32,
    s_b: u32,
    s_e: u32,
    s_h: u32,
    tag_len: usize,
    iv_a: &'static [u8],
    iv_ka: &'static [u8],
    iv_ke: &'static [u8],
}

/// Derive a rekeyed state: inject `key || iv`, permute `s_k` rounds, then
/// absorb `data` one bit at a time, MSB-first per byte, permuting `s_b`
/// rounds after every bit except the last — the last bit is followed by a
/// full `s_k`-round permute instead (§4.9).
fn isap_rekey<P: SpongePermutation>(key: &[u8], iv: &[u8], data: &[u8], s_k: u32, s_b: u32) -> P {
    let mut buf = vec![0u8; P::STATE_BYTES];
    buf[..key.len()].copy_from_slice(key);
    buf[key.len()..key.len() + iv.len()].copy_from_slice(iv);
    let mut state = P::from_bytes(&buf);
    state.permute_rounds(s_k);

    let total_bits = data.len() * 8;
    for bit_index in 0..total_bits {
        let byte = data[bit_index / 8];
        let shift = 7 - (bit_index % 8);
        let bit = (byte >> shift) & 1;
        let mut b = vec![0u8; P::STATE_BYTES];
        state.write_bytes(&mut b);
        b[0] ^= bit << 7;
        state = P::from_bytes(&b);
        if bit_index + 1 < total_bits {
            state.permute_rounds(s_b);
        } else {
            state.permute_rounds(s_k);
        }
    }
    state
}

/// Seed a state directly from `nonce || iv_a`, with no rekey — the MAC/AD
/// path's state origin (§4.9's "MAC step" never rekeys for absorption).
fn isap_mac_init<P: SpongePermutation>(nonce: &[u8], iv_a: &[u8]) -> P {
    let mut buf = vec![0u8; P::STATE_BYTES];
    buf[..nonce.len()].copy_from_slice(nonce);
    buf[nonce.len()..nonce.len() + iv_a.len()].copy_from_slice(iv_a);
    P::from_bytes(&buf)
}

/// Keystream XOR: permute `s_e` rounds, then XOR the state's leading `rate`
/// bytes against the next input block — the permute runs before every
/// block, including the first. Symmetric: the same function encrypts and
/// decrypts.
fn isap_keystream_xor<P: SpongePermutation>(mut state: P, rate: usize, s_e: u32, input: &[u8]) -> Vec<u8> {
    let mut out = vec![0u8; input.len()];
    let mut buf = vec![0u8; P::STATE_BYTES];
    let mut offset = 0;
    while offset < input.len() {
        state.permute_rounds(s_e);
        state.write_bytes(&mut buf);
        let take = rate.min(input.len() - offset);
        for i in 0..take {
            out[offset + i] = buf[i] ^ input[offset + i];
        }
        offset += take;
    }
    out
}

/// Absorb `ad` then `ciphertext` (domain-separated by `0x01` between the
/// two) into a MAC state already seeded by `isap_mac_init`, and return the
/// leading `tag_len` bytes of the resulting state as the preliminary digest
/// — note this is *not* clamped to `rate`; ISAP's tag can be wider than the
/// absorption rate (§4.9).
fn isap_mac_digest<P: SpongePermutation>(
    mut state: P,
    rate: usize,
    s_h: u32,
    tag_len: usize,
    ad: &[u8],
    ciphertext: &[u8],
) -> Vec<u8> {
    state.permute_rounds(s_h);
    absorb_ad(&mut state, rate, s_h, ad);
    apply_domain_separator_bit(&mut state, 0x01);
    absorb_ad(&mut state, rate, s_h, ciphertext);
    let mut buf = vec![0u8; P::STATE_BYTES];
    state.write_bytes(&mut buf);
    buf[..tag_len].to_vec()
}

/// Rekey the preliminary digest under `IV_KA`, restoring the MAC state's
/// trailing bytes (beyond the digest) around the rekey and running one more
/// `s_h`-round permute, then returning the final `tag_len`-byte tag. This
/// is the one place ISAP deliberately keeps part of the pre-rekey MAC state
/// alive across the rekey call (§4.9).
fn isap_finalize_tag<P: SpongePermutation>(
    key: &[u8],
    iv_ka: &[u8],
    s_k: u32,
    s_b: u32,
    s_h: u32,
    tag_len: usize,
    mac_state_bytes: &[u8],
) -> Vec<u8> {
    let digest = &mac_state_bytes[..tag_len];
    let preserved = &mac_state_bytes[tag_len..];

    let rekeyed: P = isap_rekey(key, iv_ka, digest, s_k, s_b);
    let mut buf = vec![0u8; P::STATE_BYTES];
    rekeyed.write_bytes(&mut buf);
    buf[tag_len..].copy_from_slice(preserved);

    let mut state = P::from_bytes(&buf);
    state.permute_rounds(s_h);
    state.write_bytes(&mut buf);
    buf[..tag_len].to_vec()
}

fn isap_mac<P: SpongePermutation>(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext: &[u8], p: &IsapParams) -> Vec<u8> {
    let mac_state: P = isap_mac_init(nonce, p.iv_a);
    let digest = isap_mac_digest(mac_state, p.rate, p.s_h, p.tag_len, ad, ciphertext);
    isap_finalize_tag::<P>(key, p.iv_ka, p.s_k, p.s_b, p.s_h, p.tag_len, &digest)
}

fn isap_seal<P: SpongePermutation>(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8], p: &IsapParams) -> Vec<u8> {
    let mut ke_state: P = isap_rekey(key, p.iv_ke, nonce, p.s_k, p.s_b);
    let mut buf = vec![0u8; P::STATE_BYTES];
    ke_state.write_bytes(&mut buf);
    let tail = buf.len() - nonce.len();
    buf[tail..].copy_from_slice(nonce);
    ke_state = P::from_bytes(&buf);

    let ciphertext = isap_keystream_xor(ke_state, p.rate, p.s_e, plaintext);
    let tag = isap_mac::<P>(key, nonce, ad, &ciphertext, p);

    let mut out = ciphertext;
    out.extend_from_slice(&tag);
    out
}

fn isap_open<P: SpongePermutation>(
    key: &[u8],
    nonce: &[u8],
    ad: &[u8],
    ciphertext_and_tag: &[u8],
    p: &IsapParams,
) -> Result<Vec<u8>> {
    if ciphertext_and_tag.len() < p.tag_len {
        return Err(LwcError::InvalidCiphertextLength);
    }
    let (ct, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - p.tag_len);

    let expected_tag = isap_mac::<P>(key, nonce, ad, ct, p);
    if !ct_eq(&expected_tag, tag) {
        log::warn!("isap: tag mismatch, rejecting ciphertext");
        return Err(LwcError::AuthenticationFailed);
    }

    let mut ke_state: P = isap_rekey(key, p.iv_ke, nonce, p.s_k, p.s_b);
    let mut buf = vec![0u8; P::STATE_BYTES];
    ke_state.write_bytes(&mut buf);
    let tail = buf.len() - nonce.len();
    buf[tail..].copy_from_slice(nonce);
    ke_state = P::from_bytes(&buf);

    Ok(isap_keystream_xor(ke_state, p.rate, p.s_e, ct))
}

const ISAP_A_128A: IsapParams = IsapParams {
    rate: 8,
    s_k: 12,
    s_b: 1,
    s_e: 6,
    s_h: 12,
    tag_len: 16,
    iv_a: &[0x01, 0x80, 0x40, 0x01, 0x0c, 0x01, 0x06, 0x0c, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    iv_ka: &[0x02, 0x80, 0x40, 0x01, 0x0c, 0x01, 0x06, 0x0c, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
    iv_ke: &[0x03, 0x80, 0x40, 0x01, 0x0c, 0x01, 0x06, 0x0c, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0],
};

const ISAP_K_128A: IsapParams = IsapParams {
    rate: 18,
    s_k: 8,
    s_b: 1,
    s_e: 8,
    s_h: 16,
    tag_len: 16,
    iv_a: &[
        0x01, 0x80, 0x90, 0x01, 0x10, 0x01, 0x08, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0,
    ],
    iv_ka: &[
        0x02, 0x80, 0x90, 0x01, 0x10, 0x01, 0x08, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0,
    ],
    iv_ke: &[
        0x03, 0x80, 0x90, 0x01, 0x10, 0x01, 0x08, 0x08, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0,
    ],
};

/// ISAP-A-128A: the Ascon-p instantiation. K=16, N=16, T=16.
pub struct IsapA128A;

impl Aead for IsapA128A {
    const KEY_LEN: usize = 16;
    const NONCE_LEN: usize = 16;
    const TAG_LEN: usize = 16;

    fn encrypt(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        Ok(isap_seal::<IsapAsconState>(key, nonce, ad, plaintext, &ISAP_A_128A))
    }

    fn decrypt(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        isap_open::<IsapAsconState>(key, nonce, ad, ciphertext_and_tag, &ISAP_A_128A)
    }
}

/// ISAP-K-128A: the Keccak-p[400] instantiation. K=16, N=16, T=16.
pub struct IsapK128A;

impl Aead for IsapK128A {
    const KEY_LEN: usize = 16;
    const NONCE_LEN: usize = 16;
    const TAG_LEN: usize = 16;

    fn encrypt(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        Ok(isap_seal::<Keccak400State>(key, nonce, ad, plaintext, &ISAP_K_128A))
    }

    fn decrypt(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        isap_open::<Keccak400State>(key, nonce, ad, ciphertext_and_tag, &ISAP_K_128A)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isap_a_roundtrips() {
        let key = [0x11u8; 16];
        let nonce = [0x22u8; 16];
        let msg = b"rekeying mode over ascon";
        let ct = IsapA128A::encrypt(&key, &nonce, b"ad", msg).unwrap();
        assert_eq!(ct.len(), msg.len() + 16);
        let pt = IsapA128A::decrypt(&key, &nonce, b"ad", &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn isap_a_empty_message_roundtrip() {
        let key = [0u8; 16];
        let nonce = [0u8; 16];
        let ct = IsapA128A::encrypt(&key, &nonce, &[], &[]).unwrap();
        assert_eq!(ct.len(), 16);
        let pt = IsapA128A::decrypt(&key, &nonce, &[], &ct).unwrap();
        assert_eq!(pt.len(), 0);
    }

    #[test]
    fn isap_a_tampered_ciphertext_is_rejected() {
        let key = [3u8; 16];
        let nonce = [4u8; 16];
        let mut ct = IsapA128A::encrypt(&key, &nonce, b"ad", b"message body").unwrap();
        ct[0] ^= 1;
        assert_eq!(IsapA128A::decrypt(&key, &nonce, b"ad", &ct), Err(LwcError::AuthenticationFailed));
    }

    #[test]
    fn isap_a_rejects_ad_substitution() {
        let key = [9u8; 16];
        let nonce = [10u8; 16];
        let ct = IsapA128A::encrypt(&key, &nonce, b"header-a", b"payload").unwrap();
        assert_eq!(
            IsapA128A::decrypt(&key, &nonce, b"header-b", &ct),
            Err(LwcError::AuthenticationFailed)
        );
    }

    #[test]
    fn isap_k_roundtrips_multi_block() {
        let key = [5u8; 16];
        let nonce = [6u8; 16];
        let msg: Vec<u8> = (0..70u8).collect();
        let ct = IsapK128A::encrypt(&key, &nonce, b"x", &msg).unwrap();
        let pt = IsapK128A::decrypt(&key, &nonce, b"x", &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn isap_k_empty_message_roundtrip() {
        let key = [0u8; 16];
        let nonce = [1u8; 16];
        let ct = IsapK128A::encrypt(&key, &nonce, &[], &[]).unwrap();
        assert_eq!(ct.len(), 16);
        assert_eq!(IsapK128A::decrypt(&key, &nonce, &[], &ct).unwrap().len(), 0);
    }

    #[test]
    fn isap_a_and_isap_k_produce_different_ciphertext() {
        let key = [7u8; 16];
        let nonce = [8u8; 16];
        let a = IsapA128A::encrypt(&key, &nonce, &[], b"same message").unwrap();
        let k = IsapK128A::encrypt(&key, &nonce, &[], b"same message").unwrap();
        assert_ne!(a, k);
    }

    #[test]
    fn isap_rejects_wrong_nonce_length() {
        let key = [0u8; 16];
        assert_eq!(
            IsapA128A::encrypt(&key, &[0u8; 4], &[], &[]),
            Err(LwcError::InvalidNonceLength { expected: 16, actual: 4 })
        );
    }

    #[test]
    fn isap_a_multi_block_message_round_trips_past_one_rate_block() {
        let key = [0x44u8; 16];
        let nonce = [0x55u8; 16];
        let msg: Vec<u8> = (0..40u8).collect();
        let ct = IsapA128A::encrypt(&key, &nonce, b"ad", &msg).unwrap();
        let pt = IsapA128A::decrypt(&key, &nonce, b"ad", &ct).unwrap();
        assert_eq!(pt, msg);
    }
}
