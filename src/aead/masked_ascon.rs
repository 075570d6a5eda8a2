//! Masked Ascon-128 AEAD (§4.6's "masked encrypt/decrypt"): the same duplex
//! shape as [`super::ascon_aead::Ascon128`], driven over an `N`-share
//! [`MaskedAsconState`] instead of a plain one. Two compile-time-selectable
//! protection levels, chosen per call via [`Protection`]:
//!
//! - **key-only**: the init permutation and the two finalisation key
//!   injections run masked; bulk AD/message absorption runs on the
//!   recombined (unmasked) state, reusing the plain duplex helpers directly.
//! - **full**: every permutation call runs masked. Plaintext/AD/the key
//!   enter the rate lane through [`Masked::xor_const`] (share 0 only) — the
//!   spec's "plaintext enters through masked XOR" is read literally here as
//!   the same share-0-only XOR the unmasked engine's domain separator and
//!   round-constant injection already use, not a fresh reshare of secret
//!   data; see DESIGN.md.
//!
//! Ascon-128's `rate = 8` and `KEY_OFFSET = 8` both align exactly to lane
//! boundaries (lane 0 is the rate; the 16-byte key spans lanes 1 and 2),
//! which is what keeps this module free of cross-lane byte splicing.

use crate::aead::check_lengths;
use crate::error::{LwcError, Result};
use crate::mask_rng::MaskRng;
use crate::permutations::ascon::AsconState;
use crate::permutations::masked::ascon_masked::MaskedAsconState;
use crate::util::{ct_eq, load_u64_be, store_u64_be, xor_inplace};
use zeroize::Zeroize;

pub enum Protection {
    KeyOnly,
    Full,
}

const IV: u64 = 0x8040_0c06_0000_0000;
const RATE: usize = 8;
const R_A: u32 = 6;
const R_F: u32 = 12;
const KEY_OFFSET: usize = 8;
const TAG_LEN: usize = 16;

fn plain_init_state(key: &[u8], nonce: &[u8]) -> AsconState {
    let mut buf = [0u8; 40];
    store_u64_be(IV, &mut buf[0..8]);
    buf[8..24].copy_from_slice(key);
    buf[24..40].copy_from_slice(nonce);
    AsconState::from_bytes(&buf)
}

fn key_lanes(key: &[u8]) -> (u64, u64) {
    (load_u64_be(&key[0..8]), load_u64_be(&key[8..16]))
}

fn masked_absorb_ad<const N: usize>(masked: &mut MaskedAsconState<N>, ad: &[u8], rng: &mut dyn MaskRng) -> Result<()> {
    if ad.is_empty() {
        return Ok(());
    }
    let full_blocks = ad.len() / RATE;
    for i in 0..full_blocks {
        masked.0[0].xor_const(load_u64_be(&ad[i * RATE..(i + 1) * RATE]));
        masked.permute(12 - R_A, rng)?;
    }
    let rem = &ad[full_blocks * RATE..];
    let mut buf = [0u8; 8];
    buf[..rem.len()].copy_from_slice(rem);
    masked.0[0].xor_const(load_u64_be(&buf));
    masked.0[0].xor_const(0x80u64 << (8 * (7 - rem.len())));
    masked.permute(12 - R_A, rng)?;
    Ok(())
}

fn masked_finalize<const N: usize>(masked: &mut MaskedAsconState<N>, key: &[u8], rng: &mut dyn MaskRng) -> Result<[u8; TAG_LEN]> {
    let (k0, k1) = key_lanes(key);
    masked.0[1].xor_const(k0);
    masked.0[2].xor_const(k1);
    masked.permute(12 - R_F, rng)?;
    masked.0[1].xor_const(k0);
    masked.0[2].xor_const(k1);
    let state = masked.output();
    let mut tag = [0u8; TAG_LEN];
    tag.copy_from_slice(&state.to_bytes()[40 - TAG_LEN..]);
    Ok(tag)
}

pub struct MaskedAscon128<const N: usize>;

impl<const N: usize> MaskedAscon128<N> {
    pub const KEY_LEN: usize = 16;
    pub const NONCE_LEN: usize = 16;
    pub const TAG_LEN: usize = TAG_LEN;

    pub fn encrypt(
        key: &[u8],
        nonce: &[u8],
        ad: &[u8],
        plaintext: &[u8],
        protection: Protection,
        rng: &mut dyn MaskRng,
    ) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        rng.init()?;
        let result = match protection {
            Protection::KeyOnly => Self::seal_key_only(key, nonce, ad, plaintext, rng),
            Protection::Full => Self::seal_full(key, nonce, ad, plaintext, rng),
        };
        rng.finish();
        result
    }

    pub fn decrypt(
        key: &[u8],
        nonce: &[u8],
        ad: &[u8],
        ciphertext_and_tag: &[u8],
        protection: Protection,
        rng: &mut dyn MaskRng,
    ) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        rng.init()?;
        let result = match protection {
            Protection::KeyOnly => Self::open_key_only(key, nonce, ad, ciphertext_and_tag, rng),
            Protection::Full => Self::open_full(key, nonce, ad, ciphertext_and_tag, rng),
        };
        rng.finish();
        result
    }

    fn seal_key_only(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8], rng: &mut dyn MaskRng) -> Result<Vec<u8>> {
        let plain = plain_init_state(key, nonce);
        let mut masked: MaskedAsconState<N> = MaskedAsconState::input(&plain, rng)?;
        masked.permute(12 - R_F, rng)?;
        let mut bytes = masked.output().to_bytes();
        xor_inplace(&mut bytes[KEY_OFFSET..KEY_OFFSET + 16], key);
        let mut state = AsconState::from_bytes(&bytes);

        crate::aead::absorb_ad(&mut state, RATE, R_A, ad);
        crate::aead::apply_message_domain_separator(&mut state);
        let mut ciphertext = vec![0u8; plaintext.len()];
        crate::aead::encrypt_message(&mut state, RATE, R_A, plaintext, &mut ciphertext);

        let mut masked_final: MaskedAsconState<N> = MaskedAsconState::input(&state, rng)?;
        let tag = masked_finalize(&mut masked_final, key, rng)?;
        ciphertext.extend_from_slice(&tag);
        Ok(ciphertext)
    }

    fn open_key_only(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8], rng: &mut dyn MaskRng) -> Result<Vec<u8>> {
        if ciphertext_and_tag.len() < TAG_LEN {
            return Err(LwcError::InvalidCiphertextLength);
        }
        let (ct, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - TAG_LEN);

        let plain = plain_init_state(key, nonce);
        let mut masked: MaskedAsconState<N> = MaskedAsconState::input(&plain, rng)?;
        masked.permute(12 - R_F, rng)?;
        let mut bytes = masked.output().to_bytes();
        xor_inplace(&mut bytes[KEY_OFFSET..KEY_OFFSET + 16], key);
        let mut state = AsconState::from_bytes(&bytes);

        crate::aead::absorb_ad(&mut state, RATE, R_A, ad);
        crate::aead::apply_message_domain_separator(&mut state);
        let mut plaintext = vec![0u8; ct.len()];
        crate::aead::decrypt_message(&mut state, RATE, R_A, ct, &mut plaintext);

        let mut masked_final: MaskedAsconState<N> = MaskedAsconState::input(&state, rng)?;
        let expected_tag = masked_finalize(&mut masked_final, key, rng)?;
        if !ct_eq(&expected_tag, tag) {
            plaintext.zeroize();
            log::warn!("masked-ascon: tag mismatch, rejecting ciphertext");
            return Err(LwcError::AuthenticationFailed);
        }
        Ok(plaintext)
    }

    fn seal_full(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8], rng: &mut dyn MaskRng) -> Result<Vec<u8>> {
        let plain = plain_init_state(key, nonce);
        let mut masked: MaskedAsconState<N> = MaskedAsconState::input(&plain, rng)?;
        masked.permute(12 - R_F, rng)?;
        let (k0, k1) = key_lanes(key);
        masked.0[1].xor_const(k0);
        masked.0[2].xor_const(k1);

        masked_absorb_ad(&mut masked, ad, rng)?;
        masked.0[4].xor_const(0x01);

        let mut ciphertext = vec![0u8; plaintext.len()];
        let full_blocks = plaintext.len() / RATE;
        for i in 0..full_blocks {
            masked.0[0].xor_const(load_u64_be(&plaintext[i * RATE..(i + 1) * RATE]));
            let c = masked.0[0].output();
            store_u64_be(c, &mut ciphertext[i * RATE..(i + 1) * RATE]);
            masked.permute(12 - R_A, rng)?;
        }
        let off = full_blocks * RATE;
        let rem = &plaintext[off..];
        let mut buf = [0u8; 8];
        buf[..rem.len()].copy_from_slice(rem);
        masked.0[0].xor_const(load_u64_be(&buf));
        let c_bytes = masked.0[0].output().to_be_bytes();
        ciphertext[off..].copy_from_slice(&c_bytes[..rem.len()]);
        masked.0[0].xor_const(0x80u64 << (8 * (7 - rem.len())));

        let tag = masked_finalize(&mut masked, key, rng)?;
        ciphertext.extend_from_slice(&tag);
        Ok(ciphertext)
    }

    fn open_full(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8], rng: &mut dyn MaskRng) -> Result<Vec<u8>> {
        if ciphertext_and_tag.len() < TAG_LEN {
            return Err(LwcError::InvalidCiphertextLength);
        }
        let (ct, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - TAG_LEN);

        let plain = plain_init_state(key, nonce);
        let mut masked: MaskedAsconState<N> = MaskedAsconState::input(&plain, rng)?;
        masked.permute(12 - R_F, rng)?;
        let (k0, k1) = key_lanes(key);
        masked.0[1].xor_const(k0);
        masked.0[2].xor_const(k1);

        masked_absorb_ad(&mut masked, ad, rng)?;
        masked.0[4].xor_const(0x01);

        let mut plaintext = vec![0u8; ct.len()];
        let full_blocks = ct.len() / RATE;
        for i in 0..full_blocks {
            let c_word = load_u64_be(&ct[i * RATE..(i + 1) * RATE]);
            let current = masked.0[0].output();
            let p_word = current ^ c_word;
            store_u64_be(p_word, &mut plaintext[i * RATE..(i + 1) * RATE]);
            masked.0[0].xor_const(p_word);
            masked.permute(12 - R_A, rng)?;
        }
        let off = full_blocks * RATE;
        let rem = &ct[off..];
        let current = masked.0[0].output().to_be_bytes();
        for j in 0..rem.len() {
            plaintext[off + j] = current[j] ^ rem[j];
        }
        let mut p_buf = [0u8; 8];
        p_buf[..rem.len()].copy_from_slice(&plaintext[off..off + rem.len()]);
        masked.0[0].xor_const(load_u64_be(&p_buf));
        masked.0[0].xor_const(0x80u64 << (8 * (7 - rem.len())));

        let expected_tag = masked_finalize(&mut masked, key, rng)?;
        if !ct_eq(&expected_tag, tag) {
            plaintext.zeroize();
            log::warn!("masked-ascon: tag mismatch, rejecting ciphertext");
            return Err(LwcError::AuthenticationFailed);
        }
        Ok(plaintext)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask_rng::DeterministicMaskRngForTests;

    fn rng(seed: u64) -> DeterministicMaskRngForTests {
        DeterministicMaskRngForTests::from_seed(seed)
    }

    #[test]
    fn key_only_matches_unmasked_ascon128() {
        use crate::aead::ascon_aead::Ascon128;
        use crate::aead::Aead;
        let key = [0x11u8; 16];
        let nonce = [0x22u8; 16];
        let expected = Ascon128::encrypt(&key, &nonce, b"ad", b"masked lwc suite").unwrap();
        let mut r = rng(1);
        let got = MaskedAscon128::<3>::encrypt(&key, &nonce, b"ad", b"masked lwc suite", Protection::KeyOnly, &mut r).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn full_protection_matches_unmasked_ascon128_multi_block() {
        use crate::aead::ascon_aead::Ascon128;
        use crate::aead::Aead;
        let key = [9u8; 16];
        let nonce = [8u8; 16];
        let msg: Vec<u8> = (0..50u8).collect();
        let expected = Ascon128::encrypt(&key, &nonce, b"hdr", &msg).unwrap();
        let mut r = rng(2);
        let got = MaskedAscon128::<4>::encrypt(&key, &nonce, b"hdr", &msg, Protection::Full, &mut r).unwrap();
        assert_eq!(got, expected);
    }

    #[test]
    fn full_protection_roundtrips_empty_message() {
        let key = [0u8; 16];
        let nonce = [0u8; 16];
        let mut r = rng(3);
        let ct = MaskedAscon128::<2>::encrypt(&key, &nonce, &[], &[], Protection::Full, &mut r).unwrap();
        let mut r2 = rng(4);
        let pt = MaskedAscon128::<2>::decrypt(&key, &nonce, &[], &ct, Protection::Full, &mut r2).unwrap();
        assert_eq!(pt.len(), 0);
    }

    #[test]
    fn key_only_roundtrips_and_rejects_tamper() {
        let key = [5u8; 16];
        let nonce = [6u8; 16];
        let mut r1 = rng(5);
        let mut ct = MaskedAscon128::<5>::encrypt(&key, &nonce, b"x", b"round trip body", Protection::KeyOnly, &mut r1).unwrap();
        let mut r2 = rng(6);
        let pt = MaskedAscon128::<5>::decrypt(&key, &nonce, b"x", &ct, Protection::KeyOnly, &mut r2).unwrap();
        assert_eq!(pt, b"round trip body");

        ct[0] ^= 1;
        let mut r3 = rng(7);
        assert_eq!(
            MaskedAscon128::<5>::decrypt(&key, &nonce, b"x", &ct, Protection::KeyOnly, &mut r3),
            Err(LwcError::AuthenticationFailed)
        );
    }
}
