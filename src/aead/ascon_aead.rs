//! Ascon-128 / Ascon-128a / Ascon-80pq (§6), instantiating the generic
//! duplex engine over `AsconState`.
//!
//! All three share a 40-byte, five-lane state and the `init → absorb-AD →
//! domain-separate → encrypt/decrypt → finalise` shape; they differ only in
//! rate, round schedule, key size and the exact initial-state layout
//! (Ascon-80pq's 20-byte key straddles the IV lane).

use super::{
    absorb_ad, apply_message_domain_separator, check_lengths, decrypt_message, encrypt_message,
    finalize_tag, Aead, SpongePermutation,
};
use crate::error::{LwcError, Result};
use crate::permutations::ascon::AsconState;
use crate::util::{ct_eq, store_u64_be, xor_inplace};
use zeroize::Zeroize;

impl SpongePermutation for AsconState {
    const STATE_BYTES: usize = crate::permutations::ascon::STATE_BYTES;

    fn from_bytes(bytes: &[u8]) -> Self {
        AsconState::from_bytes(bytes.try_into().expect("Ascon state is always 40 bytes"))
    }

    fn write_bytes(&self, out: &mut [u8]) {
        out.copy_from_slice(&self.to_bytes());
    }

    fn permute_rounds(&mut self, rounds: u32) {
        self.permute(12 - rounds);
    }
}

const TAG_LEN: usize = 16;

fn seal(mut state: AsconState, rate: usize, r_a: u32, r_f: u32, key: &[u8], key_offset: usize, ad: &[u8], plaintext: &[u8]) -> Vec<u8> {
    absorb_ad(&mut state, rate, r_a, ad);
    apply_message_domain_separator(&mut state);
    let mut ciphertext = vec![0u8; plaintext.len()];
    encrypt_message(&mut state, rate, r_a, plaintext, &mut ciphertext);
    let tag = finalize_tag(&mut state, key, key_offset, r_f, TAG_LEN);
    ciphertext.extend_from_slice(&tag);
    ciphertext
}

fn open(
    mut state: AsconState,
    rate: usize,
    r_a: u32,
    r_f: u32,
    key: &[u8],
    key_offset: usize,
    ad: &[u8],
    ciphertext_and_tag: &[u8],
) -> Result<Vec<u8>> {
    if ciphertext_and_tag.len() < TAG_LEN {
        return Err(LwcError::InvalidCiphertextLength);
    }
    let (ct, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - TAG_LEN);
    absorb_ad(&mut state, rate, r_a, ad);
    apply_message_domain_separator(&mut state);
    let mut plaintext = vec![0u8; ct.len()];
    decrypt_message(&mut state, rate, r_a, ct, &mut plaintext);
    let expected_tag = finalize_tag(&mut state, key, key_offset, r_f, TAG_LEN);
    if !ct_eq(&expected_tag, tag) {
        plaintext.zeroize();
        log::warn!("ascon-aead: tag mismatch, rejecting ciphertext");
        return Err(LwcError::AuthenticationFailed);
    }
    Ok(plaintext)
}

/// Ascon-128: K=16, N=16, T=16, rate=8, r_a=6, r_f=12, IV=`0x80400c0600000000`.
pub struct Ascon128;

impl Ascon128 {
    const IV: u64 = 0x8040_0c06_0000_0000;
    const RATE: usize = 8;
    const R_A: u32 = 6;
    const R_F: u32 = 12;
    const KEY_OFFSET: usize = 8;

    fn init_state(key: &[u8], nonce: &[u8]) -> AsconState {
        let mut buf = [0u8; 40];
        store_u64_be(Self::IV, &mut buf[0..8]);
        buf[8..24].copy_from_slice(key);
        buf[24..40].copy_from_slice(nonce);
        let mut s = AsconState::from_bytes(&buf);
        s.permute(12 - Self::R_F);
        let mut out = s.to_bytes();
        xor_inplace(&mut out[Self::KEY_OFFSET..Self::KEY_OFFSET + 16], key);
        AsconState::from_bytes(&out)
    }
}

impl Aead for Ascon128 {
    const KEY_LEN: usize = 16;
    const NONCE_LEN: usize = 16;
    const TAG_LEN: usize = 16;

    fn encrypt(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        let state = Self::init_state(key, nonce);
        Ok(seal(state, Self::RATE, Self::R_A, Self::R_F, key, Self::KEY_OFFSET, ad, plaintext))
    }

    fn decrypt(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        let state = Self::init_state(key, nonce);
        open(state, Self::RATE, Self::R_A, Self::R_F, key, Self::KEY_OFFSET, ad, ciphertext_and_tag)
    }
}

/// Ascon-128a: K=16, N=16, T=16, rate=16, r_a=8, r_f=12, IV=`0x80800c0800000000`.
pub struct Ascon128a;

impl Ascon128a {
    const IV: u64 = 0x8080_0c08_0000_0000;
    const RATE: usize = 16;
    const R_A: u32 = 8;
    const R_F: u32 = 12;
    const KEY_OFFSET: usize = 8;

    fn init_state(key: &[u8], nonce: &[u8]) -> AsconState {
        let mut buf = [0u8; 40];
        store_u64_be(Self::IV, &mut buf[0..8]);
        buf[8..24].copy_from_slice(key);
        buf[24..40].copy_from_slice(nonce);
        let mut s = AsconState::from_bytes(&buf);
        s.permute(12 - Self::R_F);
        let mut out = s.to_bytes();
        xor_inplace(&mut out[Self::KEY_OFFSET..Self::KEY_OFFSET + 16], key);
        AsconState::from_bytes(&out)
    }
}

impl Aead for Ascon128a {
    const KEY_LEN: usize = 16;
    const NONCE_LEN: usize = 16;
    const TAG_LEN: usize = 16;

    fn encrypt(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        let state = Self::init_state(key, nonce);
        Ok(seal(state, Self::RATE, Self::R_A, Self::R_F, key, Self::KEY_OFFSET, ad, plaintext))
    }

    fn decrypt(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        let state = Self::init_state(key, nonce);
        open(state, Self::RATE, Self::R_A, Self::R_F, key, Self::KEY_OFFSET, ad, ciphertext_and_tag)
    }
}

/// Ascon-80pq: K=20, N=16, T=16, rate=8, r_a=6, r_f=12,
/// IV=`0xa0400c06 || key[0..4]` forming the first lane.
pub struct Ascon80pq;

impl Ascon80pq {
    const IV_PREFIX: u32 = 0xa040_0c06;
    const RATE: usize = 8;
    const R_A: u32 = 6;
    const R_F: u32 = 12;
    const KEY_OFFSET: usize = 4;

    fn init_state(key: &[u8], nonce: &[u8]) -> AsconState {
        let mut buf = [0u8; 40];
        buf[0..4].copy_from_slice(&Self::IV_PREFIX.to_be_bytes());
        buf[4..24].copy_from_slice(key);
        buf[24..40].copy_from_slice(nonce);
        let mut s = AsconState::from_bytes(&buf);
        s.permute(12 - Self::R_F);
        let mut out = s.to_bytes();
        xor_inplace(&mut out[Self::KEY_OFFSET..Self::KEY_OFFSET + 20], key);
        AsconState::from_bytes(&out)
    }
}

impl Aead for Ascon80pq {
    const KEY_LEN: usize = 20;
    const NONCE_LEN: usize = 16;
    const TAG_LEN: usize = 16;

    fn encrypt(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        let state = Self::init_state(key, nonce);
        Ok(seal(state, Self::RATE, Self::R_A, Self::R_F, key, Self::KEY_OFFSET, ad, plaintext))
    }

    fn decrypt(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>> {
        check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
        let state = Self::init_state(key, nonce);
        open(state, Self::RATE, Self::R_A, Self::R_F, key, Self::KEY_OFFSET, ad, ciphertext_and_tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascon128_roundtrips() {
        let key = [0x42u8; 16];
        let nonce = [0x24u8; 16];
        let ad = b"associated data";
        let msg = b"lightweight cryptography";
        let ct = Ascon128::encrypt(&key, &nonce, ad, msg).unwrap();
        assert_eq!(ct.len(), msg.len() + 16);
        let pt = Ascon128::decrypt(&key, &nonce, ad, &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn ascon128_empty_message_roundtrip() {
        let key = [0u8; 16];
        let nonce = [0u8; 16];
        let ct = Ascon128::encrypt(&key, &nonce, &[], &[]).unwrap();
        assert_eq!(ct.len(), 16);
        let pt = Ascon128::decrypt(&key, &nonce, &[], &ct).unwrap();
        assert_eq!(pt.len(), 0);
    }

    #[test]
    fn ascon128_tampered_tag_is_rejected() {
        let key = [1u8; 16];
        let nonce = [2u8; 16];
        let mut ct = Ascon128::encrypt(&key, &nonce, b"ad", b"message").unwrap();
        let last = ct.len() - 1;
        ct[last] ^= 0x01;
        assert_eq!(Ascon128::decrypt(&key, &nonce, b"ad", &ct), Err(LwcError::AuthenticationFailed));
    }

    #[test]
    fn ascon128_tampered_ad_is_rejected() {
        let key = [1u8; 16];
        let nonce = [2u8; 16];
        let ct = Ascon128::encrypt(&key, &nonce, b"ad", b"message").unwrap();
        assert_eq!(Ascon128::decrypt(&key, &nonce, b"different ad", &ct), Err(LwcError::AuthenticationFailed));
    }

    #[test]
    fn ascon128_rejects_wrong_key_length() {
        let nonce = [0u8; 16];
        assert_eq!(
            Ascon128::encrypt(&[0u8; 10], &nonce, &[], &[]),
            Err(LwcError::InvalidKeyLength { expected: 16, actual: 10 })
        );
    }

    #[test]
    fn ascon128a_roundtrips_multi_block() {
        let key = [7u8; 16];
        let nonce = [9u8; 16];
        let msg: Vec<u8> = (0..100u8).collect();
        let ct = Ascon128a::encrypt(&key, &nonce, b"x", &msg).unwrap();
        let pt = Ascon128a::decrypt(&key, &nonce, b"x", &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn ascon80pq_roundtrips() {
        let key = [3u8; 20];
        let nonce = [4u8; 16];
        let msg = b"post-quantum-margin key schedule";
        let ct = Ascon80pq::encrypt(&key, &nonce, b"pq", msg).unwrap();
        let pt = Ascon80pq::decrypt(&key, &nonce, b"pq", &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn distinct_algorithms_produce_distinct_ciphertext() {
        let key16 = [5u8; 16];
        let nonce = [6u8; 16];
        let a = Ascon128::encrypt(&key16, &nonce, &[], b"same").unwrap();
        let b = Ascon128a::encrypt(&key16, &nonce, &[], b"same").unwrap();
        assert_ne!(a, b);
    }
}
