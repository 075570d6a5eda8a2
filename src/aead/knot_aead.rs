//! KNOT-AEAD-{128-256,128-384,192-384,256-512} (§6), instantiating the
//! generic duplex engine over [`KnotState`].
//!
//! The four variants share one state machine and differ only in width,
//! rate, and round schedule. The functional spec gives those parameters
//! explicitly but — unlike Ascon, whose IV is a published 64-bit constant —
//! does not publish KNOT's initial-state byte layout beyond "key || nonce ||
//! IV" (§4.6's generic shape). Where `key.len() + nonce.len()` already fills
//! the state (KNOT-AEAD-128-256) there is no room for a separate IV and none
//! is added; where it doesn't, the remaining bytes are left zero rather than
//! inventing an unpublished constant. See DESIGN.md for this decision.

use super::{
    absorb_ad, apply_domain_separator_bit, check_lengths, decrypt_message, encrypt_message,
    finalize_tag, Aead, SpongePermutation,
};
use crate::error::{LwcError, Result};
use crate::permutations::knot::{KnotState, KnotWidth};
use crate::util::{ct_eq, xor_inplace};
use zeroize::Zeroize;

/// The domain-separation bit KNOT XORs into the high bit of the last state
/// byte after AD absorption (§6), as opposed to Ascon's low bit.
const KNOT_DOMAIN_BIT: u8 = 0x80;

macro_rules! knot_perm_wrapper {
    ($name:ident, $width:expr, $bytes:expr) => {
        #[derive(Clone, Copy)]
        struct $name(KnotState);

        impl SpongePermutation for $name {
            const STATE_BYTES: usize = $bytes;

            fn from_bytes(bytes: &[u8]) -> Self {
                $name(KnotState::from_bytes($width, bytes))
            }

            fn write_bytes(&self, out: &mut [u8]) {
                out.copy_from_slice(&self.0.to_bytes());
            }

            fn permute_rounds(&mut self, rounds: u32) {
                self.0.permute(rounds);
            }
        }
    };
}

knot_perm_wrapper!(Knot256Perm, KnotWidth::W256, 32);
knot_perm_wrapper!(Knot384Perm, KnotWidth::W384, 48);
knot_perm_wrapper!(Knot512Perm, KnotWidth::W512, 64);

fn init_state<P: SpongePermutation>(key: &[u8], nonce: &[u8], init_rounds: u32, key_offset: usize) -> P {
    let mut buf = vec![0u8; P::STATE_BYTES];
    buf[..key.len()].copy_from_slice(key);
    buf[key.len()..key.len() + nonce.len()].copy_from_slice(nonce);
    let mut state = P::from_bytes(&buf);
    state.permute_rounds(init_rounds);
    let mut out = vec![0u8; P::STATE_BYTES];
    state.write_bytes(&mut out);
    xor_inplace(&mut out[key_offset..key_offset + key.len()], key);
    P::from_bytes(&out)
}

fn seal<P: SpongePermutation>(
    mut state: P,
    rate: usize,
    r_a: u32,
    r_f: u32,
    key: &[u8],
    key_offset: usize,
    tag_len: usize,
    ad: &[u8],
    plaintext: &[u8],
) -> Vec<u8> {
    absorb_ad(&mut state, rate, r_a, ad);
    apply_domain_separator_bit(&mut state, KNOT_DOMAIN_BIT);
    let mut ciphertext = vec![0u8; plaintext.len()];
    encrypt_message(&mut state, rate, r_a, plaintext, &mut ciphertext);
    let tag = finalize_tag(&mut state, key, key_offset, r_f, tag_len);
    ciphertext.extend_from_slice(&tag);
    ciphertext
}

fn open<P: SpongePermutation>(
    mut state: P,
    rate: usize,
    r_a: u32,
    r_f: u32,
    key: &[u8],
    key_offset: usize,
    tag_len: usize,
    ad: &[u8],
    ciphertext_and_tag: &[u8],
) -> Result<Vec<u8>> {
    if ciphertext_and_tag.len() < tag_len {
        return Err(LwcError::InvalidCiphertextLength);
    }
    let (ct, tag) = ciphertext_and_tag.split_at(ciphertext_and_tag.len() - tag_len);
    absorb_ad(&mut state, rate, r_a, ad);
    apply_domain_separator_bit(&mut state, KNOT_DOMAIN_BIT);
    let mut plaintext = vec![0u8; ct.len()];
    decrypt_message(&mut state, rate, r_a, ct, &mut plaintext);
    let expected_tag = finalize_tag(&mut state, key, key_offset, r_f, tag_len);
    if !ct_eq(&expected_tag, tag) {
        plaintext.zeroize();
        log::warn!("knot-aead: tag mismatch, rejecting ciphertext");
        return Err(LwcError::AuthenticationFailed);
    }
    Ok(plaintext)
}

macro_rules! knot_aead_algorithm {
    ($name:ident, $perm:ty, $k:expr, $n:expr, $t:expr, $rate:expr, $init:expr, $r_a:expr, $r_f:expr) => {
        #[doc = concat!("KNOT-AEAD instance: K=", stringify!($k), ", N=", stringify!($n), ", T=", stringify!($t), ", rate=", stringify!($rate), ".")]
        pub struct $name;

        impl Aead for $name {
            const KEY_LEN: usize = $k;
            const NONCE_LEN: usize = $n;
            const TAG_LEN: usize = $t;

            fn encrypt(key: &[u8], nonce: &[u8], ad: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
                check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
                let state: $perm = init_state(key, nonce, $init, 0);
                Ok(seal(state, $rate, $r_a, $r_f, key, 0, $t, ad, plaintext))
            }

            fn decrypt(key: &[u8], nonce: &[u8], ad: &[u8], ciphertext_and_tag: &[u8]) -> Result<Vec<u8>> {
                check_lengths(key, nonce, Self::KEY_LEN, Self::NONCE_LEN)?;
                let state: $perm = init_state(key, nonce, $init, 0);
                open(state, $rate, $r_a, $r_f, key, 0, $t, ad, ciphertext_and_tag)
            }
        }
    };
}

knot_aead_algorithm!(KnotAead128_256, Knot256Perm, 16, 16, 16, 8, 52, 28, 32);
knot_aead_algorithm!(KnotAead128_384, Knot384Perm, 16, 16, 16, 24, 76, 28, 32);
knot_aead_algorithm!(KnotAead192_384, Knot384Perm, 24, 16, 24, 12, 76, 40, 44);
knot_aead_algorithm!(KnotAead256_512, Knot512Perm, 32, 16, 32, 16, 100, 52, 56);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn knot_128_256_roundtrips() {
        let key = [0x11u8; 16];
        let nonce = [0x22u8; 16];
        let msg = b"knot lightweight aead";
        let ct = KnotAead128_256::encrypt(&key, &nonce, b"ad", msg).unwrap();
        assert_eq!(ct.len(), msg.len() + 16);
        let pt = KnotAead128_256::decrypt(&key, &nonce, b"ad", &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn knot_128_384_roundtrips_multi_block() {
        let key = [0x33u8; 16];
        let nonce = [0x44u8; 16];
        let msg: Vec<u8> = (0..80u8).collect();
        let ct = KnotAead128_384::encrypt(&key, &nonce, &[], &msg).unwrap();
        let pt = KnotAead128_384::decrypt(&key, &nonce, &[], &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn knot_192_384_roundtrips() {
        let key = [0x55u8; 24];
        let nonce = [0x66u8; 16];
        let msg = b"variable key and tag sizes";
        let ct = KnotAead192_384::encrypt(&key, &nonce, b"x", msg).unwrap();
        assert_eq!(ct.len(), msg.len() + 24);
        let pt = KnotAead192_384::decrypt(&key, &nonce, b"x", &ct).unwrap();
        assert_eq!(pt, msg);
    }

    #[test]
    fn knot_256_512_roundtrips_empty_message() {
        let key = [0x77u8; 32];
        let nonce = [0x88u8; 16];
        let ct = KnotAead256_512::encrypt(&key, &nonce, &[], &[]).unwrap();
        assert_eq!(ct.len(), 32);
        let pt = KnotAead256_512::decrypt(&key, &nonce, &[], &ct).unwrap();
        assert_eq!(pt.len(), 0);
    }

    #[test]
    fn knot_tampered_ciphertext_is_rejected() {
        let key = [1u8; 16];
        let nonce = [2u8; 16];
        let mut ct = KnotAead128_256::encrypt(&key, &nonce, b"ad", b"message body").unwrap();
        ct[0] ^= 0x01;
        assert_eq!(
            KnotAead128_256::decrypt(&key, &nonce, b"ad", &ct),
            Err(LwcError::AuthenticationFailed)
        );
    }

    #[test]
    fn knot_256_512_rejects_wrong_key_length() {
        let nonce = [0u8; 16];
        assert_eq!(
            KnotAead256_512::encrypt(&[0u8; 10], &nonce, &[], &[]),
            Err(LwcError::InvalidKeyLength { expected: 32, actual: 10 })
        );
    }
}
