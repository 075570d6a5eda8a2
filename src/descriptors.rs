//! C8: algorithm descriptors — immutable records pairing each algorithm's
//! metadata with its entry points, for table-driven testing and selection
//! (§4.8). Nothing in this crate consults these tables at runtime; callers
//! (a KAT harness, a registration layer) are the intended consumer.

use crate::aead::ascon_aead::{Ascon128, Ascon128a, Ascon80pq};
use crate::aead::knot_aead::{KnotAead128_256, KnotAead128_384, KnotAead192_384, KnotAead256_512};
use crate::aead::spook::{Spook128_384Mu, Spook128_384Su, Spook128_512Mu, Spook128_512Su};
use crate::aead::Aead;
use crate::drygascon::{DryGascon128K16, DryGascon128K32, DryGascon128K56, DryGascon256};
use crate::error::Result;
use crate::hash::ascon_hash::AsconHash;
use crate::hash::knot_hash::{KnotHash256, KnotHash256Over384, KnotHash384, KnotHash512};
use crate::hash::Hash;
use crate::isap::{IsapA128A, IsapK128A};

/// Descriptor flag bits (§4.8).
pub mod flags {
    pub const NONE: u8 = 0;
    /// KAT vectors for this algorithm are given in little-endian byte order.
    pub const LITTLE_ENDIAN_CANONICAL: u8 = 1 << 0;
    /// Side-channel protection covers key material only.
    pub const SC_PROTECT_KEY: u8 = 1 << 1;
    /// Side-channel protection covers every operation.
    pub const SC_PROTECT_ALL: u8 = 1 << 2;
}

/// `{name, key_size, nonce_size, tag_size, flags, encrypt, decrypt}` (§4.8).
#[derive(Clone, Copy)]
pub struct AeadDescriptor {
    pub name: &'static str,
    pub key_size: usize,
    pub nonce_size: usize,
    pub tag_size: usize,
    pub flags: u8,
    pub encrypt: fn(&[u8], &[u8], &[u8], &[u8]) -> Result<Vec<u8>>,
    pub decrypt: fn(&[u8], &[u8], &[u8], &[u8]) -> Result<Vec<u8>>,
}

/// `{name, ctx_size, hash_size, flags, one_shot, ...}` — this crate exposes
/// only the one-shot entry point; `absorb`/`squeeze` members are covered by
/// the [`crate::hash::Xof`] trait directly rather than function pointers
/// stored here, since XOF state is not `'static`.
#[derive(Clone, Copy)]
pub struct HashDescriptor {
    pub name: &'static str,
    pub hash_size: usize,
    pub flags: u8,
    pub one_shot: fn(&[u8]) -> Vec<u8>,
}

pub const AEAD_ALGORITHMS: &[AeadDescriptor] = &[
    AeadDescriptor {
        name: "Ascon-128",
        key_size: Ascon128::KEY_LEN,
        nonce_size: Ascon128::NONCE_LEN,
        tag_size: Ascon128::TAG_LEN,
        flags: flags::NONE,
        encrypt: Ascon128::encrypt,
        decrypt: Ascon128::decrypt,
    },
    AeadDescriptor {
        name: "Ascon-128a",
        key_size: Ascon128a::KEY_LEN,
        nonce_size: Ascon128a::NONCE_LEN,
        tag_size: Ascon128a::TAG_LEN,
        flags: flags::NONE,
        encrypt: Ascon128a::encrypt,
        decrypt: Ascon128a::decrypt,
    },
    AeadDescriptor {
        name: "Ascon-80pq",
        key_size: Ascon80pq::KEY_LEN,
        nonce_size: Ascon80pq::NONCE_LEN,
        tag_size: Ascon80pq::TAG_LEN,
        flags: flags::NONE,
        encrypt: Ascon80pq::encrypt,
        decrypt: Ascon80pq::decrypt,
    },
    AeadDescriptor {
        name: "KNOT-AEAD-128-256",
        key_size: KnotAead128_256::KEY_LEN,
        nonce_size: KnotAead128_256::NONCE_LEN,
        tag_size: KnotAead128_256::TAG_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        encrypt: KnotAead128_256::encrypt,
        decrypt: KnotAead128_256::decrypt,
    },
    AeadDescriptor {
        name: "KNOT-AEAD-128-384",
        key_size: KnotAead128_384::KEY_LEN,
        nonce_size: KnotAead128_384::NONCE_LEN,
        tag_size: KnotAead128_384::TAG_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        encrypt: KnotAead128_384::encrypt,
        decrypt: KnotAead128_384::decrypt,
    },
    AeadDescriptor {
        name: "KNOT-AEAD-192-384",
        key_size: KnotAead192_384::KEY_LEN,
        nonce_size: KnotAead192_384::NONCE_LEN,
        tag_size: KnotAead192_384::TAG_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        encrypt: KnotAead192_384::encrypt,
        decrypt: KnotAead192_384::decrypt,
    },
    AeadDescriptor {
        name: "KNOT-AEAD-256-512",
        key_size: KnotAead256_512::KEY_LEN,
        nonce_size: KnotAead256_512::NONCE_LEN,
        tag_size: KnotAead256_512::TAG_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        encrypt: KnotAead256_512::encrypt,
        decrypt: KnotAead256_512::decrypt,
    },
    AeadDescriptor {
        name: "Spook-128-384-su",
        key_size: Spook128_384Su::KEY_LEN,
        nonce_size: Spook128_384Su::NONCE_LEN,
        tag_size: Spook128_384Su::TAG_LEN,
        flags: flags::NONE,
        encrypt: Spook128_384Su::encrypt,
        decrypt: Spook128_384Su::decrypt,
    },
    AeadDescriptor {
        name: "Spook-128-512-su",
        key_size: Spook128_512Su::KEY_LEN,
        nonce_size: Spook128_512Su::NONCE_LEN,
        tag_size: Spook128_512Su::TAG_LEN,
        flags: flags::NONE,
        encrypt: Spook128_512Su::encrypt,
        decrypt: Spook128_512Su::decrypt,
    },
    AeadDescriptor {
        name: "Spook-128-384-mu",
        key_size: Spook128_384Mu::KEY_LEN,
        nonce_size: Spook128_384Mu::NONCE_LEN,
        tag_size: Spook128_384Mu::TAG_LEN,
        flags: flags::NONE,
        encrypt: Spook128_384Mu::encrypt,
        decrypt: Spook128_384Mu::decrypt,
    },
    AeadDescriptor {
        name: "Spook-128-512-mu",
        key_size: Spook128_512Mu::KEY_LEN,
        nonce_size: Spook128_512Mu::NONCE_LEN,
        tag_size: Spook128_512Mu::TAG_LEN,
        flags: flags::NONE,
        encrypt: Spook128_512Mu::encrypt,
        decrypt: Spook128_512Mu::decrypt,
    },
    AeadDescriptor {
        name: "ISAP-A-128A",
        key_size: IsapA128A::KEY_LEN,
        nonce_size: IsapA128A::NONCE_LEN,
        tag_size: IsapA128A::TAG_LEN,
        flags: flags::NONE,
        encrypt: IsapA128A::encrypt,
        decrypt: IsapA128A::decrypt,
    },
    AeadDescriptor {
        name: "ISAP-K-128A",
        key_size: IsapK128A::KEY_LEN,
        nonce_size: IsapK128A::NONCE_LEN,
        tag_size: IsapK128A::TAG_LEN,
        flags: flags::NONE,
        encrypt: IsapK128A::encrypt,
        decrypt: IsapK128A::decrypt,
    },
    AeadDescriptor {
        name: "DryGASCON-128-k16",
        key_size: DryGascon128K16::KEY_LEN,
        nonce_size: DryGascon128K16::NONCE_LEN,
        tag_size: DryGascon128K16::TAG_LEN,
        flags: flags::NONE,
        encrypt: DryGascon128K16::encrypt,
        decrypt: DryGascon128K16::decrypt,
    },
    AeadDescriptor {
        name: "DryGASCON-128-k32",
        key_size: DryGascon128K32::KEY_LEN,
        nonce_size: DryGascon128K32::NONCE_LEN,
        tag_size: DryGascon128K32::TAG_LEN,
        flags: flags::NONE,
        encrypt: DryGascon128K32::encrypt,
        decrypt: DryGascon128K32::decrypt,
    },
    AeadDescriptor {
        name: "DryGASCON-128-k56",
        key_size: DryGascon128K56::KEY_LEN,
        nonce_size: DryGascon128K56::NONCE_LEN,
        tag_size: DryGascon128K56::TAG_LEN,
        flags: flags::NONE,
        encrypt: DryGascon128K56::encrypt,
        decrypt: DryGascon128K56::decrypt,
    },
    AeadDescriptor {
        name: "DryGASCON-256",
        key_size: DryGascon256::KEY_LEN,
        nonce_size: DryGascon256::NONCE_LEN,
        tag_size: DryGascon256::TAG_LEN,
        flags: flags::NONE,
        encrypt: DryGascon256::encrypt,
        decrypt: DryGascon256::decrypt,
    },
];

pub const HASH_ALGORITHMS: &[HashDescriptor] = &[
    HashDescriptor {
        name: "Ascon-HASH",
        hash_size: AsconHash::OUTPUT_LEN,
        flags: flags::NONE,
        one_shot: AsconHash::hash,
    },
    HashDescriptor {
        name: "KNOT-HASH-256",
        hash_size: KnotHash256::OUTPUT_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        one_shot: KnotHash256::hash,
    },
    HashDescriptor {
        name: "KNOT-HASH-384",
        hash_size: KnotHash384::OUTPUT_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        one_shot: KnotHash384::hash,
    },
    HashDescriptor {
        name: "KNOT-HASH-512",
        hash_size: KnotHash512::OUTPUT_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        one_shot: KnotHash512::hash,
    },
    HashDescriptor {
        name: "KNOT-HASH-256-384",
        hash_size: KnotHash256Over384::OUTPUT_LEN,
        flags: flags::LITTLE_ENDIAN_CANONICAL,
        one_shot: KnotHash256Over384::hash,
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_aead_descriptor_roundtrips_through_its_function_pointers() {
        for d in AEAD_ALGORITHMS {
            // Varying bytes, not a constant fill: DryGASCON's 32/56-byte key
            // modes read `x` straight out of the key and reject a key whose
            // four derived words collide (§4.10).
            let key: Vec<u8> = (0..d.key_size).map(|i| (0x42u32.wrapping_add(i as u32 * 17)) as u8).collect();
            let nonce = vec![0x24u8; d.nonce_size];
            let msg = b"descriptor driven roundtrip";
            let ct = (d.encrypt)(&key, &nonce, b"ad", msg).unwrap_or_else(|e| panic!("{}: {e}", d.name));
            assert_eq!(ct.len(), msg.len() + d.tag_size, "{}", d.name);
            let pt = (d.decrypt)(&key, &nonce, b"ad", &ct).unwrap_or_else(|e| panic!("{}: {e}", d.name));
            assert_eq!(pt, msg, "{}", d.name);
        }
    }

    #[test]
    fn every_hash_descriptor_produces_its_declared_length() {
        for d in HASH_ALGORITHMS {
            let out = (d.one_shot)(b"descriptor driven digest");
            assert_eq!(out.len(), d.hash_size, "{}", d.name);
        }
    }
}
