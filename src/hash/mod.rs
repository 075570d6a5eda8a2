//! C7: fixed-output hash and extendable-output (XOF) engines, sharing one
//! generic absorb/squeeze duplex driver over any [`SpongePermutation`].

pub mod ascon_hash;
pub mod knot_hash;

use crate::aead::SpongePermutation;
use crate::util::xor_inplace;

/// The external hash contract (§6): `hash(in) -> digest`.
pub trait Hash {
    const OUTPUT_LEN: usize;
    fn hash(input: &[u8]) -> Vec<u8>;
}

/// The external XOF contract (§6): stateful `absorb`/`squeeze` with a phase
/// flag separating the two (§4.7).
pub trait Xof {
    fn absorb(&mut self, input: &[u8]);
    fn squeeze(&mut self, out: &mut [u8]);
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Phase {
    Absorbing,
    Squeezing,
}

/// Generic sponge absorb/squeeze driver (§4.7). Fixed-output hashes use it
/// for a single absorb followed by one fixed-length squeeze; XOFs expose it
/// through the [`Xof`] trait for repeated absorb/squeeze transitions.
///
/// `extra_squeeze_permute` runs the inter-squeeze permutation twice instead
/// of once — KNOT-HASH's documented "two permutation calls between output
/// halves" (§6); Ascon leaves it `false`.
pub struct SpongeHasher<P: SpongePermutation> {
    state: P,
    rate: usize,
    rounds: u32,
    tail: Vec<u8>,
    phase: Phase,
    padded: bool,
    squeeze_buf: Vec<u8>,
    squeeze_pos: usize,
    extra_squeeze_permute: bool,
}

impl<P: SpongePermutation> SpongeHasher<P> {
    pub fn new(initial_state: P, rate: usize, rounds: u32, extra_squeeze_permute: bool) -> Self {
        Self {
            state: initial_state,
            rate,
            rounds,
            tail: Vec::new(),
            phase: Phase::Absorbing,
            padded: false,
            squeeze_buf: Vec::new(),
            squeeze_pos: 0,
            extra_squeeze_permute,
        }
    }

    fn permute_once(&mut self) {
        self.state.permute_rounds(self.rounds);
    }

    pub fn absorb(&mut self, input: &[u8]) {
        if self.phase == Phase::Squeezing {
            // Re-entering absorb after squeeze: close the squeeze phase with
            // one more permutation and reset the byte counters (§4.7).
            self.permute_once();
            self.phase = Phase::Absorbing;
            self.padded = false;
            self.squeeze_buf.clear();
            self.squeeze_pos = 0;
        }
        self.tail.extend_from_slice(input);
        while self.tail.len() >= self.rate {
            let block: Vec<u8> = self.tail.drain(..self.rate).collect();
            let mut buf = vec![0u8; P::STATE_BYTES];
            self.state.write_bytes(&mut buf);
            xor_inplace(&mut buf[..self.rate], &block);
            self.state = P::from_bytes(&buf);
            self.permute_once();
        }
    }

    fn pad_and_enter_squeeze(&mut self) {
        let mut buf = vec![0u8; P::STATE_BYTES];
        self.state.write_bytes(&mut buf);
        xor_inplace(&mut buf[..self.tail.len()], &self.tail);
        buf[self.tail.len()] ^= 0x80;
        self.state = P::from_bytes(&buf);
        self.permute_once();
        self.tail.clear();
        self.phase = Phase::Squeezing;
        self.padded = true;
        self.refill_squeeze_buf();
    }

    fn refill_squeeze_buf(&mut self) {
        let mut buf = vec![0u8; P::STATE_BYTES];
        self.state.write_bytes(&mut buf);
        self.squeeze_buf = buf[..self.rate].to_vec();
        self.squeeze_pos = 0;
    }

    /// Write `out.len()` more squeezed bytes, continuing the stream across
    /// calls. `squeeze(k bytes)` then `squeeze(m bytes)` is exactly
    /// `squeeze(k+m bytes)` (§8 XOF phase idempotence).
    pub fn squeeze(&mut self, out: &mut [u8]) {
        if !self.padded {
            self.pad_and_enter_squeeze();
        }
        let mut written = 0;
        while written < out.len() {
            if self.squeeze_pos == self.squeeze_buf.len() {
                self.permute_once();
                if self.extra_squeeze_permute {
                    self.permute_once();
                }
                self.refill_squeeze_buf();
            }
            let avail = self.squeeze_buf.len() - self.squeeze_pos;
            let take = avail.min(out.len() - written);
            out[written..written + take]
                .copy_from_slice(&self.squeeze_buf[self.squeeze_pos..self.squeeze_pos + take]);
            self.squeeze_pos += take;
            written += take;
        }
    }
}
