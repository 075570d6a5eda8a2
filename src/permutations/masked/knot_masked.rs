//! Masked KNOT-256/384/512: the linear row-rotation layer is a per-share
//! fold identical in structure to the unmasked permutation; the bit-sliced
//! S-box's `&`/`|` are realised through the ISW-refreshed masked AND/OR.

use crate::error::Result;
use crate::mask_rng::MaskRng;
use crate::masking::Masked;
use crate::permutations::knot::{KnotState, KnotWidth};

fn mask_of(w: u32) -> u128 {
    if w >= 128 {
        u128::MAX
    } else {
        (1u128 << w) - 1
    }
}

fn rotl_masked<const N: usize>(x: &Masked<u128, N>, n: u32, w: u32) -> Masked<u128, N> {
    let n = n % w;
    let mask = mask_of(w);
    if n == 0 {
        let mut out = x.0;
        for s in out.iter_mut() {
            *s &= mask;
        }
        return Masked(out);
    }
    let mut out = [0u128; N];
    for i in 0..N {
        out[i] = ((x.0[i] << n) | (x.0[i] >> (w - n))) & mask;
    }
    Masked(out)
}

fn rotl_384_masked<const N: usize>(x: &Masked<u128, N>, n: u32) -> Masked<u128, N> {
    let half = 48u32;
    let mask = mask_of(half);
    let mut lo = [0u128; N];
    let mut hi = [0u128; N];
    for i in 0..N {
        lo[i] = x.0[i] & mask;
        hi[i] = (x.0[i] >> half) & mask;
    }
    let lo_r = rotl_masked(&Masked(lo), n, half);
    let hi_r = rotl_masked(&Masked(hi), n, half);
    let mut out = [0u128; N];
    for i in 0..N {
        out[i] = (hi_r.0[i] << half) | lo_r.0[i];
    }
    Masked(out)
}

fn mask_const<const N: usize>(x: &Masked<u128, N>, mask: u128) -> Masked<u128, N> {
    let mut out = x.0;
    out[0] &= mask;
    for s in out.iter_mut().skip(1) {
        *s &= mask;
    }
    Masked(out)
}

/// `N`-share masked KNOT state: four masked 128-bit-capacity rows, only the
/// low `width.row_bits()` of each meaningful.
pub struct MaskedKnotState<const N: usize> {
    pub rows: [Masked<u128, N>; 4],
    pub width: KnotWidth,
}

impl<const N: usize> MaskedKnotState<N> {
    pub fn input(state: &KnotState, rng: &mut dyn MaskRng) -> Result<Self> {
        let mut rows = core::array::from_fn(|_| Masked([0u128; N]));
        for i in 0..4 {
            rows[i] = Masked::input(state.rows[i], rng)?;
        }
        Ok(Self {
            rows,
            width: state.width,
        })
    }

    pub fn output(&self) -> KnotState {
        let mut rows = [0u128; 4];
        for i in 0..4 {
            rows[i] = self.rows[i].output();
        }
        KnotState {
            rows,
            width: self.width,
        }
    }

    pub fn permute(&mut self, rounds: u32, round_constants: &[u128], rng: &mut dyn MaskRng) -> Result<()> {
        let w = self.width.row_bits();
        let mask = mask_of(w);
        let shifts = self.width.row_shifts();

        for round in 0..rounds as usize {
            let rc = round_constants[round % round_constants.len()] & mask;
            self.rows[0].xor_const(rc);

            let a0 = mask_const(&self.rows[0], mask);
            let a1 = mask_const(&self.rows[1], mask);
            let a2 = mask_const(&self.rows[2], mask);
            let a3 = mask_const(&self.rows[3], mask);

            let t1 = mask_const(&a0.not(), mask);
            let t3 = mask_const(&a2.xor(&a1.and(&t1, rng)?), mask);
            let b3 = mask_const(&a3.xor(&t3), mask);
            let t6 = mask_const(&a3.xor(&t1), mask);
            let b2 = mask_const(&a1.or(&a2, rng)?.xor(&t6), mask);
            let t1b = mask_const(&a1.xor(&a3), mask);
            let b0 = mask_const(&t1b.xor(&t3.and(&t6, rng)?), mask);
            let b1 = mask_const(&t3.xor(&b2.and(&t1b, rng)?), mask);

            let r1 = if self.width == KnotWidth::W384 {
                rotl_384_masked(&b1, shifts[0])
            } else {
                rotl_masked(&b1, shifts[0], w)
            };
            let r2 = if self.width == KnotWidth::W384 {
                rotl_384_masked(&b2, shifts[1])
            } else {
                rotl_masked(&b2, shifts[1], w)
            };
            let r3 = if self.width == KnotWidth::W384 {
                rotl_384_masked(&b3, shifts[2])
            } else {
                rotl_masked(&b3, shifts[2], w)
            };

            self.rows = [b0, r1, r2, r3];
        }
        Ok(())
    }
}
