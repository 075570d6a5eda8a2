//! Masked Ascon-p: share-wise linear layer, ISW-refreshed AND for the
//! non-linear layer. Correctness invariant (§4.5):
//! `output(masked_permute(input(s))) == unmasked_permute(s)` for any state
//! `s` and any valid sharing/mask-refresh schedule.

use crate::error::Result;
use crate::mask_rng::MaskRng;
use crate::masking::Masked;
use crate::permutations::ascon::AsconState;

/// `N`-share masked Ascon-p state: five masked 64-bit lanes.
pub struct MaskedAsconState<const N: usize>(pub [Masked<u64, N>; 5]);

impl<const N: usize> MaskedAsconState<N> {
    /// Mask a plaintext Ascon state, drawing fresh shares from `rng`.
    pub fn input(state: &AsconState, rng: &mut dyn MaskRng) -> Result<Self> {
        let mut lanes = core::array::from_fn(|_| Masked([0u64; N]));
        for i in 0..5 {
            lanes[i] = Masked::input(state.0[i], rng)?;
        }
        Ok(Self(lanes))
    }

    /// Recombine all shares back into a plaintext Ascon state.
    pub fn output(&self) -> AsconState {
        let mut lanes = [0u64; 5];
        for i in 0..5 {
            lanes[i] = self.0[i].output();
        }
        AsconState(lanes)
    }

    /// Run rounds `first_round..12`, refreshed-AND non-linear layer.
    pub fn permute(&mut self, first_round: u32, rng: &mut dyn MaskRng) -> Result<()> {
        for r in first_round..12 {
            self.round(r, rng)?;
        }
        Ok(())
    }

    fn round(&mut self, r: u32, rng: &mut dyn MaskRng) -> Result<()> {
        let [mut x0, mut x1, mut x2, mut x3, mut x4] = self.0;

        // (a) round constant — affects share 0 of x2 only
        x2.xor_const(AsconState::round_constant(r));

        // (b) 5-bit bit-sliced S-box, masked AND for every `&`
        x0.xor_assign(&x4);
        x4.xor_assign(&x3);
        x2.xor_assign(&x1);
        let t0 = x0.not().and(&x1, rng)?;
        let t1 = x1.not().and(&x2, rng)?;
        let t2 = x2.not().and(&x3, rng)?;
        let t3 = x3.not().and(&x4, rng)?;
        let t4 = x4.not().and(&x0, rng)?;
        x0.xor_assign(&t1);
        x1.xor_assign(&t2);
        x2.xor_assign(&t3);
        x3.xor_assign(&t4);
        x4.xor_assign(&t0);
        x1.xor_assign(&x0);
        x3.xor_assign(&x2);
        x0.xor_assign(&x4);
        x2 = x2.not();

        // (c) linear diffusion, per share
        let d0 = x0.rotr(19).xor(&x0.rotr(28));
        x0.xor_assign(&d0);
        let d1 = x1.rotr(61).xor(&x1.rotr(39));
        x1.xor_assign(&d1);
        let d2 = x2.rotr(1).xor(&x2.rotr(6));
        x2.xor_assign(&d2);
        let d3 = x3.rotr(10).xor(&x3.rotr(17));
        x3.xor_assign(&d3);
        let d4 = x4.rotr(7).xor(&x4.rotr(41));
        x4.xor_assign(&d4);

        self.0 = [x0, x1, x2, x3, x4];
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask_rng::DeterministicMaskRngForTests;

    fn vector_input() -> AsconState {
        let mut b = [0u8; 40];
        for (i, byte) in b.iter_mut().enumerate() {
            *byte = i as u8;
        }
        AsconState::from_bytes(&b)
    }

    fn check_equivalence<const N: usize>(seed: u64) {
        let plain = vector_input();
        let mut expected = plain;
        expected.permute(0);

        let mut rng = DeterministicMaskRngForTests::from_seed(seed);
        rng.init().unwrap();
        let mut masked: MaskedAsconState<N> = MaskedAsconState::input(&plain, &mut rng).unwrap();
        masked.permute(0, &mut rng).unwrap();
        assert_eq!(masked.output(), expected);
    }

    #[test]
    fn masked_ascon_matches_unmasked_for_all_share_counts() {
        check_equivalence::<2>(1);
        check_equivalence::<3>(2);
        check_equivalence::<4>(3);
        check_equivalence::<5>(4);
        check_equivalence::<6>(5);
    }

    #[test]
    fn masked_ascon_matches_unmasked_with_reduced_rounds() {
        let plain = vector_input();
        let mut expected = plain;
        expected.permute(4);

        let mut rng = DeterministicMaskRngForTests::from_seed(99);
        rng.init().unwrap();
        let mut masked: MaskedAsconState<3> = MaskedAsconState::input(&plain, &mut rng).unwrap();
        masked.permute(4, &mut rng).unwrap();
        assert_eq!(masked.output(), expected);
    }
}
