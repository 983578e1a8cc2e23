//! Fixed-width saturating lane types.
//!
//! Kernels are written once, generic over [`ByteLanes`] / [`WordLanes`], and
//! instantiated for the backend picked by [`LaneBackend::detect`]. Every
//! backend is bit-exact with the scalar lanes; only throughput differs.

/// Lanes in a byte vector.
pub const BYTE_LANES: usize = 16;

/// Lanes in a word vector.
pub const WORD_LANES: usize = 8;

/// Instruction set used by the vector kernels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaneBackend {
    /// Portable emulation with plain arrays
    Scalar,
    /// 128-bit SSE2 (x86_64)
    Sse2,
    /// 128-bit NEON (aarch64)
    Neon,
}

impl LaneBackend {
    /// Best backend for this CPU. `LASP_FORCE_SCALAR=1` forces scalar lanes.
    pub fn detect() -> Self {
        let forced = std::env::var("LASP_FORCE_SCALAR")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);
        if forced {
            return LaneBackend::Scalar;
        }
        Self::native()
    }

    #[cfg(target_arch = "x86_64")]
    fn native() -> Self {
        if is_x86_feature_detected!("sse2") {
            LaneBackend::Sse2
        } else {
            LaneBackend::Scalar
        }
    }

    #[cfg(target_arch = "aarch64")]
    fn native() -> Self {
        LaneBackend::Neon
    }

    #[cfg(not(any(target_arch = "x86_64", target_arch = "aarch64")))]
    fn native() -> Self {
        LaneBackend::Scalar
    }

    pub fn name(&self) -> &'static str {
        match self {
            LaneBackend::Scalar => "scalar",
            LaneBackend::Sse2 => "sse2",
            LaneBackend::Neon => "neon",
        }
    }
}

/// 16 unsigned bytes with saturating arithmetic.
pub trait ByteLanes: Copy {
    fn splat(v: u8) -> Self;
    fn load(src: &[u8; BYTE_LANES]) -> Self;
    fn store(self, dst: &mut [u8; BYTE_LANES]);
    fn adds(self, other: Self) -> Self;
    fn subs(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
}

/// 8 signed words with saturating arithmetic.
pub trait WordLanes: Copy {
    fn splat(v: i16) -> Self;
    fn load(src: &[i16; WORD_LANES]) -> Self;
    fn store(self, dst: &mut [i16; WORD_LANES]);
    fn adds(self, other: Self) -> Self;
    fn subs(self, other: Self) -> Self;
    fn max(self, other: Self) -> Self;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarBytes([u8; BYTE_LANES]);

impl ByteLanes for ScalarBytes {
    #[inline(always)]
    fn splat(v: u8) -> Self {
        Self([v; BYTE_LANES])
    }

    #[inline(always)]
    fn load(src: &[u8; BYTE_LANES]) -> Self {
        Self(*src)
    }

    #[inline(always)]
    fn store(self, dst: &mut [u8; BYTE_LANES]) {
        *dst = self.0;
    }

    #[inline(always)]
    fn adds(mut self, other: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a = a.saturating_add(b);
        }
        self
    }

    #[inline(always)]
    fn subs(mut self, other: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a = a.saturating_sub(b);
        }
        self
    }

    #[inline(always)]
    fn max(mut self, other: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a = (*a).max(b);
        }
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScalarWords([i16; WORD_LANES]);

impl WordLanes for ScalarWords {
    #[inline(always)]
    fn splat(v: i16) -> Self {
        Self([v; WORD_LANES])
    }

    #[inline(always)]
    fn load(src: &[i16; WORD_LANES]) -> Self {
        Self(*src)
    }

    #[inline(always)]
    fn store(self, dst: &mut [i16; WORD_LANES]) {
        *dst = self.0;
    }

    #[inline(always)]
    fn adds(mut self, other: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a = a.saturating_add(b);
        }
        self
    }

    #[inline(always)]
    fn subs(mut self, other: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a = a.saturating_sub(b);
        }
        self
    }

    #[inline(always)]
    fn max(mut self, other: Self) -> Self {
        for (a, b) in self.0.iter_mut().zip(other.0) {
            *a = (*a).max(b);
        }
        self
    }
}

#[cfg(target_arch = "x86_64")]
pub mod sse2 {
    //! SSE2 is part of the x86_64 baseline, so these are always available.
    use std::arch::x86_64::*;

    use super::{ByteLanes, WordLanes, BYTE_LANES, WORD_LANES};

    #[derive(Clone, Copy)]
    pub struct Sse2Bytes(__m128i);

    impl ByteLanes for Sse2Bytes {
        #[inline(always)]
        fn splat(v: u8) -> Self {
            unsafe { Self(_mm_set1_epi8(v as i8)) }
        }

        #[inline(always)]
        fn load(src: &[u8; BYTE_LANES]) -> Self {
            unsafe { Self(_mm_loadu_si128(src.as_ptr() as *const __m128i)) }
        }

        #[inline(always)]
        fn store(self, dst: &mut [u8; BYTE_LANES]) {
            unsafe { _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, self.0) }
        }

        #[inline(always)]
        fn adds(self, other: Self) -> Self {
            unsafe { Self(_mm_adds_epu8(self.0, other.0)) }
        }

        #[inline(always)]
        fn subs(self, other: Self) -> Self {
            unsafe { Self(_mm_subs_epu8(self.0, other.0)) }
        }

        #[inline(always)]
        fn max(self, other: Self) -> Self {
            unsafe { Self(_mm_max_epu8(self.0, other.0)) }
        }
    }

    #[derive(Clone, Copy)]
    pub struct Sse2Words(__m128i);

    impl WordLanes for Sse2Words {
        #[inline(always)]
        fn splat(v: i16) -> Self {
            unsafe { Self(_mm_set1_epi16(v)) }
        }

        #[inline(always)]
        fn load(src: &[i16; WORD_LANES]) -> Self {
            unsafe { Self(_mm_loadu_si128(src.as_ptr() as *const __m128i)) }
        }

        #[inline(always)]
        fn store(self, dst: &mut [i16; WORD_LANES]) {
            unsafe { _mm_storeu_si128(dst.as_mut_ptr() as *mut __m128i, self.0) }
        }

        #[inline(always)]
        fn adds(self, other: Self) -> Self {
            unsafe { Self(_mm_adds_epi16(self.0, other.0)) }
        }

        #[inline(always)]
        fn subs(self, other: Self) -> Self {
            unsafe { Self(_mm_subs_epi16(self.0, other.0)) }
        }

        #[inline(always)]
        fn max(self, other: Self) -> Self {
            unsafe { Self(_mm_max_epi16(self.0, other.0)) }
        }
    }
}

#[cfg(target_arch = "aarch64")]
pub mod neon {
    use std::arch::aarch64::*;

    use super::{ByteLanes, WordLanes, BYTE_LANES, WORD_LANES};

    #[derive(Clone, Copy)]
    pub struct NeonBytes(uint8x16_t);

    impl ByteLanes for NeonBytes {
        #[inline(always)]
        fn splat(v: u8) -> Self {
            unsafe { Self(vdupq_n_u8(v)) }
        }

        #[inline(always)]
        fn load(src: &[u8; BYTE_LANES]) -> Self {
            unsafe { Self(vld1q_u8(src.as_ptr())) }
        }

        #[inline(always)]
        fn store(self, dst: &mut [u8; BYTE_LANES]) {
            unsafe { vst1q_u8(dst.as_mut_ptr(), self.0) }
        }

        #[inline(always)]
        fn adds(self, other: Self) -> Self {
            unsafe { Self(vqaddq_u8(self.0, other.0)) }
        }

        #[inline(always)]
        fn subs(self, other: Self) -> Self {
            unsafe { Self(vqsubq_u8(self.0, other.0)) }
        }

        #[inline(always)]
        fn max(self, other: Self) -> Self {
            unsafe { Self(vmaxq_u8(self.0, other.0)) }
        }
    }

    #[derive(Clone, Copy)]
    pub struct NeonWords(int16x8_t);

    impl WordLanes for NeonWords {
        #[inline(always)]
        fn splat(v: i16) -> Self {
            unsafe { Self(vdupq_n_s16(v)) }
        }

        #[inline(always)]
        fn load(src: &[i16; WORD_LANES]) -> Self {
            unsafe { Self(vld1q_s16(src.as_ptr())) }
        }

        #[inline(always)]
        fn store(self, dst: &mut [i16; WORD_LANES]) {
            unsafe { vst1q_s16(dst.as_mut_ptr(), self.0) }
        }

        #[inline(always)]
        fn adds(self, other: Self) -> Self {
            unsafe { Self(vqaddq_s16(self.0, other.0)) }
        }

        #[inline(always)]
        fn subs(self, other: Self) -> Self {
            unsafe { Self(vqsubq_s16(self.0, other.0)) }
        }

        #[inline(always)]
        fn max(self, other: Self) -> Self {
            unsafe { Self(vmaxq_s16(self.0, other.0)) }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn byte_ops<L: ByteLanes>(a: &[u8; 16], b: &[u8; 16]) -> [[u8; 16]; 3] {
        let (x, y) = (L::load(a), L::load(b));
        let mut out = [[0u8; 16]; 3];
        x.adds(y).store(&mut out[0]);
        x.subs(y).store(&mut out[1]);
        x.max(y).store(&mut out[2]);
        out
    }

    fn word_ops<L: WordLanes>(a: &[i16; 8], b: &[i16; 8]) -> [[i16; 8]; 3] {
        let (x, y) = (L::load(a), L::load(b));
        let mut out = [[0i16; 8]; 3];
        x.adds(y).store(&mut out[0]);
        x.subs(y).store(&mut out[1]);
        x.max(y).store(&mut out[2]);
        out
    }

    const A8: [u8; 16] = [0, 1, 100, 200, 255, 128, 7, 250, 3, 0, 90, 180, 255, 1, 60, 30];
    const B8: [u8; 16] = [0, 255, 100, 100, 1, 127, 9, 10, 0, 3, 200, 80, 255, 0, 61, 29];
    const A16: [i16; 8] = [0, i16::MAX, i16::MIN, -5, 30000, -30000, 17, 100];
    const B16: [i16; 8] = [0, 1, -1, 5, 10000, 10000, -17, -200];

    #[test]
    fn test_scalar_saturates() {
        let r = byte_ops::<ScalarBytes>(&A8, &B8);
        assert_eq!(r[0][1], 255);
        assert_eq!(r[0][4], 255);
        assert_eq!(r[1][1], 0);
        assert_eq!(r[2][7], 250);
        let w = word_ops::<ScalarWords>(&A16, &B16);
        assert_eq!(w[0][1], i16::MAX);
        assert_eq!(w[1][2], i16::MIN + 1);
        assert_eq!(w[0][4], i16::MAX);
        assert_eq!(w[1][5], i16::MIN);
    }

    #[cfg(target_arch = "x86_64")]
    #[test]
    fn test_sse2_matches_scalar() {
        assert_eq!(byte_ops::<sse2::Sse2Bytes>(&A8, &B8), byte_ops::<ScalarBytes>(&A8, &B8));
        assert_eq!(word_ops::<sse2::Sse2Words>(&A16, &B16), word_ops::<ScalarWords>(&A16, &B16));
    }

    #[cfg(target_arch = "aarch64")]
    #[test]
    fn test_neon_matches_scalar() {
        assert_eq!(byte_ops::<neon::NeonBytes>(&A8, &B8), byte_ops::<ScalarBytes>(&A8, &B8));
        assert_eq!(word_ops::<neon::NeonWords>(&A16, &B16), word_ops::<ScalarWords>(&A16, &B16));
    }

    #[test]
    fn test_detect_returns_usable_backend() {
        let backend = LaneBackend::detect();
        assert!(!backend.name().is_empty());
    }
}
