//! Seed model: alphabet partition and polynomial seed codes.

use crate::error::{ConfigError, Result};
use crate::utils::matrix::{encode_residue, TABLE_WIDTH};

pub type SeedCode = u32;

/// Largest code space an index may address.
pub const MAX_CODE_COUNT: usize = 1 << 28;

const INVALID_CLASS: u8 = u8::MAX;

/// Maps residues to seed classes and windows of `span` classes to codes.
///
/// code = c[0]*A^(span-1) + c[1]*A^(span-2) + ... + c[span-1], where A is the
/// number of classes. Residues outside every class are invalid and no seed
/// may contain them.
#[derive(Debug, Clone)]
pub struct SeedModel {
    span: usize,
    alphabet_size: usize,
    code_count: usize,
    /// A^(span-1), the weight of the oldest residue in a window
    high_weight: SeedCode,
    classes: [u8; TABLE_WIDTH],
}

impl SeedModel {
    /// One class per residue for the first `alphabet_size` residue codes.
    pub fn new(span: usize, alphabet_size: usize) -> Result<Self> {
        let mut classes = [INVALID_CLASS; TABLE_WIDTH];
        for (code, class) in classes.iter_mut().enumerate().take(alphabet_size.min(TABLE_WIDTH)) {
            *class = code as u8;
        }
        Self::build(span, alphabet_size, classes)
    }

    /// Reduced alphabet: every group of letters forms one class.
    ///
    /// `SeedModel::with_partition(3, &["LVIM", "C", "AG", ...])`
    pub fn with_partition(span: usize, groups: &[&str]) -> Result<Self> {
        let mut classes = [INVALID_CLASS; TABLE_WIDTH];
        for (class, group) in groups.iter().enumerate() {
            for &letter in group.as_bytes() {
                let code = encode_residue(letter) as usize;
                if classes[code] != INVALID_CLASS {
                    return Err(ConfigError::InvalidParameter {
                        name: "seed_partition",
                        reason: format!("letter '{}' appears in more than one group", letter as char),
                    });
                }
                classes[code] = class as u8;
            }
        }
        Self::build(span, groups.len(), classes)
    }

    fn build(span: usize, alphabet_size: usize, classes: [u8; TABLE_WIDTH]) -> Result<Self> {
        if span == 0 {
            return Err(ConfigError::InvalidParameter {
                name: "seed_span",
                reason: "must be at least 1".to_string(),
            });
        }
        if alphabet_size == 0 || alphabet_size > TABLE_WIDTH {
            return Err(ConfigError::InvalidParameter {
                name: "seed_alphabet",
                reason: format!("must be within 1..={}", TABLE_WIDTH),
            });
        }
        let mut code_count: usize = 1;
        for _ in 0..span {
            code_count = code_count
                .checked_mul(alphabet_size)
                .filter(|&c| c <= MAX_CODE_COUNT)
                .ok_or(ConfigError::SeedSpaceTooLarge {
                    span,
                    alphabet: alphabet_size,
                })?;
        }
        let high_weight = (code_count / alphabet_size) as SeedCode;
        Ok(Self {
            span,
            alphabet_size,
            code_count,
            high_weight,
            classes,
        })
    }

    pub fn span(&self) -> usize {
        self.span
    }

    pub fn alphabet_size(&self) -> usize {
        self.alphabet_size
    }

    /// Number of distinct codes; valid codes are `0..code_count`.
    pub fn code_count(&self) -> usize {
        self.code_count
    }

    #[inline(always)]
    pub fn class_of(&self, residue: u8) -> Option<u8> {
        match self.classes.get(residue as usize) {
            Some(&c) if c != INVALID_CLASS => Some(c),
            _ => None,
        }
    }

    /// Code of the first `span` residues of `window`.
    pub fn hash(&self, window: &[u8]) -> Option<SeedCode> {
        if window.len() < self.span {
            return None;
        }
        let base = self.alphabet_size as SeedCode;
        window[..self.span]
            .iter()
            .try_fold(0 as SeedCode, |code, &r| Some(code * base + self.class_of(r)? as SeedCode))
    }

    /// Rolling scan over `sequence` yielding `(offset, code)` for every valid
    /// window in offset order.
    pub fn scan<'a>(&'a self, sequence: &'a [u8]) -> SeedScanner<'a> {
        SeedScanner {
            model: self,
            sequence,
            pos: 0,
            run: 0,
            code: 0,
        }
    }

    /// Codes to iterate. `ratio >= 1` yields every code; a smaller ratio keeps
    /// a deterministic, evenly spread subset of about `ratio * code_count`.
    pub fn codes(&self, ratio: f64) -> Vec<SeedCode> {
        let count = self.code_count as SeedCode;
        if ratio >= 1.0 {
            return (0..count).collect();
        }
        if ratio <= 0.0 {
            return Vec::new();
        }
        let cutoff = (ratio * (1u64 << 32) as f64) as u64;
        (0..count).filter(|&code| spread(code) < cutoff).collect()
    }
}

/// Fibonacci hash of a code into [0, 2^32).
#[inline]
fn spread(code: SeedCode) -> u64 {
    ((code as u64).wrapping_mul(0x9E37_79B9_7F4A_7C15)) >> 32
}

/// Iterator returned by [`SeedModel::scan`].
pub struct SeedScanner<'a> {
    model: &'a SeedModel,
    sequence: &'a [u8],
    pos: usize,
    run: usize,
    code: SeedCode,
}

impl<'a> Iterator for SeedScanner<'a> {
    type Item = (usize, SeedCode);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let base = self.model.alphabet_size as SeedCode;
        while self.pos < self.sequence.len() {
            let residue = self.sequence[self.pos];
            self.pos += 1;
            match self.model.class_of(residue) {
                Some(class) => {
                    self.code = (self.code % self.model.high_weight) * base + class as SeedCode;
                    self.run += 1;
                    if self.run >= self.model.span {
                        return Some((self.pos - self.model.span, self.code));
                    }
                }
                None => {
                    self.run = 0;
                    self.code = 0;
                }
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::matrix::encode_sequence;

    #[test]
    fn test_hash_matches_polynomial() {
        let model = SeedModel::new(3, 20).unwrap();
        let seq = encode_sequence(b"AAD");
        assert_eq!(model.hash(&seq), Some(3));
        let seq = encode_sequence(b"CFF");
        assert_eq!(model.hash(&seq), Some(4 * 400 + 13 * 20 + 13));
        let seq = encode_sequence(b"AXD");
        assert_eq!(model.hash(&seq), None);
    }

    #[test]
    fn test_scan_agrees_with_hash() {
        let model = SeedModel::new(3, 20).unwrap();
        let seq = encode_sequence(b"MKVLAXWWPQRSTY");
        let scanned: Vec<_> = model.scan(&seq).collect();
        let direct: Vec<_> = (0..=seq.len() - 3)
            .filter_map(|i| model.hash(&seq[i..]).map(|c| (i, c)))
            .collect();
        assert_eq!(scanned, direct);
        assert!(scanned.iter().all(|&(i, _)| !(i <= 5 && i + 3 > 5)));
    }

    #[test]
    fn test_span_one() {
        let model = SeedModel::new(1, 20).unwrap();
        let seq = encode_sequence(b"ARN");
        let codes: Vec<_> = model.scan(&seq).map(|(_, c)| c).collect();
        assert_eq!(codes, vec![0, 1, 2]);
    }

    #[test]
    fn test_reduced_alphabet() {
        let model = SeedModel::with_partition(2, &["LVIM", "FWY", "AGST"]).unwrap();
        assert_eq!(model.code_count(), 9);
        let a = encode_sequence(b"LF");
        let b = encode_sequence(b"MY");
        assert_eq!(model.hash(&a), model.hash(&b));
        assert!(model.hash(&encode_sequence(b"LC")).is_none());
        assert!(SeedModel::with_partition(2, &["LV", "VA"]).is_err());
    }

    #[test]
    fn test_code_space_limit() {
        assert!(matches!(
            SeedModel::new(12, 20),
            Err(ConfigError::SeedSpaceTooLarge { .. })
        ));
    }

    #[test]
    fn test_filtered_codes() {
        let model = SeedModel::new(3, 20).unwrap();
        assert_eq!(model.codes(1.0).len(), 8000);
        let half = model.codes(0.5);
        assert!(half.len() > 3000 && half.len() < 5000);
        assert!(half.windows(2).all(|w| w[0] < w[1]));
        assert!(model.codes(0.0).is_empty());
    }
}
