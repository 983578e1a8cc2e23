//! Residue encoding and substitution matrices.
//!
//! Residues are stored in the packed BLOSUM order `ARNDCQEGHILKMFPSTWYVBJZX*`
//! so that an encoded residue doubles as a matrix row/column index. The first
//! [`STANDARD_RESIDUES`] codes are the twenty standard amino acids.

/// Residue letters in code order.
pub const ALPHABET: &[u8; 25] = b"ARNDCQEGHILKMFPSTWYVBJZX*";

/// Size of the BLOSUM62 matrix (25x25).
pub const BLOSUM62_SIZE: usize = 25;

/// Number of standard amino acids (codes 0..20).
pub const STANDARD_RESIDUES: usize = 20;

/// Code of the unknown residue `X`.
pub const UNKNOWN: u8 = 23;

/// Padding code for neighborhood positions that fall outside a sequence.
pub const SENTINEL: u8 = 25;

/// Width of the direct-address score tables.
pub const TABLE_WIDTH: usize = 32;

/// Number of cells in a direct-address score table.
pub const TABLE_CELLS: usize = TABLE_WIDTH * TABLE_WIDTH;

/// BLOSUM62 default score for sentinel and out-of-range residues.
pub const DEFSCORE: i32 = -4;

/// Encode an ASCII residue. Unknown letters map to `X`.
#[inline(always)]
pub fn encode_residue(aa: u8) -> u8 {
    const TABLE: [u8; 26] = [
        0, 20, 4, 3, 6, 13, 7, 8, 9, 21, 11, 10, 12, 2, 23, 14, 5, 1, 15, 16, 23, 19, 17, 23, 18, 22,
        // A  B  C  D  E  F  G  H  I   J   K   L   M  N   O   P  Q  R   S   T   U   V   W   X   Y   Z
    ];
    match aa {
        b'*' => 24,
        b'A'..=b'Z' => TABLE[(aa - b'A') as usize],
        b'a'..=b'z' => TABLE[(aa - b'a') as usize],
        _ => UNKNOWN,
    }
}

/// Decode a residue code back to ASCII. The sentinel decodes to `-`.
#[inline]
pub fn decode_residue(code: u8) -> u8 {
    ALPHABET.get(code as usize).copied().unwrap_or(b'-')
}

/// Encode a whole ASCII sequence.
pub fn encode_sequence(ascii: &[u8]) -> Vec<u8> {
    ascii
        .iter()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|&c| encode_residue(c))
        .collect()
}

/// BLOSUM62 matrix in NCBI packed order: ARNDCQEGHILKMFPSTWYVBJZX*
pub static BLOSUM62: [i8; BLOSUM62_SIZE * BLOSUM62_SIZE] = [
    //       A,  R,  N,  D,  C,  Q,  E,  G,  H,  I,  L,  K,  M,  F,  P,  S,  T,  W,  Y,  V,  B,  J,  Z,  X,  *
    /*A*/    4, -1, -2, -2,  0, -1, -1,  0, -2, -1, -1, -1, -1, -2, -1,  1,  0, -3, -2,  0, -2, -1, -1, -1, -4,
    /*R*/   -1,  5,  0, -2, -3,  1,  0, -2,  0, -3, -2,  2, -1, -3, -2, -1, -1, -3, -2, -3, -1, -2,  0, -1, -4,
    /*N*/   -2,  0,  6,  1, -3,  0,  0,  0,  1, -3, -3,  0, -2, -3, -2,  1,  0, -4, -2, -3,  4, -3,  0, -1, -4,
    /*D*/   -2, -2,  1,  6, -3,  0,  2, -1, -1, -3, -4, -1, -3, -3, -1,  0, -1, -4, -3, -3,  4, -3,  1, -1, -4,
    /*C*/    0, -3, -3, -3,  9, -3, -4, -3, -3, -1, -1, -3, -1, -2, -3, -1, -1, -2, -2, -1, -3, -1, -3, -1, -4,
    /*Q*/   -1,  1,  0,  0, -3,  5,  2, -2,  0, -3, -2,  1,  0, -3, -1,  0, -1, -2, -1, -2,  0, -2,  4, -1, -4,
    /*E*/   -1,  0,  0,  2, -4,  2,  5, -2,  0, -3, -3,  1, -2, -3, -1,  0, -1, -3, -2, -2,  1, -3,  4, -1, -4,
    /*G*/    0, -2,  0, -1, -3, -2, -2,  6, -2, -4, -4, -2, -3, -3, -2,  0, -2, -2, -3, -3, -1, -4, -2, -1, -4,
    /*H*/   -2,  0,  1, -1, -3,  0,  0, -2,  8, -3, -3, -1, -2, -1, -2, -1, -2, -2,  2, -3,  0, -3,  0, -1, -4,
    /*I*/   -1, -3, -3, -3, -1, -3, -3, -4, -3,  4,  2, -3,  1,  0, -3, -2, -1, -3, -1,  3, -3,  3, -3, -1, -4,
    /*L*/   -1, -2, -3, -4, -1, -2, -3, -4, -3,  2,  4, -2,  2,  0, -3, -2, -1, -2, -1,  1, -4,  3, -3, -1, -4,
    /*K*/   -1,  2,  0, -1, -3,  1,  1, -2, -1, -3, -2,  5, -1, -3, -1,  0, -1, -3, -2, -2,  0, -3,  1, -1, -4,
    /*M*/   -1, -1, -2, -3, -1,  0, -2, -3, -2,  1,  2, -1,  5,  0, -2, -1, -1, -1, -1,  1, -3,  2, -1, -1, -4,
    /*F*/   -2, -3, -3, -3, -2, -3, -3, -3, -1,  0,  0, -3,  0,  6, -4, -2, -2,  1,  3, -1, -3,  0, -3, -1, -4,
    /*P*/   -1, -2, -2, -1, -3, -1, -1, -2, -2, -3, -3, -1, -2, -4,  7, -1, -1, -4, -3, -2, -2, -3, -1, -1, -4,
    /*S*/    1, -1,  1,  0, -1,  0,  0,  0, -1, -2, -2,  0, -1, -2, -1,  4,  1, -3, -2, -2,  0, -2,  0, -1, -4,
    /*T*/    0, -1,  0, -1, -1, -1, -1, -2, -2, -1, -1, -1, -1, -2, -1,  1,  5, -2, -2,  0, -1, -1, -1, -1, -4,
    /*W*/   -3, -3, -4, -4, -2, -2, -3, -2, -2, -3, -2, -3, -1,  1, -4, -3, -2, 11,  2, -3, -4, -2, -2, -1, -4,
    /*Y*/   -2, -2, -2, -3, -2, -1, -2, -3,  2, -1, -1, -2, -1,  3, -3, -2, -2,  2,  7, -1, -3, -1, -2, -1, -4,
    /*V*/    0, -3, -3, -3, -1, -2, -2, -3, -3,  3,  1, -2,  1, -1, -2, -2,  0, -3, -1,  4, -3,  2, -2, -1, -4,
    /*B*/   -2, -1,  4,  4, -3,  0,  1, -1,  0, -3, -4,  0, -3, -3, -2,  0, -1, -4, -3, -3,  4, -3,  0, -1, -4,
    /*J*/   -1, -2, -3, -3, -1, -2, -3, -4, -3,  3,  3, -3,  2,  0, -3, -2, -1, -2, -1,  2, -3,  3, -3, -1, -4,
    /*Z*/   -1,  0,  0,  1, -3,  4,  4, -2,  0, -3, -3,  1, -1, -3, -1,  0, -1, -2, -2, -2,  0, -3,  4, -1, -4,
    /*X*/   -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -1, -4,
    /***/   -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4, -4,  1,
];

/// A named substitution matrix with a 32x32 direct-address table.
///
/// Any code outside the matrix dimension (including [`SENTINEL`]) scores
/// `default_score`, which terminates X-drop extensions at sequence ends.
#[derive(Debug, Clone)]
pub struct ScoreMatrix {
    name: String,
    dimension: usize,
    default_score: i32,
    min_score: i32,
    max_score: i32,
    table: Box<[i8; TABLE_CELLS]>,
}

impl ScoreMatrix {
    /// The built-in BLOSUM62 matrix.
    pub fn blosum62() -> Self {
        Self::from_scores("BLOSUM62", BLOSUM62_SIZE, &BLOSUM62, DEFSCORE as i8)
    }

    /// Build a matrix from a row-major `dimension x dimension` score slice.
    ///
    /// Missing cells (a short slice) fall back to `default_score`.
    pub fn from_scores(name: &str, dimension: usize, scores: &[i8], default_score: i8) -> Self {
        let dimension = dimension.min(SENTINEL as usize);
        let mut table = Box::new([default_score; TABLE_CELLS]);
        let mut min_score = default_score as i32;
        let mut max_score = default_score as i32;
        for a in 0..dimension {
            for b in 0..dimension {
                let s = scores.get(a * dimension + b).copied().unwrap_or(default_score);
                table[a * TABLE_WIDTH + b] = s;
                min_score = min_score.min(s as i32);
                max_score = max_score.max(s as i32);
            }
        }
        Self {
            name: name.to_string(),
            dimension,
            default_score: default_score as i32,
            min_score,
            max_score,
            table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn default_score(&self) -> i32 {
        self.default_score
    }

    pub fn min_score(&self) -> i32 {
        self.min_score
    }

    pub fn max_score(&self) -> i32 {
        self.max_score
    }

    #[inline(always)]
    pub fn score(&self, a: u8, b: u8) -> i32 {
        self.table[((a as usize) & (TABLE_WIDTH - 1)) * TABLE_WIDTH + ((b as usize) & (TABLE_WIDTH - 1))] as i32
    }

    /// Bias that lifts every score to a non-negative value.
    pub fn bias(&self) -> u8 {
        (-self.min_score).clamp(0, u8::MAX as i32) as u8
    }

    /// Scores shifted by [`ScoreMatrix::bias`], for unsigned byte lanes.
    pub fn biased_table(&self) -> Box<[u8; TABLE_CELLS]> {
        let bias = self.bias() as i32;
        let mut out = Box::new([0u8; TABLE_CELLS]);
        for (dst, &s) in out.iter_mut().zip(self.table.iter()) {
            *dst = (s as i32 + bias).clamp(0, u8::MAX as i32) as u8;
        }
        out
    }

    /// Scores widened for signed word lanes.
    pub fn word_table(&self) -> Box<[i16; TABLE_CELLS]> {
        let mut out = Box::new([0i16; TABLE_CELLS]);
        for (dst, &s) in out.iter_mut().zip(self.table.iter()) {
            *dst = s as i16;
        }
        out
    }
}

impl Default for ScoreMatrix {
    fn default() -> Self {
        Self::blosum62()
    }
}
