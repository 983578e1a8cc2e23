use crate::utils::matrix::{decode_residue, ScoreMatrix};

/// Edit operation for traceback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOp {
    /// Match (identical residues)
    Match,
    /// Mismatch (different residues)
    Mismatch,
    /// Insertion in query (gap in subject)
    Ins,
    /// Deletion from query (gap in query)
    Del,
}

/// Column statistics of one aligned pair of ranges
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AlignmentStats {
    /// Number of identical positions
    pub identities: usize,
    /// Aligned positions with a positive substitution score
    pub positives: usize,
    /// Number of mismatched positions
    pub mismatches: usize,
    /// Gap columns in the query row
    pub query_gaps: usize,
    /// Gap columns in the subject row
    pub subject_gaps: usize,
    /// Number of gap openings
    pub gap_opens: usize,
    /// Total alignment length (number of columns including gaps)
    pub length: usize,
}

impl AlignmentStats {
    /// Walk an edit script over `query` and `subject`, both starting at
    /// the first aligned residue.
    pub fn from_edit_script(ops: &[EditOp], query: &[u8], subject: &[u8], matrix: &ScoreMatrix) -> Self {
        let mut stats = AlignmentStats {
            length: ops.len(),
            ..Default::default()
        };
        let (mut qi, mut si) = (0usize, 0usize);
        let mut prev_op: Option<EditOp> = None;
        for &op in ops {
            match op {
                EditOp::Match | EditOp::Mismatch => {
                    let (q, s) = (query[qi], subject[si]);
                    if op == EditOp::Match {
                        stats.identities += 1;
                    } else {
                        stats.mismatches += 1;
                    }
                    if matrix.score(q, s) > 0 {
                        stats.positives += 1;
                    }
                    qi += 1;
                    si += 1;
                }
                EditOp::Ins => {
                    if prev_op != Some(EditOp::Ins) {
                        stats.gap_opens += 1;
                    }
                    stats.subject_gaps += 1;
                    qi += 1;
                }
                EditOp::Del => {
                    if prev_op != Some(EditOp::Del) {
                        stats.gap_opens += 1;
                    }
                    stats.query_gaps += 1;
                    si += 1;
                }
            }
            prev_op = Some(op);
        }
        stats
    }

    /// Percent identity over alignment columns
    pub fn identity(&self) -> f64 {
        if self.length == 0 {
            return 0.0;
        }
        100.0 * (self.identities as f64) / (self.length as f64)
    }

    /// Total gap columns on both rows
    pub fn gaps(&self) -> usize {
        self.query_gaps + self.subject_gaps
    }
}

/// Render both rows of an alignment with `-` in gap columns.
pub fn aligned_strings(ops: &[EditOp], query: &[u8], subject: &[u8]) -> (String, String) {
    let mut q_row = String::with_capacity(ops.len());
    let mut s_row = String::with_capacity(ops.len());
    let (mut qi, mut si) = (0usize, 0usize);
    for &op in ops {
        match op {
            EditOp::Match | EditOp::Mismatch => {
                q_row.push(decode_residue(query[qi]) as char);
                s_row.push(decode_residue(subject[si]) as char);
                qi += 1;
                si += 1;
            }
            EditOp::Ins => {
                q_row.push(decode_residue(query[qi]) as char);
                s_row.push('-');
                qi += 1;
            }
            EditOp::Del => {
                q_row.push('-');
                s_row.push(decode_residue(subject[si]) as char);
                si += 1;
            }
        }
    }
    (q_row, s_row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::matrix::encode_sequence;

    #[test]
    fn test_edit_script_stats() {
        let query = encode_sequence(b"AWCKKV");
        let subject = encode_sequence(b"AWHVLL");
        let script = vec![
            EditOp::Match,
            EditOp::Match,
            EditOp::Mismatch,
            EditOp::Ins,
            EditOp::Ins,
            EditOp::Match,
            EditOp::Del,
            EditOp::Del,
        ];

        let stats = AlignmentStats::from_edit_script(&script, &query, &subject, &ScoreMatrix::blosum62());
        assert_eq!(stats.identities, 3);
        assert_eq!(stats.mismatches, 1);
        assert_eq!(stats.gap_opens, 2); // One insertion run, one deletion run
        assert_eq!(stats.subject_gaps, 2);
        assert_eq!(stats.query_gaps, 2);
        assert_eq!(stats.length, 8);
        // C/H scores -3, so only the identities are positive
        assert_eq!(stats.positives, 3);
    }

    #[test]
    fn test_aligned_strings() {
        let query = encode_sequence(b"AWCV");
        let subject = encode_sequence(b"AWV");
        let ops = [EditOp::Match, EditOp::Match, EditOp::Ins, EditOp::Match];
        let (q, s) = aligned_strings(&ops, &query, &subject);
        assert_eq!(q, "AWCV");
        assert_eq!(s, "AW-V");
    }

    #[test]
    fn test_identity_of_empty_alignment() {
        assert_eq!(AlignmentStats::default().identity(), 0.0);
    }
}
