use std::fmt;
use std::str::FromStr;

/// Substitution matrices with known Karlin-Altschul parameter tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScoringMatrix {
    Blosum45,
    Blosum50,
    #[default]
    Blosum62,
    Blosum80,
    Blosum90,
}

impl ScoringMatrix {
    pub fn name(&self) -> &'static str {
        match self {
            ScoringMatrix::Blosum45 => "BLOSUM45",
            ScoringMatrix::Blosum50 => "BLOSUM50",
            ScoringMatrix::Blosum62 => "BLOSUM62",
            ScoringMatrix::Blosum80 => "BLOSUM80",
            ScoringMatrix::Blosum90 => "BLOSUM90",
        }
    }
}

impl fmt::Display for ScoringMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScoringMatrix {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "BLOSUM45" => Ok(ScoringMatrix::Blosum45),
            "BLOSUM50" => Ok(ScoringMatrix::Blosum50),
            "BLOSUM62" => Ok(ScoringMatrix::Blosum62),
            "BLOSUM80" => Ok(ScoringMatrix::Blosum80),
            "BLOSUM90" => Ok(ScoringMatrix::Blosum90),
            _ => Err(format!("Unknown scoring matrix: {}", s)),
        }
    }
}
