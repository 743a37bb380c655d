use std::path::Path;
use thiserror::Error;

// encode the default matrix at compile time as a string literal
const EDNAFULL: &str = include_str!("EDNAFULL");

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("Could not read substitution matrix {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Substitution matrix has no header row")]
    MissingHeader,

    #[error("Invalid residue '{0}' in matrix header, residues must be single ASCII characters")]
    InvalidResidue(String),

    #[error("Line {line} of substitution matrix is invalid: {reason}")]
    InvalidRow { line: usize, reason: String },

    #[error("Substitution matrix has no row for residue '{0}'")]
    MissingRow(char),
}

/// A symmetric-lookup table of substitution scores over a nucleotide alphabet.
/// Lookups are case-insensitive.
#[derive(Clone)]
pub struct SubstitutionMatrix {
    scores: Vec<i32>,
    known: [bool; 256],
    residues: Vec<u8>,
}

fn cell(a: u8, b: u8) -> usize {
    ((a as usize) << 8) | b as usize
}

impl SubstitutionMatrix {
    /// The NCBI EDNAFULL (NUC.4.4) matrix, which covers the IUPAC nucleotide codes.
    pub fn ednafull() -> Result<Self, MatrixError> {
        Self::parse(EDNAFULL)
    }

    /// Loads a matrix in the NCBI text format from a file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, MatrixError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| MatrixError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&text)
    }

    /// Parses a matrix in the NCBI text format: `#` comment lines, a header row of residues,
    /// then one row per residue holding the residue followed by one integer per column.
    pub fn parse(text: &str) -> Result<Self, MatrixError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(i, l)| (i + 1, l.trim()))
            .filter(|(_, l)| !l.is_empty() && !l.starts_with('#'));

        let (_, header) = lines.next().ok_or(MatrixError::MissingHeader)?;
        let columns = header
            .split_whitespace()
            .map(parse_residue)
            .collect::<Result<Vec<u8>, _>>()?;

        let mut matrix = SubstitutionMatrix {
            scores: vec![0; 1 << 16],
            known: [false; 256],
            residues: columns.clone(),
        };
        let mut seen_rows = [false; 256];

        for (line, row) in lines {
            let mut fields = row.split_whitespace();
            let residue = fields
                .next()
                .and_then(|r| parse_residue(r).ok())
                .ok_or_else(|| MatrixError::InvalidRow {
                    line,
                    reason: "row must start with a single residue".to_string(),
                })?;

            let values = fields
                .map(|v| v.parse::<i32>())
                .collect::<Result<Vec<i32>, _>>()
                .map_err(|e| MatrixError::InvalidRow {
                    line,
                    reason: e.to_string(),
                })?;

            if values.len() != columns.len() {
                return Err(MatrixError::InvalidRow {
                    line,
                    reason: format!(
                        "expected {} scores, found {}",
                        columns.len(),
                        values.len()
                    ),
                });
            }

            for (&col, &score) in columns.iter().zip(values.iter()) {
                matrix.set(residue, col, score);
            }
            seen_rows[residue.to_ascii_uppercase() as usize] = true;
        }

        for &col in columns.iter() {
            if !seen_rows[col.to_ascii_uppercase() as usize] {
                return Err(MatrixError::MissingRow(col as char));
            }
            matrix.known[col.to_ascii_uppercase() as usize] = true;
            matrix.known[col.to_ascii_lowercase() as usize] = true;
        }

        Ok(matrix)
    }

    fn set(&mut self, a: u8, b: u8, score: i32) {
        for x in [a.to_ascii_uppercase(), a.to_ascii_lowercase()] {
            for y in [b.to_ascii_uppercase(), b.to_ascii_lowercase()] {
                self.scores[cell(x, y)] = score;
            }
        }
    }

    pub fn score(&self, a: u8, b: u8) -> i32 {
        self.scores[cell(a, b)]
    }

    /// Whether `residue` has a row and a column in this matrix
    pub fn contains(&self, residue: u8) -> bool {
        self.known[residue as usize]
    }

    pub fn residues(&self) -> &[u8] {
        &self.residues
    }
}

impl std::fmt::Debug for SubstitutionMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubstitutionMatrix")
            .field("residues", &String::from_utf8_lossy(&self.residues))
            .finish()
    }
}

fn parse_residue(s: &str) -> Result<u8, MatrixError> {
    match s.as_bytes() {
        [b] if b.is_ascii_graphic() => Ok(*b),
        _ => Err(MatrixError::InvalidResidue(s.to_string())),
    }
}
