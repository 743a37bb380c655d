pub mod identity;
pub mod matrix;

pub use identity::identity;
pub use matrix::SubstitutionMatrix;

use bio::alignment::pairwise::Aligner;
use bio::alignment::AlignmentOperation;
use thiserror::Error;

/// The gap symbol used in alignment rows
pub const GAP: u8 = b'-';

#[derive(Error, Debug)]
pub enum AlignError {
    #[error("Residue '{residue}' at position {position} is not in the substitution matrix")]
    UnsupportedResidue { residue: char, position: usize },

    #[error("Aligned rows have different lengths ({0} and {1})")]
    LengthMismatch(usize, usize),

    #[error("Invalid gap penalties (open {open}, extend {extend}): penalties must be <= 0 and opening must cost at least as much as extending")]
    InvalidPenalties { open: i32, extend: i32 },
}

/// Two rows of a pairwise alignment, with `GAP` inserted. Both rows always have the same length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlignmentPair {
    x: Vec<u8>,
    y: Vec<u8>,
}

impl AlignmentPair {
    pub fn new(x: Vec<u8>, y: Vec<u8>) -> Result<Self, AlignError> {
        if x.len() != y.len() {
            return Err(AlignError::LengthMismatch(x.len(), y.len()));
        }
        Ok(AlignmentPair { x, y })
    }

    pub fn x(&self) -> &[u8] {
        &self.x
    }

    pub fn y(&self) -> &[u8] {
        &self.y
    }

    /// The alignment length, i.e. the number of columns
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }
}

/// Gap penalties for global alignment. A gap of length `k` costs `gap_open + (k - 1) * gap_extend`,
/// so `gap_open` is the cost of the first gap position.
#[derive(Copy, Clone, Debug)]
pub struct AlignParams {
    pub gap_open: i32,
    pub gap_extend: i32,
}

impl Default for AlignParams {
    fn default() -> Self {
        AlignParams {
            gap_open: -1,
            gap_extend: -1,
        }
    }
}

/// Something which can produce a global alignment of two sequences.
pub trait PairwiseAligner {
    fn align(&mut self, x: &[u8], y: &[u8]) -> Result<AlignmentPair, AlignError>;
}

/// Needleman-Wunsch global alignment with affine gap penalties, scored with a substitution matrix.
pub struct NeedlemanWunsch {
    params: AlignParams,
    matrix: SubstitutionMatrix,
}

impl NeedlemanWunsch {
    pub fn new(params: AlignParams, matrix: SubstitutionMatrix) -> Result<Self, AlignError> {
        let AlignParams {
            gap_open: open,
            gap_extend: extend,
        } = params;

        if open > 0 || extend > 0 || open > extend {
            return Err(AlignError::InvalidPenalties { open, extend });
        }

        Ok(NeedlemanWunsch { params, matrix })
    }

    fn check_residues(&self, seq: &[u8]) -> Result<(), AlignError> {
        match seq.iter().position(|&c| !self.matrix.contains(c)) {
            Some(position) => Err(AlignError::UnsupportedResidue {
                residue: seq[position] as char,
                position,
            }),
            None => Ok(()),
        }
    }
}

impl PairwiseAligner for NeedlemanWunsch {
    fn align(&mut self, x: &[u8], y: &[u8]) -> Result<AlignmentPair, AlignError> {
        self.check_residues(x)?;
        self.check_residues(y)?;

        if x.is_empty() || y.is_empty() {
            let row_x = x.iter().copied().chain(std::iter::repeat(GAP).take(y.len()));
            let row_y = std::iter::repeat(GAP).take(x.len()).chain(y.iter().copied());
            return AlignmentPair::new(row_x.collect(), row_y.collect());
        }

        let matrix = &self.matrix;
        let score = |a: u8, b: u8| matrix.score(a, b);

        // bio charges gap_open + k * gap_extend for a gap of length k
        let mut aligner = Aligner::with_capacity(
            x.len(),
            y.len(),
            self.params.gap_open - self.params.gap_extend,
            self.params.gap_extend,
            &score,
        );
        let alignment = aligner.global(x, y);

        pair_from_operations(x, y, &alignment.operations)
    }
}

/// Expands a list of alignment operations into two gapped rows.
fn pair_from_operations(
    x: &[u8],
    y: &[u8],
    ops: &[AlignmentOperation],
) -> Result<AlignmentPair, AlignError> {
    let mut row_x = Vec::with_capacity(x.len() + y.len());
    let mut row_y = Vec::with_capacity(x.len() + y.len());
    let (mut i, mut j) = (0, 0);

    for op in ops {
        match *op {
            AlignmentOperation::Match | AlignmentOperation::Subst => {
                row_x.push(x[i]);
                row_y.push(y[j]);
                i += 1;
                j += 1;
            }
            // consumes y only
            AlignmentOperation::Del => {
                row_x.push(GAP);
                row_y.push(y[j]);
                j += 1;
            }
            // consumes x only
            AlignmentOperation::Ins => {
                row_x.push(x[i]);
                row_y.push(GAP);
                i += 1;
            }
            AlignmentOperation::Xclip(n) => {
                row_x.extend_from_slice(&x[i..i + n]);
                row_y.extend(std::iter::repeat(GAP).take(n));
                i += n;
            }
            AlignmentOperation::Yclip(n) => {
                row_x.extend(std::iter::repeat(GAP).take(n));
                row_y.extend_from_slice(&y[j..j + n]);
                j += n;
            }
        }
    }

    AlignmentPair::new(row_x, row_y)
}
