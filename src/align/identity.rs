use super::AlignmentPair;

/// Computes the percent identity of an alignment: the share of columns where both rows hold the
/// same character, times 100.
///
/// A gap never matches in practice, as a global alignment does not place two gaps in the same
/// column. An empty alignment has an identity of 0.
///
/// Characters are compared exactly, so `a` and `A` differ. `SequenceReader` upper-cases its
/// output, which keeps soft-masked reads comparable.
pub fn identity(pair: &AlignmentPair) -> f64 {
    if pair.is_empty() {
        return 0.0;
    }

    let identical = pair
        .x()
        .iter()
        .zip(pair.y().iter())
        .filter(|(a, b)| a == b)
        .count();

    100.0 * identical as f64 / pair.len() as f64
}
