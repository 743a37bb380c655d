use crate::align::{identity, AlignError, PairwiseAligner};
use crate::record::{AbundanceRecord, OtuRecord};

pub const DEFAULT_IDENTITY_THRESHOLD: f64 = 97.0;

/// What happens to the count of a sequence absorbed into an existing OTU.
#[derive(clap::ValueEnum, Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum CountPolicy {
    /// The OTU keeps the count of the sequence which seeded it; absorbed counts are dropped.
    #[default]
    Seed,

    /// Absorbed counts are added to the OTU they matched.
    Accumulate,
}

#[derive(Copy, Clone, Debug)]
pub struct ClusterOpts {
    /// minimum percent identity for a sequence to join an existing OTU
    pub identity_threshold: f64,
    pub count_policy: CountPolicy,
}

impl Default for ClusterOpts {
    fn default() -> Self {
        ClusterOpts {
            identity_threshold: DEFAULT_IDENTITY_THRESHOLD,
            count_policy: CountPolicy::Seed,
        }
    }
}

/// Greedily clusters abundance records into OTUs.
///
/// Records must arrive in descending count order. Each record is aligned against the existing
/// OTU representatives in the order they were created, and joins the first one with an identity
/// of at least `opts.identity_threshold`. A record which matches nothing becomes a new OTU.
///
/// # Arguments
///
/// * `records` - Dereplicated sequences, most abundant first.
/// * `aligner` - The global aligner used for every comparison.
/// * `opts` - Identity threshold and count policy.
///
/// # Returns
///
/// The OTUs in order of creation.
///
/// # Errors
///
/// Any alignment failure aborts the whole run, since skipping a comparison would change which
/// OTUs are created.
pub fn abundance_greedy_clustering<A: PairwiseAligner>(
    records: impl IntoIterator<Item = AbundanceRecord>,
    aligner: &mut A,
    opts: &ClusterOpts,
) -> Result<Vec<OtuRecord>, AlignError> {
    let mut otus: Vec<OtuRecord> = Vec::new();
    let mut absorbed = 0usize;

    for (idx, candidate) in records.into_iter().enumerate() {
        if idx > 0 && idx % 1000 == 0 {
            info!("Clustered {idx} sequences into {} OTUs", otus.len());
        }

        match first_match(&otus, &candidate.seq, aligner, opts.identity_threshold)? {
            Some(otu_idx) => {
                absorbed += 1;
                if opts.count_policy == CountPolicy::Accumulate {
                    otus[otu_idx].count += candidate.count;
                }
            }
            None => {
                debug!(
                    "Sequence {} (count {}) seeds OTU_{}",
                    idx + 1,
                    candidate.count,
                    otus.len() + 1
                );
                otus.push(candidate.into());
            }
        }
    }

    info!(
        "Found {} OTUs, {absorbed} sequences absorbed into existing OTUs",
        otus.len()
    );

    Ok(otus)
}

/// Returns the index of the earliest-created OTU whose representative is at least `threshold`
/// percent identical to `seq`. Stops at the first match.
fn first_match<A: PairwiseAligner>(
    otus: &[OtuRecord],
    seq: &[u8],
    aligner: &mut A,
    threshold: f64,
) -> Result<Option<usize>, AlignError> {
    for (idx, otu) in otus.iter().enumerate() {
        let pair = aligner.align(&otu.seq, seq)?;
        if identity(&pair) >= threshold {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}
