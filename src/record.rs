/// An exact sequence together with the number of reads which collapsed onto it.
///
/// # Fields
///
/// * `seq` - The nucleotide sequence, exactly as it appeared in the input
/// * `count` - The number of input reads with this exact sequence
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct AbundanceRecord {
    pub seq: Vec<u8>,
    pub count: usize,
}

impl AbundanceRecord {
    pub fn new(seq: impl Into<Vec<u8>>, count: usize) -> Self {
        AbundanceRecord {
            seq: seq.into(),
            count,
        }
    }
}

/// A representative sequence selected by the greedy clustering, along with its count.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct OtuRecord {
    pub seq: Vec<u8>,
    pub count: usize,
}

impl From<AbundanceRecord> for OtuRecord {
    fn from(rec: AbundanceRecord) -> Self {
        OtuRecord {
            seq: rec.seq,
            count: rec.count,
        }
    }
}
