pub struct FilterOpts {
    /// minimum sequence length, inclusive
    pub min_len: usize,
}

pub fn filter(seq: &[u8], opts: &FilterOpts) -> bool {
    seq.len() >= opts.min_len
}
