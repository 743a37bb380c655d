use crate::derep::DerepStatistics;
use anyhow::{Context, Result};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};

/// Parameters and statistics of a clustering run, written as JSON with `--summary`.
#[derive(Serialize, Default)]
pub struct RunSummary {
    pub otuclust_version: String,
    pub input_path: String,
    pub run_date: String,
    pub elapsed: f64,
    pub min_seq_len: usize,
    pub min_count: usize,
    pub identity_threshold: f64,
    pub gap_open: i32,
    pub gap_extend: i32,
    pub count_policy: String,
    pub matrix: String,
    /// records read from the input, before the length filter
    pub read_count: usize,
    pub derep: DerepStatistics,
    pub otu_count: usize,
}

impl RunSummary {
    pub fn new(input_path: &str) -> Self {
        RunSummary {
            otuclust_version: crate::cli::VERSION.to_string(),
            input_path: input_path.to_string(),
            run_date: format!("{:?}", chrono::offset::Local::now()),
            ..RunSummary::default()
        }
    }
}

/// Writes the summary to `output` as pretty-printed JSON.
pub fn write_summary(summary: &RunSummary, output: &str) -> Result<()> {
    let file =
        File::create(output).with_context(|| format!("Unable to create summary file {output}"))?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, summary).context("Could not serialize summary")?;
    writeln!(writer)?;
    writer.flush()?;

    info!("Wrote run summary to {output}");
    Ok(())
}
