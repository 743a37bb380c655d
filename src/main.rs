extern crate env_logger;
#[macro_use]
extern crate log;
use std::{
    fs::File,
    io::{prelude::*, stdout, BufWriter},
    path::Path,
    time::Instant,
};

use anyhow::{Context, Result};
use clap::Parser;

mod align;
mod cli;
mod cluster;
mod derep;
mod filter;
mod io;
mod record;
mod summary;

use align::{AlignParams, NeedlemanWunsch, SubstitutionMatrix};
use cli::{Cli, ClusterArgs, Commands, InputArgs};
use cluster::ClusterOpts;
use filter::FilterOpts;
use io::SequenceReader;

/// Creates a `BufWriter` for the given output option. This allows for an output file to be passed
/// or otherwise will default to using standard output.
///
/// If `output` is `Some`, it creates a file at the specified path and returns a `BufWriter` for it.
/// If `output` is `None`, it returns a `BufWriter` for the standard output.
fn get_writer(output: &Option<String>) -> Result<impl Write> {
    // get output as a BufWriter - equal to stdout if None
    let writer = BufWriter::new(match output {
        Some(ref x) => {
            let file = File::create(Path::new(x))
                .with_context(|| format!("Unable to create output file {x}"))?;
            Box::new(file) as Box<dyn Write + Send>
        }
        None => Box::new(stdout()) as Box<dyn Write + Send>,
    });
    Ok(writer)
}

fn open_reader(args: &InputArgs) -> Result<SequenceReader> {
    info!(
        "Reading {} (minimum length {}, minimum count {})",
        args.input, args.minseqlen, args.mincount
    );
    SequenceReader::from_path(
        &args.input,
        FilterOpts {
            min_len: args.minseqlen,
        },
    )
}

/// Dereplicates the input and writes every retained unique sequence with its count.
fn run_derep(args: &InputArgs) -> Result<()> {
    let mut reader = open_reader(args)?;
    let (records, _) = derep::dereplicate(reader.by_ref(), args.mincount)?;
    info!(
        "{} of {} reads passed the length filter",
        reader.passed_count, reader.read_count
    );

    let mut writer = get_writer(&args.output)?;
    io::write_uniques(&mut writer, &records)?;
    writer.flush()?;
    Ok(())
}

/// Dereplicates the input, clusters it into OTUs and writes the OTUs in creation order.
fn run_cluster(args: &ClusterArgs) -> Result<()> {
    let start = Instant::now();

    // set up the aligner first, so a bad matrix fails before the input is read
    let matrix = match &args.matrix {
        Some(path) => {
            let matrix = SubstitutionMatrix::from_path(path)?;
            info!(
                "Using substitution matrix {path} over {}",
                String::from_utf8_lossy(matrix.residues())
            );
            matrix
        }
        None => SubstitutionMatrix::ednafull()?,
    };
    let params = AlignParams {
        gap_open: args.gap_open,
        gap_extend: args.gap_extend,
    };
    let mut aligner = NeedlemanWunsch::new(params, matrix)?;

    let opts = ClusterOpts {
        identity_threshold: args.identity,
        count_policy: args.count_policy,
    };

    let mut reader = open_reader(&args.input)?;
    let (records, derep_stats) = derep::dereplicate(reader.by_ref(), args.input.mincount)?;
    info!(
        "{} of {} reads passed the length filter",
        reader.passed_count, reader.read_count
    );

    info!(
        "Clustering {} sequences at {}% identity",
        records.len(),
        opts.identity_threshold
    );
    let otus = cluster::abundance_greedy_clustering(records, &mut aligner, &opts)
        .context("Clustering aborted")?;

    let mut writer = get_writer(&args.input.output)?;
    io::write_otus(&mut writer, &otus)?;
    writer.flush()?;

    if let Some(path) = &args.summary {
        let mut run = summary::RunSummary::new(&args.input.input);
        run.elapsed = start.elapsed().as_secs_f64();
        run.min_seq_len = args.input.minseqlen;
        run.min_count = args.input.mincount;
        run.identity_threshold = opts.identity_threshold;
        run.gap_open = params.gap_open;
        run.gap_extend = params.gap_extend;
        run.count_policy = format!("{:?}", opts.count_policy);
        run.matrix = args
            .matrix
            .clone()
            .unwrap_or_else(|| String::from("EDNAFULL"));
        run.read_count = reader.read_count;
        run.derep = derep_stats;
        run.otu_count = otus.len();

        summary::write_summary(&run, path)?;
    }

    Ok(())
}

fn try_main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_target(false)
        .init();

    let cli = Cli::parse();

    info!("otuclust v{}", cli::VERSION);

    match &cli.command {
        Commands::Cluster(args) => {
            run_cluster(args)?;
            info!("Completed successfully.")
        }
        Commands::Derep(args) => {
            run_derep(args)?;
            info!("Completed successfully.")
        }
    };
    Ok(())
}

fn main() {
    if let Err(err) = try_main() {
        error!("{}", err);

        // report any errors that are produced
        err.chain()
            .skip(1)
            .for_each(|cause| error!("  because: {}", cause));

        std::process::exit(1);
    }
}
