use clap::builder::styling::AnsiColor;
use clap::builder::Styles;
use clap::{Args, Parser, Subcommand};

use crate::cluster::{CountPolicy, DEFAULT_IDENTITY_THRESHOLD};

const fn extra_build_info() -> &'static str {
    match option_env!("CARGO_BUILD_DESC") {
        Some(e) => e,
        None => env!("CARGO_PKG_VERSION"),
    }
}
pub const VERSION: &str = extra_build_info();
const INFO_STRING: &str = "
otuclust version ";
const AFTER_STRING: &str = "
   ──────────────────────────────────
   abundance greedy clustering of amplicon reads into OTUs";

// colouring of the help
const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().bold())
    .usage(AnsiColor::BrightMagenta.on_default().bold())
    .literal(AnsiColor::BrightMagenta.on_default())
    .placeholder(AnsiColor::White.on_default());

#[derive(Parser)]
#[command(
    version = VERSION,
    about = format!("{}{}{}", INFO_STRING, VERSION, AFTER_STRING),
    arg_required_else_help = true,
    flatten_help = true,
    styles = STYLES
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Dereplicate reads and cluster them into OTUs
    #[command(arg_required_else_help = true)]
    Cluster(ClusterArgs),

    /// Dereplicate reads, reporting each unique sequence and its count
    #[command(arg_required_else_help = true)]
    Derep(InputArgs),
}

#[derive(Args)]
pub struct InputArgs {
    /// the input .fasta or .fasta.gz file
    pub input: String,

    /// the output .fasta, standard output if not given
    #[arg(short)]
    pub output: Option<String>,

    /// minimum sequence length for dereplication
    #[arg(short = 's', long, default_value_t = 400)]
    pub minseqlen: usize,

    /// minimum count for dereplication
    #[arg(short = 'm', long, default_value_t = 10)]
    pub mincount: usize,
}

#[derive(Args)]
pub struct ClusterArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// minimum percent identity for a sequence to join an existing OTU
    #[arg(long, default_value_t = DEFAULT_IDENTITY_THRESHOLD, value_parser = parse_identity)]
    pub identity: f64,

    /// gap opening penalty, the cost of the first position of a gap
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub gap_open: i32,

    /// gap extension penalty, the cost of every further position of a gap
    #[arg(long, default_value_t = -1, allow_negative_numbers = true)]
    pub gap_extend: i32,

    /// substitution matrix in NCBI format. the EDNAFULL matrix is used if not given
    #[arg(long)]
    pub matrix: Option<String>,

    /// what happens to the count of a sequence absorbed into an existing OTU
    #[arg(long, value_enum, default_value = "seed")]
    pub count_policy: CountPolicy,

    /// write a JSON summary of the run to this file
    #[arg(long)]
    pub summary: Option<String>,
}

fn parse_identity(arg: &str) -> Result<f64, String> {
    let v = arg
        .parse::<f64>()
        .map_err(|_| format!("Invalid identity: '{arg}' (should be a number)"))?;

    if !(0.0..=100.0).contains(&v) {
        return Err(format!("Invalid identity: {v} (should be between 0 and 100)"));
    }
    Ok(v)
}
