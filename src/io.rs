use crate::filter::{filter, FilterOpts};
use crate::record::{AbundanceRecord, OtuRecord};
use anyhow::{Context, Result};
use flate2::read::MultiGzDecoder;
use needletail::errors::ParseErrorKind;
use needletail::FastxReader;
use std::fs::File;
use std::io::{BufRead, BufReader, Write};

/// Column at which sequence lines are wrapped in FASTA output.
pub const LINE_WIDTH: usize = 80;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// The kind of record being written, which determines the FASTA header prefix.
#[derive(Copy, Clone)]
pub enum RecordLabel {
    Otu,
    Unique,
}

/// A forward-only stream of sequences read from a (possibly gzip-compressed) FASTA file.
/// Sequences are upper-cased, and those shorter than the minimum length are skipped.
///
/// A record with a header but no sequence lines is read as an empty sequence, wherever it
/// appears in the file.
///
/// The stream is single-pass; to read the file again, open a new `SequenceReader`.
pub struct SequenceReader {
    reader: Option<Box<dyn FastxReader>>,
    opts: FilterOpts,
    path: String,
    /// Number of records read from the file
    pub read_count: usize,
    /// Number of records which passed the length filter
    pub passed_count: usize,
}

impl SequenceReader {
    /// Opens a FASTA file for streaming. Compression is detected from the file contents, so
    /// both `.fasta` and `.fasta.gz` inputs are accepted.
    ///
    /// # Errors
    ///
    /// This function will return an error if:
    /// * The file cannot be opened or decompressed.
    /// * The file is not recognisable as FASTA/FASTQ.
    ///
    /// An empty file, or one holding only blank lines, is not an error and produces an empty
    /// stream.
    pub fn from_path(path: &str, opts: FilterOpts) -> Result<Self> {
        let mut input = open_decompressed(path)?;

        let has_records = skip_leading_whitespace(&mut input)
            .with_context(|| format!("Unable to read file {path}"))?;

        let reader = if has_records {
            match needletail::parse_fastx_reader(input) {
                Ok(r) => Some(r),
                Err(e) if matches!(e.kind, ParseErrorKind::EmptyFile) => None,
                Err(e) => {
                    return Err(e).with_context(|| format!("Unable to parse file {path}"));
                }
            }
        } else {
            None
        };

        if reader.is_none() {
            warn!("Input file {path} is empty");
        }

        Ok(SequenceReader {
            reader,
            opts,
            path: path.to_string(),
            read_count: 0,
            passed_count: 0,
        })
    }
}

/// Opens `path` as a buffered reader, decompressing it if it starts with the gzip magic bytes.
fn open_decompressed(path: &str) -> Result<Box<dyn BufRead + Send>> {
    let file = File::open(path).with_context(|| format!("Unable to open file {path}"))?;
    let mut buffered = BufReader::new(file);

    let is_gzipped = buffered
        .fill_buf()
        .with_context(|| format!("Unable to read file {path}"))?
        .starts_with(&GZIP_MAGIC);

    Ok(if is_gzipped {
        Box::new(BufReader::new(MultiGzDecoder::new(buffered)))
    } else {
        Box::new(buffered)
    })
}

/// Consumes blank lines and other whitespace in front of the first record. Returns `false` if
/// nothing is left after them.
fn skip_leading_whitespace(reader: &mut dyn BufRead) -> std::io::Result<bool> {
    loop {
        let buf = reader.fill_buf()?;
        if buf.is_empty() {
            return Ok(false);
        }

        let available = buf.len();
        let blank = buf.iter().take_while(|c| c.is_ascii_whitespace()).count();
        reader.consume(blank);
        if blank < available {
            return Ok(true);
        }
    }
}

impl Iterator for SequenceReader {
    type Item = Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let reader = self.reader.as_mut()?;

            let seq = match reader.next()?.map(|rec| rec.seq().to_ascii_uppercase()) {
                Ok(seq) => seq,
                // a header without sequence lines at the very end of the file
                Err(e) if matches!(e.kind, ParseErrorKind::UnexpectedEnd) => {
                    self.reader = None;
                    Vec::new()
                }
                Err(e) => {
                    let path = &self.path;
                    return Some(
                        Err(e).with_context(|| format!("Invalid record in {path}")),
                    );
                }
            };

            self.read_count += 1;
            if self.read_count % 50000 == 0 {
                info!("Processed: {}", self.read_count)
            }

            if filter(&seq, &self.opts) {
                self.passed_count += 1;
                return Some(Ok(seq));
            }
        }
    }
}

/// Utility function to extract the error from an iterator and stop iteration immediately. Useful
/// for iterators which yield a Result<T>.
///
/// # Returns
///
/// This function returns an `Option<T>`. If the item is `Ok`, it returns `Some(T)`.
/// If the item is `Err`, it updates `err` with the error and returns `None`.
pub fn until_err<T>(err: &mut &mut Result<()>, item: Result<T>) -> Option<T> {
    match item {
        Ok(item) => Some(item),
        Err(e) => {
            **err = Err(e);
            None
        }
    }
}

/// Writes a single FASTA record, wrapping the sequence every `LINE_WIDTH` characters.
///
/// # Arguments
///
/// * `writer` - A mutable reference to an object that implements the `Write` trait. Since this is
///   `std::io::Write` and *not* `std::fmt::Write`, this does not accept Strings. It is acceptable
///   to use a `std::io::Cursor` instead.
/// * `header` - The header line, without the leading `>`.
/// * `seq` - The sequence.
pub fn write_fasta(writer: &mut impl Write, header: &str, seq: &[u8]) -> std::io::Result<()> {
    writeln!(writer, ">{header}")?;

    if seq.is_empty() {
        return writeln!(writer);
    }

    for line in seq.chunks(LINE_WIDTH) {
        writer.write_all(line)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Writes a numbered list of records, with headers of the form `>OTU_1 occurrence:42`.
/// Numbering is 1-based and follows the order of `records`.
pub fn write_records<'a>(
    writer: &mut impl Write,
    records: impl IntoIterator<Item = (&'a [u8], usize)>,
    label: RecordLabel,
) -> std::io::Result<()> {
    let prefix = match label {
        RecordLabel::Otu => "OTU",
        RecordLabel::Unique => "seq",
    };

    for (idx, (seq, count)) in records.into_iter().enumerate() {
        write_fasta(writer, &format!("{prefix}_{} occurrence:{count}", idx + 1), seq)?;
    }
    Ok(())
}

pub fn write_otus(writer: &mut impl Write, otus: &[OtuRecord]) -> std::io::Result<()> {
    write_records(
        writer,
        otus.iter().map(|o| (o.seq.as_slice(), o.count)),
        RecordLabel::Otu,
    )
}

pub fn write_uniques(writer: &mut impl Write, records: &[AbundanceRecord]) -> std::io::Result<()> {
    write_records(
        writer,
        records.iter().map(|r| (r.seq.as_slice(), r.count)),
        RecordLabel::Unique,
    )
}
