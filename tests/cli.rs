use assert_cmd::Command;
use assert_fs::prelude::*;
use flate2::write::GzEncoder;
use flate2::Compression;
use indoc::indoc;
use predicates::prelude::*;
use std::io::Write;

const BINARY: &str = "otuclust";

// sequence bodies are wrapped one base per line
const AMPLICONS: &str = indoc! {"
    >r1
    A
    A
    A
    A
    >r2
    AAAA
    >r3
    AA
    AA
    >r4
    CCCC
    >r5
    C
    CCC
    >r6
    GGGG
"};

fn gzipped(dir: &assert_fs::TempDir, name: &str, contents: &str) -> assert_fs::fixture::ChildPath {
    let mut enc = GzEncoder::new(Vec::new(), Compression::default());
    enc.write_all(contents.as_bytes()).unwrap();

    let file = dir.child(name);
    file.write_binary(&enc.finish().unwrap()).unwrap();
    file
}

fn otuclust() -> Command {
    Command::cargo_bin(BINARY).unwrap()
}

#[test]
fn clusters_to_stdout() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", AMPLICONS);

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "4", "-m", "2"])
        .assert()
        .success()
        .stdout(indoc! {"
            >OTU_1 occurrence:3
            AAAA
            >OTU_2 occurrence:2
            CCCC
        "});
}

#[test]
fn clusters_to_output_file() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", AMPLICONS);
    let output = dir.child("OTU.fasta");

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "4", "-m", "1"])
        .arg("-o")
        .arg(output.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    output.assert(predicate::str::starts_with(">OTU_1 occurrence:3\nAAAA\n"));
    output.assert(predicate::str::contains(">OTU_3 occurrence:1\nGGGG\n"));
}

#[test]
fn near_identical_reads_share_an_otu() {
    let dir = assert_fs::TempDir::new().unwrap();
    let base = "ACGTTGCATGCATCGATCGGATCCTAGCTAGGCTAACGTTAGCCATGCAAGTCGATCGTAGCTAGCTGACTGATCGATGCTAGCTAGCATCGACTGAC";
    let mut variant = base.to_string();
    variant.replace_range(40..41, "G");
    assert_ne!(variant, base);

    let fasta = format!(">a\n{base}\n>b\n{base}\n>c\n{base}\n>d\n{variant}\n>e\n{variant}\n");
    let input = gzipped(&dir, "amplicons.fasta.gz", &fasta);

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "50", "-m", "2"])
        .assert()
        .success()
        .stdout(format!(">OTU_1 occurrence:3\n{}\n{}\n", &base[..80], &base[80..]));
}

#[test]
fn high_mincount_gives_empty_output() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", AMPLICONS);

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "4", "-m", "50"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn derep_reports_unique_sequences() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", AMPLICONS);

    otuclust()
        .args(["derep", input.path().to_str().unwrap(), "-s", "4", "-m", "1"])
        .assert()
        .success()
        .stdout(indoc! {"
            >seq_1 occurrence:3
            AAAA
            >seq_2 occurrence:2
            CCCC
            >seq_3 occurrence:1
            GGGG
        "});
}

#[test]
fn writes_summary() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", AMPLICONS);
    let summary = dir.child("summary.json");

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "4", "-m", "2"])
        .arg("--summary")
        .arg(summary.path())
        .assert()
        .success();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(summary.path()).unwrap()).unwrap();
    assert_eq!(value["otu_count"], 2);
    assert_eq!(value["read_count"], 6);
    assert_eq!(value["derep"]["unique_sequences"], 3);
    assert_eq!(value["matrix"], "EDNAFULL");
}

#[test]
fn file_doesnt_exist() {
    otuclust()
        .args(["cluster", "file_which_does_not_exist.fasta.gz"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No such file or directory"));
}

#[test]
fn unsupported_residue_aborts() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", ">a\nAAAA\n>b\nAAAA\n>c\nACXA\n>d\nACXA\n");

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "4", "-m", "2"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Clustering aborted"))
        .stderr(predicate::str::contains("'X'"));
}

#[test]
fn invalid_matrix_fails_early() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", AMPLICONS);
    let matrix = dir.child("MATCH");
    matrix.write_str("   A  C\nA  1\nC -1  1\n").unwrap();

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "4", "-m", "2"])
        .arg("--matrix")
        .arg(matrix.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("substitution matrix"));
}

#[test]
fn custom_matrix_is_used() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", AMPLICONS);
    let matrix = dir.child("MATCH");
    matrix
        .write_str(indoc! {"
            # match / mismatch
               A  C  G  T
            A  1 -1 -1 -1
            C -1  1 -1 -1
            G -1 -1  1 -1
            T -1 -1 -1  1
        "})
        .unwrap();

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "4", "-m", "1"])
        .arg("--matrix")
        .arg(matrix.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(">OTU_3 occurrence:1"));
}

#[test]
fn soft_masked_reads_collapse_with_upper_case() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = gzipped(&dir, "amplicons.fasta.gz", ">a\nACGT\n>b\nacgt\n>c\nAcGt\n");

    otuclust()
        .args(["derep", input.path().to_str().unwrap(), "-s", "4", "-m", "1"])
        .assert()
        .success()
        .stdout(">seq_1 occurrence:3\nACGT\n");
}

#[test]
fn padding_and_empty_records_are_filtered() {
    let dir = assert_fs::TempDir::new().unwrap();
    let input = dir.child("amplicons.fasta");
    input
        .write_str("\n\n>a\nAAAA\n>empty\n>b\nAAAA\n>c\nCCCC\n>trailing\n")
        .unwrap();

    otuclust()
        .args(["cluster", input.path().to_str().unwrap(), "-s", "1", "-m", "1"])
        .assert()
        .success()
        .stdout(indoc! {"
            >OTU_1 occurrence:2
            AAAA
            >OTU_2 occurrence:1
            CCCC
        "});
}
