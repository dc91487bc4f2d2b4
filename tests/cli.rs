use assert_cmd::Command;
use predicates::prelude::*;

fn bestimate() -> Command {
    Command::cargo_bin("bestimate").unwrap()
}

#[test]
fn genome_requires_known_assembly() {
    bestimate()
        .args(["genome", "--assembly", "GRCm39"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown assembly"));
}

#[test]
fn check_only_fails_without_genome_and_downloads_nothing() {
    let dir = tempfile::tempdir().unwrap();
    bestimate()
        .args(["genome", "--assembly", "GRCh38", "--mode", "check-only", "-o"])
        .arg(dir.path())
        .assert()
        .failure()
        .stdout(predicate::str::contains("please download the human reference genome"));
    assert!(!dir.path().join("genome/chromosome_ftps.txt").exists());
}

#[test]
fn check_only_succeeds_with_aggregate_archive() {
    let dir = tempfile::tempdir().unwrap();
    let genome = dir.path().join("genome");
    std::fs::create_dir_all(&genome).unwrap();
    std::fs::write(
        genome.join("Homo_sapiens.GRCh37.75.dna.chromosome.all.fa.gz"),
        "",
    )
    .unwrap();
    let report = dir.path().join("status.json");

    bestimate()
        .args(["genome", "--assembly", "hg19", "--v-ensembl", "75", "-o"])
        .arg(dir.path())
        .arg("--report")
        .arg(&report)
        .assert()
        .success()
        .stdout(predicate::str::contains("GRCh37 genome is ready."));
    let text = std::fs::read_to_string(report).unwrap();
    assert!(text.contains("\"aggregate_archive\": true"));
}

#[test]
fn flank_reports_missing_table() {
    let dir = tempfile::tempdir().unwrap();
    bestimate()
        .args(["flank", "--assembly", "GRCh38", "--file", "guides", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("guides.csv"));
    assert!(!dir.path().join("guides_flaking.csv").exists());
}

#[test]
fn flank_rejects_bad_location_before_network() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("output.csv"),
        ",CRISPR_PAM_Location,Direction\n0,not-a-range,left\n",
    )
    .unwrap();
    bestimate()
        .args(["flank", "--assembly", "GRCh38", "--path"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid location"));
    assert!(!dir.path().join("output_flaking.csv").exists());
}

#[test]
fn log_file_receives_output() {
    let dir = tempfile::tempdir().unwrap();
    let log = dir.path().join("run.log");
    bestimate()
        .args(["genome", "--assembly", "GRCh38", "-o"])
        .arg(dir.path())
        .arg("--log-file")
        .arg(&log)
        .assert()
        .failure();
    let text = std::fs::read_to_string(log).unwrap();
    assert!(text.contains("Logging initialized"));
}
