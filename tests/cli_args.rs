use predicates::prelude::*;

#[test]
fn scrape_rejects_url_outside_base_url() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wattscrape");
    cmd.args([
        "scrape",
        "--engine",
        "static",
        "--url",
        "https://example.com/story/1-elsewhere",
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("must be under --base-url"));
}

#[test]
fn scrape_rejects_non_http_url() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wattscrape");
    cmd.args(["scrape", "--engine", "static", "--url", "ftp://www.wattpad.com/story/1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be http/https"));
}

#[test]
fn scrape_requires_url() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wattscrape");
    cmd.args(["scrape"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn rust_log_debug_emits_debug_line_to_stderr() {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("wattscrape");
    cmd.env("RUST_LOG", "debug")
        .args(["scrape", "--engine", "static", "--url", "notaurl"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("parsed cli"));
}
