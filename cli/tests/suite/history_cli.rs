use std::fmt::Write as _;
use std::path::Path;

use anyhow::Result;
use predicates::prelude::PredicateBooleanExt;
use predicates::str::contains;
use pretty_assertions::assert_eq;
use serde_json::Value as JsonValue;
use tempfile::TempDir;

fn ledger_command(cwd: &Path) -> Result<assert_cmd::Command> {
    let mut cmd = assert_cmd::Command::cargo_bin("ledger-history")?;
    cmd.current_dir(cwd);
    cmd.env("NO_COLOR", "1");
    cmd.env_remove("RUST_LOG");
    Ok(cmd)
}

/// `count` web3 transfers, one per hour starting 2024-06-01T00:00Z.
fn write_web3_fixture(dir: &Path, count: u32) -> Result<()> {
    let mut json = String::from("[");
    for i in 0..count {
        if i > 0 {
            json.push(',');
        }
        let kind = if i % 2 == 0 { "receive" } else { "send" };
        let token = if i % 3 == 0 { "usdc" } else { "eth" };
        write!(
            json,
            r#"{{"transaction_hash": "0x{i:04}", "chain_id": "ethereum", "kind": "{kind}",
                "token": "{token}", "counterpart_address": "0xfeed", "amount": "{amount}",
                "usd_value": "{value}", "transacted_at": "2024-06-{day:02}T{hour:02}:00:00Z"}}"#,
            amount = i + 1,
            value = (i * 7) % 50,
            day = 1 + i / 24,
            hour = i % 24,
        )?;
    }
    json.push(']');
    std::fs::write(dir.join("web3.json"), json)?;
    Ok(())
}

fn json_output(cmd: &mut assert_cmd::Command) -> Result<JsonValue> {
    let output = cmd.output()?;
    assert!(output.status.success(), "{output:?}");
    Ok(serde_json::from_slice(&output.stdout)?)
}

#[test]
fn pages_through_fixture_as_json() -> Result<()> {
    let dir = TempDir::new()?;
    write_web3_fixture(dir.path(), 60)?;

    let mut cmd = ledger_command(dir.path())?;
    cmd.args([
        "--fixture",
        "web3.json",
        "--kind",
        "web3",
        "--page-size",
        "20",
        "--refill-threshold",
        "4",
        "--pages",
        "1",
        "--json",
    ]);
    let report = json_output(&mut cmd)?;

    assert_eq!(report["rows"], 40);
    assert_eq!(report["pages_loaded"], 2);
    assert_eq!(report["exhausted"], false);
    let titles: Vec<&str> = report["sections"]
        .as_array()
        .into_iter()
        .flatten()
        .filter_map(|s| s["title"].as_str())
        .collect();
    assert_eq!(titles, vec!["2024-06-03", "2024-06-02", "2024-06-01"]);
    assert_eq!(report["sections"][0]["records"][0]["transaction_hash"], "0x0059");
    Ok(())
}

#[test]
fn filters_and_config_file_apply() -> Result<()> {
    let dir = TempDir::new()?;
    write_web3_fixture(dir.path(), 48)?;
    std::fs::write(
        dir.path().join("ledger.toml"),
        "[pager]\npage_size = 5\nrefill_threshold = 2\n",
    )?;

    let mut cmd = ledger_command(dir.path())?;
    cmd.args([
        "--fixture",
        "web3.json",
        "--kind",
        "web3",
        "--token",
        "usdc",
        "--type",
        "receive",
        "--until",
        "2024-06-01",
        "--order",
        "oldest",
        "--json",
    ]);
    let report = json_output(&mut cmd)?;

    // usdc receives on day one: hours 0, 6, 12, 18.
    assert_eq!(report["rows"], 4);
    assert_eq!(report["exhausted"], true);
    assert_eq!(
        report["sections"][0]["records"][0]["transaction_hash"],
        "0x0000"
    );
    Ok(())
}

#[test]
fn human_output_lists_sections() -> Result<()> {
    let dir = TempDir::new()?;
    write_web3_fixture(dir.path(), 30)?;

    ledger_command(dir.path())?
        .args(["--fixture", "web3.json", "--kind", "web3"])
        .assert()
        .success()
        .stdout(
            contains("2024-06-02")
                .and(contains("2024-06-01"))
                .and(contains("30 rows, 1 pages, end of history")),
        );
    Ok(())
}

#[test]
fn invalid_config_fails() -> Result<()> {
    let dir = TempDir::new()?;
    write_web3_fixture(dir.path(), 3)?;

    ledger_command(dir.path())?
        .args([
            "--fixture",
            "web3.json",
            "--kind",
            "web3",
            "--page-size",
            "4",
            "--refill-threshold",
            "4",
        ])
        .assert()
        .failure()
        .stderr(contains("refill_threshold"));
    Ok(())
}

#[test]
fn missing_fixture_fails() -> Result<()> {
    let dir = TempDir::new()?;

    ledger_command(dir.path())?
        .args(["--fixture", "absent.json"])
        .assert()
        .failure()
        .stderr(contains("absent.json"));
    Ok(())
}
