use std::path::Path;

use assert_cmd::Command;
use tempfile::TempDir;

pub const BIN_NAME: &str = "boleto_cli";

/// An isolated data directory plus a pinned "today" for deterministic statuses.
pub struct Sandbox {
    dir: TempDir,
    today: &'static str,
}

impl Sandbox {
    pub fn new(today: &'static str) -> Self {
        Self {
            dir: TempDir::new().expect("create temp dir"),
            today,
        }
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// The binary preconfigured with this sandbox's data dir and date.
    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin(BIN_NAME).expect("binary exists");
        cmd.arg("--data-dir")
            .arg(self.path())
            .arg("--today")
            .arg(self.today)
            .arg("--no-color")
            .env("RUST_LOG", "off");
        cmd
    }

    pub fn add(&self, client: &str, total: &str, down: &str, count: &str, start: &str) {
        self.cmd()
            .args([
                "add", "--client", client, "--total", total, "--down", down, "--count", count,
                "--method", "pix", "--start", start,
            ])
            .assert()
            .success();
    }

    /// Ids in stored order (newest first).
    pub fn ids(&self) -> Vec<String> {
        let raw = std::fs::read_to_string(self.path().join("boletos.json")).expect("read portfolio");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("parse portfolio");
        value
            .as_array()
            .expect("array")
            .iter()
            .map(|entry| entry["id"].as_str().expect("id").to_string())
            .collect()
    }
}
