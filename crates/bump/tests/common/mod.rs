//! Throwaway git repositories for driving the binary end to end.
//!
//! Each [`Fixture`] is a work tree with one commit, pushed to a bare
//! `origin` next to it, so verification, fetch and push all run for real.
#![allow(dead_code)]

use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub struct Fixture {
    tmp: TempDir,
    pub work: PathBuf,
    pub logs: PathBuf,
}

impl Fixture {
    pub fn new() -> Self {
        let tmp = TempDir::new().unwrap();
        let work = tmp.path().join("work");
        let logs = tmp.path().join("logs");

        git(tmp.path(), &["init", "--quiet", "--bare", "origin.git"]);
        git(tmp.path(), &["init", "--quiet", "work"]);
        for (key, value) in [
            ("user.name", "bump tests"),
            ("user.email", "bump@example.com"),
            ("commit.gpgsign", "false"),
            ("tag.gpgsign", "false"),
        ] {
            git(&work, &["config", key, value]);
        }
        git(&work, &["commit", "--quiet", "--allow-empty", "--message", "initial"]);
        let origin = tmp.path().join("origin.git");
        git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);
        git(&work, &["push", "--quiet", "origin", "HEAD"]);

        Self { tmp, work, logs }
    }

    /// A directory outside the work tree for extra files.
    pub fn outside(&self) -> &Path {
        self.tmp.path()
    }

    /// The binary, started inside the work tree, logging outside of it.
    #[allow(deprecated)]
    pub fn bump(&self) -> Command {
        let mut cmd = Command::cargo_bin(env!("CARGO_PKG_NAME")).unwrap();
        cmd.current_dir(&self.work)
            .env("BUMP_LOG_DIR", &self.logs)
            .env_remove("BUMP_LOG_PATH")
            .env_remove("RUST_LOG");
        cmd
    }

    pub fn git(&self, args: &[&str]) -> String {
        git(&self.work, args)
    }

    /// Create a tag and push it.
    pub fn tag(&self, name: &str) {
        self.git(&["tag", name]);
        self.git(&["push", "--quiet", "origin", name]);
    }

    /// Commit a file and push it.
    pub fn commit_file(&self, name: &str, contents: &str) {
        fs::write(self.work.join(name), contents).unwrap();
        self.git(&["add", name]);
        self.git(&["commit", "--quiet", "--message", &format!("add {name}")]);
        self.git(&["push", "--quiet", "origin", "HEAD"]);
    }

    /// Commit `.bump.json` with `config` as its contents.
    pub fn configure(&self, config: serde_json::Value) {
        self.commit_file(".bump.json", &config.to_string());
    }

    pub fn local_tags(&self) -> Vec<String> {
        self.git(&["tag", "--list"])
            .lines()
            .map(str::to_string)
            .collect()
    }

    pub fn remote_tags(&self) -> Vec<String> {
        self.git(&["ls-remote", "--tags", "origin"])
            .lines()
            .filter_map(|line| line.split_once("refs/tags/"))
            .map(|(_, tag)| tag.to_string())
            .collect()
    }

    pub fn last_commit_subject(&self) -> String {
        self.git(&["log", "-1", "--format=%s"]).trim().to_string()
    }

    pub fn is_clean(&self) -> bool {
        self.git(&["status", "--porcelain"]).trim().is_empty()
    }
}

pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .output()
        .unwrap();
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8(output.stdout).unwrap()
}
