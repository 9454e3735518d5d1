#![allow(dead_code)]

use std::path::Path;
use std::path::PathBuf;

use assert_cmd::Command;
use flowcheck_core::test_support::{FakeTool, write_console_template};
use tempfile::TempDir;

const FLOWCHECK_VARS: [&str; 6] = [
    "FLOWCHECK_TOOL",
    "FLOWCHECK_ASSETS",
    "FLOWCHECK_WORKSPACE_ROOT",
    "FLOWCHECK_KEEP_WORKSPACES",
    "FLOWCHECK_MAX_PARALLELISM",
    "FLOWCHECK_LOG",
];

pub fn flowcheck_cmd() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("flowcheck"));
    for var in FLOWCHECK_VARS {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1");
    cmd
}

/// A fake tool and scratch directories, wired into the binary through its
/// environment variables.
pub struct Sandbox {
    fake: FakeTool,
    root: TempDir,
}

impl Sandbox {
    pub fn new() -> Self {
        Self {
            fake: FakeTool::install().expect("install fake tool"),
            root: tempfile::tempdir().expect("create scratch root"),
        }
    }

    pub fn with_templates(self) -> Self {
        for template in ["MSBuildTestApp", "TestAppWithProjDepTool"] {
            write_console_template(&self.assets(), template, "Hello Portable World!")
                .expect("write template");
        }
        self
    }

    pub fn tool_path(&self) -> &Path {
        self.fake.tool().path()
    }

    pub fn assets(&self) -> PathBuf {
        self.root.path().join("assets")
    }

    pub fn workspaces(&self) -> PathBuf {
        self.root.path().join("workspaces")
    }

    pub fn workspaces_left(&self) -> usize {
        std::fs::read_dir(self.workspaces())
            .map(|d| d.count())
            .unwrap_or(0)
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = flowcheck_cmd();
        cmd.env("FLOWCHECK_TOOL", self.tool_path())
            .env("FLOWCHECK_ASSETS", self.assets())
            .env("FLOWCHECK_WORKSPACE_ROOT", self.workspaces());
        cmd
    }
}
