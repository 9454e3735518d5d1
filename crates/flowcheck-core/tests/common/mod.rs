#![allow(dead_code)]

use std::path::Path;

use flowcheck_core::test_support::FakeTool;
use flowcheck_core::{ToolUnderTest, Workspace};
use tempfile::TempDir;

/// A fake tool plus a private workspace root, both removed on drop.
pub struct Fixture {
    fake: FakeTool,
    root: TempDir,
}

impl Fixture {
    pub fn new() -> Self {
        Self {
            fake: FakeTool::install().expect("install fake tool"),
            root: tempfile::tempdir().expect("create workspace root"),
        }
    }

    pub fn tool(&self) -> &ToolUnderTest {
        self.fake.tool()
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::create_in(self.root.path()).expect("create workspace")
    }

    /// Number of entries left directly under the workspace root.
    pub fn leftover_workspaces(&self) -> usize {
        std::fs::read_dir(self.root.path())
            .map(|entries| entries.count())
            .unwrap_or(0)
    }
}
