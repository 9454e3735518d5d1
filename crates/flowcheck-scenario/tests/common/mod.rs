#![allow(dead_code)]

use std::path::Path;

use flowcheck_core::HarnessConfig;
use flowcheck_core::test_support::{FakeTool, write_console_template};
use flowcheck_scenario::catalog;
use tempfile::TempDir;

/// Fake tool, private workspace root and an assets root holding the
/// catalog's templates.
pub struct CatalogHarness {
    pub fake: FakeTool,
    pub root: TempDir,
    pub config: HarnessConfig,
}

impl CatalogHarness {
    pub fn new() -> Self {
        let fake = FakeTool::install().expect("install fake tool");
        let root = tempfile::tempdir().expect("create scratch root");
        let config = HarnessConfig::default()
            .with_workspace_root(root.path().join("workspaces"))
            .with_assets_root(root.path().join("assets"))
            .with_keep_workspaces(false)
            .with_max_parallelism(1);
        Self { fake, root, config }
    }

    pub fn with_templates(self) -> Self {
        write_console_template(
            &self.config.assets_root,
            catalog::PORTABLE_APP_TEMPLATE,
            "Hello Portable World!",
        )
        .expect("write portable template");
        write_console_template(
            &self.config.assets_root,
            catalog::PROJECT_DEPENDENCY_TOOL_TEMPLATE,
            "Hello Portable World!",
        )
        .expect("write dependency tool template");
        self
    }

    pub fn workspaces_left(&self) -> usize {
        std::fs::read_dir(self.root.path().join("workspaces"))
            .map(|d| d.count())
            .unwrap_or(0)
    }

    pub fn root(&self) -> &Path {
        self.root.path()
    }
}
