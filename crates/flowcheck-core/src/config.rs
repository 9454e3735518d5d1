use std::env;
use std::path::PathBuf;

pub const DEFAULT_TOOL: &str = "dotnet";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_MAX_PARALLELISM: usize = 1;

pub const TOOL_ENV: &str = "FLOWCHECK_TOOL";
pub const WORKSPACE_ROOT_ENV: &str = "FLOWCHECK_WORKSPACE_ROOT";
pub const ASSETS_ENV: &str = "FLOWCHECK_ASSETS";
pub const KEEP_WORKSPACES_ENV: &str = "FLOWCHECK_KEEP_WORKSPACES";
pub const MAX_PARALLELISM_ENV: &str = "FLOWCHECK_MAX_PARALLELISM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Program name or path of the tool under test.
    pub tool: String,
    /// Directory under which workspaces are created.
    pub workspace_root: PathBuf,
    /// Directory holding project templates.
    pub assets_root: PathBuf,
    /// Leave workspace directories behind for inspection.
    pub keep_workspaces: bool,
    /// Upper bound on scenarios running at once; 1 runs the suite serially.
    pub max_parallelism: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

impl HarnessConfig {
    pub fn from_env() -> Self {
        Self {
            tool: env::var(TOOL_ENV)
                .ok()
                .filter(|v| !v.trim().is_empty())
                .unwrap_or_else(|| DEFAULT_TOOL.to_string()),
            workspace_root: env::var_os(WORKSPACE_ROOT_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            assets_root: env::var_os(ASSETS_ENV)
                .filter(|v| !v.is_empty())
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            keep_workspaces: env::var(KEEP_WORKSPACES_ENV)
                .map(|v| parse_flag(&v))
                .unwrap_or(false),
            max_parallelism: env::var(MAX_PARALLELISM_ENV)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_MAX_PARALLELISM)
                .max(1),
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = tool.into();
        self
    }

    pub fn with_workspace_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.workspace_root = root.into();
        self
    }

    pub fn with_assets_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.assets_root = root.into();
        self
    }

    pub fn with_keep_workspaces(mut self, keep: bool) -> Self {
        self.keep_workspaces = keep;
        self
    }

    /// Values below 1 are raised to 1.
    pub fn with_max_parallelism(mut self, max: usize) -> Self {
        self.max_parallelism = max.max(1);
        self
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}
