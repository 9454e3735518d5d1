//! Locating the external build tool under test.

use std::env;
use std::ffi::OsStr;
use std::path::Path;
use std::path::PathBuf;

use crate::error::HarnessError;
use crate::invocation::{CommandInvocation, CommandKind};

/// Runtime-root variable read by 64-bit hosts.
pub const RUNTIME_ROOT_VAR: &str = "DOTNET_ROOT";
/// Runtime-root variable read by 32-bit hosts.
pub const RUNTIME_ROOT_VAR_X86: &str = "DOTNET_ROOT(x86)";

/// Name of the runtime-root variable for this process's pointer width.
pub fn runtime_root_variable() -> &'static str {
    if cfg!(target_pointer_width = "64") {
        RUNTIME_ROOT_VAR
    } else {
        RUNTIME_ROOT_VAR_X86
    }
}

/// A resolved, absolute path to the tool executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolUnderTest {
    path: PathBuf,
}

impl ToolUnderTest {
    /// Uses `path` as-is, without checking that it exists.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Resolves `program` the way a shell would find it.
    ///
    /// Names containing a path separator are taken relative to the current
    /// directory; bare names are searched on `PATH`.
    pub fn resolve(program: &str) -> Result<Self, HarnessError> {
        let not_found = || HarnessError::ToolNotFound {
            tool: program.to_string(),
        };

        let candidate = Path::new(program);
        if candidate.components().count() > 1 || candidate.is_absolute() {
            return executable_file(candidate)
                .and_then(|p| p.canonicalize().ok())
                .map(Self::new)
                .ok_or_else(not_found);
        }

        let search_path = env::var_os("PATH").ok_or_else(not_found)?;
        Self::resolve_in(program, &search_path).ok_or_else(not_found)
    }

    // The hit is canonicalised: a PATH entry is often a symlink into the SDK
    // directory, and the runtime root must be that directory.
    fn resolve_in(program: &str, search_path: &OsStr) -> Option<Self> {
        env::split_paths(search_path)
            .filter(|dir| !dir.as_os_str().is_empty())
            .flat_map(|dir| executable_names(program).map(move |name| dir.join(name)))
            .find_map(|candidate| executable_file(&candidate))
            .and_then(|path| path.canonicalize().ok())
            .map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory holding the executable, used as the runtime root.
    pub fn runtime_root(&self) -> Option<&Path> {
        self.path.parent()
    }

    pub fn command(&self, kind: CommandKind) -> CommandInvocation {
        CommandInvocation::new(&self.path, kind)
    }

    pub fn new_project(&self) -> CommandInvocation {
        self.command(CommandKind::New)
    }

    pub fn restore(&self) -> CommandInvocation {
        self.command(CommandKind::Restore)
    }

    pub fn build(&self) -> CommandInvocation {
        self.command(CommandKind::Build)
    }

    pub fn run(&self) -> CommandInvocation {
        self.command(CommandKind::Run)
    }

    pub fn clean(&self) -> CommandInvocation {
        self.command(CommandKind::Clean)
    }

    /// Generic invocation; the caller supplies every token.
    pub fn invoke(&self) -> CommandInvocation {
        self.command(CommandKind::Custom)
    }
}

fn executable_names(program: &str) -> impl Iterator<Item = String> {
    let mut names = vec![program.to_string()];
    if cfg!(windows) && Path::new(program).extension().is_none() {
        names.push(format!("{}.exe", program));
    }
    names.into_iter()
}

#[cfg(unix)]
fn executable_file(path: &Path) -> Option<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let metadata = path.metadata().ok()?;
    (metadata.is_file() && metadata.permissions().mode() & 0o111 != 0).then(|| path.to_path_buf())
}

#[cfg(not(unix))]
fn executable_file(path: &Path) -> Option<PathBuf> {
    path.is_file().then(|| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_runtime_root_variable_matches_pointer_width() {
        #[cfg(target_pointer_width = "64")]
        assert_eq!(runtime_root_variable(), "DOTNET_ROOT");
        #[cfg(not(target_pointer_width = "64"))]
        assert_eq!(runtime_root_variable(), "DOTNET_ROOT(x86)");
    }

    #[test]
    fn test_runtime_root_is_parent_directory() {
        let tool = ToolUnderTest::new("/opt/dotnet/dotnet");
        assert_eq!(tool.runtime_root(), Some(Path::new("/opt/dotnet")));
    }

    #[test]
    fn test_specialized_commands_carry_their_kind() {
        let tool = ToolUnderTest::new("/opt/dotnet/dotnet");
        assert_eq!(tool.new_project().kind(), CommandKind::New);
        assert_eq!(tool.restore().kind(), CommandKind::Restore);
        assert_eq!(tool.build().kind(), CommandKind::Build);
        assert_eq!(tool.run().kind(), CommandKind::Run);
        assert_eq!(tool.clean().kind(), CommandKind::Clean);
        assert_eq!(tool.invoke().kind(), CommandKind::Custom);
        assert_eq!(tool.build().program(), Path::new("/opt/dotnet/dotnet"));
    }

    #[test]
    fn test_resolve_missing_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("dotnet");
        let err = ToolUnderTest::resolve(missing.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, HarnessError::ToolNotFound { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_in_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let empty = tempfile::tempdir().unwrap();
        let bin = tempfile::tempdir().unwrap();
        let tool_path = bin.path().join("fake-tool");
        std::fs::write(&tool_path, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&tool_path, std::fs::Permissions::from_mode(0o755)).unwrap();

        let search = env::join_paths([empty.path(), bin.path()]).unwrap();
        let tool = ToolUnderTest::resolve_in("fake-tool", &search).unwrap();
        assert_eq!(tool.path(), tool_path.canonicalize().unwrap());

        assert!(ToolUnderTest::resolve_in("other-tool", &search).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_follows_symlink_on_search_path() {
        use std::os::unix::fs::PermissionsExt;

        let sdk = tempfile::tempdir().unwrap();
        let real = sdk.path().join("dotnet");
        std::fs::write(&real, "#!/bin/sh\n").unwrap();
        std::fs::set_permissions(&real, std::fs::Permissions::from_mode(0o755)).unwrap();

        let bin = tempfile::tempdir().unwrap();
        std::os::unix::fs::symlink(&real, bin.path().join("dotnet")).unwrap();

        let search = env::join_paths([bin.path()]).unwrap();
        let found = ToolUnderTest::resolve_in("dotnet", &search).unwrap();
        let explicit = ToolUnderTest::resolve(bin.path().join("dotnet").to_str().unwrap()).unwrap();

        let sdk_dir = sdk.path().canonicalize().unwrap();
        assert_eq!(found.runtime_root(), Some(sdk_dir.as_path()));
        assert_eq!(found, explicit);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_normalizes_search_entry() {
        let found = ToolUnderTest::resolve_in("sh", OsStr::new("/bin/../bin")).unwrap();
        assert!(found.path().is_absolute());
        assert!(
            !found
                .path()
                .components()
                .any(|c| c == std::path::Component::ParentDir)
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_skips_non_executable_files() {
        let bin = tempfile::tempdir().unwrap();
        std::fs::write(bin.path().join("fake-tool"), "data").unwrap();

        let search = env::join_paths([bin.path()]).unwrap();
        assert!(ToolUnderTest::resolve_in("fake-tool", &search).is_none());
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_finds_sh() {
        let tool = ToolUnderTest::resolve("sh").unwrap();
        assert!(tool.path().is_absolute());
    }
}
