//! Disposable per-test directories.
//!
//! A [`Workspace`] owns a freshly created directory with a uuid name and
//! removes it when dropped, whether the test body finished, returned an
//! error or panicked.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use walkdir::WalkDir;

use crate::assertions::{DirectoryAssert, directory};
use crate::error::HarnessError;
use crate::invocation::{CommandInvocation, CommandKind};
use crate::tool::ToolUnderTest;

const DIR_PREFIX: &str = "flowcheck-";

#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    created_at: DateTime<Utc>,
    retain: bool,
}

impl Workspace {
    /// Creates a workspace under the system temp directory.
    pub fn create() -> Result<Self, HarnessError> {
        Self::create_in(std::env::temp_dir())
    }

    /// Creates a workspace under `root`, creating `root` if needed.
    pub fn create_in(root: impl AsRef<Path>) -> Result<Self, HarnessError> {
        let root = root.as_ref();
        let candidate = root.join(format!("{}{}", DIR_PREFIX, uuid::Uuid::new_v4()));
        let creation_error = |source| HarnessError::WorkspaceCreation {
            path: candidate.clone(),
            source,
        };

        fs::create_dir_all(root).map_err(creation_error)?;
        // create_dir, not create_dir_all: an existing directory is a collision.
        fs::create_dir(&candidate).map_err(creation_error)?;
        let path = fs::canonicalize(&candidate).map_err(creation_error)?;

        tracing::debug!(path = %path.display(), "workspace created");
        Ok(Self {
            path,
            created_at: Utc::now(),
            retain: false,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Path of a child entry, which need not exist yet.
    pub fn sub(&self, name: impl AsRef<Path>) -> PathBuf {
        self.path.join(name)
    }

    /// Directory assertions rooted at a child entry.
    pub fn dir(&self, name: impl AsRef<Path>) -> DirectoryAssert {
        directory(self.sub(name))
    }

    /// An invocation of `tool` running inside this workspace.
    pub fn invoke(&self, tool: &ToolUnderTest, kind: CommandKind) -> CommandInvocation {
        tool.command(kind).with_working_directory(&self.path)
    }

    /// Copies the contents of `template` into the workspace.
    pub fn seed_from(&self, template: impl AsRef<Path>) -> Result<(), HarnessError> {
        let template = template.as_ref();
        if !template.is_dir() {
            return Err(HarnessError::TemplateNotFound {
                path: template.to_path_buf(),
            });
        }

        for entry in WalkDir::new(template).min_depth(1) {
            let entry = entry.map_err(|err| HarnessError::TemplateCopy {
                path: err.path().unwrap_or(template).to_path_buf(),
                source: err.into(),
            })?;
            let relative = entry.path().strip_prefix(template).unwrap_or(entry.path());
            let target = self.path.join(relative);

            let copied = if entry.file_type().is_dir() {
                fs::create_dir_all(&target)
            } else {
                fs::copy(entry.path(), &target).map(|_| ())
            };
            copied.map_err(|source| HarnessError::TemplateCopy {
                path: entry.path().to_path_buf(),
                source,
            })?;
        }

        tracing::debug!(
            template = %template.display(),
            workspace = %self.path.display(),
            "workspace seeded"
        );
        Ok(())
    }

    /// Keeps (or stops keeping) the directory after the workspace is dropped.
    pub fn set_retain(&mut self, retain: bool) {
        self.retain = retain;
    }

    pub fn is_retained(&self) -> bool {
        self.retain
    }

    /// Disarms removal and hands back the directory path.
    pub fn keep(mut self) -> PathBuf {
        self.retain = true;
        self.path.clone()
    }

    /// Removes the directory now, reporting failure instead of logging it.
    pub fn dispose(mut self) -> Result<(), HarnessError> {
        self.retain = true;
        remove_tree(&self.path)
    }
}

fn remove_tree(path: &Path) -> Result<(), HarnessError> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            tracing::debug!(path = %path.display(), "workspace removed");
            Ok(())
        }
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(HarnessError::WorkspaceRemoval {
            path: path.to_path_buf(),
            source,
        }),
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if self.retain {
            return;
        }
        if let Err(e) = remove_tree(&self.path) {
            tracing::warn!(error = %e, "workspace cleanup failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_makes_empty_unique_directory() {
        let root = tempfile::tempdir().unwrap();
        let a = Workspace::create_in(root.path()).unwrap();
        let b = Workspace::create_in(root.path()).unwrap();

        assert!(a.path().is_dir());
        assert!(b.path().is_dir());
        assert_ne!(a.path(), b.path());
        assert!(a.path().is_absolute());
        assert_eq!(fs::read_dir(a.path()).unwrap().count(), 0);
        assert!(
            a.path()
                .file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with(DIR_PREFIX)
        );
    }

    #[test]
    fn test_drop_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let ws = Workspace::create_in(root.path()).unwrap();
            fs::create_dir_all(ws.sub("bin/Debug")).unwrap();
            fs::write(ws.sub("bin/Debug/app.dll"), b"x").unwrap();
            ws.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn test_drop_runs_on_panic() {
        let root = tempfile::tempdir().unwrap();
        let root_path = root.path().to_path_buf();

        let outcome = std::panic::catch_unwind(move || {
            let ws = Workspace::create_in(&root_path).unwrap();
            fs::write(ws.sub("Program.cs"), b"x").unwrap();
            panic!("assertion failed inside test body");
        });

        assert!(outcome.is_err());
        assert_eq!(fs::read_dir(root.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_keep_disarms_removal() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create_in(root.path()).unwrap();
        let kept = ws.keep();
        assert!(kept.is_dir());
    }

    #[test]
    fn test_set_retain() {
        let root = tempfile::tempdir().unwrap();
        let path = {
            let mut ws = Workspace::create_in(root.path()).unwrap();
            ws.set_retain(true);
            assert!(ws.is_retained());
            ws.path().to_path_buf()
        };
        assert!(path.is_dir());
    }

    #[test]
    fn test_dispose_removes_directory() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create_in(root.path()).unwrap();
        let path = ws.path().to_path_buf();
        ws.dispose().unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_dispose_tolerates_already_removed_directory() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create_in(root.path()).unwrap();
        fs::remove_dir_all(ws.path()).unwrap();
        assert!(ws.dispose().is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_create_in_unwritable_root_fails() {
        use std::os::unix::fs::PermissionsExt;

        let root = tempfile::tempdir().unwrap();
        let locked = root.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o500)).unwrap();

        let result = Workspace::create_in(&locked);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o700)).unwrap();

        // Privileged users can write anywhere; only check the error shape when it fails.
        if let Err(err) = result {
            assert!(matches!(err, HarnessError::WorkspaceCreation { .. }));
        }
    }

    #[test]
    fn test_seed_from_copies_tree() {
        let template = tempfile::tempdir().unwrap();
        fs::create_dir_all(template.path().join("src/nested")).unwrap();
        fs::write(template.path().join("app.csproj"), b"<Project/>").unwrap();
        fs::write(template.path().join("src/nested/Program.cs"), b"class P {}").unwrap();

        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create_in(root.path()).unwrap();
        ws.seed_from(template.path()).unwrap();

        assert_eq!(
            fs::read_to_string(ws.sub("app.csproj")).unwrap(),
            "<Project/>"
        );
        assert!(ws.sub("src/nested/Program.cs").is_file());
    }

    #[test]
    fn test_seed_from_missing_template() {
        let root = tempfile::tempdir().unwrap();
        let ws = Workspace::create_in(root.path()).unwrap();
        let err = ws.seed_from(root.path().join("NoSuchTemplate")).unwrap_err();
        assert!(matches!(err, HarnessError::TemplateNotFound { .. }));
    }

    #[test]
    fn test_sequential_workspaces_are_isolated() {
        let root = tempfile::tempdir().unwrap();
        {
            let first = Workspace::create_in(root.path()).unwrap();
            fs::write(first.sub("first.txt"), b"1").unwrap();
        }
        let second = Workspace::create_in(root.path()).unwrap();
        assert!(!second.sub("first.txt").exists());
        assert_eq!(fs::read_dir(second.path()).unwrap().count(), 0);
    }
}
