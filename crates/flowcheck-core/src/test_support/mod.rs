//! Test doubles for running workflows without a real SDK.
//!
//! [`FakeTool`] installs a POSIX `sh` script that understands `new`,
//! `restore`, `build`, `run`, `clean` and `-d <tool>` and leaves the same
//! files behind as the real tool (`obj/project.assets.json`,
//! `bin/<config>/net8.0/<project>.dll`). Requires `sh` on `PATH`.

use std::fs;
use std::io;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use crate::error::HarnessError;
use crate::tool::ToolUnderTest;
use crate::workspace::Workspace;

const FAKE_DOTNET: &str = include_str!("fake-dotnet.sh");

const CONSOLE_PROJECT: &str = r#"<Project Sdk="Microsoft.NET.Sdk">
  <PropertyGroup>
    <OutputType>Exe</OutputType>
  </PropertyGroup>
</Project>
"#;

/// Greeting printed by `run` in a freshly scaffolded console project.
pub const CONSOLE_GREETING: &str = "Hello World!";

/// A fake tool installed in its own workspace, removed on drop.
#[derive(Debug)]
pub struct FakeTool {
    home: Workspace,
    tool: ToolUnderTest,
}

impl FakeTool {
    pub fn install() -> Result<Self, HarnessError> {
        let home = Workspace::create()?;
        let path = home.sub("dotnet");
        write_executable(&path, FAKE_DOTNET).map_err(|source| HarnessError::WorkspaceCreation {
            path: path.clone(),
            source,
        })?;
        Ok(Self {
            tool: ToolUnderTest::new(path),
            home,
        })
    }

    pub fn tool(&self) -> &ToolUnderTest {
        &self.tool
    }

    /// Directory holding the fake executable.
    pub fn home(&self) -> &Path {
        self.home.path()
    }
}

// The script is written by a child process so that no descriptor to it is
// ever open in this process: a fork from another test thread would inherit
// it and exec would fail with ETXTBSY.
fn write_executable(path: &Path, contents: &str) -> io::Result<()> {
    let mut child = Command::new("sh")
        .arg("-c")
        .arg("cat > \"$1\" && chmod 755 \"$1\"")
        .arg("sh")
        .arg(path)
        .stdin(Stdio::piped())
        .spawn()?;

    if let Some(mut stdin) = child.stdin.take() {
        stdin.write_all(contents.as_bytes())?;
    }

    let status = child.wait()?;
    if !status.success() {
        return Err(io::Error::other(format!(
            "writing {} exited with {}",
            path.display(),
            status
        )));
    }
    Ok(())
}

/// Writes a minimal console project named `name` under `assets_root`,
/// printing `greeting` when run.
pub fn write_console_template(
    assets_root: &Path,
    name: &str,
    greeting: &str,
) -> io::Result<PathBuf> {
    let dir = assets_root.join(name);
    fs::create_dir_all(&dir)?;
    fs::write(dir.join(format!("{}.csproj", name)), CONSOLE_PROJECT)?;
    fs::write(
        dir.join("Program.cs"),
        format!("Console.WriteLine(\"{}\");\n", greeting),
    )?;
    Ok(dir)
}
