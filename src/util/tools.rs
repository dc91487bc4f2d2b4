//! External tool resolution and invocation (curl, converter, loader, CRISPR-Analyser).

use anyhow::{anyhow, Context, Result};
use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolve an executable.
/// Priority: CLI override > environment variable > PATH search
pub fn resolve_bin(name: &str, cli: Option<&Path>, env_var: &str) -> Result<PathBuf> {
    if let Some(p) = cli {
        if p.exists() {
            return Ok(p.to_path_buf());
        }
        // bare names such as `python3` are still looked up on PATH
        if p.components().count() == 1 {
            if let Ok(found) = which::which(p) {
                return Ok(found);
            }
        }
        return Err(anyhow!("{name} not found at {:?}", p));
    }
    if let Some(envp) = std::env::var_os(env_var) {
        return Ok(PathBuf::from(envp));
    }
    which::which(name)
        .map_err(|_| anyhow!("{name} not found (pass its path, set {env_var}, or add it to PATH)"))
}

/// CRISPR-Analyser lives under its installation directory.
pub fn resolve_crispr_analyser(install: Option<&Path>) -> Result<PathBuf> {
    match install {
        Some(dir) => {
            let bin = dir.join("bin").join("crispr_analyser");
            if bin.exists() {
                Ok(bin)
            } else {
                Err(anyhow!(
                    "crispr_analyser not found at {:?}; check --wge-path",
                    bin
                ))
            }
        }
        None => resolve_bin("crispr_analyser", None, "BESTIMATE_CRISPR_ANALYSER"),
    }
}

pub fn get_version(bin: &Path) -> Result<String> {
    let out = Command::new(bin)
        .arg("--version")
        .output()
        .with_context(|| format!("spawn {} --version", bin.display()))?;
    let stdout = String::from_utf8_lossy(&out.stdout);
    if let Some(line) = stdout.lines().next() {
        return Ok(line.trim().to_string());
    }
    // python2 and some tools report on stderr
    let stderr = String::from_utf8_lossy(&out.stderr);
    Ok(stderr.lines().next().unwrap_or_default().trim().to_string())
}

/// One external tool run: what to execute and which files it must leave behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolInvocation {
    pub tool: String,
    pub program: PathBuf,
    pub args: Vec<String>,
    pub produces: Vec<PathBuf>,
}

impl ToolInvocation {
    pub fn new(tool: &str, program: &Path) -> Self {
        Self {
            tool: tool.to_string(),
            program: program.to_path_buf(),
            args: Vec::new(),
            produces: Vec::new(),
        }
    }

    pub fn arg(mut self, a: impl Into<String>) -> Self {
        self.args.push(a.into());
        self
    }

    pub fn path_arg(self, p: &Path) -> Self {
        let s = p.display().to_string();
        self.arg(s)
    }

    pub fn produces(mut self, p: PathBuf) -> Self {
        self.produces.push(p);
        self
    }

    /// Expected outputs not present on disk.
    pub fn missing_outputs(&self) -> Vec<&Path> {
        self.produces
            .iter()
            .filter(|p| !p.exists())
            .map(PathBuf::as_path)
            .collect()
    }
}

impl fmt::Display for ToolInvocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program.display())?;
        for a in &self.args {
            write!(f, " {a}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolOutcome {
    pub success: bool,
    pub code: Option<i32>,
}

impl ToolOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            code: Some(0),
        }
    }

    pub fn describe(&self) -> String {
        match self.code {
            Some(c) => format!("exit code {c}"),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Seam between the pipeline stages and the processes they start.
pub trait ToolRunner {
    fn run(&self, inv: &ToolInvocation) -> Result<ToolOutcome>;
}

/// Spawns the process in the caller's working directory and blocks on its
/// exit notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemRunner;

impl ToolRunner for SystemRunner {
    fn run(&self, inv: &ToolInvocation) -> Result<ToolOutcome> {
        log::info!("{}: {}", inv.tool, inv);
        let mut cmd = Command::new(&inv.program);
        cmd.args(&inv.args);
        let status = cmd
            .status()
            .with_context(|| format!("failed to spawn {}", inv.program.display()))?;
        Ok(ToolOutcome {
            success: status.success(),
            code: status.code(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_bin_errors_when_missing() {
        let err = resolve_bin(
            "curl",
            Some(Path::new("/definitely/not/here")),
            "BESTIMATE_CURL",
        )
        .unwrap_err();
        assert!(err.to_string().contains("curl"), "message mentions curl");
    }

    #[test]
    fn crispr_analyser_under_install_dir() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_crispr_analyser(Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("--wge-path"));

        fs_err::create_dir_all(dir.path().join("bin")).unwrap();
        fs_err::write(dir.path().join("bin/crispr_analyser"), "").unwrap();
        let bin = resolve_crispr_analyser(Some(dir.path())).unwrap();
        assert!(bin.ends_with("bin/crispr_analyser"));
    }

    #[test]
    fn invocation_reports_missing_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("a.csv");
        fs_err::write(&present, "x").unwrap();
        let inv = ToolInvocation::new("gather", Path::new("python3"))
            .arg("-i")
            .path_arg(Path::new("in.fa"))
            .produces(present)
            .produces(dir.path().join("b.csv"));
        let missing = inv.missing_outputs();
        assert_eq!(missing.len(), 1);
        assert!(missing[0].ends_with("b.csv"));
        assert_eq!(inv.to_string(), "python3 -i in.fa");
    }

    #[cfg(unix)]
    #[test]
    fn system_runner_reports_exit_status() {
        let ok = SystemRunner
            .run(&ToolInvocation::new("true", Path::new("true")))
            .unwrap();
        assert!(ok.success);
        let bad = SystemRunner
            .run(&ToolInvocation::new("false", Path::new("false")))
            .unwrap();
        assert!(!bad.success);
        assert_eq!(bad.describe(), "exit code 1");
    }
}
