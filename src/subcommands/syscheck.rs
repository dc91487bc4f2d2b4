//! `bestimate syscheck` — environment & external tool versions.

use anyhow::Result;
use clap::Args;
use fs_err as fs;
use std::path::{Path, PathBuf};
use sysinfo::System;

use crate::util::tools;

#[derive(Args, Debug)]
pub struct CmdSyscheck {
    #[arg(long)]
    pub out: Option<PathBuf>,
    /// Optional explicit curl binary
    #[arg(long, value_name = "PATH")]
    pub curl: Option<PathBuf>,
    /// Optional explicit python interpreter
    #[arg(long, value_name = "PATH")]
    pub python: Option<PathBuf>,
    /// CRISPR-Analyser installation directory
    #[arg(long, value_name = "DIR")]
    pub wge_path: Option<PathBuf>,
}

fn describe(resolved: Result<PathBuf>, version: fn(&Path) -> Result<String>) -> serde_json::Value {
    match resolved {
        Ok(path) => {
            let v = version(&path).unwrap_or_else(|e| format!("error: {e}"));
            serde_json::json!({ "path": path, "version": v })
        }
        Err(e) => serde_json::json!({ "path": null, "error": e.to_string() }),
    }
}

impl CmdSyscheck {
    pub fn run(self) -> Result<()> {
        let mut s = System::new_all();
        s.refresh_all();

        let curl = tools::resolve_bin("curl", self.curl.as_deref(), "BESTIMATE_CURL");
        let python = tools::resolve_bin("python3", self.python.as_deref(), "BESTIMATE_PYTHON");
        let analyser = tools::resolve_crispr_analyser(self.wge_path.as_deref());

        let obj = serde_json::json!({
            "bestimate_version": env!("CARGO_PKG_VERSION"),
            "cpus": s.cpus().len(),
            "total_memory_mb": s.total_memory() / 1024 / 1024,
            "executables": {
                "curl": describe(curl, tools::get_version),
                "python": describe(python, tools::get_version),
                "crispr_analyser": describe(analyser, |p| Ok(p.display().to_string())),
            },
        });

        if let Some(path) = self.out {
            serde_json::to_writer_pretty(fs::File::create(path)?, &obj)?;
        } else {
            println!("{}", serde_json::to_string_pretty(&obj)?);
        }
        Ok(())
    }
}
