//! External command templates
//!
//! Both the native exporter and the converter are external programs. A
//! [`CommandSpec`] holds the program plus an argument template where
//! `{name}` placeholders are substituted per invocation.

use std::path::Path;
use std::process::Command;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Longest stderr excerpt kept in an error
const MAX_STDERR_LEN: usize = 2000;

/// Errors from running an external program
#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Failed to launch {program}: {source}")]
    Launch {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} failed with status {code:?}: {stderr}")]
    Failed {
        program: String,
        code: Option<i32>,
        stderr: String,
    },
}

/// Program and argument template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandSpec {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, args: &[&str]) -> Self {
        Self {
            program: program.into(),
            args: args.iter().map(|a| a.to_string()).collect(),
        }
    }

    /// Whether any argument uses the `{key}` placeholder
    pub fn references(&self, key: &str) -> bool {
        let placeholder = format!("{{{}}}", key);
        self.args.iter().any(|a| a.contains(&placeholder))
    }

    /// Substitute placeholders in every argument.
    ///
    /// Each argument is scanned once, so substituted values are never
    /// expanded again. Unknown placeholders and stray braces stay as written.
    pub fn expand(&self, vars: &[(&str, String)]) -> Vec<String> {
        self.args.iter().map(|arg| expand_one(arg, vars)).collect()
    }

    /// Run the command to completion, capturing its output
    pub fn run(&self, vars: &[(&str, String)]) -> Result<(), CommandError> {
        let args = self.expand(vars);
        debug!(program = %self.program, args = ?args, "Running external command");

        let output = Command::new(&self.program)
            .args(&args)
            .output()
            .map_err(|source| CommandError::Launch {
                program: self.program.clone(),
                source,
            })?;

        if !output.status.success() {
            let mut stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.len() > MAX_STDERR_LEN {
                let mut cut = stderr.len() - MAX_STDERR_LEN;
                while !stderr.is_char_boundary(cut) {
                    cut += 1;
                }
                stderr = format!("...{}", &stderr[cut..]);
            }
            return Err(CommandError::Failed {
                program: self.program.clone(),
                code: output.status.code(),
                stderr,
            });
        }

        Ok(())
    }
}

fn expand_one(arg: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(arg.len());
    let mut rest = arg;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let key = &after[..close];
        match vars.iter().find(|(k, _)| *k == key) {
            Some((_, value)) => out.push_str(value),
            None => out.push_str(&rest[open..open + close + 2]),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Render a path for use as a command argument
pub(crate) fn path_arg(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
