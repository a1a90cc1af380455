//! Secret references in configuration values.
//!
//! Credential fields in `config.toml` may point somewhere else instead of
//! holding the secret itself:
//!
//! - `env::VAR_NAME` reads `$VAR_NAME`
//! - `pass::path/in/store` runs `pass show path/in/store` and keeps the first line
//! - `file::/path/to/secret` reads the first line of a file
//! - anything else is taken literally

use std::path::PathBuf;
use std::process::Command;

use thiserror::Error;

/// A secret reference that could not be resolved.
#[derive(Debug, Error)]
pub enum SecretError {
    #[error("environment variable `{0}` is not set")]
    MissingEnv(String),

    #[error("failed to run `pass show {path}`: {source}")]
    PassSpawn {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`pass show {path}` failed ({status}): {stderr}")]
    PassFailed {
        path: String,
        status: String,
        stderr: String,
    },

    #[error("failed to read secret file {}: {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} produced an empty secret")]
    Empty(String),
}

/// Resolves `value`, following any `env::`, `pass::` or `file::` prefix.
pub fn resolve(value: &str) -> Result<String, SecretError> {
    if let Some(var) = value.strip_prefix("env::") {
        std::env::var(var).map_err(|_| SecretError::MissingEnv(var.to_string()))
    } else if let Some(path) = value.strip_prefix("pass::") {
        from_pass(path)
    } else if let Some(path) = value.strip_prefix("file::") {
        from_file(path)
    } else {
        Ok(value.to_string())
    }
}

fn from_pass(path: &str) -> Result<String, SecretError> {
    let output = Command::new("pass")
        .arg("show")
        .arg(path)
        .output()
        .map_err(|source| SecretError::PassSpawn {
            path: path.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(SecretError::PassFailed {
            path: path.to_string(),
            status: output.status.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    first_line(&String::from_utf8_lossy(&output.stdout))
        .ok_or_else(|| SecretError::Empty(format!("`pass show {}`", path)))
}

fn from_file(path: &str) -> Result<String, SecretError> {
    let path = crate::config::expand_home(path);
    let content = std::fs::read_to_string(&path).map_err(|source| SecretError::File {
        path: path.clone(),
        source,
    })?;
    first_line(&content).ok_or_else(|| SecretError::Empty(path.display().to_string()))
}

fn first_line(text: &str) -> Option<String> {
    text.lines()
        .next()
        .map(|line| line.trim_end().to_string())
        .filter(|line| !line.is_empty())
}
