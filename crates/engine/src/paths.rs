//! Finding the project root and its `assets/` folder at startup.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

pub const ROOT_ENV_VAR: &str = "TILEQUEST_ROOT";
const ASSETS_DIR: &str = "assets";

#[derive(Debug, Clone)]
pub struct AppPaths {
    pub root: PathBuf,
    pub assets_dir: PathBuf,
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to read environment variable {var}: {source}")]
    EnvVar {
        var: &'static str,
        #[source]
        source: env::VarError,
    },
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] std::io::Error),
    #[error("asset directory not found at {path}")]
    MissingAssetsDir { path: PathBuf },
    #[error("{var} does not point at a project root (Cargo.toml plus assets/ or crates/): {path}")]
    InvalidEnvRoot { var: &'static str, path: PathBuf },
    #[error(
        "no project root above {start_dir}; set {var} to the directory holding Cargo.toml and assets/"
    )]
    RootNotFound { start_dir: PathBuf, var: &'static str },
}

/// Uses `TILEQUEST_ROOT` when set, otherwise the nearest ancestor of the
/// executable that looks like a project root.
pub fn resolve_app_paths() -> Result<AppPaths, StartupError> {
    let root = match env::var(ROOT_ENV_VAR) {
        Ok(value) => explicit_root(Path::new(&value))?,
        Err(env::VarError::NotPresent) => {
            let exe = env::current_exe().map_err(StartupError::CurrentExe)?;
            discover_root(&exe)?
        }
        Err(source) => {
            return Err(StartupError::EnvVar {
                var: ROOT_ENV_VAR,
                source,
            })
        }
    };

    let assets_dir = root.join(ASSETS_DIR);
    if !assets_dir.is_dir() {
        return Err(StartupError::MissingAssetsDir { path: assets_dir });
    }
    Ok(AppPaths { root, assets_dir })
}

fn explicit_root(path: &Path) -> Result<PathBuf, StartupError> {
    let path = canonical(path);
    if looks_like_root(&path) {
        Ok(path)
    } else {
        Err(StartupError::InvalidEnvRoot {
            var: ROOT_ENV_VAR,
            path,
        })
    }
}

fn discover_root(exe: &Path) -> Result<PathBuf, StartupError> {
    let start = exe.parent().unwrap_or(exe);
    start
        .ancestors()
        .find(|dir| looks_like_root(dir))
        .map(canonical)
        .ok_or_else(|| StartupError::RootNotFound {
            start_dir: canonical(start),
            var: ROOT_ENV_VAR,
        })
}

fn looks_like_root(dir: &Path) -> bool {
    dir.join("Cargo.toml").is_file()
        && [ASSETS_DIR, "crates"].iter().any(|sub| dir.join(sub).is_dir())
}

fn canonical(path: &Path) -> PathBuf {
    fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn project(with_assets: bool) -> TempDir {
        let dir = TempDir::new().expect("temp dir");
        fs::write(dir.path().join("Cargo.toml"), "[workspace]\n").expect("manifest");
        if with_assets {
            fs::create_dir(dir.path().join("assets")).expect("assets dir");
        }
        dir
    }

    #[test]
    fn manifest_alone_is_not_a_root() {
        let dir = project(false);
        assert!(!looks_like_root(dir.path()));
    }

    #[test]
    fn root_is_found_above_the_executable() {
        let dir = project(true);
        let bin = dir.path().join("target/debug");
        fs::create_dir_all(&bin).expect("bin dir");

        let root = discover_root(&bin.join("game")).expect("root found");

        assert_eq!(root, canonical(dir.path()));
    }

    #[test]
    fn explicit_root_must_look_like_a_project() {
        let dir = project(false);

        let error = explicit_root(dir.path()).expect_err("not a root");

        assert!(matches!(error, StartupError::InvalidEnvRoot { .. }));
    }
}
