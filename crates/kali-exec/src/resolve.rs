//! Search-path resolution for program names.
//!
//! Resolution never spawns a process. Bare names are looked up in each `PATH`
//! entry and must be executable regular files; names containing a path
//! separator are taken as given and only need to exist, so the spawn step can
//! report a precise permission error for them.

use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

/// Resolves `program` against the current `PATH`.
#[must_use]
pub fn resolve_program(program: &str) -> Option<PathBuf> {
    let search_path = env::var_os("PATH")?;
    resolve_in(program, &search_path)
}

/// Resolves `program` against an explicit search path value.
#[must_use]
pub fn resolve_in(program: &str, search_path: &OsStr) -> Option<PathBuf> {
    if program.trim().is_empty() {
        return None;
    }

    let candidate = Path::new(program);
    if candidate.components().count() > 1 || candidate.is_absolute() {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }

    env::split_paths(search_path)
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(|dir| dir.join(program))
        .find(|path| is_executable(path))
}

#[cfg(unix)]
fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .is_ok_and(|meta| meta.is_file() && meta.permissions().mode() & 0o111 != 0)
}

#[cfg(not(unix))]
fn is_executable(path: &Path) -> bool {
    path.is_file()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    #[cfg(unix)]
    fn write_script(dir: &Path, name: &str, mode: u32) -> PathBuf {
        use std::os::unix::fs::PermissionsExt;

        let path = dir.join(name);
        fs::write(&path, "#!/bin/sh\nexit 0\n").expect("write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(mode)).expect("chmod");
        path
    }

    #[cfg(unix)]
    #[test]
    fn finds_executable_on_search_path() {
        let dir = TempDir::new().expect("temp dir");
        let script = write_script(dir.path(), "hashid", 0o755);
        let resolved = resolve_in("hashid", dir.path().as_os_str());
        assert_eq!(resolved, Some(script));
    }

    #[cfg(unix)]
    #[test]
    fn skips_non_executable_files() {
        let dir = TempDir::new().expect("temp dir");
        write_script(dir.path(), "john", 0o644);
        assert_eq!(resolve_in("john", dir.path().as_os_str()), None);
    }

    #[test]
    fn missing_program_is_unresolved() {
        let dir = TempDir::new().expect("temp dir");
        assert_eq!(
            resolve_in("definitely-not-installed", dir.path().as_os_str()),
            None
        );
    }

    #[test]
    fn empty_program_is_unresolved() {
        assert_eq!(resolve_in("", OsStr::new("/usr/bin")), None);
    }

    #[cfg(unix)]
    #[test]
    fn explicit_paths_only_need_to_exist() {
        let dir = TempDir::new().expect("temp dir");
        let script = write_script(dir.path(), "not-executable", 0o644);
        let program = script.to_str().expect("utf8 path");
        assert_eq!(resolve_in(program, OsStr::new("")), Some(script.clone()));
    }
}
