//! Lexical path helpers shared by the loaders and the dispatcher.

use std::path::{Component, Path, PathBuf};

/// Collapses `.` and `..` components without touching the filesystem.
pub(crate) fn normalize_path(path: &Path) -> PathBuf {
    let mut components = Vec::new();

    for component in path.components() {
        match component {
            Component::ParentDir => {
                if !components.is_empty()
                    && !matches!(
                        components.last(),
                        Some(Component::RootDir) | Some(Component::Prefix(_))
                    )
                {
                    components.pop();
                }
            }
            Component::CurDir => {}
            c => components.push(c),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

/// Makes `path` absolute against the process working directory.
pub(crate) fn absolute(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    match std::env::current_dir() {
        Ok(cwd) => normalize_path(&cwd.join(path)),
        Err(_) => normalize_path(path),
    }
}

/// Joins `name` onto `base` and makes the result absolute.
pub(crate) fn resolve(base: &Path, name: impl AsRef<Path>) -> PathBuf {
    absolute(&base.join(name))
}

/// Replaces a leading `~` with the user's home directory.
pub(crate) fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" {
        if let Some(home) = super::home_dir() {
            return home;
        }
    } else if let Some(rest) = raw.strip_prefix("~/")
        && let Some(home) = super::home_dir()
    {
        return home.join(rest);
    }
    PathBuf::from(raw)
}

/// Compares two paths after making both absolute; falls back to canonical
/// forms so a symlinked spelling of the same file still matches.
pub(crate) async fn same_file(a: &Path, b: &Path) -> bool {
    if absolute(a) == absolute(b) {
        return true;
    }
    match tokio::join!(tokio::fs::canonicalize(a), tokio::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path() {
        assert_eq!(
            normalize_path(Path::new("/a/b/../c")),
            PathBuf::from("/a/c")
        );
        assert_eq!(normalize_path(Path::new("/a/./b")), PathBuf::from("/a/b"));
        assert_eq!(
            normalize_path(Path::new("/a/b/../../../c")),
            PathBuf::from("/c")
        );
    }

    #[test]
    fn test_resolve_relative_base() {
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(
            resolve(Path::new("./sample"), "settings.json"),
            normalize_path(&cwd.join("sample/settings.json"))
        );
    }

    #[test]
    fn test_resolve_absolute_name_wins() {
        assert_eq!(
            resolve(Path::new("/base"), "/etc/plugins/a.js"),
            PathBuf::from("/etc/plugins/a.js")
        );
    }

    #[test]
    fn test_expand_home() {
        assert_eq!(expand_home("plugins"), PathBuf::from("plugins"));
        if let Some(home) = crate::common::home_dir() {
            assert_eq!(expand_home("~/plugins"), home.join("plugins"));
            assert_eq!(expand_home("~"), home);
        }
    }

    #[tokio::test]
    async fn test_same_file_via_symlink() {
        let dir = tempfile::tempdir().unwrap();
        let real = dir.path().join("real.js");
        std::fs::write(&real, "").unwrap();
        assert!(same_file(&real, &dir.path().join("./real.js")).await);

        #[cfg(unix)]
        {
            let link = dir.path().join("link.js");
            std::os::unix::fs::symlink(&real, &link).unwrap();
            assert!(same_file(&real, &link).await);
        }

        assert!(!same_file(&real, &dir.path().join("other.js")).await);
    }
}
