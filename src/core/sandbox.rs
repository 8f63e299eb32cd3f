//! Directory browsing confined to a single safe root.
//!
//! Every path this module hands back is the root itself or one of its
//! descendants. Requests that resolve elsewhere are redirected to the root
//! rather than rejected, so a browser client always has something to show.

use std::fs;
use std::path::{Component, Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use super::models::{DirectoryEntry, EntryKind, Listing};

#[derive(Debug, Error)]
pub enum SandboxError {
    #[error("sandbox root {path} is not usable: {source}")]
    InvalidRoot {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sandbox root is not a directory: {0}")]
    NotADirectory(PathBuf),
}

#[derive(Debug, Clone)]
pub struct PathSandbox {
    /// Canonical form of the configured root.
    root: PathBuf,
}

impl PathSandbox {
    /// Create a sandbox rooted at `root`, which must be an existing directory.
    pub fn new(root: impl AsRef<Path>) -> Result<Self, SandboxError> {
        let root = root.as_ref();
        let canonical = fs::canonicalize(root).map_err(|source| SandboxError::InvalidRoot {
            path: root.to_path_buf(),
            source,
        })?;

        if !canonical.is_dir() {
            return Err(SandboxError::NotADirectory(canonical));
        }

        Ok(Self { root: canonical })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Canonicalize `requested` (relative paths are taken against `base`).
    ///
    /// Anything that lands outside the root resolves to the root itself.
    /// A path that does not exist resolves to its nearest existing ancestor.
    pub fn resolve(&self, requested: &Path, base: &Path) -> PathBuf {
        if requested.as_os_str().is_empty() {
            return self.root.clone();
        }

        // Joining an absolute path replaces the base
        let joined = base.join(requested);

        match canonicalize_existing(&joined) {
            Some(canonical) if self.contains(&canonical) => canonical,
            Some(canonical) => {
                debug!(
                    requested = %requested.display(),
                    resolved = %canonical.display(),
                    "Path outside sandbox, using root"
                );
                self.root.clone()
            }
            None => self.root.clone(),
        }
    }

    /// List the direct children of `path`, folders first.
    ///
    /// A file path lists its parent directory. Unreadable entries are
    /// skipped, and an unreadable directory yields an empty listing.
    pub fn list(&self, path: &Path) -> Listing {
        let mut current = self.resolve(path, &self.root);
        if !current.is_dir() {
            current = match current.parent() {
                Some(parent) if self.contains(parent) => parent.to_path_buf(),
                _ => self.root.clone(),
            };
        }

        let items = read_entries(&current);

        let parent_path = if current == self.root {
            None
        } else {
            current.parent().map(Path::to_path_buf)
        };

        Listing {
            current_path: current,
            parent_path,
            items,
        }
    }

    fn contains(&self, path: &Path) -> bool {
        path.starts_with(&self.root)
    }
}

/// Canonicalize `path`, or failing that its closest ancestor that exists.
///
/// `..` after a missing component cancels that component; `..` over an
/// existing prefix steps to its real parent.
fn canonicalize_existing(path: &Path) -> Option<PathBuf> {
    if let Ok(canonical) = fs::canonicalize(path) {
        return Some(canonical);
    }

    let mut current = PathBuf::new();
    let mut missing = 0usize;
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir if missing > 0 => missing -= 1,
            Component::ParentDir => {
                current.pop();
            }
            other if missing == 0 => match fs::canonicalize(current.join(other)) {
                Ok(canonical) => current = canonical,
                Err(_) => missing += 1,
            },
            _ => missing += 1,
        }
    }

    (!current.as_os_str().is_empty()).then_some(current)
}

fn read_entries(dir: &Path) -> Vec<DirectoryEntry> {
    let reader = match fs::read_dir(dir) {
        Ok(reader) => reader,
        Err(e) => {
            warn!(path = %dir.display(), error = %e, "Cannot read directory");
            return Vec::new();
        }
    };

    let mut items: Vec<DirectoryEntry> = reader
        .filter_map(|entry| entry.ok())
        .map(|entry| {
            let path = entry.path();
            // Follows symlinks; broken links count as files
            let kind = match fs::metadata(&path) {
                Ok(meta) if meta.is_dir() => EntryKind::Folder,
                _ => EntryKind::File,
            };
            DirectoryEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                kind,
            }
        })
        .collect();

    items.sort_by(|a, b| {
        let a_key = (a.kind != EntryKind::Folder, a.name.to_lowercase());
        let b_key = (b.kind != EntryKind::Folder, b.name.to_lowercase());
        a_key.cmp(&b_key).then_with(|| a.name.cmp(&b.name))
    });

    items
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(listing: &Listing) -> Vec<&str> {
        listing.items.iter().map(|e| e.name.as_str()).collect()
    }

    #[test]
    fn test_new_rejects_missing_root() {
        let dir = tempdir().unwrap();
        assert!(matches!(
            PathSandbox::new(dir.path().join("missing")),
            Err(SandboxError::InvalidRoot { .. })
        ));
    }

    #[test]
    fn test_new_rejects_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("f.txt");
        fs::write(&file, b"x").unwrap();
        assert!(matches!(
            PathSandbox::new(&file),
            Err(SandboxError::NotADirectory(_))
        ));
    }

    #[test]
    fn test_traversal_falls_back_to_root() {
        let dir = tempdir().unwrap();
        let home = dir.path().join("home").join("u");
        fs::create_dir_all(&home).unwrap();
        let sandbox = PathSandbox::new(&home).unwrap();

        let resolved = sandbox.resolve(Path::new("../../etc"), sandbox.root());
        assert_eq!(resolved, sandbox.root());

        let resolved = sandbox.resolve(Path::new("/"), sandbox.root());
        assert_eq!(resolved, sandbox.root());
    }

    #[test]
    fn test_sibling_with_shared_prefix_is_outside() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("u")).unwrap();
        fs::create_dir_all(dir.path().join("u2")).unwrap();
        let sandbox = PathSandbox::new(dir.path().join("u")).unwrap();

        let resolved = sandbox.resolve(&dir.path().join("u2"), sandbox.root());
        assert_eq!(resolved, sandbox.root());
    }

    #[test]
    fn test_resolve_inside_root() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a/b")).unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let resolved = sandbox.resolve(Path::new("a/./b/../b"), sandbox.root());
        assert_eq!(resolved, sandbox.root().join("a/b"));

        let resolved = sandbox.resolve(Path::new(""), sandbox.root());
        assert_eq!(resolved, sandbox.root());
    }

    #[test]
    fn test_missing_path_resolves_to_existing_ancestor() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("a")).unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let resolved = sandbox.resolve(Path::new("a/missing/deeper"), sandbox.root());
        assert_eq!(resolved, sandbox.root().join("a"));
    }

    #[test]
    fn test_parent_steps_after_missing_component_apply() {
        let dir = tempdir().unwrap();
        let root = dir.path().join("root");
        fs::create_dir_all(root.join("a/b")).unwrap();
        let sandbox = PathSandbox::new(&root).unwrap();

        let resolved = sandbox.resolve(Path::new("a/missing/.."), sandbox.root());
        assert_eq!(resolved, sandbox.root().join("a"));

        let resolved = sandbox.resolve(Path::new("a/missing/../b"), sandbox.root());
        assert_eq!(resolved, sandbox.root().join("a/b"));

        // Climbs past the root, so falls back to it
        let resolved = sandbox.resolve(Path::new("a/missing/../../.."), sandbox.root());
        assert_eq!(resolved, sandbox.root());
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_lists_empty() {
        use std::os::unix::fs::PermissionsExt;

        // Root ignores permission bits
        if nix::unistd::Uid::effective().is_root() {
            eprintln!("Skipping test: running as root");
            return;
        }

        let dir = tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::write(locked.join("secret.txt"), b"s").unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let listing = sandbox.list(&sandbox.root().join("locked"));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(listing.items.is_empty());
        assert_eq!(listing.current_path, sandbox.root().join("locked"));
        assert_eq!(listing.parent_path.as_deref(), Some(sandbox.root()));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape_falls_back_to_root() {
        let outside = tempdir().unwrap();
        let dir = tempdir().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let resolved = sandbox.resolve(Path::new("link"), sandbox.root());
        assert_eq!(resolved, sandbox.root());
    }

    #[test]
    fn test_listing_orders_folders_first_case_insensitive() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"b").unwrap();
        fs::create_dir(dir.path().join("A")).unwrap();
        fs::write(dir.path().join("a.txt"), b"a").unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let listing = sandbox.list(sandbox.root());
        assert_eq!(names(&listing), vec!["A", "a.txt", "b.txt"]);
        assert_eq!(listing.items[0].kind, EntryKind::Folder);
        assert_eq!(listing.items[1].kind, EntryKind::File);
        assert_eq!(listing.items[0].path, sandbox.root().join("A"));
    }

    #[test]
    fn test_root_has_no_parent() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let listing = sandbox.list(sandbox.root());
        assert_eq!(listing.current_path, sandbox.root());
        assert_eq!(listing.parent_path, None);

        let listing = sandbox.list(&sandbox.root().join("sub"));
        assert_eq!(listing.current_path, sandbox.root().join("sub"));
        assert_eq!(listing.parent_path.as_deref(), Some(sandbox.root()));
    }

    #[test]
    fn test_listing_a_file_lists_its_directory() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/notes.md"), b"n").unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let listing = sandbox.list(&sandbox.root().join("sub/notes.md"));
        assert_eq!(listing.current_path, sandbox.root().join("sub"));
        assert_eq!(names(&listing), vec!["notes.md"]);
    }

    #[test]
    fn test_listing_outside_root_lists_root() {
        let outside = tempdir().unwrap();
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("inside.txt"), b"i").unwrap();
        let sandbox = PathSandbox::new(dir.path()).unwrap();

        let listing = sandbox.list(outside.path());
        assert_eq!(listing.current_path, sandbox.root());
        assert_eq!(names(&listing), vec!["inside.txt"]);
    }
}
