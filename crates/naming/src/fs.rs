//! Filesystem-backed naming context
//!
//! Directories are contexts and regular files are text entries, so a tree
//! such as `env/db/host` containing `localhost` reads as `db.host`.

use crate::{Entry, NamingContext, NamingError, NamingResult};
use std::path::{Path, PathBuf};

/// Naming context over a directory
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsContext {
    root: PathBuf,
}

impl FsContext {
    /// Context rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The directory this context reads
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_of(&self, name: &str) -> NamingResult<PathBuf> {
        let mut components = Path::new(name).components();
        match (components.next(), components.next()) {
            (Some(std::path::Component::Normal(_)), None) => Ok(self.root.join(name)),
            _ => Err(NamingError::invalid_name(
                name,
                "expected a single path component",
            )),
        }
    }
}

impl NamingContext for FsContext {
    fn lookup(&self, name: &str) -> NamingResult<Entry> {
        let path = self.path_of(name)?;
        let metadata = match std::fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(NamingError::name_not_found(name));
            }
            Err(e) => return Err(NamingError::io(&path, &e)),
        };

        if metadata.is_dir() {
            return Ok(Entry::context(FsContext::new(path)));
        }
        if !metadata.is_file() {
            return Ok(Entry::Opaque);
        }

        let bytes = std::fs::read(&path).map_err(|e| NamingError::io(&path, &e))?;
        match String::from_utf8(bytes) {
            Ok(text) => Ok(Entry::Text(text.trim().to_string())),
            Err(_) => Ok(Entry::Opaque),
        }
    }

    fn list(&self) -> NamingResult<Vec<String>> {
        let entries = std::fs::read_dir(&self.root).map_err(|e| NamingError::io(&self.root, &e))?;
        let mut names = Vec::new();
        for entry in entries {
            let Ok(entry) = entry else {
                continue;
            };
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }
        names.sort();
        Ok(names)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_directories_and_files() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("db")).unwrap();
        fs::write(dir.path().join("db").join("host"), "localhost\n").unwrap();
        fs::write(dir.path().join("blob"), [0xff, 0xfe, 0x00]).unwrap();

        let ctx = FsContext::new(dir.path());
        assert_eq!(ctx.list().unwrap(), ["blob", "db"]);
        assert!(matches!(ctx.lookup("blob"), Ok(Entry::Opaque)));

        let Ok(Entry::Context(db)) = ctx.lookup("db") else {
            panic!("db should be a context");
        };
        assert!(matches!(db.lookup("host"), Ok(Entry::Text(ref t)) if t == "localhost"));
    }

    #[test]
    fn test_bad_names() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FsContext::new(dir.path());
        assert!(matches!(ctx.lookup("missing"), Err(NamingError::NameNotFound { .. })));
        assert!(matches!(ctx.lookup("../etc"), Err(NamingError::InvalidName { .. })));
        assert!(matches!(ctx.lookup("a/b"), Err(NamingError::InvalidName { .. })));
    }

    #[test]
    fn test_missing_root_cannot_list() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = FsContext::new(dir.path().join("nope"));
        assert!(matches!(ctx.list(), Err(NamingError::Io { .. })));
    }
}
