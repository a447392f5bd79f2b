//! Test utilities for stencil crates.

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Creates a temporary directory that is cleaned up on drop.
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Creates a temporary file with given content.
pub fn temp_file(content: &str) -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("test_file");
    std::fs::write(&path, content).expect("Failed to write temp file");
    (dir, path)
}

/// A throwaway template root populated file by file.
///
/// ```
/// use stencil_test_utils::TemplateTree;
///
/// let tree = TemplateTree::new()
///     .file("page.tmpl", "{{extends \"layouts/base.tmpl\"}}")
///     .file("layouts/base.tmpl", "<html></html>");
/// assert!(tree.path("layouts/base.tmpl").is_file());
/// ```
#[derive(Debug)]
pub struct TemplateTree {
    dir: TempDir,
}

impl TemplateTree {
    pub fn new() -> Self {
        Self { dir: temp_dir() }
    }

    /// Add a file, creating parent directories.
    pub fn file(self, name: &str, content: &str) -> Self {
        self.write(name, content);
        self
    }

    /// Create or overwrite a file in place.
    pub fn write(&self, name: &str, content: &str) {
        let path = self.path(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create template dir");
        }
        std::fs::write(&path, content).expect("Failed to write template");
    }

    pub fn remove(&self, name: &str) {
        std::fs::remove_file(self.path(name)).expect("Failed to remove template");
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Absolute path of a `/`-separated name under the root.
    pub fn path(&self, name: &str) -> PathBuf {
        name.split('/').fold(self.root().to_path_buf(), |p, part| p.join(part))
    }
}

impl Default for TemplateTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Assert that a Result is Ok and return the value.
#[macro_export]
macro_rules! assert_ok {
    ($expr:expr) => {
        match $expr {
            Ok(v) => v,
            Err(e) => panic!("Expected Ok, got Err: {:?}", e),
        }
    };
}

/// Assert that a Result is Err and return the error.
#[macro_export]
macro_rules! assert_err {
    ($expr:expr) => {
        match $expr {
            Ok(v) => panic!("Expected Err, got Ok: {:?}", v),
            Err(e) => e,
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_temp_file_creation() {
        let content = "test content";
        let (_dir, path) = temp_file(content);
        assert!(path.is_file());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }

    #[test]
    fn test_template_tree_lifecycle() {
        let tree = TemplateTree::new().file("a/b/c.tmpl", "one");
        assert_eq!(std::fs::read_to_string(tree.path("a/b/c.tmpl")).unwrap(), "one");

        tree.write("a/b/c.tmpl", "two");
        assert_eq!(std::fs::read_to_string(tree.path("a/b/c.tmpl")).unwrap(), "two");

        tree.remove("a/b/c.tmpl");
        assert!(!tree.path("a/b/c.tmpl").exists());
        assert!(tree.path("a/b").is_dir());
    }

    #[test]
    fn test_assert_macros() {
        let ok: Result<i32, String> = Ok(3);
        assert_eq!(assert_ok!(ok), 3);
        let err: Result<i32, String> = Err("bad".to_string());
        assert_eq!(assert_err!(err), "bad");
    }

    proptest! {
        #[test]
        fn test_template_content_roundtrip(content in "\\PC*") {
            let tree = TemplateTree::new().file("t.tmpl", &content);
            let read = std::fs::read_to_string(tree.path("t.tmpl")).unwrap();
            prop_assert_eq!(content, read);
        }
    }
}
