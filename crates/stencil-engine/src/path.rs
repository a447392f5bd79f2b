//! Mapping between file paths and logical template names.

use std::path::{Component, Path, PathBuf};

use crate::error::{EngineError, Result};

/// Resolve `.` and `..` components without touching the filesystem.
pub fn normalize(path: impl AsRef<Path>) -> PathBuf {
    let mut components = Vec::new();

    for component in path.as_ref().components() {
        match component {
            Component::Prefix(_) | Component::RootDir => components.push(component),
            Component::CurDir => {}
            Component::ParentDir => match components.last() {
                Some(Component::Normal(_)) => {
                    components.pop();
                }
                Some(Component::Prefix(_) | Component::RootDir) => {}
                _ => components.push(component),
            },
            Component::Normal(_) => components.push(component),
        }
    }

    if components.is_empty() {
        PathBuf::from(".")
    } else {
        components.iter().collect()
    }
}

/// The root-relative, `/`-separated name of `path`, extension included.
///
/// Relative paths are taken relative to `root`.
pub fn to_logical_name(path: impl AsRef<Path>, root: impl AsRef<Path>) -> Result<String> {
    let root = normalize(root);
    let path = path.as_ref();
    let path = if path.is_absolute() {
        normalize(path)
    } else {
        normalize(root.join(path))
    };

    let outside = || EngineError::PathOutsideRoot {
        path: path.clone(),
        root: root.clone(),
    };
    let relative = path.strip_prefix(&root).map_err(|_| outside())?;

    let parts = relative
        .components()
        .map(|c| match c {
            Component::Normal(part) => Ok(part.to_string_lossy().into_owned()),
            _ => Err(outside()),
        })
        .collect::<Result<Vec<_>>>()?;

    if parts.is_empty() {
        return Err(outside());
    }
    Ok(parts.join("/"))
}

/// The absolute path of a logical name under `root`.
pub fn from_logical_name(name: &str, root: impl AsRef<Path>) -> PathBuf {
    let mut path = root.as_ref().to_path_buf();
    for part in name.split('/').filter(|p| !p.is_empty()) {
        path.push(part);
    }
    normalize(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("./a/b/../c", "a/c")]
    #[test_case("a/./b", "a/b")]
    #[test_case("../../a/b", "../../a/b")]
    #[test_case("/a/../../b", "/b")]
    #[test_case("", ".")]
    fn test_normalize(input: &str, expected: &str) {
        assert_eq!(normalize(input), PathBuf::from(expected));
    }

    #[test]
    fn test_logical_name() {
        assert_eq!(
            to_logical_name("/site/templates/page.tmpl", "/site/templates").unwrap(),
            "page.tmpl"
        );
        assert_eq!(
            to_logical_name("/site/templates/layouts/../layouts/base.tmpl", "/site/templates/")
                .unwrap(),
            "layouts/base.tmpl"
        );
        assert_eq!(
            to_logical_name("partials/nav.tmpl", "/site/templates").unwrap(),
            "partials/nav.tmpl"
        );
    }

    #[test]
    fn test_logical_name_outside_root() {
        let err = to_logical_name("/site/other/page.tmpl", "/site/templates").unwrap_err();
        assert!(matches!(err, EngineError::PathOutsideRoot { .. }));
        assert!(to_logical_name("../escape.tmpl", "/site/templates").is_err());
        assert!(to_logical_name("/site/templates", "/site/templates").is_err());
    }

    #[test]
    fn test_from_logical_name() {
        assert_eq!(
            from_logical_name("layouts/base.tmpl", "/site/templates"),
            PathBuf::from("/site/templates/layouts/base.tmpl")
        );
    }
}
