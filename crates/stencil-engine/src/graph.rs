//! Dependency discovery across `extends` and `template` directives.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::directive::{self, ParsedTemplate};
use crate::error::{EngineError, Result};
use crate::path::{from_logical_name, to_logical_name};

/// Resolves the flattened dependency list of an entry template.
///
/// Every file is read and scanned at most once per builder; the parsed
/// sources stay available for the compile pass that follows.
#[derive(Debug)]
pub struct DependencyGraphBuilder<'a> {
    root: &'a Path,
    sources: HashMap<PathBuf, ParsedTemplate>,
}

impl<'a> DependencyGraphBuilder<'a> {
    pub fn new(root: &'a Path) -> Self {
        Self {
            root,
            sources: HashMap::new(),
        }
    }

    /// Absolute paths of every template `entry` depends on, deduplicated with
    /// the first occurrence kept.
    ///
    /// Each direct dependency is followed immediately by its own
    /// dependencies, before the next direct dependency.
    pub fn resolve(&mut self, entry: &Path) -> Result<Vec<PathBuf>> {
        let mut stack = Vec::new();
        let mut resolved = Vec::new();
        self.visit(entry, &mut stack, &mut resolved)?;
        debug!(
            entry = %entry.display(),
            dependencies = resolved.len(),
            "resolved template dependencies"
        );
        Ok(resolved)
    }

    fn visit(
        &mut self,
        path: &Path,
        stack: &mut Vec<PathBuf>,
        resolved: &mut Vec<PathBuf>,
    ) -> Result<()> {
        stack.push(path.to_path_buf());
        let root = self.root;
        let dependencies: Vec<PathBuf> = self
            .load(path)?
            .dependencies()
            .map(|name| from_logical_name(name, root))
            .collect();

        for dependency in dependencies {
            if let Some(start) = stack.iter().position(|p| *p == dependency) {
                let mut cycle: Vec<String> =
                    stack[start..].iter().map(|p| self.display_name(p)).collect();
                cycle.push(self.display_name(&dependency));
                return Err(EngineError::DependencyCycle(cycle));
            }
            if resolved.contains(&dependency) {
                continue;
            }
            resolved.push(dependency.clone());
            self.visit(&dependency, stack, resolved)?;
        }

        stack.pop();
        Ok(())
    }

    /// Read and scan `path`, reusing an earlier scan when there is one.
    pub fn load(&mut self, path: &Path) -> Result<&ParsedTemplate> {
        if !self.sources.contains_key(path) {
            let name = self.display_name(path);
            let text = fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
            let parsed = directive::parse(&name, &text)?;
            self.sources.insert(path.to_path_buf(), parsed);
        }
        self.sources
            .get(path)
            .ok_or_else(|| EngineError::TemplateNotFound(path.display().to_string()))
    }

    fn display_name(&self, path: &Path) -> String {
        to_logical_name(path, self.root).unwrap_or_else(|_| path.display().to_string())
    }
}
