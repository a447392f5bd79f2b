//! Compiled bundles: an entry template plus everything it pulls in.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use handlebars::Handlebars;
use serde_json::Value as Json;
use stencil_common_config::TemplatesConfig;
use stencil_value::{DiagnosticPolicy, OperationRegistry};
use tracing::{debug, debug_span};

use crate::directive::VarDecl;
use crate::error::Result;
use crate::graph::DependencyGraphBuilder;
use crate::helpers;
use crate::path::to_logical_name;

/// The executable form of one entry template.
pub struct Bundle {
    name: String,
    path: PathBuf,
    descendants: Vec<String>,
    registry: Handlebars<'static>,
}

impl Bundle {
    /// Logical name of the entry template.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Logical names of every template merged into this bundle, in
    /// resolution order. The entry itself is not included.
    pub fn descendants(&self) -> &[String] {
        &self.descendants
    }

    /// Whether `name` is the entry or one of its descendants.
    pub fn contains(&self, name: &str) -> bool {
        self.name == name || self.descendants.iter().any(|d| d == name)
    }

    /// Logical names of every registered template, entry first.
    pub fn templates(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str()).chain(self.descendants.iter().map(String::as_str))
    }

    /// Execute the entry template against `data`.
    pub fn render(&self, data: &Json) -> Result<String> {
        Ok(self.registry.render(&self.name, data)?)
    }
}

impl fmt::Debug for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bundle")
            .field("name", &self.name)
            .field("path", &self.path)
            .field("descendants", &self.descendants)
            .finish()
    }
}

/// Output of a successful compile.
///
/// Declarations are returned rather than applied so that a failed compile
/// leaves no trace in the variable scope.
#[derive(Debug)]
pub struct Compiled {
    pub bundle: Bundle,
    /// `(logical name, declaration)` for every contributing file, in
    /// dependency order with the entry last.
    pub declarations: Vec<(String, VarDecl)>,
}

/// Builds bundles for entry templates under one root.
pub struct BundleCompiler<'a> {
    root: &'a Path,
    config: &'a TemplatesConfig,
    operations: &'a Arc<OperationRegistry>,
    policy: DiagnosticPolicy,
}

impl<'a> BundleCompiler<'a> {
    pub fn new(
        root: &'a Path,
        config: &'a TemplatesConfig,
        operations: &'a Arc<OperationRegistry>,
        policy: DiagnosticPolicy,
    ) -> Self {
        Self {
            root,
            config,
            operations,
            policy,
        }
    }

    /// Compile `entry` into a bundle named `name`.
    pub fn compile(&self, entry: &Path, name: &str) -> Result<Compiled> {
        let _span = debug_span!("compile", template = name).entered();

        let mut graph = DependencyGraphBuilder::new(self.root);
        let dependencies = graph.resolve(entry)?;

        let mut registry = Handlebars::new();
        registry.set_strict_mode(self.config.strict_variables);
        if !self.config.escape_html {
            registry.register_escape_fn(handlebars::no_escape);
        }
        helpers::register_all(&mut registry, self.operations, self.policy);

        let mut descendants = Vec::with_capacity(dependencies.len());
        let mut declarations = Vec::new();
        for path in dependencies.iter().map(PathBuf::as_path).chain(std::iter::once(entry)) {
            let logical = if path == entry {
                name.to_string()
            } else {
                to_logical_name(path, self.root)?
            };
            let parsed = graph.load(path)?;
            registry.register_template_string(&logical, &parsed.body)?;
            declarations.extend(parsed.vars.iter().map(|v| (logical.clone(), v.clone())));
            if path != entry {
                descendants.push(logical);
            }
        }

        debug!(
            template = name,
            descendants = descendants.len(),
            declarations = declarations.len(),
            "compiled bundle"
        );

        Ok(Compiled {
            bundle: Bundle {
                name: name.to_string(),
                path: entry.to_path_buf(),
                descendants,
                registry,
            },
            declarations,
        })
    }
}
