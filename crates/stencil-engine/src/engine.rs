//! The template engine: scanning, caching and rendering of entry templates.

use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{Map, Value as Json};
use stencil_common_config::StencilConfig;
use stencil_value::OperationRegistry;
use tracing::{debug, debug_span, info, warn};
use walkdir::WalkDir;

use crate::bundle::{Bundle, BundleCompiler};
use crate::error::{EngineError, Result};
use crate::path::{from_logical_name, normalize, to_logical_name};
use crate::scope::{Params, VariableScope};

#[derive(Default)]
struct EngineState {
    parsed: bool,
    bundles: HashMap<String, Arc<Bundle>>,
    scope: VariableScope,
}

/// Compiles entry templates into bundles and renders them.
///
/// One engine is shared by concurrent renders. Rendering a cached bundle
/// takes the state lock for reading only; scans, compiles and reloads take
/// it for writing.
pub struct Engine {
    config: StencilConfig,
    root: PathBuf,
    operations: Arc<OperationRegistry>,
    state: RwLock<EngineState>,
}

impl Engine {
    /// Create an engine with the built-in operations.
    pub fn new(config: StencilConfig) -> Result<Self> {
        Self::with_operations(config, OperationRegistry::with_builtins())
    }

    /// Create an engine with a custom operation registry.
    pub fn with_operations(config: StencilConfig, operations: OperationRegistry) -> Result<Self> {
        let root = &config.templates.root;
        let root = if root.is_absolute() {
            normalize(root)
        } else {
            let cwd = std::env::current_dir().map_err(|e| EngineError::io(root, e))?;
            normalize(cwd.join(root))
        };
        debug!(root = %root.display(), "created template engine");
        Ok(Self {
            config,
            root,
            operations: Arc::new(operations),
            state: RwLock::new(EngineState::default()),
        })
    }

    /// Absolute template root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &StencilConfig {
        &self.config
    }

    pub fn operations(&self) -> &OperationRegistry {
        &self.operations
    }

    /// Scan the root and compile every entry template.
    ///
    /// Every entry is attempted. The first compile failure is returned after
    /// the scan completes; entries that compiled stay cached.
    pub fn parse(&self) -> Result<()> {
        let mut state = self.write()?;
        let failures = self.scan(&mut state)?;
        match failures.into_iter().next() {
            Some((_, err)) => Err(err),
            None => Ok(()),
        }
    }

    /// Compile (or recompile) one template file as an entry.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<Arc<Bundle>> {
        let path = self.absolute(path.as_ref());
        let name = to_logical_name(&path, &self.root)?;
        let mut state = self.write()?;
        self.compile_into(&mut state, &path, &name)
    }

    /// Render the entry template `name` with caller parameters merged over
    /// declared defaults.
    pub fn render(&self, name: &str, params: &Params) -> Result<Vec<u8>> {
        self.render_to_string(name, params).map(String::into_bytes)
    }

    /// Like [`Engine::render`], returning text.
    pub fn render_to_string(&self, name: &str, params: &Params) -> Result<String> {
        let _span = debug_span!("render", template = name).entered();
        self.ensure_parsed()?;

        let (bundle, params) = self.prepare(name, params)?;
        let data = Json::Object(
            params
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect::<Map<String, Json>>(),
        );
        let output = bundle.render(&data)?;
        debug!(template = name, bytes = output.len(), "rendered template");
        Ok(output)
    }

    /// The cached bundle for `name`, if compiled.
    pub fn bundle(&self, name: &str) -> Result<Option<Arc<Bundle>>> {
        Ok(self.read()?.bundles.get(name).cloned())
    }

    /// Logical names of every cached bundle, sorted.
    pub fn bundle_names(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.read()?.bundles.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    /// Descendants recorded for the entry `name`.
    pub fn descendants(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.read()?.scope.descendants(name).to_vec())
    }

    /// Parameters a render of `name` would see.
    pub fn effective_params(&self, name: &str, params: &Params) -> Result<Params> {
        Ok(self.read()?.scope.effective_params(name, params))
    }

    /// Recompile every cached bundle built from the file `name`.
    ///
    /// A new entry file is compiled and a deleted one is dropped. Returns the
    /// bundles that were rebuilt, sorted. Bundles that fail to recompile keep
    /// their previous version.
    pub fn invalidate(&self, name: &str) -> Result<Vec<String>> {
        let mut state = self.write()?;

        let mut affected: Vec<String> = state
            .bundles
            .values()
            .filter(|b| b.contains(name))
            .map(|b| b.name().to_string())
            .collect();

        let path = from_logical_name(name, &self.root);
        if self.is_entry(&path) {
            if !path.is_file() {
                if state.bundles.remove(name).is_some() {
                    state.scope.remove_entry(name);
                    info!(template = name, "dropped deleted template");
                }
                affected.retain(|n| n != name);
            } else if state.parsed && !affected.iter().any(|n| n == name) {
                affected.push(name.to_string());
            }
        }
        affected.sort();

        let mut rebuilt = Vec::with_capacity(affected.len());
        for entry in affected {
            let entry_path = from_logical_name(&entry, &self.root);
            match self.compile_into(&mut state, &entry_path, &entry) {
                Ok(_) => rebuilt.push(entry),
                Err(err) => warn!(
                    template = %entry,
                    error = %err,
                    "recompile failed, keeping previous bundle"
                ),
            }
        }
        debug!(changed = name, rebuilt = rebuilt.len(), "invalidated templates");
        Ok(rebuilt)
    }

    /// Whether `path` may be rendered by name: it carries the template
    /// extension and sits outside every excluded directory.
    pub fn is_entry(&self, path: &Path) -> bool {
        let templates = &self.config.templates;
        let Ok(relative) = path.strip_prefix(&self.root) else {
            return false;
        };
        let mut parts = relative.components().peekable();
        while let Some(part) = parts.next() {
            let Component::Normal(part) = part else {
                return false;
            };
            let part = part.to_string_lossy();
            if parts.peek().is_none() {
                return templates.matches_extension(&part);
            }
            if templates.is_excluded(&part) {
                return false;
            }
        }
        false
    }

    fn ensure_parsed(&self) -> Result<()> {
        if self.read()?.parsed {
            return Ok(());
        }
        let mut state = self.write()?;
        if !state.parsed {
            for (name, err) in self.scan(&mut state)? {
                warn!(template = %name, error = %err, "failed to compile template");
            }
        }
        Ok(())
    }

    /// The bundle to render and its effective parameters, compiling on
    /// demand when hot reload is on or the bundle is not cached.
    fn prepare(&self, name: &str, params: &Params) -> Result<(Arc<Bundle>, Params)> {
        if !self.config.templates.hot_reload {
            let state = self.read()?;
            if let Some(bundle) = state.bundles.get(name) {
                return Ok((Arc::clone(bundle), state.scope.effective_params(name, params)));
            }
        }

        let mut state = self.write()?;
        let path = from_logical_name(name, &self.root);
        let canonical = to_logical_name(&path, &self.root).ok();
        if canonical.as_deref() != Some(name) || !self.is_entry(&path) || !path.is_file() {
            if state.bundles.remove(name).is_some() {
                state.scope.remove_entry(name);
            }
            return Err(EngineError::TemplateNotFound(name.to_string()));
        }
        let bundle = self.compile_into(&mut state, &path, name)?;
        Ok((bundle, state.scope.effective_params(name, params)))
    }

    /// Walk the root, compiling every entry. Returns per-entry failures.
    fn scan(&self, state: &mut EngineState) -> Result<Vec<(String, EngineError)>> {
        let _span = debug_span!("parse", root = %self.root.display()).entered();
        let mut failures = Vec::new();
        for path in self.entries()? {
            let name = to_logical_name(&path, &self.root)?;
            if let Err(err) = self.compile_into(state, &path, &name) {
                failures.push((name, err));
            }
        }
        state.parsed = true;
        info!(
            bundles = state.bundles.len(),
            failed = failures.len(),
            "parsed template root"
        );
        Ok(failures)
    }

    fn entries(&self) -> Result<Vec<PathBuf>> {
        let templates = &self.config.templates;
        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| {
                !(e.file_type().is_dir() && templates.is_excluded(&e.file_name().to_string_lossy()))
            });

        let mut entries = Vec::new();
        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file()
                && templates.matches_extension(&entry.file_name().to_string_lossy())
            {
                entries.push(entry.into_path());
            }
        }
        Ok(entries)
    }

    fn compile_into(
        &self,
        state: &mut EngineState,
        path: &Path,
        name: &str,
    ) -> Result<Arc<Bundle>> {
        let compiled = BundleCompiler::new(
            &self.root,
            &self.config.templates,
            &self.operations,
            self.config.diagnostics,
        )
        .compile(path, name)?;

        for (file, decl) in &compiled.declarations {
            if !state.scope.declare(file, &decl.name, &decl.literal) {
                debug!(template = %file, variable = %decl.name, "keeping earlier declaration");
            }
        }
        let bundle = Arc::new(compiled.bundle);
        state.scope.set_descendants(name, bundle.descendants().to_vec());
        state.bundles.insert(name.to_string(), Arc::clone(&bundle));
        Ok(bundle)
    }

    fn absolute(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            normalize(path)
        } else {
            normalize(self.root.join(path))
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, EngineState>> {
        self.state.read().map_err(|_| EngineError::Lock)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, EngineState>> {
        self.state.write().map_err(|_| EngineError::Lock)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("root", &self.root)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
