//! Template dependency resolution and bundle compilation.
//!
//! An [`Engine`] scans a template root, resolves each entry template's
//! `extends` and `template` directives into a flattened dependency list,
//! and compiles the entry plus its dependencies into one cached
//! [`Bundle`]. Defaults declared in `var` blocks are merged under the
//! caller's parameters at render time.
//!
//! ```no_run
//! use stencil_common_config::StencilConfig;
//! use stencil_engine::{Engine, Params};
//!
//! let engine = Engine::new(StencilConfig::default())?;
//! let page = engine.render_to_string("page.tmpl", &Params::new())?;
//! # Ok::<(), stencil_engine::EngineError>(())
//! ```

pub mod bundle;
pub mod directive;
pub mod engine;
pub mod error;
pub mod graph;
pub mod helpers;
pub mod literal;
pub mod path;
pub mod scope;
pub mod watcher;

pub use bundle::{Bundle, BundleCompiler, Compiled};
pub use directive::{ParsedTemplate, VarDecl};
pub use engine::Engine;
pub use error::{EngineError, Result};
pub use graph::DependencyGraphBuilder;
pub use literal::parse_literal;
pub use path::{from_logical_name, normalize, to_logical_name};
pub use scope::{Params, VariableScope};
pub use watcher::{ChangeKind, TemplateWatcher, WatchEvent};
