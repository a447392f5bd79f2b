//! Command implementations.

mod deps;
mod list;
mod ops;
mod render;
mod vars;
mod watch;

pub use deps::DepsCommand;
pub use list::ListCommand;
pub use ops::OpsCommand;
pub use render::RenderCommand;
pub use vars::VarsCommand;
pub use watch::WatchCommand;
