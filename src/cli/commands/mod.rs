//! One module per subcommand.

pub mod completions;
pub mod create;
pub mod delete;
pub mod list;
pub mod lock;
pub mod receive;
pub mod remove;
pub mod share;
pub mod store;
pub mod unlock;
pub mod version;
pub mod view;
