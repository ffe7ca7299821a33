pub mod fetch;
pub mod inventory;
pub mod project;
pub mod providers;
pub mod slug;
pub mod util;

pub use fetch::*;
pub use inventory::*;
pub use project::*;
pub use providers::*;
pub use slug::*;
pub use util::*;
