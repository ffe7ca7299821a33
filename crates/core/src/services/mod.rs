pub mod batch;
pub mod providers;
pub mod resolver;

pub use batch::{run_batch, run_batch_within, BatchOptions, RunReport, RunSummary};
pub use resolver::{
    Provider, ProviderError, ProviderRegistry, ResolveError, ResolveOptions, Resolver,
};
