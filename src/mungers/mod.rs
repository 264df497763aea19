//! Munger system
//!
//! Mungers are independent plugins that act on pull requests. They register
//! by name, a subset is activated at startup, and every eligible PR is run
//! through the active ones in activation order.
//!
//! ## Key Components
//!
//! - [`Munger`] - Trait every munger implements
//! - [`MungerRegistry`] - Registration, activation and the per-cycle hook
//! - [`munge_issue`] - Per-item fetch/wait/enrich/dispatch pipeline
//! - [`MergeabilityPolicy`] - Bounded wait for GitHub's mergeability computation
//! - [`SummaryMunger`] - Built-in munger that logs a digest per PR
//!
//! ## Example
//!
//! ```rust,ignore
//! use mungehub::mungers::{MungerRegistry, SummaryMunger, MergeabilityPolicy, munge_issue};
//!
//! let mut registry = MungerRegistry::new();
//! registry.register_or_fatal(Box::new(SummaryMunger::new()));
//! registry.activate(&["summary".to_string()], &config).await?;
//!
//! registry.run_each_loop(&config).await?;
//! let outcome = munge_issue(&registry, &config, &MergeabilityPolicy::default(), obj).await?;
//! ```

mod process;
mod registry;
mod summary;
mod traits;

pub use process::{
    MergeabilityPolicy, MungeOutcome, PrResolution, ProcessError, munge_issue,
    resolve_pull_request,
};
pub use registry::{MungerRegistry, RegistryError};
pub use summary::SummaryMunger;
pub use traits::{Munger, MungerError};

/// Registry pre-populated with every built-in munger
pub fn builtin_registry() -> MungerRegistry {
    let mut registry = MungerRegistry::new();
    registry.register_or_fatal(Box::new(SummaryMunger::new()));
    registry
}
