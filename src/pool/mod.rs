//! Bounded worker pool: dispatch tasks, run them on workers, gather results.

pub mod aggregator;
pub mod channel;
pub mod coordinator;
pub mod dispatcher;
pub mod types;
pub mod worker;

pub use aggregator::*;
pub use channel::*;
pub use coordinator::*;
pub use dispatcher::*;
pub use types::*;
pub use worker::*;
