// Title lookup - cache, strategies, extractors and the fallback orchestrator

pub mod cache;
pub mod errors;
pub mod extractors;
pub mod invoker;
pub mod models;
pub mod orchestrator;
pub mod strategy;
pub mod tools;
pub mod utils;

pub use cache::TitleCache;
pub use errors::{ExtractError, ValidationError};
pub use invoker::Invoker;
pub use models::{AttemptResult, FailureDetail, FetchOutcome, StrategyFailure};
pub use orchestrator::TitleOrchestrator;
pub use strategy::{
    default_strategies, ExtractorKind, InvocationEnv, InvocationSpec, StrategyDescriptor, UrlPolicy,
};
