// TitleExtractor trait

use async_trait::async_trait;

use crate::lookup::errors::ExtractError;
use crate::lookup::strategy::InvocationSpec;

/// Trait for title extractors
///
/// Implementations may ignore cancellation entirely: the invoker enforces
/// the deadline by dropping the returned future, so anything holding an
/// external resource must release it on drop.
#[async_trait]
pub trait TitleExtractor: Send + Sync {
    /// Name of the extractor (for logging and status)
    fn name(&self) -> &'static str;

    /// Check if this extractor is available
    ///
    /// May run an external command; callers bound it with a deadline.
    async fn is_available(&self) -> bool;

    /// Extract the raw title for a prepared invocation
    async fn extract_title(&self, invocation: &InvocationSpec) -> Result<String, ExtractError>;
}
