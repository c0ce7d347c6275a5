use async_trait::async_trait;

use crate::platform::ShareUrl;

use super::{MediaReference, StrategyError};

#[async_trait]
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the strategy can run at all (credentials set, binary present).
    async fn available(&self) -> bool {
        true
    }

    /// `Ok(None)` means the strategy ran but found nothing usable.
    async fn attempt(&self, url: &ShareUrl) -> Result<Option<MediaReference>, StrategyError>;
}
