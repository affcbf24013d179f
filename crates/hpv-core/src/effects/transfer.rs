//! Native value transfer effect

use crate::errors::HpvResult;
use crate::types::{Address, Amount};
use async_trait::async_trait;

/// Pays out native currency.
///
/// Called by the reward ledger only after the claimant's balance has been
/// zeroed and committed. A failure is reported as `HpvError::TransferFailed`.
#[async_trait]
pub trait ValueTransfer: Send + Sync {
    /// Send `amount` to `to`
    async fn transfer(&self, to: Address, amount: Amount) -> HpvResult<()>;
}
