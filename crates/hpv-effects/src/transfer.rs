//! Native value transfer handlers

use async_trait::async_trait;
use hpv_core::effects::ValueTransfer;
use hpv_core::{Address, Amount, HpvError, HpvResult};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct TreasuryState {
    reserve: Amount,
    balances: HashMap<Address, Amount>,
}

/// Funded treasury paying claims out of a reserve.
///
/// Transfers fail with `TransferFailed` when the reserve cannot cover them,
/// which is how an underfunded rewards contract behaves.
#[derive(Debug, Clone, Default)]
pub struct MemoryTreasury {
    state: Arc<RwLock<TreasuryState>>,
}

impl MemoryTreasury {
    /// Create a treasury holding `reserve`
    pub fn with_reserve(reserve: Amount) -> Self {
        Self {
            state: Arc::new(RwLock::new(TreasuryState {
                reserve,
                balances: HashMap::new(),
            })),
        }
    }

    /// Add funds to the reserve
    pub async fn fund(&self, amount: Amount) -> HpvResult<()> {
        let mut state = self.state.write().await;
        state.reserve = state
            .reserve
            .checked_add(amount)
            .ok_or_else(|| HpvError::overflow("treasury reserve"))?;
        Ok(())
    }

    /// Remaining reserve
    pub async fn reserve(&self) -> Amount {
        self.state.read().await.reserve
    }

    /// Total paid out to `account`
    pub async fn balance_of(&self, account: &Address) -> Amount {
        self.state
            .read()
            .await
            .balances
            .get(account)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ValueTransfer for MemoryTreasury {
    async fn transfer(&self, to: Address, amount: Amount) -> HpvResult<()> {
        let mut state = self.state.write().await;
        if state.reserve < amount {
            return Err(HpvError::transfer_failed(format!(
                "reserve {} cannot cover {amount}",
                state.reserve
            )));
        }
        let balance = state.balances.get(&to).copied().unwrap_or(0);
        let credited = balance
            .checked_add(amount)
            .ok_or_else(|| HpvError::overflow("recipient balance"))?;
        state.reserve -= amount;
        state.balances.insert(to, credited);
        tracing::debug!(recipient = %to, amount, "Treasury transfer");
        Ok(())
    }
}
