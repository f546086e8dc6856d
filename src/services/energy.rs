use std::future::Future;

#[derive(Debug, thiserror::Error)]
#[error("energy ledger error: {0}")]
pub struct EnergyError(pub String);

/// Spendable per-user balance gating AI-backed features. The check and the
/// deduction are one atomic operation at this boundary: `try_deduct` either
/// takes the full amount or takes nothing, so two concurrent spenders can
/// never drive a balance negative or both succeed off one balance check.
pub trait EnergyLedger: Send + Sync {
    fn balance(&self, user_id: &str) -> impl Future<Output = Result<i64, EnergyError>> + Send;

    /// Returns `true` and deducts `amount` iff the balance covers it.
    fn try_deduct(
        &self,
        user_id: &str,
        amount: i64,
    ) -> impl Future<Output = Result<bool, EnergyError>> + Send;

    /// Compensating credit, used when a mint fails after a deduction.
    fn credit(&self, user_id: &str, amount: i64)
        -> impl Future<Output = Result<(), EnergyError>> + Send;
}
