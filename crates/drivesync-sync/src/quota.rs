//! Quota pre-check for pushes.

use anyhow::Result;

use crate::engine::Engine;

/// How close a projected push brings the account to its quota.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaStatus {
    /// Under half the quota.
    Barely,
    /// Between 50% and 80%.
    HalfwayExceeded,
    /// Between 80% and 100%.
    AlmostExceeded,
    /// At or past the quota.
    Exceeded,
    /// Total quota unknown; no judgement possible.
    Unknown,
}

/// Categorizes `projected` additional bytes against current usage.
pub fn categorize(projected: u64, used: u64, total: u64) -> QuotaStatus {
    if total == 0 {
        return QuotaStatus::Unknown;
    }
    let to_be_used = projected.saturating_add(used);
    if to_be_used >= total {
        return QuotaStatus::Exceeded;
    }
    let fraction = to_be_used as f64 / total as f64;
    if fraction < 0.5 {
        QuotaStatus::Barely
    } else if fraction < 0.8 {
        QuotaStatus::HalfwayExceeded
    } else {
        QuotaStatus::AlmostExceeded
    }
}

impl Engine {
    /// Checks where the projected transfer would land the account.
    pub async fn quota_status(&self, projected: u64) -> Result<QuotaStatus> {
        let about = self.about().await?;
        Ok(categorize(projected, about.quota_used, about.quota_total))
    }
}
