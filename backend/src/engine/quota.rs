use super::error::MergeError;

/// Ceiling used when no other policy is configured.
pub const DEFAULT_EMAIL_QUOTA: usize = 1000;

/// Source of the outbound email capacity for the current period.
pub trait QuotaPolicy {
    fn remaining_email_quota(&self) -> usize;
}

/// A static ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedQuota(pub usize);

impl Default for FixedQuota {
    fn default() -> Self {
        FixedQuota(DEFAULT_EMAIL_QUOTA)
    }
}

impl QuotaPolicy for FixedQuota {
    fn remaining_email_quota(&self) -> usize {
        self.0
    }
}

/// Rejects a batch that would send more emails than the policy allows.
pub fn ensure_capacity(policy: &dyn QuotaPolicy, requested: usize) -> Result<(), MergeError> {
    let remaining = policy.remaining_email_quota();
    if requested > remaining {
        return Err(MergeError::QuotaExceeded {
            requested,
            remaining,
        });
    }
    Ok(())
}
