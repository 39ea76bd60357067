#[derive(Clone, Debug)]
pub struct PremiumGrant {
    pub user_id: u64,
    pub expires_at: u64,
    pub granted_by: u64,
    pub granted_at: u64,
}

impl PremiumGrant {
    pub fn is_active(&self, now: u64) -> bool {
        self.expires_at > now
    }
}

/// Compute the new expiry for a grant of `duration_seconds`.
///
/// Time left on an active grant is kept; an expired or missing grant starts
/// counting from `now`.
pub fn extended_expiry(current_expiry: Option<u64>, now: u64, duration_seconds: u64) -> u64 {
    current_expiry
        .filter(|expiry| *expiry > now)
        .unwrap_or(now)
        .saturating_add(duration_seconds)
}

#[cfg(test)]
mod tests {
    use super::{PremiumGrant, extended_expiry};

    #[test]
    fn fresh_grant_starts_now() {
        assert_eq!(extended_expiry(None, 1_000, 60), 1_060);
    }

    #[test]
    fn active_grant_is_extended() {
        assert_eq!(extended_expiry(Some(5_000), 1_000, 60), 5_060);
    }

    #[test]
    fn expired_grant_restarts_from_now() {
        assert_eq!(extended_expiry(Some(900), 1_000, 60), 1_060);
    }

    #[test]
    fn back_to_back_grants_stack() {
        let first = extended_expiry(None, 1_000, 60);
        assert_eq!(extended_expiry(Some(first), 1_000, 60), 1_120);
    }

    #[test]
    fn expiry_saturates() {
        assert_eq!(extended_expiry(Some(u64::MAX - 1), 0, 60), u64::MAX);
    }

    #[test]
    fn active_is_strictly_before_expiry() {
        let grant = PremiumGrant {
            user_id: 1,
            expires_at: 100,
            granted_by: 2,
            granted_at: 0,
        };
        assert!(grant.is_active(99));
        assert!(!grant.is_active(100));
    }
}
