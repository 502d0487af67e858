//! Lock types, durations, and lock-state derivation.
//!
//! A lock is a time-bounded (or permanent) exclusive claim on a lead by one
//! dealer. The store never hard-enforces single-row exclusivity; whether a
//! lead is locked is *computed* from the most recent non-expired row, so all
//! activity checks must agree on one predicate: a lock is active when
//! `expires_at` is NULL (permanent) or strictly in the future.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Lock type id type matching SMALLINT in the database.
pub type LockTypeId = i16;

/// Grace-lock duration granted to the buyer after a confirmed purchase.
pub const POST_PURCHASE_LOCK_HOURS: i64 = 24;

// ---------------------------------------------------------------------------
// Lock type
// ---------------------------------------------------------------------------

/// The enumerated lock products a dealer can hold on a lead.
///
/// Wire names match the client vocabulary (`24hours`, `1week`, `permanent`,
/// `purchase_lock`); database ids are stable SMALLINT codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LockType {
    /// 24-hour exclusive hold.
    #[serde(rename = "24hours")]
    Temporary24h = 1,
    /// One-week exclusive hold.
    #[serde(rename = "1week")]
    Temporary1Week = 2,
    /// Never expires on its own; only release or a competing purchase ends it.
    #[serde(rename = "permanent")]
    Permanent = 3,
    /// Automatic grace lock created by reconciliation after a purchase.
    #[serde(rename = "purchase_lock")]
    PurchaseLock = 4,
}

impl LockType {
    /// Return the database lock type id.
    pub fn id(self) -> LockTypeId {
        self as LockTypeId
    }

    /// Look up a lock type from its database id.
    pub fn from_id(id: LockTypeId) -> Option<Self> {
        match id {
            1 => Some(Self::Temporary24h),
            2 => Some(Self::Temporary1Week),
            3 => Some(Self::Permanent),
            4 => Some(Self::PurchaseLock),
            _ => None,
        }
    }

    /// Lock lifetime. `None` means the lock never expires on its own.
    pub fn duration(self) -> Option<Duration> {
        match self {
            Self::Temporary24h => Some(Duration::hours(24)),
            Self::Temporary1Week => Some(Duration::weeks(1)),
            Self::Permanent => None,
            Self::PurchaseLock => Some(Duration::hours(POST_PURCHASE_LOCK_HOURS)),
        }
    }

    /// Whether acquiring this lock type requires a completed payment
    /// reference. `purchase_lock` is created only by reconciliation and
    /// carries no charge of its own.
    pub fn requires_payment(self) -> bool {
        !matches!(self, Self::PurchaseLock)
    }

    /// Expiry timestamp for a lock of this type acquired at `now`.
    /// `None` is the permanent sentinel (nullable column).
    pub fn expiry_from(self, now: Timestamp) -> Option<Timestamp> {
        self.duration().map(|d| now + d)
    }

    /// Whether a live lock of this type held by *another* dealer makes the
    /// lead contested for pricing. Only the temporary holds qualify: a
    /// permanent lock is settled exclusivity, and a post-purchase grace
    /// lock means purchase state, not lock state, governs the lead.
    pub fn contests_pricing(self) -> bool {
        matches!(self, Self::Temporary24h | Self::Temporary1Week)
    }

    /// Human-readable label for display.
    pub fn label(self) -> &'static str {
        match self {
            Self::Temporary24h => "24 hours",
            Self::Temporary1Week => "1 week",
            Self::Permanent => "permanent",
            Self::PurchaseLock => "purchase lock",
        }
    }
}

// ---------------------------------------------------------------------------
// Activity predicate
// ---------------------------------------------------------------------------

/// Whether a lock row with the given expiry is active at `now`.
///
/// NULL expiry means permanent and always active. The comparison is strict:
/// a lock whose `expires_at` equals `now` is already expired, which is what
/// lets `release` and forced expiry work by setting `expires_at = now`.
pub fn is_lock_active(expires_at: Option<Timestamp>, now: Timestamp) -> bool {
    match expires_at {
        None => true,
        Some(at) => at > now,
    }
}

// ---------------------------------------------------------------------------
// Derived lock status
// ---------------------------------------------------------------------------

/// The requester-relative lock state of a lead, derived from the most recent
/// active lock row (if any).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockStatus {
    pub is_locked: bool,
    pub lock_type: Option<LockType>,
    pub expires_at: Option<Timestamp>,
    /// True when the active lock belongs to the requesting dealer. Governs
    /// whether the lead reads as "mine" versus "blocked by someone else".
    pub is_own_lock: bool,
}

impl LockStatus {
    /// No active lock.
    pub fn unlocked() -> Self {
        Self {
            is_locked: false,
            lock_type: None,
            expires_at: None,
            is_own_lock: false,
        }
    }

    /// Derive the status from the latest active lock row.
    pub fn from_active_lock(
        holder: DbId,
        lock_type: LockType,
        expires_at: Option<Timestamp>,
        requester: DbId,
    ) -> Self {
        Self {
            is_locked: true,
            lock_type: Some(lock_type),
            expires_at,
            is_own_lock: holder == requester,
        }
    }

    /// True when the lead is locked by a dealer other than the requester.
    pub fn blocked_for_requester(&self) -> bool {
        self.is_locked && !self.is_own_lock
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    // -- LockType ids round-trip --

    #[test]
    fn lock_type_ids_round_trip() {
        for lt in [
            LockType::Temporary24h,
            LockType::Temporary1Week,
            LockType::Permanent,
            LockType::PurchaseLock,
        ] {
            assert_eq!(LockType::from_id(lt.id()), Some(lt));
        }
    }

    #[test]
    fn unknown_lock_type_id_is_none() {
        assert_eq!(LockType::from_id(0), None);
        assert_eq!(LockType::from_id(99), None);
    }

    #[test]
    fn wire_names_match_client_vocabulary() {
        assert_eq!(
            serde_json::to_string(&LockType::Temporary24h).unwrap(),
            "\"24hours\""
        );
        assert_eq!(
            serde_json::to_string(&LockType::Temporary1Week).unwrap(),
            "\"1week\""
        );
        assert_eq!(
            serde_json::to_string(&LockType::Permanent).unwrap(),
            "\"permanent\""
        );
        assert_eq!(
            serde_json::to_string(&LockType::PurchaseLock).unwrap(),
            "\"purchase_lock\""
        );
        let parsed: LockType = serde_json::from_str("\"1week\"").unwrap();
        assert_eq!(parsed, LockType::Temporary1Week);
    }

    // -- Durations --

    #[test]
    fn durations() {
        assert_eq!(LockType::Temporary24h.duration(), Some(Duration::hours(24)));
        assert_eq!(LockType::Temporary1Week.duration(), Some(Duration::weeks(1)));
        assert_eq!(LockType::Permanent.duration(), None);
        assert_eq!(
            LockType::PurchaseLock.duration(),
            Some(Duration::hours(POST_PURCHASE_LOCK_HOURS))
        );
    }

    #[test]
    fn permanent_expiry_is_none() {
        let now = Utc::now();
        assert_eq!(LockType::Permanent.expiry_from(now), None);
        assert_eq!(
            LockType::Temporary24h.expiry_from(now),
            Some(now + Duration::hours(24))
        );
    }

    #[test]
    fn purchase_lock_is_free() {
        assert!(LockType::Temporary24h.requires_payment());
        assert!(LockType::Permanent.requires_payment());
        assert!(!LockType::PurchaseLock.requires_payment());
    }

    #[test]
    fn only_temporary_holds_contest_pricing() {
        assert!(LockType::Temporary24h.contests_pricing());
        assert!(LockType::Temporary1Week.contests_pricing());
        assert!(!LockType::Permanent.contests_pricing());
        assert!(!LockType::PurchaseLock.contests_pricing());
    }

    #[test]
    fn labels() {
        assert_eq!(LockType::Temporary24h.label(), "24 hours");
        assert_eq!(LockType::Temporary1Week.label(), "1 week");
        assert_eq!(LockType::Permanent.label(), "permanent");
        assert_eq!(LockType::PurchaseLock.label(), "purchase lock");
    }

    // -- is_lock_active --

    #[test]
    fn null_expiry_always_active() {
        assert!(is_lock_active(None, Utc::now()));
    }

    #[test]
    fn future_expiry_active() {
        let now = Utc::now();
        assert!(is_lock_active(Some(now + Duration::minutes(1)), now));
    }

    #[test]
    fn expiry_at_now_is_expired() {
        let now = Utc::now();
        assert!(!is_lock_active(Some(now), now));
        assert!(!is_lock_active(Some(now - Duration::seconds(1)), now));
    }

    // -- LockStatus derivation --

    #[test]
    fn own_lock_not_blocked() {
        let now = Utc::now();
        let status = LockStatus::from_active_lock(
            7,
            LockType::Temporary24h,
            Some(now + Duration::hours(1)),
            7,
        );
        assert!(status.is_locked);
        assert!(status.is_own_lock);
        assert!(!status.blocked_for_requester());
    }

    #[test]
    fn foreign_lock_blocks_requester() {
        let status = LockStatus::from_active_lock(7, LockType::Permanent, None, 8);
        assert!(status.is_locked);
        assert!(!status.is_own_lock);
        assert!(status.blocked_for_requester());
    }

    #[test]
    fn unlocked_status() {
        let status = LockStatus::unlocked();
        assert!(!status.is_locked);
        assert!(!status.blocked_for_requester());
        assert_eq!(status.lock_type, None);
    }
}
