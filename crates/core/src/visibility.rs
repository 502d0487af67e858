//! Dashboard visibility filters.
//!
//! Each filter is independently togglable and they AND-combine: an item
//! survives only if it passes every enabled filter. Locally-hidden items
//! (the dealer's client-side bookmark list) are a UI preference subtracted
//! after these filters and are not a server concern.

use serde::Deserialize;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Age cutoff, in days, applied by the `hide_older_than_90_days` filter.
pub const MAX_LEAD_AGE_DAYS: i64 = 90;

// ---------------------------------------------------------------------------
// Filters
// ---------------------------------------------------------------------------

/// Dealer-chosen dashboard filters, one flag per toggle.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct DashboardFilters {
    #[serde(default)]
    pub hide_purchased: bool,
    #[serde(default)]
    pub hide_locked: bool,
    #[serde(default)]
    pub hide_older_than_90_days: bool,
}

/// The filter-relevant state of one lead, relative to the requesting dealer.
#[derive(Debug, Clone, Copy)]
pub struct LeadVisibility {
    /// The requesting dealer holds an active purchase of this lead.
    pub is_purchased: bool,
    /// Another dealer holds an active lock on this lead.
    pub locked_by_other: bool,
    /// Whole days since submission.
    pub age_days: i64,
}

/// Whether a lead passes every enabled filter.
pub fn passes_filters(lead: &LeadVisibility, filters: &DashboardFilters) -> bool {
    if filters.hide_purchased && lead.is_purchased {
        return false;
    }
    if filters.hide_locked && lead.locked_by_other {
        return false;
    }
    if filters.hide_older_than_90_days && lead.age_days > MAX_LEAD_AGE_DAYS {
        return false;
    }
    true
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
