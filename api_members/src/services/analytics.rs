use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::models::member::{Member, MemberStatus};

/// Members whose access ends within this window count as expiring soon.
pub const EXPIRING_SOON_DAYS: i64 = 7;

/// Summary cards of the members dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MemberOverview {
    pub total: usize,
    pub active: usize,
    pub inactive: usize,
    pub expired: usize,
    pub expiring_soon: usize,
}

/// Counts `members` by the status the console shows at `now`.
pub fn member_overview(members: &[Member], now: DateTime<Utc>) -> MemberOverview {
    let horizon = now + Duration::days(EXPIRING_SOON_DAYS);
    members
        .iter()
        .fold(MemberOverview::default(), |mut overview, member| {
            overview.total += 1;
            match member.effective_status(now) {
                MemberStatus::Active => overview.active += 1,
                MemberStatus::Inactive => overview.inactive += 1,
                MemberStatus::Expired => overview.expired += 1,
            }
            if member
                .active_expiry(now)
                .is_some_and(|expiry| expiry <= horizon)
            {
                overview.expiring_soon += 1;
            }
            overview
        })
}
