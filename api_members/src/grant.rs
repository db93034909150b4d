//! Access-grant expiry calculation.
//!
//! A grant either overrides the member's current period (starting now) or is
//! queued behind it (starting at the current expiry). A member without a
//! running subscription always starts now. Override may not leave the member
//! with less paid time than they already have.
//!
//! Both the override comparison and the stored expiry use calendar
//! arithmetic: a month is however many days the calendar month has, counted
//! from the start date.

use chrono::{DateTime, Days, Months, Utc};
use common::error::AppError;
use thiserror::Error;

use crate::models::{
    grant::{AccessGrant, ApplyMode, DurationType, GrantPlan},
    member::MemberStatus,
};

const MILLIS_PER_DAY: i64 = 86_400_000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrantError {
    #[error("Duration must be a positive number")]
    InvalidDuration,

    #[error("A plan must be selected")]
    MissingPlan,

    #[error(
        "Override would shorten access: {requested_days} day(s) requested but {remaining_days} day(s) remain. Queue the grant instead."
    )]
    OverrideShortensAccess {
        requested_days: i64,
        remaining_days: i64,
    },

    #[error("Resulting date is out of range")]
    DateOutOfRange,
}

impl From<GrantError> for AppError {
    fn from(error: GrantError) -> Self {
        AppError::Validation(error.to_string())
    }
}

/// Whole days left until `expiry`, rounded up and never negative.
pub fn remaining_days(expiry: Option<DateTime<Utc>>, now: DateTime<Utc>) -> i64 {
    let Some(expiry) = expiry else {
        return 0;
    };
    let millis = (expiry - now).num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Adds `duration` calendar days or months to `start`.
///
/// Month addition clamps to the last day of a shorter target month, so
/// 31 January plus one month is the last day of February.
pub fn add_duration(
    start: DateTime<Utc>,
    duration: u32,
    duration_type: DurationType,
) -> Result<DateTime<Utc>, GrantError> {
    match duration_type {
        DurationType::Days => start.checked_add_days(Days::new(u64::from(duration))),
        DurationType::Months => start.checked_add_months(Months::new(duration)),
    }
    .ok_or(GrantError::DateOutOfRange)
}

/// Length of the grant in days when it starts at `now`.
pub fn requested_days(grant: &AccessGrant, now: DateTime<Utc>) -> Result<i64, GrantError> {
    let end = add_duration(now, grant.duration, grant.duration_type)?;
    Ok((end - now).num_days())
}

/// Checks a grant before any date is computed.
pub fn validate(grant: &AccessGrant) -> Result<(), GrantError> {
    if grant.plan_id.trim().is_empty() {
        return Err(GrantError::MissingPlan);
    }
    if grant.duration == 0 {
        return Err(GrantError::InvalidDuration);
    }
    Ok(())
}

/// Resolves `grant` against the member's current expiry.
///
/// # Arguments
///
/// * `current_expiry` - Expiry of the member's subscription, `None` if never subscribed.
/// * `grant` - The requested grant.
/// * `now` - Reference instant for expiry checks and override starts.
///
/// # Returns
///
/// The plan and dates to submit, always with status `active`, or a
/// `GrantError` to show before anything is sent.
pub fn plan_grant(
    current_expiry: Option<DateTime<Utc>>,
    grant: &AccessGrant,
    now: DateTime<Utc>,
) -> Result<GrantPlan, GrantError> {
    validate(grant)?;

    let running_expiry = current_expiry.filter(|expiry| *expiry > now);
    let (start_date, applied_mode) = match (running_expiry, grant.apply_mode) {
        (None, _) => (now, ApplyMode::Override),
        (Some(expiry), ApplyMode::Queue) => (expiry, ApplyMode::Queue),
        (Some(expiry), ApplyMode::Override) => {
            let remaining = remaining_days(Some(expiry), now);
            let requested = requested_days(grant, now)?;
            if requested < remaining {
                return Err(GrantError::OverrideShortensAccess {
                    requested_days: requested,
                    remaining_days: remaining,
                });
            }
            (now, ApplyMode::Override)
        }
    };

    Ok(GrantPlan {
        plan_id: grant.plan_id.clone(),
        status: MemberStatus::Active,
        start_date,
        expiry_date: add_duration(start_date, grant.duration, grant.duration_type)?,
        applied_mode,
    })
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};

    use super::*;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn grant(duration: u32, duration_type: DurationType, apply_mode: ApplyMode) -> AccessGrant {
        AccessGrant {
            plan_id: "plan-gold".to_string(),
            duration,
            duration_type,
            reason: "Loyalty bonus".to_string(),
            apply_mode,
        }
    }

    #[test]
    fn remaining_days_rounds_up_and_floors_at_zero() {
        let now = at(2025, 5, 1);
        assert_eq!(remaining_days(None, now), 0);
        assert_eq!(remaining_days(Some(now - Duration::days(3)), now), 0);
        assert_eq!(remaining_days(Some(now), now), 0);
        assert_eq!(remaining_days(Some(now + Duration::hours(1)), now), 1);
        assert_eq!(remaining_days(Some(now + Duration::days(10)), now), 10);
        assert_eq!(
            remaining_days(Some(now + Duration::days(10) + Duration::minutes(1)), now),
            11
        );
    }

    #[test]
    fn override_equal_to_remaining_time_is_allowed() {
        let now = at(2025, 5, 1) + Duration::hours(9);
        let expiry = now + Duration::days(10);

        let plan = plan_grant(
            Some(expiry),
            &grant(10, DurationType::Days, ApplyMode::Override),
            now,
        )
        .unwrap();

        assert_eq!(plan.start_date, now);
        assert_eq!(plan.expiry_date, now + Duration::days(10));
        assert_eq!(plan.applied_mode, ApplyMode::Override);
    }

    #[test]
    fn override_shorter_than_remaining_time_is_rejected() {
        let now = at(2025, 5, 1) + Duration::hours(9);
        let expiry = now + Duration::days(10);

        let err = plan_grant(
            Some(expiry),
            &grant(9, DurationType::Days, ApplyMode::Override),
            now,
        )
        .unwrap_err();

        assert_eq!(
            err,
            GrantError::OverrideShortensAccess {
                requested_days: 9,
                remaining_days: 10
            }
        );
        let message = err.to_string();
        assert!(message.contains('9') && message.contains("10"), "{message}");
    }

    #[test]
    fn queued_grant_starts_at_current_expiry() {
        let now = at(2025, 5, 20);
        let expiry = at(2025, 6, 1);

        let plan = plan_grant(
            Some(expiry),
            &grant(30, DurationType::Days, ApplyMode::Queue),
            now,
        )
        .unwrap();

        assert_eq!(plan.start_date, at(2025, 6, 1));
        assert_eq!(plan.expiry_date, at(2025, 7, 1));
        assert_eq!(plan.status, MemberStatus::Active);
        assert_eq!(plan.applied_mode, ApplyMode::Queue);
        assert_eq!(plan.plan_id, "plan-gold");
    }

    #[test]
    fn expired_subscription_starts_now_even_when_queued() {
        let now = at(2025, 3, 1) + Duration::hours(15);
        let stale_expiry = at(2025, 1, 1);

        let plan = plan_grant(
            Some(stale_expiry),
            &grant(1, DurationType::Months, ApplyMode::Queue),
            now,
        )
        .unwrap();

        assert_eq!(plan.start_date, now);
        assert_eq!(plan.expiry_date, at(2025, 4, 1) + Duration::hours(15));
        assert_eq!(plan.applied_mode, ApplyMode::Override);
    }

    #[test]
    fn never_subscribed_member_queue_behaves_like_override() {
        let now = at(2025, 8, 10);
        let plan = plan_grant(None, &grant(14, DurationType::Days, ApplyMode::Queue), now).unwrap();
        assert_eq!(plan.start_date, now);
        assert_eq!(plan.expiry_date, at(2025, 8, 24));
    }

    #[test]
    fn expired_subscription_allows_any_override_length() {
        let now = at(2025, 3, 1);
        let plan = plan_grant(
            Some(at(2025, 2, 1)),
            &grant(1, DurationType::Days, ApplyMode::Override),
            now,
        )
        .unwrap();
        assert_eq!(plan.expiry_date, at(2025, 3, 2));
    }

    #[test]
    fn month_addition_clamps_to_end_of_month() {
        assert_eq!(
            add_duration(at(2025, 1, 31), 1, DurationType::Months).unwrap(),
            at(2025, 2, 28)
        );
        assert_eq!(
            add_duration(at(2024, 1, 31), 1, DurationType::Months).unwrap(),
            at(2024, 2, 29)
        );
        assert_eq!(
            add_duration(at(2025, 10, 31), 4, DurationType::Months).unwrap(),
            at(2026, 2, 28)
        );
    }

    #[test]
    fn month_override_is_compared_in_calendar_days() {
        // February 2025 has 28 days; one month from 1 February falls short of 30.
        let now = at(2025, 2, 1);
        let expiry = now + Duration::days(30);
        let one_month = grant(1, DurationType::Months, ApplyMode::Override);

        assert_eq!(requested_days(&one_month, now).unwrap(), 28);
        assert_eq!(
            plan_grant(Some(expiry), &one_month, now).unwrap_err(),
            GrantError::OverrideShortensAccess {
                requested_days: 28,
                remaining_days: 30
            }
        );

        // In March the same month is 31 days and clears the bar.
        let march = at(2025, 3, 1);
        let plan = plan_grant(Some(march + Duration::days(30)), &one_month, march).unwrap();
        assert_eq!(plan.expiry_date, at(2025, 4, 1));
    }

    #[test]
    fn invalid_grants_are_rejected_before_date_math() {
        let now = at(2025, 1, 1);
        assert_eq!(
            plan_grant(None, &grant(0, DurationType::Days, ApplyMode::Override), now).unwrap_err(),
            GrantError::InvalidDuration
        );

        let mut no_plan = grant(5, DurationType::Days, ApplyMode::Override);
        no_plan.plan_id = "  ".to_string();
        assert_eq!(plan_grant(None, &no_plan, now).unwrap_err(), GrantError::MissingPlan);
    }

    #[test]
    fn grant_errors_surface_as_validation() {
        let err: AppError = GrantError::InvalidDuration.into();
        assert!(matches!(err, AppError::Validation(_)));
    }
}
