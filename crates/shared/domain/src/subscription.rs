//! Subscription plans, subscriptions and their date arithmetic.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};
use crate::owner::OwnerRef;
use crate::resource_kind;

/// Calendar unit a subscription duration is counted in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    Day,
    Week,
    Month,
    Year,
}

impl Frequency {
    /// Parse a stored frequency. Unknown units mean "never expires".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" => Some(Frequency::Day),
            "week" => Some(Frequency::Week),
            "month" => Some(Frequency::Month),
            "year" => Some(Frequency::Year),
            _ => None,
        }
    }
}

/// `start + duration` in the given unit, `None` for an unlimited subscription.
pub fn end_date(start: DateTime<Utc>, duration: u32, frequency: &str) -> Option<DateTime<Utc>> {
    match Frequency::parse(frequency)? {
        Frequency::Day => start.checked_add_signed(Duration::days(i64::from(duration))),
        Frequency::Week => start.checked_add_signed(Duration::weeks(i64::from(duration))),
        Frequency::Month => start.checked_add_months(Months::new(duration)),
        Frequency::Year => start.checked_add_months(Months::new(duration.checked_mul(12)?)),
    }
}

/// Back-to-back subscriptions: start when the prior one ends, if that is
/// still ahead of `now`.
pub fn chained_start(now: DateTime<Utc>, prior_end: Option<DateTime<Utc>>) -> DateTime<Utc> {
    match prior_end {
        Some(end) if end > now => end,
        _ => now,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanKind {
    /// Grants access for a period of time
    Duration,
    /// Grants a number of SMS credits
    Credits,
}

impl PlanKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanKind::Duration => "duration",
            PlanKind::Credits => "credits",
        }
    }
}

impl fmt::Display for PlanKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlanKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "duration" => Ok(PlanKind::Duration),
            "credits" => Ok(PlanKind::Credits),
            other => Err(DomainError::corrupt("subscription_plans.kind", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubscriptionPlan {
    pub id: Uuid,
    pub name: String,
    pub kind: PlanKind,
    /// Price in minor currency units
    pub price: i64,
    pub duration: Option<i32>,
    pub frequency: Option<String>,
    pub credits: Option<i32>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(
    SubscriptionPlan,
    "subscription plan",
    "subscription plans",
    "Subscription plan",
    "subscription_plan"
);

/// What a plan grants once validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanTerms {
    Duration { duration: u32, frequency: String },
    Credits { credits: u32 },
}

impl SubscriptionPlan {
    /// Validate that the fields required by the plan kind are present.
    pub fn terms(&self) -> DomainResult<PlanTerms> {
        match self.kind {
            PlanKind::Duration => {
                let duration = self
                    .duration
                    .filter(|d| *d > 0)
                    .ok_or_else(|| {
                        DomainError::validation("The subscription plan duration is required")
                    })?;
                let frequency = self
                    .frequency
                    .clone()
                    .filter(|f| !f.trim().is_empty())
                    .ok_or_else(|| {
                        DomainError::validation("The subscription plan frequency is required")
                    })?;
                Ok(PlanTerms::Duration {
                    duration: duration.unsigned_abs(),
                    frequency,
                })
            }
            PlanKind::Credits => {
                let credits = self
                    .credits
                    .filter(|c| *c > 0)
                    .ok_or_else(|| {
                        DomainError::validation("The subscription plan credits are required")
                    })?;
                Ok(PlanTerms::Credits {
                    credits: credits.unsigned_abs(),
                })
            }
        }
    }

    /// SMS credits granted by a credits plan.
    pub fn sms_credits(&self) -> DomainResult<u32> {
        match self.terms()? {
            PlanTerms::Credits { credits } => Ok(credits),
            PlanTerms::Duration { .. } => Err(DomainError::WrongPlanKind(self.name.clone())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: Uuid,
    /// Paying user
    pub user_id: Uuid,
    pub owner: OwnerRef,
    pub subscription_plan_id: Uuid,
    pub sms_credits: i32,
    pub start_at: DateTime<Utc>,
    /// `None` for subscriptions that never expire
    pub end_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

resource_kind!(Subscription, "subscription", "subscriptions", "Subscription", "subscription");

/// Subscription creation payload
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSubscription {
    pub owner: OwnerRef,
    pub subscription_plan_id: Uuid,
}

/// Fully computed subscription row, ready to insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    pub user_id: Uuid,
    pub owner: OwnerRef,
    pub subscription_plan_id: Uuid,
    pub sms_credits: i32,
    pub start_at: DateTime<Utc>,
    pub end_at: Option<DateTime<Utc>>,
}

impl NewSubscription {
    /// Compute start and end dates for `plan`, chaining onto `prior_end`.
    pub fn for_plan(
        user_id: Uuid,
        owner: OwnerRef,
        plan: &SubscriptionPlan,
        now: DateTime<Utc>,
        prior_end: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        let (sms_credits, start_at, end_at) = match plan.terms()? {
            PlanTerms::Duration {
                duration,
                frequency,
            } => {
                let start_at = chained_start(now, prior_end);
                (0, start_at, end_date(start_at, duration, &frequency))
            }
            PlanTerms::Credits { credits } => {
                let credits = i32::try_from(credits).map_err(|_| {
                    DomainError::validation("The subscription plan credits are too large")
                })?;
                (credits, now, None)
            }
        };

        Ok(Self {
            user_id,
            owner,
            subscription_plan_id: plan.id,
            sms_credits,
            start_at,
            end_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn plan(kind: PlanKind) -> SubscriptionPlan {
        SubscriptionPlan {
            id: Uuid::new_v4(),
            name: "Monthly".to_string(),
            kind,
            price: 5000,
            duration: Some(1),
            frequency: Some("month".to_string()),
            credits: Some(100),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn end_date_per_frequency() {
        let start = at(2024, 1, 15);
        assert_eq!(end_date(start, 3, "month"), Some(at(2024, 4, 15)));
        assert_eq!(end_date(start, 10, "day"), Some(at(2024, 1, 25)));
        assert_eq!(end_date(start, 2, "week"), Some(at(2024, 1, 29)));
        assert_eq!(end_date(start, 1, "year"), Some(at(2025, 1, 15)));
        assert_eq!(end_date(start, 1, "Month"), Some(at(2024, 2, 15)));
    }

    #[test]
    fn unknown_frequency_never_expires() {
        assert_eq!(end_date(at(2024, 1, 15), 3, "unknown"), None);
        assert_eq!(end_date(at(2024, 1, 15), 3, ""), None);
    }

    #[test]
    fn month_end_is_clamped() {
        assert_eq!(end_date(at(2024, 1, 31), 1, "month"), Some(at(2024, 2, 29)));
    }

    #[test]
    fn chained_start_uses_future_prior_end() {
        let now = at(2024, 1, 15);
        let future = at(2024, 2, 1);
        let past = at(2024, 1, 1);

        assert_eq!(chained_start(now, Some(future)), future);
        assert_eq!(chained_start(now, Some(past)), now);
        assert_eq!(chained_start(now, None), now);
    }

    #[test]
    fn duration_plan_requires_duration_and_frequency() {
        let mut missing_duration = plan(PlanKind::Duration);
        missing_duration.duration = None;
        assert!(matches!(
            missing_duration.terms(),
            Err(DomainError::Validation(_))
        ));

        let mut missing_frequency = plan(PlanKind::Duration);
        missing_frequency.frequency = None;
        assert!(matches!(
            missing_frequency.terms(),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn credits_plan_requires_credits() {
        let mut missing = plan(PlanKind::Credits);
        missing.credits = Some(0);
        assert!(matches!(missing.terms(), Err(DomainError::Validation(_))));
        assert_eq!(plan(PlanKind::Credits).sms_credits(), Ok(100));
    }

    #[test]
    fn sms_credits_on_duration_plan_is_wrong_kind() {
        assert!(matches!(
            plan(PlanKind::Duration).sms_credits(),
            Err(DomainError::WrongPlanKind(_))
        ));
    }

    #[test]
    fn new_subscription_chains_onto_prior_end() {
        let now = at(2024, 1, 15);
        let prior_end = at(2024, 2, 15);
        let owner = OwnerRef::store(Uuid::new_v4());

        let sub = NewSubscription::for_plan(
            Uuid::new_v4(),
            owner,
            &plan(PlanKind::Duration),
            now,
            Some(prior_end),
        )
        .unwrap();

        assert_eq!(sub.start_at, prior_end);
        assert_eq!(sub.end_at, Some(at(2024, 3, 15)));
        assert_eq!(sub.sms_credits, 0);
    }

    #[test]
    fn credits_subscription_starts_now_and_never_ends() {
        let now = at(2024, 1, 15);
        let sub = NewSubscription::for_plan(
            Uuid::new_v4(),
            OwnerRef::sms_alert(Uuid::new_v4()),
            &plan(PlanKind::Credits),
            now,
            Some(at(2024, 6, 1)),
        )
        .unwrap();

        assert_eq!(sub.start_at, now);
        assert_eq!(sub.end_at, None);
        assert_eq!(sub.sms_credits, 100);
    }
}
