//! Recommendation rules
//!
//! When in doubt the verdict is `review`: a ref is only `clean` when it is
//! either long merged into the primary branch or was never integrated
//! anywhere, and every environment branch could be compared against.

use chrono::{DateTime, FixedOffset, Utc};

use super::{MergeStatus, Recommendation};

const SECONDS_PER_DAY: i64 = 86_400;

/// Whole days between the commit and `now`, rounded down
pub fn commit_age_days(now: DateTime<Utc>, committed_at: DateTime<FixedOffset>) -> i64 {
    (now.timestamp() - committed_at.timestamp()).div_euclid(SECONDS_PER_DAY)
}

/// Everything the rules look at for one ref
#[derive(Debug, Clone)]
pub struct RecommendationInput<'a> {
    pub has_commit: bool,
    /// `(environment name, status)` in configured order
    pub statuses: &'a [(&'a str, MergeStatus)],
    pub age_days: Option<i64>,
    pub review_days: i64,
}

/// A recommendation and the reasons behind it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub recommendation: Recommendation,
    pub notes: Vec<String>,
}

fn is_primary(name: &str) -> bool {
    name == "main" || name == "master"
}

/// Apply the recommendation rules
pub fn recommend(input: &RecommendationInput<'_>) -> Verdict {
    let mut notes = Vec::new();

    let unresolved: Vec<&str> = input
        .statuses
        .iter()
        .filter(|(_, s)| *s == MergeStatus::UnknownNoRef)
        .map(|(name, _)| *name)
        .collect();
    let merged: Vec<&str> = input
        .statuses
        .iter()
        .filter(|(_, s)| *s == MergeStatus::Yes)
        .map(|(name, _)| *name)
        .collect();

    if !input.has_commit {
        notes.push("commit unresolved".to_string());
        if !unresolved.is_empty() {
            notes.push(format!("no ref for {}", unresolved.join(", ")));
        }
        return Verdict {
            recommendation: Recommendation::Critical,
            notes,
        };
    }

    if !unresolved.is_empty() {
        notes.push(format!("no ref for {}", unresolved.join(", ")));
    }
    if !merged.is_empty() {
        notes.push(format!("merged into {}", merged.join(", ")));
    }

    let merged_into_primary = merged.iter().any(|name| is_primary(name));

    let mut recommendation = if merged_into_primary {
        match input.age_days {
            Some(age) if age < input.review_days => {
                notes.push(format!(
                    "merged {}d ago (< {}d review window)",
                    age, input.review_days
                ));
                Recommendation::Review
            }
            _ => Recommendation::Clean,
        }
    } else if !merged.is_empty() {
        Recommendation::Review
    } else {
        Recommendation::Clean
    };

    if recommendation == Recommendation::Clean && !unresolved.is_empty() {
        recommendation = Recommendation::Review;
    }

    Verdict {
        recommendation,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use MergeStatus::{No, NoCommit, UnknownNoRef, Yes};

    const ENVS: [&str; 4] = ["dev", "qa", "prod", "main"];

    fn statuses(values: [MergeStatus; 4]) -> Vec<(&'static str, MergeStatus)> {
        ENVS.iter().copied().zip(values).collect()
    }

    fn verdict(values: [MergeStatus; 4], age: Option<i64>) -> Verdict {
        let statuses = statuses(values);
        recommend(&RecommendationInput {
            has_commit: true,
            statuses: &statuses,
            age_days: age,
            review_days: 14,
        })
    }

    #[test]
    fn test_never_merged_is_clean() {
        let v = verdict([No, No, No, No], Some(3));
        assert_eq!(v.recommendation, Recommendation::Clean);
        assert!(v.notes.is_empty());
    }

    #[test]
    fn test_merged_into_main_respects_review_window() {
        assert_eq!(
            verdict([No, No, No, Yes], Some(40)).recommendation,
            Recommendation::Clean
        );
        assert_eq!(
            verdict([No, No, No, Yes], Some(14)).recommendation,
            Recommendation::Clean
        );
        let recent = verdict([No, No, No, Yes], Some(13));
        assert_eq!(recent.recommendation, Recommendation::Review);
        assert_eq!(
            recent.notes,
            vec!["merged into main", "merged 13d ago (< 14d review window)"]
        );
    }

    #[test]
    fn test_merged_into_main_with_unknown_age_is_clean() {
        assert_eq!(
            verdict([Yes, Yes, Yes, Yes], None).recommendation,
            Recommendation::Clean
        );
    }

    #[test]
    fn test_partially_integrated_needs_review() {
        let v = verdict([Yes, No, No, No], Some(100));
        assert_eq!(v.recommendation, Recommendation::Review);
        assert_eq!(v.notes, vec!["merged into dev"]);
    }

    #[test]
    fn test_missing_commit_is_critical_regardless_of_status() {
        let statuses = statuses([Yes, NoCommit, UnknownNoRef, Yes]);
        let v = recommend(&RecommendationInput {
            has_commit: false,
            statuses: &statuses,
            age_days: Some(100),
            review_days: 14,
        });
        assert_eq!(v.recommendation, Recommendation::Critical);
        assert_eq!(v.notes, vec!["commit unresolved", "no ref for prod"]);
    }

    #[test]
    fn test_unresolved_environment_downgrades_clean() {
        let v = verdict([UnknownNoRef, No, No, No], Some(100));
        assert_eq!(v.recommendation, Recommendation::Review);
        assert_eq!(v.notes, vec!["no ref for dev"]);

        assert_eq!(
            verdict([No, No, UnknownNoRef, Yes], Some(100)).recommendation,
            Recommendation::Review
        );
    }

    #[test]
    fn test_master_counts_as_primary() {
        let statuses = vec![("develop", No), ("master", Yes)];
        let v = recommend(&RecommendationInput {
            has_commit: true,
            statuses: &statuses,
            age_days: Some(30),
            review_days: 14,
        });
        assert_eq!(v.recommendation, Recommendation::Clean);
    }

    #[test]
    fn test_custom_review_window() {
        let statuses = statuses([No, No, No, Yes]);
        let v = recommend(&RecommendationInput {
            has_commit: true,
            statuses: &statuses,
            age_days: Some(20),
            review_days: 30,
        });
        assert_eq!(v.recommendation, Recommendation::Review);
    }

    #[test]
    fn test_commit_age_days_floors() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();

        let just_under = offset.with_ymd_and_hms(2024, 5, 31, 14, 0, 1).unwrap();
        assert_eq!(commit_age_days(now, just_under), 0);

        let exactly_two = offset.with_ymd_and_hms(2024, 5, 30, 14, 0, 0).unwrap();
        assert_eq!(commit_age_days(now, exactly_two), 2);

        let future = offset.with_ymd_and_hms(2024, 6, 1, 15, 0, 0).unwrap();
        assert_eq!(commit_age_days(now, future), -1);
    }
}
