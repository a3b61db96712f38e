use std::{
    collections::HashMap,
    time::{Duration, Instant},
};

use chrono::{Duration as ChronoDuration, SecondsFormat, Utc};
use reqwest::{Client, StatusCode};
use tokio::sync::Mutex;

use crate::{
    error::UpstreamError,
    types::{
        ContributionBreakdown, ContributionStats, ContributionValue, ContributionVariables,
        ContributionsCollection, GraphqlRequest, GraphqlResponse,
    },
};

const GITHUB_TIMEOUT: Duration = Duration::from_secs(10);
const STATS_TTL: Duration = Duration::from_secs(300);
const CALENDAR_DAYS: i64 = 364;
const USER_AGENT: &str = "foliosrv";

const CONTRIBUTION_QUERY: &str = r#"
  query ($login: String!, $from: DateTime!, $to: DateTime!) {
    user(login: $login) {
      contributionsCollection(from: $from, to: $to) {
        contributionCalendar {
          totalContributions
          weeks {
            contributionDays {
              date
              contributionCount
            }
          }
        }
        totalCommitContributions
        totalIssueContributions
        totalPullRequestContributions
        totalPullRequestReviewContributions
      }
    }
  }
"#;

pub struct GithubClient {
    token: Option<String>,
    graphql_url: String,
    stats_cache: Mutex<HashMap<String, (Instant, ContributionStats)>>,
}

impl GithubClient {
    pub fn new(token: Option<String>, graphql_url: String) -> Self {
        Self {
            token,
            graphql_url,
            stats_cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    /// Fetches contribution statistics for a user, memoized for five minutes.
    ///
    /// Issues the contributions GraphQL query over the trailing 364 day
    /// window and flattens the calendar into the heatmap shape. A memoized
    /// result younger than the TTL is returned without a network call.
    ///
    /// # Arguments
    ///
    /// * `username` - GitHub login to query
    ///
    /// # Returns
    ///
    /// Returns a `Result` containing:
    /// - `Ok(ContributionStats)` - flattened calendar values with totals
    /// - `Err(UpstreamError)` - missing token, rejected authentication,
    ///   transport failure, timeout, or a response without calendar data
    ///   (unknown username)
    pub async fn contributions(&self, username: &str) -> Result<ContributionStats, UpstreamError> {
        {
            let cache = self.stats_cache.lock().await;
            if let Some((fetched_at, stats)) = cache.get(username) {
                if fetched_at.elapsed() < STATS_TTL {
                    return Ok(stats.clone());
                }
            }
        }

        let token = self
            .token
            .as_deref()
            .ok_or(UpstreamError::MissingCredentials("github"))?;

        let to = Utc::now();
        let from = to - ChronoDuration::days(CALENDAR_DAYS);
        let request = GraphqlRequest {
            query: CONTRIBUTION_QUERY.to_string(),
            variables: ContributionVariables {
                login: username.to_string(),
                from: from.to_rfc3339_opts(SecondsFormat::Millis, true),
                to: to.to_rfc3339_opts(SecondsFormat::Millis, true),
            },
        };

        let client = Client::new();
        let response = client
            .post(&self.graphql_url)
            .bearer_auth(token)
            .header("User-Agent", USER_AGENT)
            .json(&request)
            .timeout(GITHUB_TIMEOUT)
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(UpstreamError::AuthRejected(format!(
                "GitHub API returned {status}"
            )));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Transport(format!(
                "GitHub API returned {status}: {body}"
            )));
        }

        let payload: GraphqlResponse = response.json().await?;
        let collection = payload
            .data
            .and_then(|data| data.user)
            .and_then(|user| user.contributions_collection)
            .ok_or_else(|| {
                UpstreamError::Transport("GitHub response is missing contribution data".to_string())
            })?;

        let stats = flatten_calendar(&collection).ok_or_else(|| {
            UpstreamError::Transport("GitHub response is missing the contribution calendar".to_string())
        })?;

        self.memoize(username, stats.clone()).await;

        Ok(stats)
    }

    // Entries past the TTL are dropped on insert, which bounds the map to
    // usernames queried within the last window.
    async fn memoize(&self, username: &str, stats: ContributionStats) {
        let mut cache = self.stats_cache.lock().await;
        cache.retain(|_, (fetched_at, _)| fetched_at.elapsed() < STATS_TTL);
        cache.insert(username.to_string(), (Instant::now(), stats));
    }
}

/// Flattens a contributions collection into the heatmap shape.
///
/// Days are emitted in calendar order, week by week. The reported `total` is
/// the calendar total, which matches the number shown on a GitHub profile;
/// the breakdown fields do not sum to it because GitHub also counts
/// contribution kinds the breakdown does not list.
pub fn flatten_calendar(collection: &ContributionsCollection) -> Option<ContributionStats> {
    let calendar = collection.contribution_calendar.as_ref()?;

    let values = calendar
        .weeks
        .iter()
        .flat_map(|week| week.contribution_days.iter())
        .map(|day| ContributionValue {
            date: day.date.clone(),
            count: day.contribution_count,
        })
        .collect();

    Some(ContributionStats {
        values,
        total: calendar.total_contributions,
        breakdown: ContributionBreakdown {
            commits: collection.total_commit_contributions,
            issues: collection.total_issue_contributions,
            prs: collection.total_pull_request_contributions,
            reviews: collection.total_pull_request_review_contributions,
            calendar_total: calendar.total_contributions,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CalendarDay, ContributionCalendar, ContributionWeek};

    fn day(date: &str, count: u64) -> CalendarDay {
        CalendarDay {
            date: date.to_string(),
            contribution_count: count,
        }
    }

    fn collection_with_weeks(weeks: Vec<ContributionWeek>, total: u64) -> ContributionsCollection {
        ContributionsCollection {
            contribution_calendar: Some(ContributionCalendar {
                total_contributions: total,
                weeks,
            }),
            total_commit_contributions: 40,
            total_issue_contributions: 3,
            total_pull_request_contributions: 7,
            total_pull_request_review_contributions: 2,
        }
    }

    #[test]
    fn flattens_weeks_in_calendar_order() {
        let collection = collection_with_weeks(
            vec![
                ContributionWeek {
                    contribution_days: vec![day("2024-01-01", 1), day("2024-01-02", 0)],
                },
                ContributionWeek {
                    contribution_days: vec![day("2024-01-08", 5)],
                },
            ],
            60,
        );

        let stats = flatten_calendar(&collection).unwrap();

        let dates: Vec<&str> = stats.values.iter().map(|v| v.date.as_str()).collect();
        assert_eq!(dates, vec!["2024-01-01", "2024-01-02", "2024-01-08"]);
        assert_eq!(stats.values[2].count, 5);
    }

    #[test]
    fn total_comes_from_the_calendar_not_the_breakdown() {
        // Calendar totals include contribution kinds the breakdown does not,
        // so 60 != 40 + 3 + 7 + 2 is expected.
        let collection = collection_with_weeks(vec![], 60);

        let stats = flatten_calendar(&collection).unwrap();

        assert_eq!(stats.total, 60);
        assert_eq!(stats.breakdown.calendar_total, 60);
        assert_eq!(stats.breakdown.commits, 40);
        assert_eq!(stats.breakdown.issues, 3);
        assert_eq!(stats.breakdown.prs, 7);
        assert_eq!(stats.breakdown.reviews, 2);
    }

    #[test]
    fn missing_calendar_yields_none() {
        let collection = ContributionsCollection {
            contribution_calendar: None,
            total_commit_contributions: 0,
            total_issue_contributions: 0,
            total_pull_request_contributions: 0,
            total_pull_request_review_contributions: 0,
        };

        assert!(flatten_calendar(&collection).is_none());
    }

    fn empty_stats() -> ContributionStats {
        ContributionStats {
            values: vec![],
            total: 0,
            breakdown: ContributionBreakdown {
                commits: 0,
                issues: 0,
                prs: 0,
                reviews: 0,
                calendar_total: 0,
            },
        }
    }

    #[tokio::test]
    async fn memoizing_evicts_entries_past_the_ttl() {
        let client = GithubClient::new(None, "http://localhost/graphql".to_string());
        let stale = Instant::now() - (STATS_TTL + Duration::from_secs(1));
        {
            let mut cache = client.stats_cache.lock().await;
            cache.insert("idle-user".to_string(), (stale, empty_stats()));
            cache.insert("busy-user".to_string(), (Instant::now(), empty_stats()));
        }

        client.memoize("new-user", empty_stats()).await;

        let cache = client.stats_cache.lock().await;
        assert!(!cache.contains_key("idle-user"));
        assert!(cache.contains_key("busy-user"));
        assert!(cache.contains_key("new-user"));
    }
}
