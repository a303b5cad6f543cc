use async_trait::async_trait;
use serde_json::{json, Value};

use crate::client::{endpoint, fetch, post, Client};
use crate::error::Error;
use crate::extract::{Miss, Outcome};
use crate::json_path::{lookup, lookup_array, lookup_u64};
use crate::platforms::Platform;
use crate::types::{LeetCodeProfile, ProfileResult, Status};

const PROFILE_QUERY: &str = "query getUserProfile($username: String!) {  allQuestionsCount {    difficulty    count  }  matchedUser(username: $username) {    contributions {    points      questionCount      testcaseCount    }    profile {    reputation      ranking    }    submitStats {      acSubmissionNum {        difficulty        count        submissions      }      totalSubmissionNum {        difficulty        count        submissions      }    }  }}";

/// Rankings past this are shown as an approximate bucket upstream.
const RANKING_CAP: u64 = 100_000;
const CAPPED_RANKING: &str = "~100000";

pub struct LeetCode {
    base_url: String,
}

impl LeetCode {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    fn payload(username: &str) -> Value {
        json!({
            "operationName": "getUserProfile",
            "variables": { "username": username },
            "query": PROFILE_QUERY,
        })
    }
}

#[async_trait]
impl Platform for LeetCode {
    async fn lookup(
        &self,
        client: &dyn Client,
        username: &str,
    ) -> Result<Outcome<ProfileResult>, Error> {
        let profile_url = endpoint(&self.base_url, &[username])?;
        if !fetch(client, profile_url.as_str()).await.is_success() {
            return Ok(Outcome::NotFound);
        }

        // graphql rejects calls whose referer is not the profile page
        let referer = endpoint(&self.base_url, &[username, ""])?;
        let graphql_url = endpoint(&self.base_url, &["graphql"])?;
        let payload = Self::payload(username);
        let page = post(client, graphql_url.as_str(), referer.as_str(), &payload).await;
        if !page.is_success() {
            return Ok(Outcome::SchemaDrift(format!(
                "graphql responded {}",
                page.status
            )));
        }

        let response: Value = match serde_json::from_str(&page.body) {
            Ok(response) => response,
            Err(e) => return Ok(Outcome::SchemaDrift(format!("graphql response: {e}"))),
        };

        Ok(Outcome::from(parse_stats(&response)).map(ProfileResult::LeetCode))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct Tier {
    total_questions: u64,
    solved: u64,
    accepted_submissions: u64,
    submitted: u64,
    total_submissions: u64,
}

impl Tier {
    fn collect(response: &Value, difficulty: &str) -> Self {
        let mut tier = Tier::default();
        let field = |item: &Value, key: &str| lookup_u64(item, &[key]).unwrap_or(0);

        for item in entries(response, &["data", "allQuestionsCount"], difficulty) {
            tier.total_questions = field(item, "count");
        }
        for item in entries(
            response,
            &["data", "matchedUser", "submitStats", "acSubmissionNum"],
            difficulty,
        ) {
            tier.solved = field(item, "count");
            tier.accepted_submissions = field(item, "submissions");
        }
        for item in entries(
            response,
            &["data", "matchedUser", "submitStats", "totalSubmissionNum"],
            difficulty,
        ) {
            tier.submitted = field(item, "count");
            tier.total_submissions = field(item, "submissions");
        }
        tier
    }

    fn rate(&self) -> String {
        render_rate(self.accepted_submissions, self.total_submissions)
    }
}

/// Items of the list at `path` whose `difficulty` field equals `difficulty`.
fn entries<'a>(
    response: &'a Value,
    path: &[&str],
    difficulty: &'a str,
) -> impl Iterator<Item = &'a Value> + 'a {
    lookup_array(response, path)
        .iter()
        .filter(move |item| lookup(item, &["difficulty"]).and_then(Value::as_str) == Some(difficulty))
}

/// Accepted share of submissions in percent, rounded to two places; 0 when nothing was submitted.
pub fn acceptance_rate(accepted: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let rate = accepted as f64 * 100.0 / total as f64;
    round_half_even(rate, 2)
}

/// Rounds the exact binary value to `places` decimals, ties going to the even digit.
fn round_half_even(value: f64, places: usize) -> f64 {
    if !value.is_finite() || value < 0.0 {
        return value;
    }

    // every finite f64 has a terminating expansion well within this many digits
    let exact = format!("{value:.1100}");
    let Some((whole, fraction)) = exact.split_once('.') else {
        return value;
    };
    let (kept, dropped) = fraction.split_at(places);

    let mut digits: Vec<u8> = whole.bytes().chain(kept.bytes()).collect();
    let round_up = match dropped.as_bytes() {
        [b'6'..=b'9', ..] => true,
        [b'5', rest @ ..] => {
            rest.iter().any(|&d| d != b'0') || digits.last().is_some_and(|d| (d - b'0') % 2 == 1)
        }
        _ => false,
    };

    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == b'9' {
                *digit = b'0';
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, b'1');
        }
    }

    let split = digits.len() - places;
    let rounded = format!(
        "{}.{}",
        String::from_utf8_lossy(&digits[..split]),
        String::from_utf8_lossy(&digits[split..])
    );
    rounded.parse().unwrap_or(value)
}

/// "25.0%", "33.33%", or "0%" when the rate is undefined.
pub fn render_rate(accepted: u64, total: u64) -> String {
    if total == 0 {
        return "0%".into();
    }
    let rate = acceptance_rate(accepted, total);
    if rate.fract() == 0.0 {
        format!("{rate:.1}%")
    } else {
        format!("{rate}%")
    }
}

pub fn render_ranking(ranking: Option<u64>) -> String {
    match ranking {
        Some(ranking) if ranking > RANKING_CAP => CAPPED_RANKING.into(),
        Some(ranking) => ranking.to_string(),
        None => "NA".into(),
    }
}

fn render_optional(value: Option<u64>) -> String {
    value.map_or_else(|| "NA".into(), |value| value.to_string())
}

pub fn parse_stats(response: &Value) -> Result<LeetCodeProfile, Miss> {
    let user = lookup(response, &["data", "matchedUser"])
        .filter(|user| user.is_object())
        .ok_or(Miss::NotFound)?;

    let all = Tier::collect(response, "All");
    let easy = Tier::collect(response, "Easy");
    let medium = Tier::collect(response, "Medium");
    let hard = Tier::collect(response, "Hard");

    Ok(LeetCodeProfile {
        status: Status::Ok,
        ranking: render_ranking(lookup_u64(user, &["profile", "ranking"])),
        total_problems_submitted: all.submitted.to_string(),
        total_problems_solved: all.solved.to_string(),
        acceptance_rate: all.rate(),
        easy_problems_submitted: easy.submitted.to_string(),
        easy_questions_solved: easy.solved.to_string(),
        easy_acceptance_rate: easy.rate(),
        total_easy_questions: easy.total_questions.to_string(),
        medium_problems_submitted: medium.submitted.to_string(),
        medium_questions_solved: medium.solved.to_string(),
        medium_acceptance_rate: medium.rate(),
        total_medium_questions: medium.total_questions.to_string(),
        hard_problems_submitted: hard.submitted.to_string(),
        hard_questions_solved: hard.solved.to_string(),
        hard_acceptance_rate: hard.rate(),
        total_hard_questions: hard.total_questions.to_string(),
        contribution_points: render_optional(lookup_u64(user, &["contributions", "points"])),
        contribution_problems: render_optional(lookup_u64(
            user,
            &["contributions", "questionCount"],
        )),
        contribution_testcases: render_optional(lookup_u64(
            user,
            &["contributions", "testcaseCount"],
        )),
        reputation: render_optional(lookup_u64(user, &["profile", "reputation"])),
    })
}
