use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

use crate::error::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    CodeChef,
    Codeforces,
    LeetCode,
    Spoj,
    AtCoder,
}

impl PlatformKind {
    pub const ALL: [PlatformKind; 5] = [
        PlatformKind::CodeChef,
        PlatformKind::Codeforces,
        PlatformKind::LeetCode,
        PlatformKind::Spoj,
        PlatformKind::AtCoder,
    ];

    pub fn key(self) -> &'static str {
        match self {
            PlatformKind::CodeChef => "codechef",
            PlatformKind::Codeforces => "codeforces",
            PlatformKind::LeetCode => "leetcode",
            PlatformKind::Spoj => "spoj",
            PlatformKind::AtCoder => "atcoder",
        }
    }
}

// keys are matched exactly, "CodeChef" is not a platform
impl FromStr for PlatformKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlatformKind::ALL
            .into_iter()
            .find(|kind| kind.key() == s)
            .ok_or_else(|| Error::Platform(s.into()))
    }
}

impl fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Status {
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "Failed")]
    Failed,
}

/// A value the upstream site may display as "NA" instead of a number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Reported<T> {
    Value(T),
    NotAvailable,
}

impl<T: Serialize> Serialize for Reported<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Reported::Value(value) => value.serialize(serializer),
            Reported::NotAvailable => serializer.serialize_str("NA"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ProblemRef {
    pub name: String,
    pub link: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct SolvedBucket {
    pub count: u64,
    #[serde(flatten)]
    pub categories: BTreeMap<String, Vec<ProblemRef>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UserDetails {
    pub name: String,
    pub username: String,
    pub image: String,
    #[serde(flatten)]
    pub attributes: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CodeChefProfile {
    pub status: Status,
    pub rating: i64,
    pub stars: Option<String>,
    pub highest_rating: i64,
    pub global_rank: Reported<u64>,
    pub country_rank: Reported<u64>,
    pub user_details: UserDetails,
    pub contest_ratings: Vec<serde_json::Map<String, serde_json::Value>>,
    pub fully_solved: SolvedBucket,
    pub partially_solved: SolvedBucket,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContestRow {
    pub contest: String,
    pub rank: String,
    pub solved: String,
    #[serde(rename = "ratingChange")]
    pub rating_change: String,
    #[serde(rename = "newRating")]
    pub new_rating: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CodeforcesProfile {
    pub status: Status,
    #[serde(flatten)]
    pub user: serde_json::Map<String, serde_json::Value>,
    pub contests: Vec<ContestRow>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct LeetCodeProfile {
    pub status: Status,
    pub ranking: String,
    pub total_problems_submitted: String,
    pub total_problems_solved: String,
    pub acceptance_rate: String,
    pub easy_problems_submitted: String,
    pub easy_questions_solved: String,
    pub easy_acceptance_rate: String,
    pub total_easy_questions: String,
    pub medium_problems_submitted: String,
    pub medium_questions_solved: String,
    pub medium_acceptance_rate: String,
    pub total_medium_questions: String,
    pub hard_problems_submitted: String,
    pub hard_questions_solved: String,
    pub hard_acceptance_rate: String,
    pub total_hard_questions: String,
    pub contribution_points: String,
    pub contribution_problems: String,
    pub contribution_testcases: String,
    pub reputation: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SpojProfile {
    pub status: Status,
    pub fullname: String,
    pub username: String,
    pub location: String,
    pub img_scr: String,
    pub points: f64,
    pub rank: u64,
    pub solved: Vec<String>,
    pub todo: Option<Vec<String>>,
    pub join_date: String,
    pub institute: String,
    pub problems_solved: String,
    pub solution_submitted: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AtCoderProfile {
    pub status: Status,
    pub username: String,
    pub platform: &'static str,
    pub rating: Reported<u64>,
    pub highest: Reported<u64>,
    pub rank: Reported<u64>,
    pub level: Reported<String>,
    pub other: BTreeMap<String, String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProfileResult {
    CodeChef(CodeChefProfile),
    Codeforces(CodeforcesProfile),
    LeetCode(LeetCodeProfile),
    Spoj(SpojProfile),
    AtCoder(AtCoderProfile),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailureBody {
    pub status: Status,
    pub details: String,
}

impl From<&Error> for FailureBody {
    fn from(err: &Error) -> Self {
        Self {
            status: Status::Failed,
            details: err.details(),
        }
    }
}
