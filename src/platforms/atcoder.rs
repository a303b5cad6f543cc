use std::collections::BTreeMap;

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::client::{endpoint, fetch, Client};
use crate::error::Error;
use crate::extract::{parse_num, root, text, Miss, Outcome, Rule};
use crate::platforms::Platform;
use crate::types::{AtCoderProfile, ProfileResult, Reported, Status};

const DATA_TABLE: Rule = Rule::new("data table", "table.dl-table");
const ROW: Rule = Rule::new("data row", "tr");
const LABEL: Rule = Rule::new("row label", "th");
const VALUE: Rule = Rule::new("row value", "td");
const BADGE: Rule = Rule::new("rating badge", "span");

const HIGHEST_RATING_LABEL: &str = "Highest Rating";
const PLATFORM_NAME: &str = "Atcoder";

pub struct AtCoder {
    base_url: String,
}

impl AtCoder {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Platform for AtCoder {
    async fn lookup(
        &self,
        client: &dyn Client,
        username: &str,
    ) -> Result<Outcome<ProfileResult>, Error> {
        let url = endpoint(&self.base_url, &["users", username])?;
        let page = fetch(client, url.as_str()).await;
        if !page.is_success() {
            return Ok(Outcome::NotFound);
        }

        Ok(Outcome::from(parse_profile(&page.body, username)).map(ProfileResult::AtCoder))
    }
}

pub fn parse_profile(html: &str, username: &str) -> Result<AtCoderProfile, Miss> {
    let document = Html::parse_document(html);
    let tables = DATA_TABLE.all(root(&document))?;
    if tables.is_empty() {
        return Err(Miss::NotFound);
    }

    let mut other = BTreeMap::new();
    for table in &tables {
        for row in ROW.all(*table)? {
            let (Some(label), Some(value)) = (LABEL.first(row)?, VALUE.first(row)?) else {
                continue;
            };
            let label = text(label);
            let mut value = text(value);
            if label == HIGHEST_RATING_LABEL {
                value = value.split_whitespace().next().unwrap_or_default().to_string();
            }
            other.insert(label, value);
        }
    }

    let mut profile = AtCoderProfile {
        status: Status::Ok,
        username: username.into(),
        platform: PLATFORM_NAME,
        rating: Reported::NotAvailable,
        highest: Reported::NotAvailable,
        rank: Reported::NotAvailable,
        level: Reported::NotAvailable,
        other,
    };

    // users who never entered a rated contest have no ranking table
    if let Some(ranking) = tables.get(1) {
        let history = ranking_history(*ranking)?;
        profile.rank = Reported::Value(history.rank);
        profile.rating = Reported::Value(history.rating);
        profile.highest = Reported::Value(history.highest);
        profile.level = Reported::Value(history.level);
    }

    Ok(profile)
}

struct RankingHistory {
    rank: u64,
    rating: u64,
    highest: u64,
    level: String,
}

// any failure here means the layout moved, the user exists either way
fn ranking_history(table: ElementRef<'_>) -> Result<RankingHistory, Miss> {
    let rank = text(VALUE.nth(table, 0)?);
    let rank = rank.trim_end_matches(|c: char| c.is_alphabetic());
    let rating = text(VALUE.nth(table, 1)?);
    let highest = VALUE.nth(table, 2)?;

    Ok(RankingHistory {
        rank: parse_num(rank, "rank")?,
        rating: parse_num(&rating, "rating")?,
        highest: parse_num(&text(BADGE.nth(highest, 0)?), "highest rating")?,
        level: text(BADGE.nth(highest, 2)?),
    })
}
