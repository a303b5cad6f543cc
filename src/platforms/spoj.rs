use std::collections::HashMap;

use async_trait::async_trait;
use scraper::{ElementRef, Html};

use crate::client::{endpoint, fetch, Client};
use crate::error::Error;
use crate::extract::{attr, parse_num, root, text, Miss, Outcome, Rule};
use crate::platforms::Platform;
use crate::types::{ProfileResult, SpojProfile, Status};

const PROFILE_LEFT: Rule = Rule::new("profile block", "#user-profile-left");
const FULL_NAME: Rule = Rule::new("full name", "h3");
const AVATAR: Rule = Rule::new("avatar", "img");
const PARAGRAPH: Rule = Rule::new("profile paragraph", "p");
const STATS: Rule = Rule::new("stats block", ".profile-info-data-stats");
const STAT_LABEL: Rule = Rule::new("stat label", "dt");
const STAT_VALUE: Rule = Rule::new("stat value", "dd");
const SOLVED_TABLE: Rule = Rule::new("solved table", "table.table.table-condensed");
const ANY_TABLE: Rule = Rule::new("problem table", "table.table");
const PROBLEM_CELL: Rule = Rule::new("problem cell", "td");
const PROBLEM_LINK: Rule = Rule::new("problem link", "a");

// Paragraph order inside the profile block: location, join date, world
// rank with points, institution. Values are read by token position, e.g.
// "World Rank: #1234 (56.78 points)" -> rank token 2, points token 3.
const LOCATION_PARAGRAPH: usize = 0;
const JOINED_PARAGRAPH: usize = 1;
const RANK_PARAGRAPH: usize = 2;
const INSTITUTE_PARAGRAPH: usize = 3;
const RANK_TOKEN: usize = 2;
const POINTS_TOKEN: usize = 3;

pub struct Spoj {
    base_url: String,
}

impl Spoj {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Platform for Spoj {
    async fn lookup(
        &self,
        client: &dyn Client,
        username: &str,
    ) -> Result<Outcome<ProfileResult>, Error> {
        let url = endpoint(&self.base_url, &["users", username, ""])?;
        let page = fetch(client, url.as_str()).await;
        if !page.is_success() {
            return Ok(Outcome::NotFound);
        }

        Ok(Outcome::from(parse_profile(&page.body, username)).map(ProfileResult::Spoj))
    }
}

pub fn parse_profile(html: &str, username: &str) -> Result<SpojProfile, Miss> {
    let document = Html::parse_document(html);
    let root = root(&document);

    let left = PROFILE_LEFT.first(root)?.ok_or(Miss::NotFound)?;
    let paragraphs: Vec<String> = PARAGRAPH.all(left)?.into_iter().map(text).collect();
    let paragraph = |index: usize| {
        paragraphs
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| Miss::drift(format!("profile paragraph {index} not found")))
    };

    // a profile page without numeric points is treated as a missing user
    let rank_line = paragraph(RANK_PARAGRAPH).map_err(|_| Miss::NotFound)?;
    let points = token(rank_line, POINTS_TOKEN)
        .and_then(|raw| raw.get(1..))
        .and_then(|raw| raw.parse::<f64>().ok())
        .ok_or(Miss::NotFound)?;
    let rank = token(rank_line, RANK_TOKEN)
        .and_then(|raw| raw.get(1..))
        .ok_or_else(|| Miss::drift(format!("no rank in {rank_line:?}")))?;
    let rank = parse_num(rank, "world rank")?;

    let joined: Vec<&str> = paragraph(JOINED_PARAGRAPH)?.split_whitespace().collect();
    let join_date = joined
        .get(1..3)
        .map(|parts| parts.join(" "))
        .ok_or_else(|| Miss::drift("join date paragraph too short"))?;

    let institute = paragraph(INSTITUTE_PARAGRAPH)?
        .split_whitespace()
        .skip(1)
        .collect::<Vec<_>>()
        .join(" ");

    let stats = stats(root)?;
    let stat = |label: &str| {
        stats
            .get(label)
            .cloned()
            .ok_or_else(|| Miss::drift(format!("stat {label:?} not found")))
    };

    Ok(SpojProfile {
        status: Status::Ok,
        fullname: text(FULL_NAME.require(left)?),
        username: username.into(),
        location: paragraph(LOCATION_PARAGRAPH)?.to_string(),
        img_scr: attr(AVATAR.require(left)?, "src", &AVATAR)?,
        points,
        rank,
        solved: problems(SOLVED_TABLE.require(root)?)?,
        todo: todo(root)?,
        join_date,
        institute,
        problems_solved: stat("Problems solved")?,
        solution_submitted: stat("Solutions submitted")?,
    })
}

fn token(line: &str, index: usize) -> Option<&str> {
    line.split_whitespace().nth(index)
}

/// Label to value pairs from the dt/dd stats list.
fn stats(root: ElementRef<'_>) -> Result<HashMap<String, String>, Miss> {
    let block = STATS.require(root)?;
    let labels = STAT_LABEL.all(block)?;
    let values = STAT_VALUE.all(block)?;

    Ok(labels
        .into_iter()
        .zip(values)
        .map(|(label, value)| (text(label), text(value)))
        .collect())
}

fn problems(table: ElementRef<'_>) -> Result<Vec<String>, Miss> {
    let mut codes = Vec::new();
    for cell in PROBLEM_CELL.all(table)? {
        if let Some(link) = PROBLEM_LINK.first(cell)? {
            let code = text(link);
            if !code.is_empty() {
                codes.push(code);
            }
        }
    }
    Ok(codes)
}

/// The to-do table is only rendered when the user keeps one.
fn todo(root: ElementRef<'_>) -> Result<Option<Vec<String>>, Miss> {
    match ANY_TABLE.all(root)?.get(1) {
        Some(table) => problems(*table).map(Some),
        None => Ok(None),
    }
}
