use async_trait::async_trait;
use scraper::Html;
use serde_json::Value;

use crate::client::{endpoint, fetch, Client, Page};
use crate::error::Error;
use crate::extract::{root, text, Miss, Outcome, Rule};
use crate::platforms::Platform;
use crate::types::{CodeforcesProfile, ContestRow, ProfileResult, Status};

const CONTEST_TABLE: Rule = Rule::new("contest table", "table.user-contests-table");
const CONTEST_ROW: Rule = Rule::new("contest row", "tbody tr");
const CELL: Rule = Rule::new("contest cell", "td");

// Column positions in the rendered contest table. Positional, so a column
// inserted upstream shifts values silently instead of failing.
const CONTEST_COLUMN: usize = 1;
const RANK_COLUMN: usize = 3;
const SOLVED_COLUMN: usize = 4;
const DELTA_COLUMN: usize = 5;
const NEW_RATING_COLUMN: usize = 6;

pub struct Codeforces {
    base_url: String,
}

impl Codeforces {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Platform for Codeforces {
    async fn lookup(
        &self,
        client: &dyn Client,
        username: &str,
    ) -> Result<Outcome<ProfileResult>, Error> {
        let mut info_url = endpoint(&self.base_url, &["api", "user.info"])?;
        info_url.query_pairs_mut().append_pair("handles", username);
        let contests_url = endpoint(&self.base_url, &["contests", "with", username])?;

        let info = fetch(client, info_url.as_str()).await;
        let contests = fetch(client, contests_url.as_str()).await;

        Ok(Outcome::from(parse_profile(&info, &contests)).map(ProfileResult::Codeforces))
    }
}

pub fn parse_profile(info: &Page, contests: &Page) -> Result<CodeforcesProfile, Miss> {
    if !info.is_success() && !contests.is_success() {
        return Err(Miss::NotFound);
    }

    let user = user_record(info)?;
    // the handle exists, so a missing contest page is not a missing user;
    // report it apart from a page that came back without the table
    if !contests.is_success() {
        return Err(Miss::drift(format!(
            "contest page unavailable (status {})",
            contests.status
        )));
    }
    let contests = contest_rows(&contests.body)?;

    Ok(CodeforcesProfile {
        status: Status::Ok,
        user,
        contests,
    })
}

/// First record of a `user.info` response; a FAILED status or empty result means no such handle.
fn user_record(info: &Page) -> Result<serde_json::Map<String, Value>, Miss> {
    let body: Value = match serde_json::from_str(&info.body) {
        Ok(body) => body,
        Err(_) if !info.is_success() => return Err(Miss::NotFound),
        Err(e) => return Err(Miss::drift(format!("user.info response: {e}"))),
    };

    if body.get("status").and_then(Value::as_str) != Some("OK") {
        return Err(Miss::NotFound);
    }

    let mut user = body
        .get("result")
        .and_then(Value::as_array)
        .and_then(|result| result.first())
        .and_then(Value::as_object)
        .cloned()
        .ok_or(Miss::NotFound)?;

    // these keys belong to the merged record
    user.remove("status");
    user.remove("contests");
    Ok(user)
}

fn contest_rows(html: &str) -> Result<Vec<ContestRow>, Miss> {
    let document = Html::parse_document(html);
    let table = CONTEST_TABLE.require(root(&document))?;

    let mut rows = Vec::new();
    for row in CONTEST_ROW.all(table)? {
        let cells: Vec<String> = CELL.all(row)?.into_iter().map(text).collect();
        if cells.len() <= NEW_RATING_COLUMN {
            return Err(Miss::drift(format!(
                "contest row has {} cells, expected {}",
                cells.len(),
                NEW_RATING_COLUMN + 1
            )));
        }
        rows.push(ContestRow {
            contest: cells[CONTEST_COLUMN].clone(),
            rank: cells[RANK_COLUMN].clone(),
            solved: cells[SOLVED_COLUMN].clone(),
            rating_change: cells[DELTA_COLUMN].clone(),
            new_rating: cells[NEW_RATING_COLUMN].clone(),
        });
    }

    Ok(rows)
}
