use std::collections::BTreeMap;
use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html};

use crate::brackets::array_after;
use crate::client::{endpoint, fetch, Client};
use crate::error::Error;
use crate::extract::{attr, parse_num, root, text, Miss, Outcome, Rule};
use crate::platforms::Platform;
use crate::types::{
    CodeChefProfile, ProblemRef, ProfileResult, Reported, SolvedBucket, Status, UserDetails,
};

const RATING: Rule = Rule::new("rating number", "div.rating-number");
const STARS: Rule = Rule::new("star tier", "span.rating");
const HIGHEST_RATING: Rule = Rule::new("highest rating label", "div.rating-header small");
const RANK_LINK: Rule = Rule::new("rank link", "div.rating-ranks a");
const RANK_VALUE: Rule = Rule::new("rank value", "strong");
const HEADER: Rule = Rule::new("page header", "header");
const FULL_NAME: Rule = Rule::new("full name", "h1.h2-style");
const AVATAR: Rule = Rule::new("avatar", "img");
const DETAIL_ITEM: Rule = Rule::new("user detail", "section.user-details li");
const SOLVED_SECTION: Rule = Rule::new(
    "problems solved section",
    "section.rating-data-section.problems-solved",
);
const SOLVED_COUNT: Rule = Rule::new("solved count", "h5");
const SOLVED_LIST: Rule = Rule::new("solved problem list", "article");
const CATEGORY: Rule = Rule::new("problem category", "p");
const CATEGORY_NAME: Rule = Rule::new("category name", "strong");
const PROBLEM_LINK: Rule = Rule::new("problem link", "a");

const RATING_MARKER: &str = "all_rating";

// these duplicate fields reported elsewhere in the record
const EXCLUDED_ATTRIBUTES: [&str; 4] = ["username", "link", "teams list", "discuss profile"];

pub struct CodeChef {
    base_url: String,
}

impl CodeChef {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl Platform for CodeChef {
    async fn lookup(
        &self,
        client: &dyn Client,
        username: &str,
    ) -> Result<Outcome<ProfileResult>, Error> {
        let url = endpoint(&self.base_url, &["users", username])?;
        let page = fetch(client, url.as_str()).await;

        Ok(Outcome::from(parse_profile(&page.body, &self.base_url)).map(ProfileResult::CodeChef))
    }
}

pub fn parse_profile(html: &str, base_url: &str) -> Result<CodeChefProfile, Miss> {
    let document = Html::parse_document(html);
    let root = root(&document);

    // the rating block only renders for existing users
    let rating = RATING.first(root)?.ok_or(Miss::NotFound)?;
    let rating = parse_num(&text(rating), "rating")?;

    let stars = STARS.first(root)?.map(text);

    let highest = text(HIGHEST_RATING.require(root)?);
    let highest = highest
        .split_whitespace()
        .last()
        .unwrap_or_default()
        .trim_end_matches(')');
    let highest_rating = parse_num(highest, "highest rating")?;

    let global_rank = rank(RANK_LINK.nth(root, 0)?)?;
    let country_rank = rank(RANK_LINK.nth(root, 1)?)?;

    let solved = SOLVED_SECTION.require(root)?;
    let fully_solved = solved_bucket(solved, 0, base_url)?;
    let partially_solved = solved_bucket(solved, 1, base_url)?;

    Ok(CodeChefProfile {
        status: Status::Ok,
        rating,
        stars,
        highest_rating,
        global_rank,
        country_rank,
        user_details: user_details(root)?,
        contest_ratings: contest_ratings(html)?,
        fully_solved,
        partially_solved,
    })
}

fn rank(link: ElementRef<'_>) -> Result<Reported<u64>, Miss> {
    let raw = text(RANK_VALUE.require(link)?);
    if raw == "NA" {
        return Ok(Reported::NotAvailable);
    }
    parse_num(&raw, "rank").map(Reported::Value)
}

fn user_details(root: ElementRef<'_>) -> Result<UserDetails, Miss> {
    let header = HEADER.nth(root, 1)?;
    let name = text(FULL_NAME.require(header)?);
    let image = attr(AVATAR.require(header)?, "src", &AVATAR)?;

    let items = DETAIL_ITEM.all(root)?;
    let first = items
        .first()
        .ok_or_else(|| Miss::drift("user detail list is empty"))?;
    // "Username:7★tourist", the star prefix is absent for unrated users
    let first = text(*first);
    let username = first
        .split_once(':')
        .map_or(first.as_str(), |(_, value)| value)
        .rsplit('★')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string();

    let mut attributes = BTreeMap::new();
    for item in &items {
        let raw: String = item.text().collect();
        let mut parts = raw.split(':');
        let (Some(attribute), Some(value)) = (parts.next(), parts.next()) else {
            continue;
        };
        let attribute = attribute.trim().to_lowercase();
        if !EXCLUDED_ATTRIBUTES.contains(&attribute.as_str()) {
            attributes.insert(attribute, value.trim().to_string());
        }
    }

    Ok(UserDetails {
        name,
        username,
        image,
        attributes,
    })
}

/// The rating graph data is embedded as a JS array literal in a page script.
pub fn contest_ratings(html: &str) -> Result<Vec<serde_json::Map<String, serde_json::Value>>, Miss> {
    let raw = array_after(html, RATING_MARKER)
        .ok_or_else(|| Miss::drift("contest rating array not found"))?;
    let mut ratings: Vec<serde_json::Map<String, serde_json::Value>> =
        serde_json::from_str(raw).map_err(|e| Miss::drift(format!("contest ratings: {e}")))?;
    for contest in &mut ratings {
        contest.remove("color");
    }
    Ok(ratings)
}

fn digits() -> &'static Regex {
    static DIGITS: OnceLock<Regex> = OnceLock::new();
    DIGITS.get_or_init(|| Regex::new(r"\d+").expect("Invalid digits regex"))
}

fn solved_bucket(section: ElementRef<'_>, index: usize, base_url: &str) -> Result<SolvedBucket, Miss> {
    let heading = text(SOLVED_COUNT.nth(section, index)?);
    let count = digits()
        .find(&heading)
        .ok_or_else(|| Miss::drift(format!("no count in {heading:?}")))?;
    let count: u64 = parse_num(count.as_str(), "solved count")?;

    let mut categories = BTreeMap::new();
    if count > 0 {
        let list = SOLVED_LIST.nth(section, index)?;
        for category in CATEGORY.all(list)? {
            let name = text(CATEGORY_NAME.require(category)?);
            let name = name.strip_suffix(':').unwrap_or(&name).to_string();
            let mut problems = Vec::new();
            for link in PROBLEM_LINK.all(category)? {
                problems.push(ProblemRef {
                    name: text(link),
                    link: format!("{base_url}{}", attr(link, "href", &PROBLEM_LINK)?),
                });
            }
            categories.insert(name, problems);
        }
    }

    Ok(SolvedBucket { count, categories })
}

#[cfg(test)]
pub(crate) mod test {
    use serde_json::json;

    use super::*;

    pub(crate) const PROFILE: &str = r###"
        <html><head><title>tourist | CodeChef</title></head>
        <body>
          <header class="site-header"><a href="/">CodeChef</a></header>
          <main>
            <div class="user-details-container">
              <header>
                <img src="https://cdn.codechef.com/sites/default/files/uploads/pictures/tourist.jpg" />
                <h1 class="h2-style">Gennady Korotkevich</h1>
              </header>
              <section class="user-details">
                <ul class="side-nav">
                  <li><label>Username:</label><span><span class="rating">7★</span>tourist</span></li>
                  <li><label>Country:</label><span>Belarus</span></li>
                  <li><label>Student/Professional:</label><span>Professional</span></li>
                  <li><label>Institution:</label><span>ITMO University</span></li>
                  <li><label>Teams List:</label><a href="/teams/view/tourist">View</a></li>
                  <li><label>Discuss Profile:</label><a href="https://discuss.codechef.com">Link</a></li>
                  <li><span>no separator here</span></li>
                </ul>
              </section>
            </div>
            <div class="rating-header text-center">
              <div class="rating-number">3558</div>
              <div><span class="rating">7★</span></div>
              <small>(Highest Rating 3818)</small>
            </div>
            <div class="rating-ranks">
              <ul>
                <li><a href="/ratings/all"><strong>1</strong></a> Global Rank</li>
                <li><a href="/ratings/all?filterBy=Country%3DBelarus"><strong>1</strong></a> Country Rank</li>
              </ul>
            </div>
            <section class="rating-data-section problems-solved">
              <h5>Fully Solved (3)</h5>
              <article>
                <p><strong>Practice:</strong><span><a href="/status/FLOW001,tourist">FLOW001</a>, <a href="/status/TEST,tourist">TEST</a></span></p>
                <p><strong>LTIME01:</strong><span><a href="/LTIME01/status/NUMFACT,tourist">NUMFACT</a></span></p>
              </article>
              <h5>Partially Solved (0)</h5>
              <article></article>
            </section>
          </main>
          <script>
            var all_rating = [{"code":"COOK01","rating":"2500","rank":"1","name":"Cook [Div 1]","color":"#ff0000","ranks":[[1,2],[3]]},{"code":"LTIME01","rating":"2600","rank":"2","name":"Lunchtime","color":"#00ff00","ranks":[]}];
            var other = [1, 2];
          </script>
        </body></html>
    "###;

    #[test]
    fn test_parse_profile() {
        let profile = parse_profile(PROFILE, "https://www.codechef.com").unwrap();

        assert_eq!(profile.rating, 3558);
        assert_eq!(profile.stars.as_deref(), Some("7★"));
        assert_eq!(profile.highest_rating, 3818);
        assert_eq!(profile.global_rank, Reported::Value(1));
        assert_eq!(profile.country_rank, Reported::Value(1));

        let details = serde_json::to_value(&profile.user_details).unwrap();
        assert_eq!(
            details,
            json!({
                "name": "Gennady Korotkevich",
                "username": "tourist",
                "image": "https://cdn.codechef.com/sites/default/files/uploads/pictures/tourist.jpg",
                "country": "Belarus",
                "student/professional": "Professional",
                "institution": "ITMO University"
            })
        );

        assert_eq!(profile.contest_ratings.len(), 2);
        assert!(profile
            .contest_ratings
            .iter()
            .all(|contest| !contest.contains_key("color")));
        assert_eq!(profile.contest_ratings[0]["ranks"], json!([[1, 2], [3]]));
        assert_eq!(profile.contest_ratings[1]["code"], json!("LTIME01"));

        assert_eq!(
            serde_json::to_value(&profile.fully_solved).unwrap(),
            json!({
                "count": 3,
                "Practice": [
                    {"name": "FLOW001", "link": "https://www.codechef.com/status/FLOW001,tourist"},
                    {"name": "TEST", "link": "https://www.codechef.com/status/TEST,tourist"}
                ],
                "LTIME01": [
                    {"name": "NUMFACT", "link": "https://www.codechef.com/LTIME01/status/NUMFACT,tourist"}
                ]
            })
        );
        assert_eq!(
            serde_json::to_value(&profile.partially_solved).unwrap(),
            json!({"count": 0})
        );
    }

    #[test]
    fn test_unrated_ranks_keep_sentinel() {
        let html = PROFILE.replacen("<strong>1</strong>", "<strong>NA</strong>", 2);
        let profile = parse_profile(&html, "https://www.codechef.com").unwrap();

        assert_eq!(profile.global_rank, Reported::NotAvailable);
        assert_eq!(profile.country_rank, Reported::NotAvailable);
        let value = serde_json::to_value(&profile).unwrap();
        assert_eq!(value["global_rank"], json!("NA"));
        assert_eq!(value["status"], json!("OK"));
    }

    #[test]
    fn test_missing_rating_is_not_found() {
        let html = PROFILE.replace(r#"<div class="rating-number">3558</div>"#, "");
        assert_eq!(
            parse_profile(&html, "https://www.codechef.com").unwrap_err(),
            Miss::NotFound
        );
        assert_eq!(
            parse_profile("<html><body></body></html>", "https://www.codechef.com").unwrap_err(),
            Miss::NotFound
        );
    }

    #[test]
    fn test_missing_rating_script_is_drift() {
        let html = PROFILE.replace("all_rating", "rating_graph");
        assert!(matches!(
            parse_profile(&html, "https://www.codechef.com"),
            Err(Miss::Drift(_))
        ));
    }

    #[test]
    fn test_solved_counts_share_one_pattern() {
        assert!(std::ptr::eq(digits(), digits()));

        let html = PROFILE.replace("Partially Solved (0)", "Partially Solved (no count)");
        assert!(matches!(
            parse_profile(&html, "https://www.codechef.com"),
            Err(Miss::Drift(_))
        ));

        for _ in 0..2 {
            let profile = parse_profile(PROFILE, "https://www.codechef.com").unwrap();
            assert_eq!(profile.fully_solved.count, 3);
            assert_eq!(profile.partially_solved.count, 0);
        }
    }

    #[test]
    fn test_stars_are_optional() {
        let html = PROFILE.replace(
            r#"<div><span class="rating">7★</span></div>"#,
            "",
        );
        let html = html.replace(r#"<span class="rating">7★</span>tourist"#, "tourist");
        let profile = parse_profile(&html, "https://www.codechef.com").unwrap();
        assert_eq!(profile.stars, None);
        assert_eq!(profile.user_details.username, "tourist");
    }
}
