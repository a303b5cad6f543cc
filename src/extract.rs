//! Named extraction rules over a parsed HTML tree.
//!
//! Each adapter declares its markup assumptions as [`Rule`] constants so a
//! change upstream shows up as a drift message naming the rule that broke.

use std::fmt;
use std::str::FromStr;

use scraper::{ElementRef, Html, Selector};

/// What an adapter hands back to the resolver.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    Found(T),
    NotFound,
    SchemaDrift(String),
}

/// Early exit used with `?` inside adapters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Miss {
    NotFound,
    Drift(String),
}

impl Miss {
    pub fn drift(detail: impl fmt::Display) -> Self {
        Miss::Drift(detail.to_string())
    }
}

impl<T> From<Result<T, Miss>> for Outcome<T> {
    fn from(result: Result<T, Miss>) -> Self {
        match result {
            Ok(found) => Outcome::Found(found),
            Err(Miss::NotFound) => Outcome::NotFound,
            Err(Miss::Drift(detail)) => Outcome::SchemaDrift(detail),
        }
    }
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Found(found) => Outcome::Found(f(found)),
            Outcome::NotFound => Outcome::NotFound,
            Outcome::SchemaDrift(detail) => Outcome::SchemaDrift(detail),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub name: &'static str,
    pub selector: &'static str,
}

impl Rule {
    pub const fn new(name: &'static str, selector: &'static str) -> Self {
        Self { name, selector }
    }

    fn compile(&self) -> Result<Selector, Miss> {
        Selector::parse(self.selector)
            .map_err(|e| Miss::drift(format!("invalid selector for {}: {e:?}", self.name)))
    }

    pub fn all<'a>(&self, scope: ElementRef<'a>) -> Result<Vec<ElementRef<'a>>, Miss> {
        let selector = self.compile()?;
        Ok(scope.select(&selector).collect())
    }

    pub fn first<'a>(&self, scope: ElementRef<'a>) -> Result<Option<ElementRef<'a>>, Miss> {
        let selector = self.compile()?;
        Ok(scope.select(&selector).next())
    }

    /// First match, or a drift naming this rule.
    pub fn require<'a>(&self, scope: ElementRef<'a>) -> Result<ElementRef<'a>, Miss> {
        self.first(scope)?
            .ok_or_else(|| Miss::drift(format!("{} not found", self.name)))
    }

    /// Positional match; fragile by nature, a missing index is reported as drift.
    pub fn nth<'a>(&self, scope: ElementRef<'a>, index: usize) -> Result<ElementRef<'a>, Miss> {
        let selector = self.compile()?;
        scope
            .select(&selector)
            .nth(index)
            .ok_or_else(|| Miss::drift(format!("{}[{index}] not found", self.name)))
    }
}

pub fn root(document: &Html) -> ElementRef<'_> {
    document.root_element()
}

/// All text below `element`, whitespace at both ends trimmed.
pub fn text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

pub fn attr(element: ElementRef<'_>, name: &str, rule: &Rule) -> Result<String, Miss> {
    element
        .value()
        .attr(name)
        .map(str::to_string)
        .ok_or_else(|| Miss::drift(format!("{} has no {name} attribute", rule.name)))
}

pub fn parse_num<T>(raw: &str, what: &str) -> Result<T, Miss>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e| Miss::drift(format!("{what} {raw:?}: {e}")))
}

#[cfg(test)]
mod test {
    use scraper::Html;

    use super::*;

    const ITEM: Rule = Rule::new("list item", "ul.items li");
    const BROKEN: Rule = Rule::new("broken", "ul[");

    fn doc() -> Html {
        Html::parse_document(
            r#"<html><body><ul class="items"><li> one </li><li><a href="/two">two</a></li></ul></body></html>"#,
        )
    }

    #[test]
    fn test_rules() {
        let document = doc();
        let root = root(&document);

        assert_eq!(ITEM.all(root).unwrap().len(), 2);
        assert_eq!(text(ITEM.require(root).unwrap()), "one");
        assert_eq!(text(ITEM.nth(root, 1).unwrap()), "two");
        assert_eq!(
            ITEM.nth(root, 2).unwrap_err(),
            Miss::Drift("list item[2] not found".into())
        );

        let missing = Rule::new("table", "table");
        assert!(missing.first(root).unwrap().is_none());
        assert_eq!(
            missing.require(root).unwrap_err(),
            Miss::Drift("table not found".into())
        );
        assert!(matches!(BROKEN.all(root), Err(Miss::Drift(_))));
    }

    #[test]
    fn test_attr_and_numbers() {
        let document = doc();
        let link_rule = Rule::new("link", "a");
        let link = link_rule.require(root(&document)).unwrap();
        assert_eq!(attr(link, "href", &link_rule).unwrap(), "/two");
        assert!(attr(link, "src", &link_rule).is_err());

        assert_eq!(parse_num::<u64>(" 42 ", "rank").unwrap(), 42);
        assert!(matches!(parse_num::<u64>("4x", "rank"), Err(Miss::Drift(_))));
    }

    #[test]
    fn test_outcome_from_result() {
        assert_eq!(Outcome::from(Ok::<_, Miss>(1)), Outcome::Found(1));
        assert_eq!(Outcome::<u8>::from(Err(Miss::NotFound)), Outcome::NotFound);
        assert_eq!(
            Outcome::<u8>::from(Err(Miss::drift("gone"))).map(|n| n + 1),
            Outcome::SchemaDrift("gone".into())
        );
    }
}
