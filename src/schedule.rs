//! Conference schedule input.
//!
//! Events are read from a Pentabarf/frab style schedule export (`schedule > day > room > event`),
//! fetched over HTTP or read from a local file, and turned into placeholder parameters for the
//! intro template.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::animation::sequence::Parameters;
use crate::foundation::error::{ReelError, ReelResult};

/// Replacement titles keyed by event id, for titles too long to fit the artwork.
pub type TitleMap = BTreeMap<u64, String>;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// One scheduled talk.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Event {
    pub id: u64,
    pub title: String,
    pub subtitle: String,
    pub persons: Vec<String>,
}

impl Event {
    /// Speaker names joined with `", "`.
    pub fn personnames(&self) -> String {
        self.persons.join(", ")
    }

    /// Placeholder values for the intro template.
    pub fn parameters(&self) -> Parameters {
        Parameters::from([
            ("$id".to_string(), self.id.to_string()),
            ("$title".to_string(), self.title.clone()),
            ("$subtitle".to_string(), self.subtitle.clone()),
            ("$personnames".to_string(), self.personnames()),
        ])
    }
}

/// Parse every event of a schedule document, in document order.
pub fn parse_schedule(xml: &str, titles: &TitleMap) -> ReelResult<Vec<Event>> {
    let doc = roxmltree::Document::parse(xml)
        .map_err(|e| ReelError::schedule(format!("invalid schedule xml: {e}")))?;

    let mut events = Vec::new();
    for day in doc.descendants().filter(|n| n.has_tag_name("day")) {
        for room in day.descendants().filter(|n| n.has_tag_name("room")) {
            for event in room.descendants().filter(|n| n.has_tag_name("event")) {
                events.push(parse_event(event, titles)?);
            }
        }
    }
    Ok(events)
}

fn parse_event(node: roxmltree::Node<'_, '_>, titles: &TitleMap) -> ReelResult<Event> {
    let raw_id = node
        .attribute("id")
        .ok_or_else(|| ReelError::schedule("event without id attribute"))?;
    let id: u64 = raw_id
        .trim()
        .parse()
        .map_err(|_| ReelError::schedule(format!("event id '{raw_id}' is not a number")))?;

    let title = match titles.get(&id) {
        Some(t) => t.clone(),
        None => child_text(node, "title")
            .ok_or_else(|| ReelError::schedule(format!("event {id} has no title")))?,
    };
    let subtitle = child_text(node, "subtitle").unwrap_or_default();

    let persons: Vec<String> = node
        .children()
        .find(|n| n.has_tag_name("persons"))
        .map(|persons| {
            persons
                .descendants()
                .filter(|n| n.has_tag_name("person"))
                .filter_map(|p| p.text())
                .map(|t| t.trim().to_string())
                .filter(|t| !t.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(Event {
        id,
        title,
        subtitle,
        persons,
    })
}

fn child_text(node: roxmltree::Node<'_, '_>, name: &str) -> Option<String> {
    node.children()
        .find(|n| n.has_tag_name(name))
        .map(|n| n.text().unwrap_or("").to_string())
}

/// Where the schedule comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ScheduleSource {
    Url(String),
    File(PathBuf),
}

impl ScheduleSource {
    /// Fetch the raw schedule document.
    pub fn load(&self) -> ReelResult<String> {
        match self {
            Self::File(path) => std::fs::read_to_string(path).map_err(|e| {
                ReelError::schedule(format!("failed to read '{}': {e}", path.display()))
            }),
            Self::Url(url) => {
                tracing::info!(%url, "downloading schedule");
                fetch(url).map_err(|e| ReelError::schedule(format!("failed to fetch {url}: {e}")))
            }
        }
    }
}

fn fetch(url: &str) -> Result<String, reqwest::Error> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("svgreel/", env!("CARGO_PKG_VERSION")))
        .timeout(FETCH_TIMEOUT)
        .build()?;
    client.get(url).send()?.error_for_status()?.text()
}

/// Load and parse the schedule at `source`.
pub fn load_schedule(source: &ScheduleSource, titles: &TitleMap) -> ReelResult<Vec<Event>> {
    let xml = source.load()?;
    let events = parse_schedule(&xml, titles)?;
    tracing::info!(events = events.len(), "schedule loaded");
    Ok(events)
}

#[cfg(test)]
#[path = "../tests/unit/schedule/schedule.rs"]
mod tests;
