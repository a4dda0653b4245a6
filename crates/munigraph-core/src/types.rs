use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

/// Semantic classification of a municipality change event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKind {
    #[serde(rename = "renamed")]
    Renamed,
    #[serde(rename = "reshaped")]
    Reshaped,
    #[serde(rename = "formed")]
    Formed,
    #[serde(rename = "merged to")]
    MergedTo,
    #[serde(rename = "split to")]
    SplitTo,
    #[serde(rename = "changed district/kanton")]
    DistrictReassignment,
}

impl EventKind {
    /// Kinds that become graph edges, in legend order.
    pub const RENDERED: [EventKind; 5] = [
        EventKind::Renamed,
        EventKind::Reshaped,
        EventKind::Formed,
        EventKind::MergedTo,
        EventKind::SplitTo,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            EventKind::Renamed => "renamed",
            EventKind::Reshaped => "reshaped",
            EventKind::Formed => "formed",
            EventKind::MergedTo => "merged to",
            EventKind::SplitTo => "split to",
            EventKind::DistrictReassignment => "changed district/kanton",
        }
    }

    /// Display color of the edge drawn for this kind. District reassignments are never drawn.
    pub fn color(&self) -> Option<&'static str> {
        match self {
            EventKind::Renamed => Some("rgb(12,51,131)"),
            EventKind::Reshaped => Some("rgb(10,136,186)"),
            EventKind::Formed => Some("rgb(242,211,56)"),
            EventKind::MergedTo => Some("rgb(242,143,56)"),
            EventKind::SplitTo => Some("rgb(217,30,30)"),
            EventKind::DistrictReassignment => None,
        }
    }

    pub fn is_rendered(&self) -> bool {
        self.color().is_some()
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "renamed" => Ok(EventKind::Renamed),
            "reshaped" => Ok(EventKind::Reshaped),
            "formed" => Ok(EventKind::Formed),
            "merged to" => Ok(EventKind::MergedTo),
            "split to" => Ok(EventKind::SplitTo),
            "changed district/kanton" => Ok(EventKind::DistrictReassignment),
            other => Err(format!("unknown event kind: {}", other)),
        }
    }
}

/// Composite identity of a commune interval, `"{name} ({admission}-{abolition})"`.
///
/// The bounds are rendered as the last parenthesised group, so the key stays
/// unambiguous even when the name itself contains parentheses.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IntervalId(String);

impl IntervalId {
    pub fn new(name: &str, admission: i32, abolition: i32) -> Self {
        Self(format!("{} ({}-{})", name, admission, abolition))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for IntervalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for IntervalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for IntervalId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IntervalId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for IntervalId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// One uninterrupted configuration of a municipality, valid over `[admission, abolition)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommuneInterval {
    pub name: String,
    pub admission: i32,
    pub abolition: i32,
}

impl CommuneInterval {
    pub fn new(name: impl Into<String>, admission: i32, abolition: i32) -> Self {
        Self {
            name: name.into(),
            admission,
            abolition,
        }
    }

    /// Identity derived from the current bounds; recomputed on every call.
    pub fn id(&self) -> IntervalId {
        IntervalId::new(&self.name, self.admission, self.abolition)
    }

    pub fn label(&self) -> &str {
        &self.name
    }

    pub fn is_well_formed(&self) -> bool {
        self.admission <= self.abolition
    }
}

/// Raw change-event row as delivered by an event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub parent_name: String,
    pub parent_admission: i32,
    pub parent_abolition: i32,
    pub child_name: String,
    pub child_admission: i32,
    /// `None` while the child is still active.
    #[serde(default)]
    pub child_abolition: Option<i32>,
    #[serde(alias = "eventdate")]
    pub event_date: NaiveDate,
    #[serde(alias = "ab_label")]
    pub abolition_label: String,
    #[serde(alias = "ad_label")]
    pub admission_label: String,
}

impl EventRecord {
    pub fn parent_interval(&self) -> CommuneInterval {
        CommuneInterval::new(
            self.parent_name.clone(),
            self.parent_admission,
            self.parent_abolition,
        )
    }

    /// Child interval with an open abolition closed at `active_until`.
    pub fn child_interval(&self, active_until: i32) -> CommuneInterval {
        CommuneInterval::new(
            self.child_name.clone(),
            self.child_admission,
            self.child_abolition.unwrap_or(active_until),
        )
    }
}

/// A record after classification, with both intervals fully bounded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub parent: CommuneInterval,
    pub child: CommuneInterval,
    pub date: NaiveDate,
    pub kind: EventKind,
}

impl ClassifiedEvent {
    pub fn year(&self) -> i32 {
        self.date.year()
    }
}

/// Directed graph edge from a parent interval to a child interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub source: IntervalId,
    pub target: IntervalId,
    pub date: i32,
    pub kind: EventKind,
    pub color: String,
}

impl ChangeEvent {
    /// `None` for kinds that are never drawn.
    pub fn from_classified(event: &ClassifiedEvent) -> Option<Self> {
        let color = event.kind.color()?;
        Some(Self {
            source: event.parent.id(),
            target: event.child.id(),
            date: event.year(),
            kind: event.kind,
            color: color.to_string(),
        })
    }
}
