//! Tag algebra for selecting event subsets.
//!
//! Every event in the log carries a [`TagSet`]. Folds select the events they
//! observe with a [`TagExpr`]: a boolean expression over tags where a tag set
//! means "carries all of these" and [`TagExpr::or`] means "matches either".
//!
//! Entity-scoped streams follow the `name` + `name:id` convention produced by
//! [`Tag::with_id`], so `drone` selects every drone event while
//! `drone:d1` selects only the events of drone `d1`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::ops::Add;

/// A single event tag.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tag(String);

impl Tag {
    /// Create a tag from its name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The tag name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Scope this tag to one entity: `{name, name:id}`.
    pub fn with_id(&self, id: impl fmt::Display) -> TagSet {
        let scoped = Tag(format!("{}:{}", self.0, id));
        TagSet::from_iter([self.clone(), scoped])
    }

    /// The tag set holding only this tag.
    pub fn set(&self) -> TagSet {
        TagSet::from_iter([self.clone()])
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Tag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// The set of tags attached to one event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TagSet(BTreeSet<Tag>);

impl TagSet {
    /// An empty tag set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Union of two tag sets: the event carries both.
    pub fn and(mut self, other: impl Into<TagSet>) -> Self {
        self.0.extend(other.into().0);
        self
    }

    /// Whether `tag` is a member.
    pub fn contains(&self, tag: &Tag) -> bool {
        self.0.contains(tag)
    }

    /// Whether every tag of `other` is a member.
    pub fn is_superset(&self, other: &TagSet) -> bool {
        self.0.is_superset(&other.0)
    }

    /// Number of tags.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the set has no tags.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in tag order.
    pub fn iter(&self) -> impl Iterator<Item = &Tag> {
        self.0.iter()
    }
}

impl FromIterator<Tag> for TagSet {
    fn from_iter<I: IntoIterator<Item = Tag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<Tag> for TagSet {
    fn from(tag: Tag) -> Self {
        tag.set()
    }
}

impl Add for TagSet {
    type Output = TagSet;

    fn add(self, rhs: TagSet) -> TagSet {
        self.and(rhs)
    }
}

impl Add<Tag> for TagSet {
    type Output = TagSet;

    fn add(self, rhs: Tag) -> TagSet {
        self.and(rhs)
    }
}

/// Boolean selector over event tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TagExpr {
    /// Matches every event
    All,
    /// Event carries this tag
    Tag(Tag),
    /// Every operand matches
    And(Vec<TagExpr>),
    /// At least one operand matches
    Or(Vec<TagExpr>),
}

impl TagExpr {
    /// Selector for a single tag.
    pub fn tag(tag: impl Into<Tag>) -> Self {
        TagExpr::Tag(tag.into())
    }

    /// Conjunction with another selector.
    pub fn and(self, other: impl Into<TagExpr>) -> Self {
        match (self, other.into()) {
            (TagExpr::All, rhs) => rhs,
            (lhs, TagExpr::All) => lhs,
            (TagExpr::And(mut lhs), TagExpr::And(rhs)) => {
                lhs.extend(rhs);
                TagExpr::And(lhs)
            }
            (TagExpr::And(mut lhs), rhs) => {
                lhs.push(rhs);
                TagExpr::And(lhs)
            }
            (lhs, rhs) => TagExpr::And(vec![lhs, rhs]),
        }
    }

    /// Disjunction with another selector.
    pub fn or(self, other: impl Into<TagExpr>) -> Self {
        match (self, other.into()) {
            (TagExpr::All, _) | (_, TagExpr::All) => TagExpr::All,
            (TagExpr::Or(mut lhs), TagExpr::Or(rhs)) => {
                lhs.extend(rhs);
                TagExpr::Or(lhs)
            }
            (TagExpr::Or(mut lhs), rhs) => {
                lhs.push(rhs);
                TagExpr::Or(lhs)
            }
            (lhs, rhs) => TagExpr::Or(vec![lhs, rhs]),
        }
    }

    /// Whether an event carrying `tags` is selected.
    pub fn matches(&self, tags: &TagSet) -> bool {
        match self {
            TagExpr::All => true,
            TagExpr::Tag(tag) => tags.contains(tag),
            TagExpr::And(operands) => operands.iter().all(|op| op.matches(tags)),
            TagExpr::Or(operands) => operands.iter().any(|op| op.matches(tags)),
        }
    }
}

impl From<Tag> for TagExpr {
    fn from(tag: Tag) -> Self {
        TagExpr::Tag(tag)
    }
}

impl From<TagSet> for TagExpr {
    fn from(tags: TagSet) -> Self {
        let mut operands: Vec<TagExpr> = tags.0.into_iter().map(TagExpr::Tag).collect();
        match operands.len() {
            0 => TagExpr::All,
            1 => operands.remove(0),
            _ => TagExpr::And(operands),
        }
    }
}

impl fmt::Display for TagExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagExpr::All => f.write_str("allEvents"),
            TagExpr::Tag(tag) => write!(f, "'{}'", tag),
            TagExpr::And(operands) => write_joined(f, operands, " & "),
            TagExpr::Or(operands) => write_joined(f, operands, " | "),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, operands: &[TagExpr], sep: &str) -> fmt::Result {
    for (idx, op) in operands.iter().enumerate() {
        if idx > 0 {
            f.write_str(sep)?;
        }
        match op {
            TagExpr::And(_) | TagExpr::Or(_) => write!(f, "({})", op)?,
            _ => write!(f, "{}", op)?,
        }
    }
    Ok(())
}
