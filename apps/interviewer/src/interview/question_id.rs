//! Question identifiers.
//!
//! Primary questions are numbered 1, 2, 3, ... and a follow-up to question `n`
//! is `n.1` (a follow-up to `n.1` is `n.2`, and so on up to `n.9`). The id is a
//! tagged value rather than a float so `2.1` can never drift into
//! `2.1000000001`; on the wire it still travels as a plain JSON number.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Deepest follow-up chain a single decimal digit can express.
pub const MAX_FOLLOW_UP_DEPTH: u32 = 9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionId {
    Primary(u32),
    FollowUp { parent: u32, depth: u32 },
}

#[derive(Debug, Error, PartialEq)]
pub enum QuestionIdError {
    #[error("question id '{0}' is not a number")]
    NotANumber(String),
    #[error("question ids start at 1")]
    Zero,
    #[error("follow-up suffix in '{0}' must be a single digit")]
    BadSuffix(String),
}

impl QuestionId {
    /// The primary question this id belongs to (the integer part).
    pub fn primary(&self) -> u32 {
        match *self {
            QuestionId::Primary(n) => n,
            QuestionId::FollowUp { parent, .. } => parent,
        }
    }

    /// Id of a follow-up asked right after this question, or `None` once the
    /// chain is as deep as the id format allows.
    pub fn follow_up(&self) -> Option<QuestionId> {
        match *self {
            QuestionId::Primary(n) => Some(QuestionId::FollowUp {
                parent: n,
                depth: 1,
            }),
            QuestionId::FollowUp { parent, depth } if depth < MAX_FOLLOW_UP_DEPTH => {
                Some(QuestionId::FollowUp {
                    parent,
                    depth: depth + 1,
                })
            }
            QuestionId::FollowUp { .. } => None,
        }
    }

    /// Next primary number: 1 at the start, otherwise `floor(previous) + 1`.
    /// `None` when the number would not fit in a `u32`.
    pub fn next_primary(previous: Option<QuestionId>) -> Option<u32> {
        match previous {
            Some(id) => id.primary().checked_add(1),
            None => Some(1),
        }
    }

    /// Label stored in conversation memory, e.g. `Question 2.1`.
    pub fn label(&self) -> String {
        format!("Question {self}")
    }

    fn sort_key(&self) -> (u32, u32) {
        match *self {
            QuestionId::Primary(n) => (n, 0),
            QuestionId::FollowUp { parent, depth } => (parent, depth),
        }
    }
}

impl Ord for QuestionId {
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for QuestionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QuestionId::Primary(n) => write!(f, "{n}"),
            QuestionId::FollowUp { parent, depth } => write!(f, "{parent}.{depth}"),
        }
    }
}

impl FromStr for QuestionId {
    type Err = QuestionIdError;

    /// Accepts `3`, `3.0` (primary) and `3.1` .. `3.9` (follow-ups).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let s = raw.trim();
        let (whole, fraction) = match s.split_once('.') {
            Some((w, f)) => (w, Some(f)),
            None => (s, None),
        };

        let parent: u32 = whole
            .parse()
            .map_err(|_| QuestionIdError::NotANumber(raw.to_string()))?;
        if parent == 0 {
            return Err(QuestionIdError::Zero);
        }

        match fraction {
            None => Ok(QuestionId::Primary(parent)),
            Some(f) if f.is_empty() || !f.chars().all(|c| c.is_ascii_digit()) => {
                Err(QuestionIdError::NotANumber(raw.to_string()))
            }
            Some(f) if f.chars().all(|c| c == '0') => Ok(QuestionId::Primary(parent)),
            Some(f) if f.len() == 1 => Ok(QuestionId::FollowUp {
                parent,
                // single ASCII digit, checked above
                depth: f.parse().map_err(|_| QuestionIdError::BadSuffix(raw.to_string()))?,
            }),
            Some(_) => Err(QuestionIdError::BadSuffix(raw.to_string())),
        }
    }
}

impl Serialize for QuestionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match *self {
            QuestionId::Primary(n) => serializer.serialize_u32(n),
            QuestionId::FollowUp { parent, depth } => {
                serializer.serialize_f64(parent as f64 + depth as f64 / 10.0)
            }
        }
    }
}

impl<'de> Deserialize<'de> for QuestionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(QuestionIdVisitor)
    }
}

struct QuestionIdVisitor;

impl<'de> Visitor<'de> for QuestionIdVisitor {
    type Value = QuestionId;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a question id such as 3 or 3.1")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<QuestionId, E> {
        let n = u32::try_from(v).map_err(|_| E::custom("question id out of range"))?;
        if n == 0 {
            return Err(E::custom(QuestionIdError::Zero));
        }
        Ok(QuestionId::Primary(n))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<QuestionId, E> {
        let v = u64::try_from(v).map_err(|_| E::custom("question id must be positive"))?;
        self.visit_u64(v)
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<QuestionId, E> {
        // Shortest round-trip formatting: 2.1 prints as "2.1", never "2.1000000001"
        self.visit_str(&v.to_string())
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<QuestionId, E> {
        v.parse().map_err(E::custom)
    }
}
