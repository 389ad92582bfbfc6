//! Alert payloads.
//!
//! An [`Alertable`] is the text half of an announcement: either one string or
//! a non-empty sequence of strings, tagged with how repeated deliveries walk
//! through that sequence.

use super::AccessibilityError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A non-empty, ordered list of alert texts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct TextSequence(Vec<String>);

impl TextSequence {
    /// Build a sequence, rejecting empty input.
    pub fn new<I, S>(items: I) -> Result<Self, AccessibilityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let items: Vec<String> = items.into_iter().map(Into::into).collect();
        if items.is_empty() {
            return Err(AccessibilityError::InvalidConfiguration(
                "alert sequence must not be empty".to_string(),
            ));
        }
        Ok(Self(items))
    }

    /// Number of texts in the sequence (always at least one).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with slices.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Text at `index`, clamped to the final element.
    pub fn get_clamped(&self, index: usize) -> &str {
        &self.0[index.min(self.0.len() - 1)]
    }

    /// Text at `index`, wrapping around to the start.
    pub fn get_wrapped(&self, index: usize) -> &str {
        &self.0[index % self.0.len()]
    }

    /// Iterate over the texts in order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl TryFrom<Vec<String>> for TextSequence {
    type Error = AccessibilityError;

    fn try_from(items: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(items)
    }
}

impl From<TextSequence> for Vec<String> {
    fn from(sequence: TextSequence) -> Self {
        sequence.0
    }
}

/// Delivery policy of an alert, without its content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPolicy {
    /// Single text, delivered once
    #[default]
    OneShot,
    /// Walk the sequence, then repeat the final text
    ClampRepeat,
    /// Walk the sequence and wrap back to the start
    Cycle,
}

impl fmt::Display for DeliveryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeliveryPolicy::OneShot => write!(f, "one-shot"),
            DeliveryPolicy::ClampRepeat => write!(f, "clamp-repeat"),
            DeliveryPolicy::Cycle => write!(f, "cycle"),
        }
    }
}

/// Raw alert content before a delivery policy is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertContent {
    /// One text
    Single(String),
    /// Ordered texts (may be empty until validated)
    Sequence(Vec<String>),
}

impl From<&str> for AlertContent {
    fn from(text: &str) -> Self {
        AlertContent::Single(text.to_string())
    }
}

impl From<String> for AlertContent {
    fn from(text: String) -> Self {
        AlertContent::Single(text)
    }
}

impl<S: Into<String>> From<Vec<S>> for AlertContent {
    fn from(items: Vec<S>) -> Self {
        AlertContent::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>, const N: usize> From<[S; N]> for AlertContent {
    fn from(items: [S; N]) -> Self {
        AlertContent::Sequence(items.into_iter().map(Into::into).collect())
    }
}

/// Alert text tagged with its delivery policy.
///
/// Looping over a single string cannot be expressed: only sequences carry a
/// `Cycle` or `ClampRepeat` policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "policy", content = "text", rename_all = "snake_case")]
pub enum Alertable {
    /// A single text
    OneShot(String),
    /// A sequence that repeats its final text once exhausted
    ClampRepeat(TextSequence),
    /// A sequence that wraps around indefinitely
    Cycle(TextSequence),
}

impl Alertable {
    /// A single-text alert.
    pub fn text(text: impl Into<String>) -> Self {
        Alertable::OneShot(text.into())
    }

    /// A sequence that clamps on its final text.
    pub fn sequence<I, S>(items: I) -> Result<Self, AccessibilityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Alertable::ClampRepeat(TextSequence::new(items)?))
    }

    /// A sequence that loops forever.
    pub fn cycle<I, S>(items: I) -> Result<Self, AccessibilityError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Alertable::Cycle(TextSequence::new(items)?))
    }

    /// Attach a policy to raw content.
    ///
    /// Fails when `looping` is requested for a single text or when the
    /// sequence is empty.
    pub fn from_content(content: AlertContent, looping: bool) -> Result<Self, AccessibilityError> {
        match (content, looping) {
            (AlertContent::Single(_), true) => Err(AccessibilityError::InvalidConfiguration(
                "looping requires a sequence of alerts".to_string(),
            )),
            (AlertContent::Single(text), false) => Ok(Alertable::OneShot(text)),
            (AlertContent::Sequence(items), true) => Self::cycle(items),
            (AlertContent::Sequence(items), false) => Self::sequence(items),
        }
    }

    /// The policy tag of this alert.
    pub fn policy(&self) -> DeliveryPolicy {
        match self {
            Alertable::OneShot(_) => DeliveryPolicy::OneShot,
            Alertable::ClampRepeat(_) => DeliveryPolicy::ClampRepeat,
            Alertable::Cycle(_) => DeliveryPolicy::Cycle,
        }
    }

    /// Text to deliver after `delivery_count` previous deliveries.
    pub fn text_at(&self, delivery_count: usize) -> &str {
        match self {
            Alertable::OneShot(text) => text,
            Alertable::ClampRepeat(sequence) => sequence.get_clamped(delivery_count),
            Alertable::Cycle(sequence) => sequence.get_wrapped(delivery_count),
        }
    }

    /// Whether an entry holding this alert leaves the queue once it has been
    /// delivered `delivery_count` times.
    ///
    /// A clamped sequence is exhausted after its final text has been
    /// delivered once more past the end of the sequence.
    pub fn is_exhausted_after(&self, delivery_count: usize) -> bool {
        match self {
            Alertable::OneShot(_) => true,
            Alertable::ClampRepeat(sequence) => delivery_count > sequence.len(),
            Alertable::Cycle(_) => false,
        }
    }
}

impl From<&str> for Alertable {
    fn from(text: &str) -> Self {
        Alertable::text(text)
    }
}

impl From<String> for Alertable {
    fn from(text: String) -> Self {
        Alertable::OneShot(text)
    }
}

impl From<TextSequence> for Alertable {
    fn from(sequence: TextSequence) -> Self {
        Alertable::ClampRepeat(sequence)
    }
}

impl fmt::Display for Alertable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Alertable::OneShot(text) => write!(f, "{}", text),
            Alertable::ClampRepeat(sequence) | Alertable::Cycle(sequence) => {
                let parts: Vec<&str> = sequence.iter().collect();
                write!(f, "[{}] ({})", parts.join(" | "), self.policy())
            }
        }
    }
}
