//! Domain DTOs for the shitposts API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Free-form user statistics returned by `GET user`. The client does not fix
/// a schema for it.
pub type UserStats = Map<String, Value>;

/// Describes one parameter of a server-side command (name, type, default...).
/// Values are whatever JSON the server sent.
pub type ParameterDescriptor = Map<String, Value>;

/// One transform within an edit job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditDirective {
    pub name: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl EditDirective {
    pub fn new<N, P, K, V>(name: N, parameters: P) -> Self
    where
        N: Into<String>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            parameters: parameters
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}

/// An ordered sequence of directives. The server applies them one after the
/// other, so order is kept exactly as given.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EditJob {
    pub edits: Vec<EditDirective>,
}

impl EditJob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a job from named arguments: each name becomes a directive and
    /// its value the directive's parameters.
    ///
    /// ```
    /// use shitposts_core::EditJob;
    ///
    /// let job = EditJob::from_named([("crop", [("x", "0"), ("y", "0")])]);
    /// assert_eq!(job.edits[0].name, "crop");
    /// ```
    pub fn from_named<I, N, P, K, V>(named: I) -> Self
    where
        I: IntoIterator<Item = (N, P)>,
        N: Into<String>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        named
            .into_iter()
            .map(|(name, parameters)| EditDirective::new(name, parameters))
            .collect()
    }

    /// Append one named directive.
    pub fn with<N, P, K, V>(mut self, name: N, parameters: P) -> Self
    where
        N: Into<String>,
        P: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.edits.push(EditDirective::new(name, parameters));
        self
    }

    pub fn push(&mut self, directive: EditDirective) {
        self.edits.push(directive);
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.edits.iter().map(|directive| directive.name.as_str())
    }
}

impl From<Vec<EditDirective>> for EditJob {
    fn from(edits: Vec<EditDirective>) -> Self {
        Self { edits }
    }
}

impl FromIterator<EditDirective> for EditJob {
    fn from_iter<T: IntoIterator<Item = EditDirective>>(iter: T) -> Self {
        Self {
            edits: iter.into_iter().collect(),
        }
    }
}

/// A capability advertised by the server. Decoding never rejects a JSON
/// object: absent fields stay absent when the command is serialized again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Command {
    /// Empty when the server sent no name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
    /// Any other fields the server sent, kept so the command round-trips
    /// unchanged.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
