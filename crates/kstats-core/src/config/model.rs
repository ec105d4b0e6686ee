use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Anonymous installation identifier: 32 lowercase hex digits.
///
/// Created once and persisted; it is the only link between reports from the
/// same installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AnonymousId(String);

impl AnonymousId {
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for AnonymousId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.len() == 32 && s.chars().all(|c| c.is_ascii_hexdigit()) {
            Ok(Self(s.to_ascii_lowercase()))
        } else {
            Err(format!("invalid anonymous id '{}'", s))
        }
    }
}

impl TryFrom<String> for AnonymousId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AnonymousId> for String {
    fn from(id: AnonymousId) -> Self {
        id.0
    }
}

impl fmt::Display for AnonymousId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The user's self-update decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdatePolicy {
    /// Never asked yet; the host should prompt.
    Undecided,
    OptedIn,
    OptedOut,
}

/// Persisted key/value configuration.
///
/// Every field distinguishes "unset" from an explicit value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Configuration {
    pub id: Option<AnonymousId>,
    pub disabled: Option<bool>,
    pub update: Option<bool>,
}

impl Configuration {
    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }

    pub fn update_policy(&self) -> UpdatePolicy {
        match self.update {
            None => UpdatePolicy::Undecided,
            Some(true) => UpdatePolicy::OptedIn,
            Some(false) => UpdatePolicy::OptedOut,
        }
    }

    /// Returns the identifier, generating one first if none is set.
    ///
    /// The flag is `true` when a new identifier was created and the
    /// configuration needs to be written back.
    pub fn ensure_identity(&mut self) -> (AnonymousId, bool) {
        match &self.id {
            Some(id) => (id.clone(), false),
            None => {
                let id = AnonymousId::generate();
                self.id = Some(id.clone());
                (id, true)
            }
        }
    }
}
