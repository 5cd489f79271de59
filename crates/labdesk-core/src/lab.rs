use std::fmt;

use serde::{Deserialize, Serialize};

use crate::LabdeskError;

const MAX_ID_LEN: usize = 128;

/// Identifier of a lab, i.e. the name of its directory under the labs root.
///
/// Ids arrive from URLs and are joined onto filesystem paths, so parsing
/// only admits a single plain path component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LabId(String);

impl LabId {
    pub fn parse(raw: &str) -> Result<Self, LabdeskError> {
        if raw.is_empty() {
            return Err(LabdeskError::InvalidInput("lab id must not be empty".into()));
        }
        if raw.len() > MAX_ID_LEN {
            return Err(LabdeskError::InvalidInput(format!(
                "lab id longer than {MAX_ID_LEN} bytes"
            )));
        }
        if raw.starts_with('.') {
            return Err(LabdeskError::InvalidInput(format!(
                "lab id must not start with '.': {raw}"
            )));
        }
        if let Some(bad) = raw
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.')))
        {
            return Err(LabdeskError::InvalidInput(format!(
                "lab id contains invalid character {bad:?}: {raw}"
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for LabId {
    type Error = LabdeskError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LabId> for String {
    fn from(id: LabId) -> Self {
        id.0
    }
}

/// A lab as found in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lab {
    pub id: LabId,
    pub has_instructions: bool,
    pub has_template: bool,
}
