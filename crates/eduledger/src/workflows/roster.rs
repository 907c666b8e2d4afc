//! CSV rosters of students to evaluate in one batch.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

/// One row of a roster. The subject is validated when it is evaluated, so a
/// bad row fails on its own without rejecting the file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub subject_id: String,
    pub label: Option<String>,
}

#[derive(Debug)]
pub enum RosterError {
    Io(std::io::Error),
    Csv(csv::Error),
}

impl std::fmt::Display for RosterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RosterError::Io(err) => write!(f, "failed to read roster: {}", err),
            RosterError::Csv(err) => write!(f, "invalid roster CSV data: {}", err),
        }
    }
}

impl std::error::Error for RosterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RosterError::Io(err) => Some(err),
            RosterError::Csv(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for RosterError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for RosterError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

pub fn parse_roster<R: Read>(reader: R) -> Result<Vec<RosterEntry>, RosterError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let mut entries = Vec::new();

    for record in csv_reader.deserialize::<RosterRow>() {
        let row = record?;
        if row.subject_id.is_empty() {
            continue;
        }
        entries.push(RosterEntry {
            subject_id: row.subject_id,
            label: row.label,
        });
    }

    Ok(entries)
}

pub fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<RosterEntry>, RosterError> {
    let file = File::open(path.as_ref())?;
    parse_roster(file)
}

#[derive(Debug, Deserialize)]
struct RosterRow {
    subject_id: String,
    #[serde(default, deserialize_with = "empty_string_as_none")]
    label: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}
