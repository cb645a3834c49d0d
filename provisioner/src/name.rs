use std::fmt;
use std::str::FromStr;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum NameError {
    #[error("database name is empty")]
    Empty,
    #[error("database name is {0} bytes long, the limit is {max}", max = DatabaseName::MAX_LEN)]
    TooLong(usize),
    #[error("database name must start with a letter or '_', found '{0}'")]
    InvalidStart(char),
    #[error("invalid character '{0}' in database name")]
    InvalidCharacter(char),
}

/// A database name that is safe to interpolate into DDL.
///
/// Only ASCII letters, digits, `_` and `-` are accepted, and the first character must be a
/// letter or `_`. Names are case-sensitive: they are always quoted, so `Orders` and `orders`
/// are different databases.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DatabaseName(String);

impl DatabaseName {
    /// PostgreSQL truncates identifiers longer than this.
    pub const MAX_LEN: usize = 63;

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The name as a quoted SQL identifier.
    pub fn quoted(&self) -> String {
        format!("\"{}\"", self.0.replace('"', "\"\""))
    }
}

impl FromStr for DatabaseName {
    type Err = NameError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        let mut chars = name.chars();
        let first = chars.next().ok_or(NameError::Empty)?;

        if name.len() > Self::MAX_LEN {
            return Err(NameError::TooLong(name.len()));
        }
        if !(first.is_ascii_alphabetic() || first == '_') {
            return Err(NameError::InvalidStart(first));
        }
        if let Some(c) = chars.find(|&c| !(c.is_ascii_alphanumeric() || c == '_' || c == '-')) {
            return Err(NameError::InvalidCharacter(c));
        }

        Ok(DatabaseName(name.to_string()))
    }
}

impl TryFrom<String> for DatabaseName {
    type Error = NameError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl fmt::Display for DatabaseName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
