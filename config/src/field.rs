use serde::{
    Deserialize,
    Serialize,
};
use std::fmt;
use strum::{
    AsRefStr,
    Display,
    EnumString,
};

/// Name of the synthetic trailing column that carries failure diagnostics.
pub const NOTES_FIELD: &str = "notes";

/// Selects one value of a measurement result.
///
/// In YAML a selector is either a plain key (`download`) or a two element list
/// naming a nested value (`[server, sponsor]`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldSelector {
    Key(String),
    Nested(String, String),
}

/// Fields that get special treatment when formatting rows and headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum KnownField {
    Timestamp,
    Download,
    Upload,
    Ping,
    Notes,
}

impl KnownField {
    pub fn unit(self) -> Option<&'static str> {
        match self {
            KnownField::Download | KnownField::Upload => Some("Mbit/s"),
            KnownField::Ping => Some("s"),
            KnownField::Timestamp | KnownField::Notes => None,
        }
    }
}

impl FieldSelector {
    pub fn key(name: impl Into<String>) -> Self {
        Self::Key(name.into())
    }

    pub fn nested(outer: impl Into<String>, inner: impl Into<String>) -> Self {
        Self::Nested(outer.into(), inner.into())
    }

    pub fn notes() -> Self {
        Self::Key(NOTES_FIELD.to_string())
    }

    /// Returns the special meaning of this field, if any. Nested selectors never have one.
    pub fn known(&self) -> Option<KnownField> {
        match self {
            Self::Key(name) => name.parse().ok(),
            Self::Nested(..) => None,
        }
    }

    pub fn is(&self, field: KnownField) -> bool {
        self.known() == Some(field)
    }

    pub fn is_notes(&self) -> bool {
        self.is(KnownField::Notes)
    }

    /// Column title for the CSV header, e.g. `download [Mbit/s]` or `server_name`.
    pub fn header_label(&self) -> String {
        match self.known().and_then(KnownField::unit) {
            Some(unit) => format!("{self} [{unit}]"),
            None => self.to_string(),
        }
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(name) => f.write_str(name),
            Self::Nested(outer, inner) => write!(f, "{outer}_{inner}"),
        }
    }
}
