use serde::{Deserialize, Serialize};

/// Declared semantic type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SemanticType {
    Numeric,
    Text,
    Boolean,
    Datetime,
    Categorical,
}

impl SemanticType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Numeric => "numeric",
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Datetime => "datetime",
            Self::Categorical => "categorical",
        }
    }

    /// Numeric with numeric, datetime with datetime, otherwise identical.
    /// `Numeric` already spans every integer/float width and `Datetime` every
    /// precision, so this reduces to equality of tags.
    pub fn is_compatible_with(&self, other: SemanticType) -> bool {
        *self == other
    }

    /// Whether two key columns can be hash-joined. Text and categorical both
    /// carry string payloads, so they join even though they are not
    /// "compatible" for validation purposes.
    pub fn is_join_compatible_with(&self, other: SemanticType) -> bool {
        self.is_compatible_with(other)
            || matches!(
                (self, other),
                (Self::Text, Self::Categorical) | (Self::Categorical, Self::Text)
            )
    }
}

impl std::fmt::Display for SemanticType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compatibility_is_identity_for_non_temporal_non_numeric() {
        assert!(SemanticType::Text.is_compatible_with(SemanticType::Text));
        assert!(!SemanticType::Text.is_compatible_with(SemanticType::Categorical));
        assert!(!SemanticType::Numeric.is_compatible_with(SemanticType::Text));
        assert!(!SemanticType::Boolean.is_compatible_with(SemanticType::Numeric));
    }

    #[test]
    fn text_and_categorical_join() {
        assert!(SemanticType::Text.is_join_compatible_with(SemanticType::Categorical));
        assert!(SemanticType::Categorical.is_join_compatible_with(SemanticType::Text));
        assert!(!SemanticType::Numeric.is_join_compatible_with(SemanticType::Text));
    }

    #[test]
    fn serde_names() {
        let json = serde_json::to_string(&SemanticType::Datetime).unwrap();
        assert_eq!(json, "\"datetime\"");
        let back: SemanticType = serde_json::from_str("\"categorical\"").unwrap();
        assert_eq!(back, SemanticType::Categorical);
    }
}
