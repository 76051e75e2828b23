use serde::{Deserialize, Deserializer, Serialize};
use sqlx::Type;

/// Assessment flavour of a progress tree. Quiz trees mirror the catalog
/// hierarchy; test trees are a flat list of questions under the course.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "progressmode", rename_all = "lowercase")]
pub(crate) enum ProgressMode {
    Quiz,
    Test,
}

impl ProgressMode {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            ProgressMode::Quiz => "quiz",
            ProgressMode::Test => "test",
        }
    }

    /// Aggregate levels between the course root and the question leaves,
    /// outermost first.
    pub(crate) fn levels(self) -> &'static [AggregateLevel] {
        match self {
            ProgressMode::Quiz => &[AggregateLevel::Chapter, AggregateLevel::Subtopic],
            ProgressMode::Test => &[],
        }
    }
}

impl std::str::FromStr for ProgressMode {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "quiz" => Ok(ProgressMode::Quiz),
            "test" => Ok(ProgressMode::Test),
            other => Err(format!("unsupported progress mode '{other}'; expected quiz or test")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "aggregatelevel", rename_all = "lowercase")]
pub(crate) enum AggregateLevel {
    Chapter,
    Subtopic,
}

/// Read mode of GetProgress: `analytics` returns the frozen submitted state;
/// any other value is `content`, which resets a submitted tree for a retake.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub(crate) enum ProgressSource {
    #[default]
    Content,
    Analytics,
}

impl ProgressSource {
    fn from_param(raw: &str) -> Self {
        if raw == "analytics" {
            ProgressSource::Analytics
        } else {
            ProgressSource::Content
        }
    }
}

impl<'de> Deserialize<'de> for ProgressSource {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(ProgressSource::from_param(&raw))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "enrollmentstatus", rename_all = "lowercase")]
pub(crate) enum EnrollmentStatus {
    #[default]
    Studying,
    Completed,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_has_two_levels_and_test_none() {
        let quiz_levels = ProgressMode::Quiz.levels();
        assert_eq!(quiz_levels, &[AggregateLevel::Chapter, AggregateLevel::Subtopic]);
        assert!(ProgressMode::Test.levels().is_empty());
    }

    #[test]
    fn modes_parse_from_lowercase() {
        let mode: ProgressMode = serde_json::from_str("\"quiz\"").expect("quiz");
        assert_eq!(mode, ProgressMode::Quiz);
        assert!(serde_json::from_str::<ProgressMode>("\"exam\"").is_err());
        assert_eq!("test".parse::<ProgressMode>(), Ok(ProgressMode::Test));
        assert!("Quiz".parse::<ProgressMode>().is_err());
    }

    #[test]
    fn source_defaults_to_content() {
        assert_eq!(ProgressSource::default(), ProgressSource::Content);
        let source: ProgressSource = serde_json::from_str("\"analytics\"").expect("analytics");
        assert_eq!(source, ProgressSource::Analytics);
        let source: ProgressSource = serde_json::from_str("\"bogus\"").expect("unknown");
        assert_eq!(source, ProgressSource::Content);
    }
}
