//! Daily content entities - question of the day and holiday datasets

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::settings::RandomizerSettings;

/// Question of the day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionOfDay {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub text: String,
}

impl QuestionOfDay {
    pub fn new(id: Option<i64>, text: impl Into<String>) -> Self {
        Self {
            id,
            text: text.into(),
        }
    }

    /// Lenient parse of a dataset item or a stored value.
    ///
    /// Plain strings are trimmed; objects need a non-blank `text` and keep
    /// it as written. A non-integer `id` is ignored.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| Self::new(None, text))
            }
            Value::Object(record) => {
                let text = record.get("text")?.as_str()?;
                if text.trim().is_empty() {
                    return None;
                }
                let id = record.get("id").and_then(Value::as_i64);
                Some(Self::new(id, text))
            }
            _ => None,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    /// Trimmed text used for equality checks
    #[inline]
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Blank questions are dropped before selection
    #[inline]
    pub fn is_blank(&self) -> bool {
        self.trimmed_text().is_empty()
    }
}

/// Questions asked on any stored day
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AskedHistory {
    pub ids: HashSet<i64>,
    pub texts: HashSet<String>,
}

impl AskedHistory {
    /// Collect the history from every stored day record
    pub fn collect(settings: &RandomizerSettings) -> Self {
        let mut history = Self::default();
        for question in settings.days().filter_map(|day| day.question()) {
            history.record(&question);
        }
        history
    }

    pub fn record(&mut self, question: &QuestionOfDay) {
        if let Some(id) = question.id {
            self.ids.insert(id);
        }
        let text = question.trimmed_text();
        if !text.is_empty() {
            self.texts.insert(text.to_string());
        }
    }

    /// Asked by id when the question has one, otherwise by trimmed text
    pub fn has_asked(&self, question: &QuestionOfDay) -> bool {
        if question.id.is_some_and(|id| self.ids.contains(&id)) {
            return true;
        }
        self.texts.contains(question.trimmed_text())
    }
}

/// Parse the question dataset: an array of strings or `{id, text}` objects
pub fn parse_question_dataset(payload: &Value) -> Vec<QuestionOfDay> {
    payload
        .as_array()
        .map(|items| items.iter().filter_map(QuestionOfDay::from_value).collect())
        .unwrap_or_default()
}

// ============================================================================
// Holidays
// ============================================================================

/// One holiday as found in the dataset
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HolidayValue {
    Text(String),
    Detailed {
        title: Option<String>,
        name: Option<String>,
        description: Option<String>,
        detail: Option<String>,
        summary: Option<String>,
        text: Option<String>,
    },
}

impl HolidayValue {
    pub fn from_value(value: &Value) -> Option<Self> {
        let field = |record: &serde_json::Map<String, Value>, key: &str| {
            record.get(key).and_then(Value::as_str).map(str::to_string)
        };
        match value {
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Object(record) => Some(Self::Detailed {
                title: field(record, "title"),
                name: field(record, "name"),
                description: field(record, "description"),
                detail: field(record, "detail"),
                summary: field(record, "summary"),
                text: field(record, "text"),
            }),
            _ => None,
        }
    }

    /// Display text: `"title: description"` or whichever part exists
    pub fn format(&self) -> Option<String> {
        fn first_non_blank<'a>(parts: &[&'a Option<String>]) -> Option<&'a str> {
            parts
                .iter()
                .copied()
                .filter_map(Option::as_deref)
                .map(str::trim)
                .find(|part| !part.is_empty())
        }

        match self {
            Self::Text(text) => {
                let text = text.trim();
                (!text.is_empty()).then(|| text.to_string())
            }
            Self::Detailed {
                title,
                name,
                description,
                detail,
                summary,
                text,
            } => {
                let heading = first_non_blank(&[title, name]);
                let body = first_non_blank(&[description, detail, summary, text]);
                match (heading, body) {
                    (Some(h), Some(b)) => Some(format!("{h}: {b}")),
                    (Some(h), None) => Some(h.to_string()),
                    (None, Some(b)) => Some(b.to_string()),
                    (None, None) => None,
                }
            }
        }
    }
}

/// Holidays listed for one "Month Day" date
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolidayDatasetEntry {
    pub date: String,
    pub holidays: Vec<HolidayValue>,
}

impl HolidayDatasetEntry {
    /// Entries without a string `date` are dropped
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let date = record.get("date")?.as_str()?;
        if date.is_empty() {
            return None;
        }
        let holidays = record
            .get("holidays")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(HolidayValue::from_value).collect())
            .unwrap_or_default();
        Some(Self {
            date: date.to_string(),
            holidays,
        })
    }
}

/// Parse the holiday dataset
pub fn parse_holiday_dataset(payload: &Value) -> Vec<HolidayDatasetEntry> {
    payload
        .as_array()
        .map(|items| items.iter().filter_map(HolidayDatasetEntry::from_value).collect())
        .unwrap_or_default()
}

/// Formatted options for a date; the first matching entry wins
pub fn holiday_options_for(dataset: &[HolidayDatasetEntry], date_key: &str) -> Vec<String> {
    dataset
        .iter()
        .find(|entry| entry.date == date_key)
        .map(|entry| entry.holidays.iter().filter_map(HolidayValue::format).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_question_from_value() {
        assert_eq!(
            QuestionOfDay::from_value(&json!("  Hi?  ")),
            Some(QuestionOfDay::new(None, "Hi?"))
        );
        assert_eq!(
            QuestionOfDay::from_value(&json!({ "id": 3, "text": " Why? " })),
            Some(QuestionOfDay::new(Some(3), " Why? "))
        );
        assert_eq!(
            QuestionOfDay::from_value(&json!({ "id": "x", "text": "Q" })),
            Some(QuestionOfDay::new(None, "Q"))
        );
        assert!(QuestionOfDay::from_value(&json!({ "id": 1, "text": "  " })).is_none());
        assert!(QuestionOfDay::from_value(&json!(42)).is_none());
    }

    #[test]
    fn test_asked_history_matches_id_or_text() {
        let mut history = AskedHistory::default();
        history.record(&QuestionOfDay::new(Some(1), "One"));
        history.record(&QuestionOfDay::new(None, " Two "));

        assert!(history.has_asked(&QuestionOfDay::new(Some(1), "Different")));
        assert!(history.has_asked(&QuestionOfDay::new(Some(9), "Two")));
        assert!(!history.has_asked(&QuestionOfDay::new(Some(2), "Three")));
    }

    #[test]
    fn test_collect_history_from_days() {
        let settings = RandomizerSettings::from_value(json!({
            "_randomizerData": {
                "1012026": { "question": { "id": 1, "text": "A" } },
                "1022026": { "question": "B" },
                "1032026": { "hotd": "X" }
            }
        }));
        let history = AskedHistory::collect(&settings);
        assert!(history.ids.contains(&1));
        assert!(history.texts.contains("A"));
        assert!(history.texts.contains("B"));
        assert_eq!(history.texts.len(), 2);
    }

    #[test]
    fn test_holiday_format() {
        let detailed = HolidayValue::from_value(&json!({
            "name": "Boss's Day",
            "summary": "Thank your boss",
            "text": "ignored"
        }))
        .unwrap();
        assert_eq!(detailed.format().as_deref(), Some("Boss's Day: Thank your boss"));

        let title_only = HolidayValue::from_value(&json!({ "title": " Only " })).unwrap();
        assert_eq!(title_only.format().as_deref(), Some("Only"));

        let body_only = HolidayValue::from_value(&json!({ "detail": "Body" })).unwrap();
        assert_eq!(body_only.format().as_deref(), Some("Body"));

        assert!(HolidayValue::Text("   ".to_string()).format().is_none());
    }

    #[test]
    fn test_holiday_options_for_date() {
        let dataset = parse_holiday_dataset(&json!([
            { "date": "October 16", "holidays": ["World Food Day", { "title": "" }, 5] },
            { "date": "October 16", "holidays": ["Shadowed"] },
            { "holidays": ["No date"] },
            "garbage"
        ]));
        assert_eq!(dataset.len(), 2);
        assert_eq!(holiday_options_for(&dataset, "October 16"), vec!["World Food Day".to_string()]);
        assert!(holiday_options_for(&dataset, "October 17").is_empty());
    }

    #[test]
    fn test_parse_question_dataset() {
        let questions = parse_question_dataset(&json!(["A", { "id": 2, "text": "B" }, null, ""]));
        assert_eq!(questions.len(), 2);
        assert!(parse_question_dataset(&json!({ "not": "array" })).is_empty());
    }
}
