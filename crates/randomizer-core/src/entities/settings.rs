//! Persisted settings blob - per-team inclusion lists, custom members and day records
//!
//! The whole blob lives under a single key and is always written back in
//! full. Updates are functional: every `with_*` method consumes the blob and
//! returns the changed copy so callers can build a delta against the latest
//! fetched value.
//!
//! Reading is lenient per part. A team list or day record that does not parse
//! is kept as its raw value and written back unchanged until it is replaced.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::content::QuestionOfDay;
use super::member::StoredMember;

/// Custom members keyed by team id
pub type StoredMembersByTeam = BTreeMap<String, Vec<StoredMember>>;

/// Day records keyed by day key
pub type RandomizerData = BTreeMap<String, RandomizerDayData>;

/// Reserved blob field holding custom members
pub const CUSTOM_MEMBERS_FIELD: &str = "_customMembers";

/// Reserved blob field holding day records
pub const RANDOMIZER_DATA_FIELD: &str = "_randomizerData";

const TEAM_MEMBERS_FIELD: &str = "teamMembers";
const ACTIVE_MEMBERS_FIELD: &str = "activeMembers";
const QUESTION_FIELD: &str = "question";
const HOLIDAY_FIELD: &str = "hotd";

/// Raw values of keyed entries that did not parse intact
type RawEntries = BTreeMap<String, Value>;

/// Full persisted blob.
///
/// Every non-reserved field is a team id mapping to that team's inclusion
/// allow-list. Unknown shapes are preserved untouched on write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomizerSettings {
    pub custom_members: Option<StoredMembersByTeam>,
    pub randomizer_data: Option<RandomizerData>,
    pub entries: BTreeMap<String, Value>,
    raw_custom_members: RawEntries,
    raw_days: RawEntries,
}

impl RandomizerSettings {
    /// Parse a raw stored value; anything that is not an object yields an empty blob
    pub fn from_value(value: Value) -> Self {
        let Value::Object(object) = value else {
            return Self::default();
        };

        let mut settings = Self::default();
        for (key, field) in object {
            match (key.as_str(), field) {
                (CUSTOM_MEMBERS_FIELD, Value::Object(by_team)) => {
                    let (parsed, raw) = parse_keyed(&by_team, parse_member_list);
                    settings.custom_members = Some(parsed);
                    settings.raw_custom_members = raw;
                }
                (RANDOMIZER_DATA_FIELD, Value::Object(by_day)) => {
                    let (parsed, raw) = parse_keyed(&by_day, |day| match RandomizerDayData::from_value(day) {
                        Some(day) => (Some(day), true),
                        None => (None, false),
                    });
                    settings.randomizer_data = Some(parsed);
                    settings.raw_days = raw;
                }
                (_, field) => {
                    settings.entries.insert(key.clone(), field);
                }
            }
        }
        settings
    }

    /// Serialize back into a JSON value
    pub fn to_value(&self) -> Value {
        let mut object: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if self.custom_members.is_some() || !self.raw_custom_members.is_empty() {
            let parsed = self.custom_members.clone().unwrap_or_default();
            let value = write_keyed(&parsed, &self.raw_custom_members, |members| {
                Value::Array(members.iter().filter_map(|m| serde_json::to_value(m).ok()).collect())
            });
            object.insert(CUSTOM_MEMBERS_FIELD.to_string(), value);
        }
        if self.randomizer_data.is_some() || !self.raw_days.is_empty() {
            let parsed = self.randomizer_data.clone().unwrap_or_default();
            let value = write_keyed(&parsed, &self.raw_days, RandomizerDayData::to_value);
            object.insert(RANDOMIZER_DATA_FIELD.to_string(), value);
        }
        Value::Object(object)
    }

    // =========================================================================
    // Inclusion lists
    // =========================================================================

    /// All team selections (array entries only, non-string items dropped)
    pub fn selections(&self) -> BTreeMap<String, Vec<String>> {
        self.entries
            .keys()
            .filter_map(|team| self.selection_for(team).map(|ids| (team.clone(), ids)))
            .collect()
    }

    /// Selection persisted for a team, if any
    pub fn selection_for(&self, team_id: &str) -> Option<Vec<String>> {
        if is_reserved(team_id) {
            return None;
        }
        self.entries
            .get(team_id)
            .and_then(Value::as_array)
            .map(|items| string_items(items).0)
    }

    /// Replace the selection for one team
    pub fn with_selection(mut self, team_id: &str, ids: Vec<String>) -> Self {
        let values = ids.into_iter().map(Value::String).collect();
        self.entries.insert(team_id.to_string(), Value::Array(values));
        self
    }

    // =========================================================================
    // Custom members
    // =========================================================================

    /// Custom members stored for a team
    pub fn custom_members_for(&self, team_id: &str) -> Vec<StoredMember> {
        self.custom_members
            .as_ref()
            .and_then(|by_team| by_team.get(team_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Replace the custom members of one team
    pub fn with_custom_members(mut self, team_id: &str, members: Vec<StoredMember>) -> Self {
        self.raw_custom_members.remove(team_id);
        self.entries.remove(CUSTOM_MEMBERS_FIELD);
        self.custom_members
            .get_or_insert_with(BTreeMap::new)
            .insert(team_id.to_string(), members);
        self
    }

    // =========================================================================
    // Day records
    // =========================================================================

    /// Day record for a key, if stored
    pub fn day(&self, day_key: &str) -> Option<&RandomizerDayData> {
        self.randomizer_data.as_ref().and_then(|data| data.get(day_key))
    }

    /// Replace the day record for a key
    pub fn with_day(mut self, day_key: &str, day: RandomizerDayData) -> Self {
        self.raw_days.remove(day_key);
        self.entries.remove(RANDOMIZER_DATA_FIELD);
        self.randomizer_data
            .get_or_insert_with(BTreeMap::new)
            .insert(day_key.to_string(), day);
        self
    }

    /// Apply a change to the day record for a key, starting from an empty record
    pub fn update_day<F>(self, day_key: &str, f: F) -> Self
    where
        F: FnOnce(RandomizerDayData) -> RandomizerDayData,
    {
        let current = self.day(day_key).cloned().unwrap_or_default();
        self.with_day(day_key, f(current))
    }

    /// Iterate all stored day records
    pub fn days(&self) -> impl Iterator<Item = &RandomizerDayData> {
        self.randomizer_data.iter().flat_map(BTreeMap::values)
    }
}

/// Per-day record
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RandomizerDayData {
    /// Completed ids per team, in completion order
    pub team_members: Option<BTreeMap<String, Vec<String>>>,
    /// Pending active id per team
    pub active_members: Option<BTreeMap<String, String>>,
    pub question: Option<Value>,
    pub hotd: Option<Value>,
    pub extra: BTreeMap<String, Value>,
    raw_team_members: RawEntries,
    raw_active_members: RawEntries,
}

impl RandomizerDayData {
    /// Parse a stored day record; `None` when it is not an object
    pub fn from_value(value: &Value) -> Option<Self> {
        let object = value.as_object()?;
        let mut day = Self::default();
        for (key, field) in object {
            match (key.as_str(), field) {
                (TEAM_MEMBERS_FIELD, Value::Object(by_team)) => {
                    let (parsed, raw) = parse_keyed(by_team, |ids| match ids.as_array() {
                        Some(items) => {
                            let (ids, intact) = string_items(items);
                            (Some(ids), intact)
                        }
                        None => (None, false),
                    });
                    day.team_members = Some(parsed);
                    day.raw_team_members = raw;
                }
                (ACTIVE_MEMBERS_FIELD, Value::Object(by_team)) => {
                    let (parsed, raw) = parse_keyed(by_team, |id| match id.as_str() {
                        Some(id) => (Some(id.to_string()), true),
                        None => (None, false),
                    });
                    day.active_members = Some(parsed);
                    day.raw_active_members = raw;
                }
                (QUESTION_FIELD, _) => day.question = Some(field.clone()),
                (HOLIDAY_FIELD, _) => day.hotd = Some(field.clone()),
                _ => {
                    day.extra.insert(key.clone(), field.clone());
                }
            }
        }
        Some(day)
    }

    /// Serialize back into a JSON value
    pub fn to_value(&self) -> Value {
        let mut object: Map<String, Value> = self
            .extra
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect();

        if self.team_members.is_some() || !self.raw_team_members.is_empty() {
            let parsed = self.team_members.clone().unwrap_or_default();
            let value = write_keyed(&parsed, &self.raw_team_members, |ids| {
                Value::Array(ids.iter().cloned().map(Value::String).collect())
            });
            object.insert(TEAM_MEMBERS_FIELD.to_string(), value);
        }
        if self.active_members.is_some() || !self.raw_active_members.is_empty() {
            let parsed = self.active_members.clone().unwrap_or_default();
            let value = write_keyed(&parsed, &self.raw_active_members, |id| Value::String(id.clone()));
            object.insert(ACTIVE_MEMBERS_FIELD.to_string(), value);
        }
        if let Some(question) = &self.question {
            object.insert(QUESTION_FIELD.to_string(), question.clone());
        }
        if let Some(hotd) = &self.hotd {
            object.insert(HOLIDAY_FIELD.to_string(), hotd.clone());
        }
        Value::Object(object)
    }

    /// Completed ids for a team
    pub fn completed_for(&self, team_id: &str) -> Vec<String> {
        self.team_members
            .as_ref()
            .and_then(|by_team| by_team.get(team_id))
            .cloned()
            .unwrap_or_default()
    }

    /// Active id for a team
    pub fn active_for(&self, team_id: &str) -> Option<String> {
        self.active_members
            .as_ref()
            .and_then(|by_team| by_team.get(team_id))
            .cloned()
    }

    /// Stored question, if it still parses
    pub fn question(&self) -> Option<QuestionOfDay> {
        self.question.as_ref().and_then(QuestionOfDay::from_value)
    }

    /// Stored holiday text, if non-blank
    pub fn holiday(&self) -> Option<String> {
        self.hotd
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(str::to_string)
    }

    /// Record a team's progress.
    ///
    /// `None` removes the team's active entry; an emptied active map is dropped.
    pub fn with_team_progress(
        mut self,
        team_id: &str,
        completed: Vec<String>,
        active: Option<String>,
    ) -> Self {
        self.raw_team_members.remove(team_id);
        self.raw_active_members.remove(team_id);
        self.extra.remove(TEAM_MEMBERS_FIELD);
        self.extra.remove(ACTIVE_MEMBERS_FIELD);

        self.team_members
            .get_or_insert_with(BTreeMap::new)
            .insert(team_id.to_string(), completed);

        match active {
            Some(id) => {
                self.active_members
                    .get_or_insert_with(BTreeMap::new)
                    .insert(team_id.to_string(), id);
            }
            None => {
                if let Some(map) = self.active_members.as_mut() {
                    map.remove(team_id);
                    if map.is_empty() {
                        self.active_members = None;
                    }
                }
            }
        }
        self
    }

    pub fn with_question(mut self, question: &QuestionOfDay) -> Self {
        self.question = Some(question.to_value());
        self
    }

    pub fn with_holiday(mut self, holiday: &str) -> Self {
        self.hotd = Some(Value::String(holiday.to_string()));
        self
    }
}

fn is_reserved(key: &str) -> bool {
    key == CUSTOM_MEMBERS_FIELD || key == RANDOMIZER_DATA_FIELD
}

/// String items of an array and whether every item was a string
fn string_items(items: &[Value]) -> (Vec<String>, bool) {
    let ids: Vec<String> = items
        .iter()
        .filter_map(|item| item.as_str().map(str::to_string))
        .collect();
    let intact = ids.len() == items.len();
    (ids, intact)
}

fn parse_member_list(value: &Value) -> (Option<Vec<StoredMember>>, bool) {
    let Some(items) = value.as_array() else {
        return (None, false);
    };
    let members: Vec<StoredMember> = items
        .iter()
        .filter_map(|item| serde_json::from_value(item.clone()).ok())
        .collect();
    let intact = members.len() == items.len();
    (Some(members), intact)
}

/// Parse each entry of a keyed object on its own.
///
/// `parse` yields the usable part of an entry and whether it parsed intact.
/// Entries that did not are also returned raw.
fn parse_keyed<T, F>(by_key: &Map<String, Value>, parse: F) -> (BTreeMap<String, T>, RawEntries)
where
    F: Fn(&Value) -> (Option<T>, bool),
{
    let mut parsed = BTreeMap::new();
    let mut raw = RawEntries::new();
    for (key, value) in by_key {
        let (usable, intact) = parse(value);
        if let Some(usable) = usable {
            parsed.insert(key.clone(), usable);
        }
        if !intact {
            raw.insert(key.clone(), value.clone());
        }
    }
    (parsed, raw)
}

/// Encode parsed entries, raw entries winning for their keys
fn write_keyed<T, F>(parsed: &BTreeMap<String, T>, raw: &RawEntries, encode: F) -> Value
where
    F: Fn(&T) -> Value,
{
    let mut object: Map<String, Value> = parsed
        .iter()
        .map(|(key, value)| (key.clone(), encode(value)))
        .collect();
    for (key, value) in raw {
        object.insert(key.clone(), value.clone());
    }
    Value::Object(object)
}
