//! # randomizer-core
//!
//! Domain layer containing roster entities, the persisted settings blob model,
//! date keys, random sources and port traits.
//! This crate has zero dependencies on infrastructure (store, HTTP, web framework).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    custom_identity_id, default_team_id, holiday_options_for, normalize_identity_token,
    parse_holiday_dataset, parse_question_dataset, sort_teams, stored_member_lists_equal,
    AskedHistory, HolidayDatasetEntry, HolidayValue, IdentityKind, MemberSource, MemberView,
    NamedRef, PanelConfiguration, PickerIdentity, PlatformIdentity, QuestionOfDay, RandomizerData,
    RandomizerDayData, RandomizerSettings, StoredIdentity, StoredMember, StoredMemberSource,
    StoredMembersByTeam, Team, TeamMember,
};
pub use error::DomainError;
pub use traits::{ContentSource, KeyValueStore, RepoResult, TeamDirectory};
pub use value_objects::{
    pick, pick_index, DayKey, HolidayDateKey, RandomSource, SeededRandom, SequenceRandom,
    ThreadRandom,
};
