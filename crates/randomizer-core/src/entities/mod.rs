//! Domain entities - roster members, persisted settings and daily content

mod content;
mod member;
mod settings;
mod team;

pub use content::{
    holiday_options_for, parse_holiday_dataset, parse_question_dataset, AskedHistory,
    HolidayDatasetEntry, HolidayValue, QuestionOfDay,
};
pub use member::{
    custom_identity_id, normalize_identity_token, stored_member_lists_equal, IdentityKind,
    MemberSource, MemberView, PickerIdentity, PlatformIdentity, StoredIdentity, StoredMember,
    StoredMemberSource, TeamMember,
};
pub use settings::{
    RandomizerData, RandomizerDayData, RandomizerSettings, StoredMembersByTeam,
    CUSTOM_MEMBERS_FIELD, RANDOMIZER_DATA_FIELD,
};
pub use team::{default_team_id, sort_teams, NamedRef, PanelConfiguration, Team};
