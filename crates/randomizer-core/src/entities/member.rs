//! Member entities - roster view models, stored custom members and platform identities

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Where a roster entry comes from.
///
/// Variants are declared in precedence order: team membership outranks
/// directory identities, which outrank custom entries. Merge, sort and
/// conflict detection all go through [`MemberSource::rank`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberSource {
    /// Platform team membership
    Team,
    /// Identity picked from the platform directory
    Directory,
    /// Free-text entry typed by a settings user
    Custom,
}

impl MemberSource {
    /// Precedence rank (lower wins)
    #[inline]
    pub const fn rank(self) -> u8 {
        match self {
            Self::Team => 0,
            Self::Directory => 1,
            Self::Custom => 2,
        }
    }

    /// Check if this source takes precedence over another
    #[inline]
    pub const fn outranks(self, other: Self) -> bool {
        self.rank() < other.rank()
    }

    /// Human readable label
    pub const fn label(self) -> &'static str {
        match self {
            Self::Team => "Team",
            Self::Directory => "Directory",
            Self::Custom => "Custom",
        }
    }
}

impl fmt::Display for MemberSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Team => write!(f, "team"),
            Self::Directory => write!(f, "directory"),
            Self::Custom => write!(f, "custom"),
        }
    }
}

/// Persisted source tag of a custom roster entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoredMemberSource {
    Custom,
    Directory,
}

impl From<StoredMemberSource> for MemberSource {
    fn from(source: StoredMemberSource) -> Self {
        match source {
            StoredMemberSource::Custom => Self::Custom,
            StoredMemberSource::Directory => Self::Directory,
        }
    }
}

/// Identity snapshot stored with a custom member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredIdentity {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_container: Option<bool>,
}

/// Custom roster entry as persisted under `_customMembers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredMember {
    pub identity: StoredIdentity,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<StoredMemberSource>,
}

impl StoredMember {
    /// Build a stored member from a picked identity
    pub fn from_identity(identity: &PickerIdentity) -> Self {
        let source = match identity.kind {
            IdentityKind::Custom => StoredMemberSource::Custom,
            IdentityKind::User => StoredMemberSource::Directory,
        };
        let display_name = identity
            .display_name
            .clone()
            .or_else(|| identity.mail.clone())
            .unwrap_or_else(|| identity.entity_id.clone());

        Self {
            identity: StoredIdentity {
                id: identity.entity_id.clone(),
                display_name,
                unique_name: identity.mail.clone(),
                image_url: identity.image_url.clone(),
                is_container: Some(false),
            },
            source: Some(source),
        }
    }

    /// Member id
    #[inline]
    pub fn id(&self) -> &str {
        &self.identity.id
    }

    /// Source used for the roster view.
    ///
    /// Entries persisted without a tag are directory entries when they carry a
    /// unique name and custom entries otherwise.
    pub fn effective_source(&self) -> MemberSource {
        match self.source {
            Some(source) => source.into(),
            None if self.identity.unique_name.is_some() => MemberSource::Directory,
            None => MemberSource::Custom,
        }
    }

    /// Field-order independent comparison key
    pub fn fingerprint(&self) -> String {
        let source = match self.source.unwrap_or(StoredMemberSource::Custom) {
            StoredMemberSource::Custom => "custom",
            StoredMemberSource::Directory => "directory",
        };
        format!(
            "{}|{}|{}|{}|{}",
            self.identity.id,
            self.identity.display_name,
            self.identity.unique_name.as_deref().unwrap_or(""),
            self.identity.image_url.as_deref().unwrap_or(""),
            source
        )
    }
}

/// Compare two stored member lists as multisets
pub fn stored_member_lists_equal(left: &[StoredMember], right: &[StoredMember]) -> bool {
    if left.len() != right.len() {
        return false;
    }
    let mut a: Vec<String> = left.iter().map(StoredMember::fingerprint).collect();
    let mut b: Vec<String> = right.iter().map(StoredMember::fingerprint).collect();
    a.sort();
    b.sort();
    a == b
}

/// Identity as reported by the platform directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformIdentity {
    pub id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub unique_name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_container: bool,
    #[serde(default)]
    pub descriptor: Option<String>,
}

impl PlatformIdentity {
    /// Directory groups (`aadgp` descriptors) cannot be expanded by the platform
    pub fn is_directory_group(&self) -> bool {
        self.descriptor
            .as_deref()
            .is_some_and(|d| d.to_lowercase().starts_with("aadgp"))
    }
}

/// One entry of a team membership listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamMember {
    pub identity: PlatformIdentity,
    #[serde(default)]
    pub is_team_admin: bool,
}

impl TeamMember {
    pub fn new(identity: PlatformIdentity) -> Self {
        Self {
            identity,
            is_team_admin: false,
        }
    }
}

/// Canonical roster entry handed to the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberView {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(rename = "sourceType")]
    pub source: MemberSource,
}

impl MemberView {
    /// Map a platform membership record
    pub fn from_team_member(member: &TeamMember) -> Self {
        let identity = &member.identity;
        let display_name = identity
            .display_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(identity.unique_name.as_deref().filter(|name| !name.is_empty()))
            .unwrap_or("Unknown member")
            .to_string();

        Self {
            id: identity.id.clone(),
            display_name,
            unique_name: identity.unique_name.clone(),
            image_url: identity.image_url.clone(),
            source: MemberSource::Team,
        }
    }

    /// Map a persisted custom member
    pub fn from_stored(member: &StoredMember) -> Self {
        Self {
            id: member.identity.id.clone(),
            display_name: member.identity.display_name.clone(),
            unique_name: member.identity.unique_name.clone(),
            image_url: member.identity.image_url.clone(),
            source: member.effective_source(),
        }
    }

    /// Case-insensitive display name, then unique name
    pub fn compare_by_name(&self, other: &Self) -> Ordering {
        self.display_name
            .to_lowercase()
            .cmp(&other.display_name.to_lowercase())
            .then_with(|| {
                self.unique_name
                    .as_deref()
                    .unwrap_or("")
                    .cmp(other.unique_name.as_deref().unwrap_or(""))
            })
            .then_with(|| self.display_name.cmp(&other.display_name))
    }

    /// Source rank, then name
    pub fn compare_by_source(&self, other: &Self) -> Ordering {
        self.source
            .rank()
            .cmp(&other.source.rank())
            .then_with(|| self.compare_by_name(other))
    }
}

/// Kind of identity offered by the identity picker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdentityKind {
    User,
    Custom,
}

/// Identity offered by the picker when adding members in settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickerIdentity {
    pub entity_id: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub mail: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub origin_id: Option<String>,
    pub kind: IdentityKind,
}

impl PickerIdentity {
    /// Picker identity for an existing roster entry
    pub fn from_member(member: &MemberView) -> Self {
        let kind = if member.source == MemberSource::Custom {
            IdentityKind::Custom
        } else {
            IdentityKind::User
        };
        Self {
            entity_id: member.id.clone(),
            display_name: Some(member.display_name.clone()),
            mail: member.unique_name.clone(),
            image_url: member.image_url.clone(),
            origin_id: Some(member.id.clone()),
            kind,
        }
    }

    /// Picker identity for a stored custom member
    pub fn from_stored(member: &StoredMember) -> Self {
        let kind = match member.source.unwrap_or(StoredMemberSource::Custom) {
            StoredMemberSource::Custom => IdentityKind::Custom,
            StoredMemberSource::Directory => IdentityKind::User,
        };
        Self {
            entity_id: member.identity.id.clone(),
            display_name: Some(member.identity.display_name.clone()),
            mail: member.identity.unique_name.clone(),
            image_url: member.identity.image_url.clone(),
            origin_id: Some(member.identity.id.clone()),
            kind,
        }
    }

    /// Custom identity for free-text input, `None` for blank input
    pub fn custom_from_input(input: &str) -> Option<Self> {
        let name = input.trim();
        if name.is_empty() {
            return None;
        }
        let id = custom_identity_id(name);
        Some(Self {
            entity_id: id.clone(),
            display_name: Some(name.to_string()),
            mail: None,
            image_url: None,
            origin_id: Some(id),
            kind: IdentityKind::Custom,
        })
    }

    /// Case-insensitive match on display name or mail
    pub fn matches_name_or_mail(&self, input: &str) -> bool {
        let needle = normalize_identity_token(Some(input));
        if needle.is_empty() {
            return false;
        }
        normalize_identity_token(self.display_name.as_deref()) == needle
            || normalize_identity_token(self.mail.as_deref()) == needle
    }

    /// Lowercased entity id, used as the dedup key
    pub fn key(&self) -> String {
        self.entity_id.to_lowercase()
    }
}

/// Trim and lowercase an identity token
pub fn normalize_identity_token(value: Option<&str>) -> String {
    value.unwrap_or("").trim().to_lowercase()
}

/// Stable id for a custom member typed as free text.
///
/// `"Jane  O'Neil"` becomes `custom-jane-o-neil`.
pub fn custom_identity_id(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let mut slug = String::with_capacity(lowered.len());
    let mut pending_dash = false;
    for c in lowered.chars() {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    if slug.is_empty() {
        format!("custom-{}", random_suffix())
    } else {
        format!("custom-{slug}")
    }
}

fn random_suffix() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
    const SUFFIX_LEN: usize = 10;

    let mut rng = rand::thread_rng();
    (0..SUFFIX_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}
