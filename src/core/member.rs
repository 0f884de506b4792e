use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberId(String);

impl MemberId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MemberId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MemberId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A person record as stored by the data layer.
///
/// Relationship references are plain ids and may point at members that do not
/// exist in the snapshot being read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub father_id: Option<MemberId>,
    #[serde(
        default,
        alias = "motherid",
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub mother_id: Option<MemberId>,
    #[serde(
        default,
        deserialize_with = "blank_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub spouse_id: Option<MemberId>,
}

/// Reads an optional reference, treating `null`, `""` and whitespace-only
/// strings as "not set".
fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<MemberId>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value
        .filter(|id| !id.trim().is_empty())
        .map(MemberId::new))
}

impl Member {
    pub fn new(
        id: impl Into<String>,
        first_name: impl Into<String>,
        last_name: impl Into<String>,
    ) -> Self {
        Self {
            id: MemberId::new(id),
            first_name: first_name.into(),
            last_name: last_name.into(),
            gender: None,
            birth_date: None,
            email: None,
            phone: None,
            notes: None,
            father_id: None,
            mother_id: None,
            spouse_id: None,
        }
    }

    pub fn with_gender(mut self, gender: impl Into<String>) -> Self {
        self.gender = Some(gender.into());
        self
    }

    pub fn with_father(mut self, id: impl Into<String>) -> Self {
        self.father_id = Some(MemberId::new(id));
        self
    }

    pub fn with_mother(mut self, id: impl Into<String>) -> Self {
        self.mother_id = Some(MemberId::new(id));
        self
    }

    pub fn with_spouse(mut self, id: impl Into<String>) -> Self {
        self.spouse_id = Some(MemberId::new(id));
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }

    pub fn gender(&self) -> Gender {
        Gender::parse(self.gender.as_deref())
    }

    /// True when neither parent reference is recorded.
    pub fn is_root(&self) -> bool {
        self.father_id.is_none() && self.mother_id.is_none()
    }

    pub fn parent_ids(&self) -> impl Iterator<Item = &MemberId> {
        self.father_id.iter().chain(self.mother_id.iter())
    }

    pub fn is_child_of(&self, parent: &MemberId) -> bool {
        self.father_id.as_ref() == Some(parent) || self.mother_id.as_ref() == Some(parent)
    }

    pub fn is_sibling_of(&self, other: &Member) -> bool {
        if self.id == other.id {
            return false;
        }
        let same_father = matches!(
            (&self.father_id, &other.father_id),
            (Some(a), Some(b)) if a == b
        );
        let same_mother = matches!(
            (&self.mother_id, &other.mother_id),
            (Some(a), Some(b)) if a == b
        );
        same_father || same_mother
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gender {
    Male,
    Female,
    Unknown,
}

impl Gender {
    pub fn parse(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_ascii_lowercase()).as_deref() {
            Some("male" | "m" | "man") => Gender::Male,
            Some("female" | "f" | "woman") => Gender::Female,
            _ => Gender::Unknown,
        }
    }
}
