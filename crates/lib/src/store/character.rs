//! Character record data model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::identity::{CharacterId, UserId};

/// A user-owned character profile: attributes, relations, and an image
/// gallery.
///
/// Free-form attributes are optional strings; the renderer substitutes its
/// own placeholders for missing values. Images are URLs or data URLs, the
/// store does not care which.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    /// Record identifier, assigned by the store
    pub id: CharacterId,

    /// Account that owns this character
    #[serde(rename = "user_id")]
    pub owner: UserId,

    pub name: String,

    /// Portrait image
    pub image: Option<String>,

    // Basic-information page
    pub age: Option<String>,
    pub birthday: Option<String>,
    pub height: Option<String>,
    pub occupation: Option<String>,
    pub race: Option<String>,
    pub location: Option<String>,
    pub goals: Option<String>,
    pub skills: Option<String>,
    pub extra: Option<String>,

    /// Story page
    pub story: Option<String>,

    /// Relations to other characters or people
    #[serde(default)]
    pub relations: Vec<Relation>,

    /// Gallery images
    #[serde(default)]
    pub gallery: Vec<String>,

    /// When the record was created, assigned by the store
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a new character.
///
/// New records start with the name, an optional portrait, and empty
/// relations/gallery; everything else is filled in through later saves.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CharacterDraft {
    pub name: String,
    pub image: Option<String>,
}

impl CharacterDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: None,
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }
}

/// A named relation attached to a character.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relation {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: RelationKind,
    pub image: Option<String>,
}

/// Kind of relation between a character and the related person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    Mother,
    Father,
    Brother,
    Sister,
    Partner,
    Friend,
    Other,
}

impl RelationKind {
    /// Human-readable label for the picker and relation cards.
    pub fn label(&self) -> &'static str {
        match self {
            RelationKind::Mother => "Mother",
            RelationKind::Father => "Father",
            RelationKind::Brother => "Brother",
            RelationKind::Sister => "Sister",
            RelationKind::Partner => "Partner",
            RelationKind::Friend => "Friend",
            RelationKind::Other => "Other",
        }
    }
}

impl Default for RelationKind {
    fn default() -> Self {
        RelationKind::Other
    }
}
