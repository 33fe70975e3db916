use serde::{Deserialize, Serialize};

/// Staff roles that count towards the staff feature
///
/// Any other credit (key animation, episode direction, voice work...) is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyRole {
    Director,
    SeriesComposition,
    CharacterDesign,
    Music,
    ArtDirector,
}

impl KeyRole {
    /// Maps an AniList role label onto a key role, exact match only
    pub fn from_label(label: &str) -> Option<Self> {
        match label {
            "Director" => Some(KeyRole::Director),
            "Series Composition" => Some(KeyRole::SeriesComposition),
            "Character Design" => Some(KeyRole::CharacterDesign),
            "Music" => Some(KeyRole::Music),
            "Art Director" => Some(KeyRole::ArtDirector),
            _ => None,
        }
    }
}

/// A ranked tag attached to a media entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaTag {
    pub name: String,
    /// Relevance of the tag for this entry, 0-100
    pub rank: u32,
}

/// A main studio credited on a media entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Studio {
    pub name: String,
    pub is_animation_studio: bool,
}

/// One staff credit; the same person may appear under several roles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StaffCredit {
    pub staff_id: i64,
    pub role: String,
}

/// A catalog or watch-history record with everything the scorer looks at
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaEntry {
    pub title: String,
    pub genres: Vec<String>,
    pub tags: Vec<MediaTag>,
    pub studios: Vec<Studio>,
    pub staff: Vec<StaffCredit>,
    /// Community average score, 0-100
    pub community_score: Option<u32>,
    pub cover_image: Option<String>,
    pub site_url: Option<String>,
    /// The viewer's own score on a 0-100 scale; 0 means unrated
    pub user_score: u32,
}

impl MediaEntry {
    /// Whether the viewer scored this entry
    pub fn is_rated(&self) -> bool {
        self.user_score > 0
    }

    /// Main studios that are animation studios
    pub fn animation_studios(&self) -> impl Iterator<Item = &str> {
        self.studios
            .iter()
            .filter(|studio| studio.is_animation_studio)
            .map(|studio| studio.name.as_str())
    }

    /// Staff ids credited under a key role, one item per qualifying credit
    pub fn key_staff(&self) -> impl Iterator<Item = i64> + '_ {
        self.staff
            .iter()
            .filter(|credit| KeyRole::from_label(&credit.role).is_some())
            .map(|credit| credit.staff_id)
    }
}

/// The watch-status lists the scorer consumes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserLists {
    pub completed: Vec<MediaEntry>,
    pub dropped: Vec<MediaEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry_with_credits(studios: Vec<Studio>, staff: Vec<StaffCredit>) -> MediaEntry {
        MediaEntry {
            title: "Mushishi".to_string(),
            genres: vec!["Mystery".to_string()],
            tags: vec![],
            studios,
            staff,
            community_score: Some(86),
            cover_image: None,
            site_url: None,
            user_score: 0,
        }
    }

    #[test]
    fn test_key_role_labels() {
        assert_eq!(KeyRole::from_label("Director"), Some(KeyRole::Director));
        assert_eq!(
            KeyRole::from_label("Series Composition"),
            Some(KeyRole::SeriesComposition)
        );
        assert_eq!(KeyRole::from_label("Art Director"), Some(KeyRole::ArtDirector));
        assert_eq!(KeyRole::from_label("Key Animation"), None);
        assert_eq!(KeyRole::from_label("Director (OP)"), None);
        assert_eq!(KeyRole::from_label("director"), None);
    }

    #[test]
    fn test_animation_studios_skips_producers() {
        let entry = entry_with_credits(
            vec![
                Studio {
                    name: "Artland".to_string(),
                    is_animation_studio: true,
                },
                Studio {
                    name: "Aniplex".to_string(),
                    is_animation_studio: false,
                },
            ],
            vec![],
        );

        let studios: Vec<&str> = entry.animation_studios().collect();
        assert_eq!(studios, vec!["Artland"]);
    }

    #[test]
    fn test_key_staff_skips_other_roles() {
        let entry = entry_with_credits(
            vec![],
            vec![
                StaffCredit {
                    staff_id: 101,
                    role: "Director".to_string(),
                },
                StaffCredit {
                    staff_id: 102,
                    role: "Key Animation".to_string(),
                },
                StaffCredit {
                    staff_id: 101,
                    role: "Series Composition".to_string(),
                },
            ],
        );

        let staff: Vec<i64> = entry.key_staff().collect();
        assert_eq!(staff, vec![101, 101]);
    }

    #[test]
    fn test_is_rated() {
        let mut entry = entry_with_credits(vec![], vec![]);
        assert!(!entry.is_rated());
        entry.user_score = 70;
        assert!(entry.is_rated());
    }
}
