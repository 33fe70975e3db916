// ============================================================================
// AniList GraphQL wire types
// ============================================================================

use serde::Deserialize;

use super::media::{MediaEntry, MediaTag, StaffCredit, Studio, UserLists};

/// Envelope every GraphQL response arrives in
#[derive(Debug, Deserialize)]
pub struct GraphQlResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphQlError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GraphQlError {
    pub message: String,
    #[serde(default)]
    pub status: Option<u16>,
}

impl GraphQlError {
    pub fn is_not_found(&self) -> bool {
        self.status == Some(404) || self.message.to_lowercase().contains("not found")
    }
}

#[derive(Debug, Deserialize)]
pub struct MediaListCollectionData {
    #[serde(rename = "MediaListCollection")]
    pub collection: Option<ApiMediaListCollection>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMediaListCollection {
    #[serde(default)]
    pub lists: Vec<ApiMediaList>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMediaList {
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub is_custom_list: Option<bool>,
    #[serde(default)]
    pub entries: Vec<ApiMediaListEntry>,
}

impl ApiMediaList {
    /// Matches a built-in status list; older payloads without `status` match on name
    fn has_status(&self, status: &str, fallback_name: &str) -> bool {
        if self.is_custom_list.unwrap_or(false) {
            return false;
        }
        match &self.status {
            Some(s) => s == status,
            None => self.name == fallback_name,
        }
    }
}

impl ApiMediaListCollection {
    /// Merges the built-in Completed and Dropped lists.
    ///
    /// AniList can split the completed section by format, so every matching list is
    /// concatenated. Returns `None` when the user has no completed list at all.
    pub fn into_user_lists(self) -> Option<UserLists> {
        let mut completed: Option<Vec<MediaEntry>> = None;
        let mut dropped = Vec::new();

        for list in self.lists {
            if list.has_status("COMPLETED", "Completed") {
                completed
                    .get_or_insert_with(Vec::new)
                    .extend(list.entries.into_iter().map(MediaEntry::from));
            } else if list.has_status("DROPPED", "Dropped") {
                dropped.extend(list.entries.into_iter().map(MediaEntry::from));
            }
        }

        completed.map(|completed| UserLists { completed, dropped })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMediaListEntry {
    pub media: ApiMedia,
    #[serde(default)]
    pub score_raw: Option<f64>,
}

impl From<ApiMediaListEntry> for MediaEntry {
    fn from(entry: ApiMediaListEntry) -> Self {
        let mut media = MediaEntry::from(entry.media);
        media.user_score = entry
            .score_raw
            .map(|score| score.round().clamp(0.0, 100.0) as u32)
            .unwrap_or(0);
        media
    }
}

#[derive(Debug, Deserialize)]
pub struct SeasonPageData {
    #[serde(rename = "Page")]
    pub page: Option<ApiPage>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPage {
    #[serde(default)]
    pub page_info: Option<ApiPageInfo>,
    #[serde(default)]
    pub media: Vec<ApiMedia>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiPageInfo {
    #[serde(default)]
    pub has_next_page: bool,
}

/// Raw media block shared by list entries and season pages
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiMedia {
    pub title: ApiMediaTitle,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub tags: Vec<ApiTag>,
    #[serde(default)]
    pub average_score: Option<u32>,
    #[serde(default)]
    pub studios: Option<ApiStudioConnection>,
    #[serde(default)]
    pub staff: Option<ApiStaffConnection>,
    #[serde(default)]
    pub cover_image: Option<ApiCoverImage>,
    #[serde(default)]
    pub site_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiMediaTitle {
    pub romaji: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApiTag {
    pub name: String,
    #[serde(default)]
    pub rank: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStudioConnection {
    #[serde(default)]
    pub nodes: Vec<ApiStudio>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStudio {
    pub name: String,
    #[serde(default)]
    pub is_animation_studio: bool,
}

#[derive(Debug, Deserialize)]
pub struct ApiStaffConnection {
    #[serde(default)]
    pub edges: Vec<ApiStaffEdge>,
}

#[derive(Debug, Deserialize)]
pub struct ApiStaffEdge {
    #[serde(default)]
    pub role: Option<String>,
    pub node: ApiStaffNode,
}

#[derive(Debug, Deserialize)]
pub struct ApiStaffNode {
    pub id: i64,
}

#[derive(Debug, Deserialize)]
pub struct ApiCoverImage {
    pub large: Option<String>,
}

impl From<ApiMedia> for MediaEntry {
    fn from(media: ApiMedia) -> Self {
        MediaEntry {
            title: media.title.romaji.unwrap_or_default(),
            genres: media.genres,
            tags: media
                .tags
                .into_iter()
                .map(|tag| MediaTag {
                    name: tag.name,
                    rank: tag.rank.unwrap_or(0),
                })
                .collect(),
            studios: media
                .studios
                .map(|studios| studios.nodes)
                .unwrap_or_default()
                .into_iter()
                .map(|studio| Studio {
                    name: studio.name,
                    is_animation_studio: studio.is_animation_studio,
                })
                .collect(),
            staff: media
                .staff
                .map(|staff| staff.edges)
                .unwrap_or_default()
                .into_iter()
                .map(|edge| StaffCredit {
                    staff_id: edge.node.id,
                    role: edge.role.unwrap_or_default(),
                })
                .collect(),
            community_score: media.average_score,
            cover_image: media.cover_image.and_then(|cover| cover.large),
            site_url: media.site_url,
            user_score: 0,
        }
    }
}
