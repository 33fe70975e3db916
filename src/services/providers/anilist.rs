/// AniList GraphQL provider
///
/// Both operations go to the single GraphQL endpoint:
/// 1. Watch history: `MediaListCollection(userName, type: ANIME)` with raw 0-100 scores
/// 2. Season catalog: paged `Page { media(season, seasonYear, format: TV) }`, best scored first
///
/// Season catalogs are the same for every viewer and are cached; watch history is not.
use std::time::Duration;

use reqwest::{header::ACCEPT, Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{json, Value};

use crate::{
    cached,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        anilist::{GraphQlError, GraphQlResponse, MediaListCollectionData, SeasonPageData},
        MediaEntry, Season, UserLists,
    },
    services::providers::CatalogProvider,
};

const SEASON_CACHE_TTL: u64 = 21_600; // 6 hours
const SEASON_PAGE_SIZE: u32 = 50;
const MAX_SEASON_PAGES: u32 = 10;
const MAX_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

const MEDIA_FIELDS: &str = r#"
    title { romaji }
    tags { name rank }
    genres
    averageScore
    studios(isMain: true) {
        nodes { name isAnimationStudio }
    }
    staff(sort: [RELEVANCE]) {
        edges {
            role
            node { id }
        }
    }
    coverImage { large }
    siteUrl
"#;

fn user_lists_query() -> String {
    format!(
        r#"
        query ($name: String!) {{
            MediaListCollection(userName: $name, type: ANIME) {{
                lists {{
                    name
                    status
                    isCustomList
                    entries {{
                        media {{ {MEDIA_FIELDS} }}
                        scoreRaw: score(format: POINT_100)
                    }}
                }}
            }}
        }}
        "#
    )
}

fn season_query() -> String {
    format!(
        r#"
        query ($season: MediaSeason, $year: Int, $page: Int, $perPage: Int) {{
            Page(page: $page, perPage: $perPage) {{
                pageInfo {{ hasNextPage }}
                media(season: $season, seasonYear: $year, format: TV, sort: [SCORE_DESC]) {{
                    {MEDIA_FIELDS}
                }}
            }}
        }}
        "#
    )
}

#[derive(Clone)]
pub struct AniListProvider {
    http_client: HttpClient,
    api_url: String,
    cache: Cache,
}

impl AniListProvider {
    /// Builds a provider whose requests fail after `timeout`
    pub fn new(cache: Cache, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .connect_timeout(timeout.min(MAX_CONNECT_TIMEOUT))
            .build()?;

        Ok(Self {
            http_client,
            api_url,
            cache,
        })
    }

    /// Posts one GraphQL query and decodes the envelope.
    ///
    /// AniList reports most failures as a JSON `errors` array next to a non-2xx
    /// status, so the envelope is returned together with the status for the
    /// caller to interpret.
    async fn post_query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: Value,
    ) -> AppResult<(StatusCode, GraphQlResponse<T>)> {
        let response = self
            .http_client
            .post(&self.api_url)
            .header(ACCEPT, "application/json")
            .json(&json!({ "query": query, "variables": variables }))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        match serde_json::from_str::<GraphQlResponse<T>>(&body) {
            Ok(envelope) => Ok((status, envelope)),
            Err(e) if status.is_success() => Err(AppError::ExternalApi(format!(
                "Malformed AniList response: {}",
                e
            ))),
            Err(_) => {
                tracing::error!(status = %status, body = %body, "AniList request failed");
                Err(AppError::ExternalApi(format!(
                    "AniList returned status {}: {}",
                    status, body
                )))
            }
        }
    }

    async fn fetch_season_pages(&self, year: i32, season: Season) -> AppResult<Vec<MediaEntry>> {
        let query = season_query();
        let mut entries = Vec::new();

        for page in 1..=MAX_SEASON_PAGES {
            let variables = json!({
                "season": season.as_str(),
                "year": year,
                "page": page,
                "perPage": SEASON_PAGE_SIZE,
            });
            let (status, envelope) = self.post_query::<SeasonPageData>(&query, variables).await?;
            ensure_ok(status, &envelope.errors)?;

            let page_data = envelope
                .data
                .and_then(|data| data.page)
                .ok_or_else(|| AppError::ExternalApi("AniList response missing Page".to_string()))?;

            let has_next = page_data
                .page_info
                .map(|info| info.has_next_page)
                .unwrap_or(false);
            entries.extend(page_data.media.into_iter().map(MediaEntry::from));

            if !has_next {
                break;
            }
            if page == MAX_SEASON_PAGES {
                tracing::warn!(
                    year,
                    season = %season,
                    fetched = entries.len(),
                    "Season catalog truncated at page limit"
                );
            }
        }

        tracing::info!(
            year,
            season = %season,
            results = entries.len(),
            provider = "anilist",
            "Season catalog fetched"
        );

        Ok(entries)
    }
}

/// Turns GraphQL errors or a non-2xx status into a fetch failure
fn ensure_ok(status: StatusCode, errors: &[GraphQlError]) -> AppResult<()> {
    if status.is_success() && errors.is_empty() {
        return Ok(());
    }

    let messages = errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ");

    Err(AppError::ExternalApi(format!(
        "AniList returned status {}: {}",
        status, messages
    )))
}

#[async_trait::async_trait]
impl CatalogProvider for AniListProvider {
    async fn fetch_user_lists(&self, username: &str) -> AppResult<UserLists> {
        let (status, envelope) = self
            .post_query::<MediaListCollectionData>(&user_lists_query(), json!({ "name": username }))
            .await?;

        if status == StatusCode::NOT_FOUND || envelope.errors.iter().any(GraphQlError::is_not_found)
        {
            return Err(AppError::UserNotFound(username.to_string()));
        }
        ensure_ok(status, &envelope.errors)?;

        let lists = envelope
            .data
            .and_then(|data| data.collection)
            .and_then(|collection| collection.into_user_lists())
            .ok_or_else(|| AppError::UserNotFound(username.to_string()))?;

        tracing::info!(
            username = %username,
            completed = lists.completed.len(),
            dropped = lists.dropped.len(),
            provider = "anilist",
            "Watch history fetched"
        );

        Ok(lists)
    }

    async fn fetch_season(&self, year: i32, season: Season) -> AppResult<Vec<MediaEntry>> {
        cached!(
            self.cache,
            CacheKey::SeasonCatalog { year, season },
            SEASON_CACHE_TTL,
            async move { self.fetch_season_pages(year, season).await }
        )
    }

    fn name(&self) -> &'static str {
        "anilist"
    }
}
