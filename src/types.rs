use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct SpotifyCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub refresh_token: String,
}

#[derive(Debug, Clone)]
pub struct KvCredentials {
    pub bin_id: String,
    pub api_key: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessToken {
    pub access_token: String,
    pub scope: String,
    pub expires_in: u64,
    pub obtained_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: Option<String>,
    pub scope: Option<String>,
    pub expires_in: Option<u64>,
    pub error: Option<String>,
    pub error_description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackSnapshot {
    pub album: String,
    pub album_image_url: String,
    pub artist: String,
    pub is_playing: bool,
    pub song_url: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub played_at: Option<String>,
    pub progress: u64,
    pub duration: u64,
    pub cached_at: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentlyPlaying {
    pub is_playing: bool,
    pub progress_ms: Option<u64>,
    pub item: Option<TrackItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackItem {
    pub name: String,
    pub artists: Vec<ArtistInfo>,
    pub album: AlbumInfo,
    pub duration_ms: u64,
    pub external_urls: ExternalUrls,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtistInfo {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlbumInfo {
    pub name: String,
    pub images: Vec<ImageInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageInfo {
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentlyPlayedResponse {
    pub items: Vec<PlayHistoryItem>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistoryItem {
    pub track: TrackItem,
    pub played_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitorCount {
    pub count: u64,
    pub last_updated: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KvReadResponse {
    pub record: VisitorCount,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlRequest {
    pub query: String,
    pub variables: ContributionVariables,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionVariables {
    pub login: String,
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<GraphqlData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphqlData {
    pub user: Option<GithubUser>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GithubUser {
    pub contributions_collection: Option<ContributionsCollection>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionsCollection {
    pub contribution_calendar: Option<ContributionCalendar>,
    #[serde(default)]
    pub total_commit_contributions: u64,
    #[serde(default)]
    pub total_issue_contributions: u64,
    #[serde(default)]
    pub total_pull_request_contributions: u64,
    #[serde(default)]
    pub total_pull_request_review_contributions: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionCalendar {
    #[serde(default)]
    pub total_contributions: u64,
    #[serde(default)]
    pub weeks: Vec<ContributionWeek>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionWeek {
    pub contribution_days: Vec<CalendarDay>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalendarDay {
    pub date: String,
    pub contribution_count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionStats {
    pub values: Vec<ContributionValue>,
    pub total: u64,
    pub breakdown: ContributionBreakdown,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContributionValue {
    pub date: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionBreakdown {
    pub commits: u64,
    pub issues: u64,
    pub prs: u64,
    pub reviews: u64,
    pub calendar_total: u64,
}
