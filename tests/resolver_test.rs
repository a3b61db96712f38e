use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use tempfile::TempDir;

use foliosrv::error::UpstreamError;
use foliosrv::management::TrackCacheManager;
use foliosrv::resolver::{NowPlayingResolver, Resolution};
use foliosrv::spotify::{PlaybackStatus, PlayerSource};
use foliosrv::types::{
    AlbumInfo, ArtistInfo, CurrentlyPlaying, ExternalUrls, ImageInfo, PlayHistoryItem,
    RecentlyPlayedResponse, TrackItem, TrackSnapshot,
};

// Scripted playback source; each call pops the next outcome from its list.
// Clones share the script, so a test can keep a handle after handing the
// source to the resolver.
#[derive(Clone)]
struct ScriptedSource {
    inner: Arc<ScriptInner>,
}

struct ScriptInner {
    playback: Mutex<Vec<Result<PlaybackStatus, UpstreamError>>>,
    recent: Mutex<Vec<Result<RecentlyPlayedResponse, UpstreamError>>>,
    recent_calls: AtomicUsize,
}

impl ScriptedSource {
    fn new(
        playback: Vec<Result<PlaybackStatus, UpstreamError>>,
        recent: Vec<Result<RecentlyPlayedResponse, UpstreamError>>,
    ) -> Self {
        Self {
            inner: Arc::new(ScriptInner {
                playback: Mutex::new(playback),
                recent: Mutex::new(recent),
                recent_calls: AtomicUsize::new(0),
            }),
        }
    }

    fn recent_calls(&self) -> usize {
        self.inner.recent_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlayerSource for ScriptedSource {
    async fn current_playback(&self) -> Result<PlaybackStatus, UpstreamError> {
        self.inner
            .playback
            .lock()
            .unwrap()
            .pop()
            .expect("playback script exhausted")
    }

    async fn recently_played(&self) -> Result<RecentlyPlayedResponse, UpstreamError> {
        self.inner.recent_calls.fetch_add(1, Ordering::SeqCst);
        self.inner
            .recent
            .lock()
            .unwrap()
            .pop()
            .expect("recently-played script exhausted")
    }
}

// Helper function to create a test track item
fn create_test_item(title: &str) -> TrackItem {
    TrackItem {
        name: title.to_string(),
        artists: vec![
            ArtistInfo {
                name: "Artist A".to_string(),
            },
            ArtistInfo {
                name: "Artist B".to_string(),
            },
        ],
        album: AlbumInfo {
            name: "Album A".to_string(),
            images: vec![ImageInfo {
                url: "https://images.example/cover.jpg".to_string(),
            }],
        },
        duration_ms: 200_000,
        external_urls: ExternalUrls {
            spotify: "https://open.spotify.com/track/a".to_string(),
        },
    }
}

fn create_test_snapshot(title: &str, is_playing: bool) -> TrackSnapshot {
    TrackSnapshot {
        album: "Album A".to_string(),
        album_image_url: "https://images.example/cover.jpg".to_string(),
        artist: "Artist A, Artist B".to_string(),
        is_playing,
        song_url: "https://open.spotify.com/track/a".to_string(),
        title: title.to_string(),
        played_at: None,
        progress: 1_000,
        duration: 200_000,
        cached_at: 1_700_000_000_000,
    }
}

fn one_recent_item(title: &str, played_at: &str) -> RecentlyPlayedResponse {
    RecentlyPlayedResponse {
        items: vec![PlayHistoryItem {
            track: create_test_item(title),
            played_at: played_at.to_string(),
        }],
    }
}

fn cache_in(dir: &TempDir) -> TrackCacheManager {
    TrackCacheManager::new(dir.path().join("track.json"))
}

fn expect_track(resolution: Resolution) -> TrackSnapshot {
    match resolution {
        Resolution::Track(snapshot) => snapshot,
        Resolution::Idle => panic!("expected a track resolution, got Idle"),
    }
}

#[tokio::test]
async fn test_live_playback_snapshot() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Active(CurrentlyPlaying {
            is_playing: true,
            progress_ms: Some(12_345),
            item: Some(create_test_item("Song Live")),
        }))],
        vec![],
    );
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    let snapshot = expect_track(resolver.resolve().await);

    assert_eq!(snapshot.title, "Song Live");
    assert!(snapshot.is_playing);
    assert_eq!(snapshot.progress, 12_345);
    assert_eq!(snapshot.duration, 200_000);
    assert!(snapshot.progress <= snapshot.duration);
    assert_eq!(snapshot.artist, "Artist A, Artist B");
    assert_eq!(snapshot.album, "Album A");
    assert!(snapshot.played_at.is_none());

    // The live result must now be the persisted fallback.
    let persisted = cache_in(&dir).read().await.expect("snapshot persisted");
    assert_eq!(persisted.title, "Song Live");
}

#[tokio::test]
async fn test_paused_playback_flag() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Active(CurrentlyPlaying {
            is_playing: false,
            progress_ms: Some(90_000),
            item: Some(create_test_item("Song Paused")),
        }))],
        vec![],
    );
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    let snapshot = expect_track(resolver.resolve().await);

    assert_eq!(snapshot.title, "Song Paused");
    assert!(!snapshot.is_playing);
    assert_eq!(snapshot.progress, 90_000);
}

#[tokio::test]
async fn test_missing_progress_defaults_to_zero() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Active(CurrentlyPlaying {
            is_playing: true,
            progress_ms: None,
            item: Some(create_test_item("Song NoProgress")),
        }))],
        vec![],
    );
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    let snapshot = expect_track(resolver.resolve().await);

    assert_eq!(snapshot.progress, 0);
}

#[tokio::test]
async fn test_no_content_falls_back_to_recently_played() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Empty)],
        vec![Ok(one_recent_item("Song A", "2024-01-01T00:00:00Z"))],
    );
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    let snapshot = expect_track(resolver.resolve().await);

    assert_eq!(snapshot.title, "Song A");
    assert!(!snapshot.is_playing);
    assert_eq!(snapshot.progress, 0);
    assert_eq!(snapshot.played_at.as_deref(), Some("2024-01-01T00:00:00Z"));

    // The recently-played result is persisted like a live one.
    let persisted = cache_in(&dir).read().await.expect("snapshot persisted");
    assert_eq!(persisted.title, "Song A");
}

#[tokio::test]
async fn test_error_status_falls_back_to_recently_played() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Failed(500))],
        vec![Ok(one_recent_item("Song B", "2024-02-02T12:00:00Z"))],
    );
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    let snapshot = expect_track(resolver.resolve().await);

    assert_eq!(snapshot.title, "Song B");
    assert!(!snapshot.is_playing);
}

#[tokio::test]
async fn test_timeout_without_cache_resolves_idle() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(vec![Err(UpstreamError::Timeout)], vec![]);
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    assert!(matches!(resolver.resolve().await, Resolution::Idle));
}

#[tokio::test]
async fn test_transport_failure_serves_cached_snapshot() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);

    // Cache a snapshot that claims to be playing; the fallback must not.
    cache
        .write(&create_test_snapshot("Song Cached", true))
        .await
        .unwrap();

    let source = ScriptedSource::new(
        vec![Err(UpstreamError::Transport("connection refused".to_string()))],
        vec![],
    );
    let resolver = NowPlayingResolver::new(source, cache);

    let snapshot = expect_track(resolver.resolve().await);

    assert_eq!(snapshot.title, "Song Cached");
    assert!(!snapshot.is_playing);

    // Serving from the cache must not rewrite it.
    let on_disk = cache_in(&dir).read().await.expect("cache still present");
    assert!(on_disk.is_playing);
}

#[tokio::test]
async fn test_empty_history_falls_through_to_cache() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    cache
        .write(&create_test_snapshot("Song Cached", false))
        .await
        .unwrap();

    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Empty)],
        vec![Ok(RecentlyPlayedResponse { items: vec![] })],
    );
    let resolver = NowPlayingResolver::new(source, cache);

    let snapshot = expect_track(resolver.resolve().await);

    assert_eq!(snapshot.title, "Song Cached");
}

#[tokio::test]
async fn test_null_item_skips_recently_played() {
    let dir = TempDir::new().unwrap();
    let cache = cache_in(&dir);
    cache
        .write(&create_test_snapshot("Song Cached", false))
        .await
        .unwrap();

    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Active(CurrentlyPlaying {
            is_playing: false,
            progress_ms: None,
            item: None,
        }))],
        vec![],
    );
    let handle = source.clone();
    let resolver = NowPlayingResolver::new(source, cache);

    let snapshot = expect_track(resolver.resolve().await);
    assert_eq!(snapshot.title, "Song Cached");

    // A 200 without an item goes straight to the cache stage.
    assert_eq!(handle.recent_calls(), 0);
}

#[tokio::test]
async fn test_corrupt_cache_treated_as_absent() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("track.json"), b"{ not json").unwrap();

    let source = ScriptedSource::new(vec![Err(UpstreamError::Timeout)], vec![]);
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    assert!(matches!(resolver.resolve().await, Resolution::Idle));
}

#[tokio::test]
async fn test_dead_upstream_without_cache_resolves_idle() {
    let dir = TempDir::new().unwrap();
    let source = ScriptedSource::new(
        vec![Ok(PlaybackStatus::Failed(429))],
        vec![Err(UpstreamError::Transport("bad gateway".to_string()))],
    );
    let resolver = NowPlayingResolver::new(source, cache_in(&dir));

    assert!(matches!(resolver.resolve().await, Resolution::Idle));
}
