use std::io::ErrorKind;

use chrono::Utc;

use crate::{
    error::CacheError,
    management::TrackCacheManager,
    spotify::{PlaybackStatus, PlayerSource},
    types::{ArtistInfo, TrackItem, TrackSnapshot},
    warning,
};

/// Answer produced by a single now-playing resolution.
///
/// `Track` carries a snapshot from whichever stage produced one; `Idle`
/// means no live data, no history and no cached snapshot exist, and the
/// caller should render "nothing playing".
#[derive(Debug, Clone)]
pub enum Resolution {
    Track(TrackSnapshot),
    Idle,
}

/// Resolves "what should the UI show as the current track" for one request.
///
/// The resolver walks a fixed fallback pipeline and never fails from the
/// caller's point of view:
///
/// 1. **live** - ask the player source for current playback; a track item
///    becomes a live snapshot and is persisted.
/// 2. **recently-played** - on 204 or an upstream error status, use the most
///    recent history item as a not-playing snapshot and persist it.
/// 3. **cache** - on transport failure, a playback body without an item, or
///    an empty history, serve the last persisted snapshot with the playing
///    flag forced off.
/// 4. **idle** - nothing anywhere; report not playing.
///
/// Persistence failures are logged and ignored; they never change the
/// returned resolution. The only state shared between requests lives in the
/// token cache and the persistent track cache.
pub struct NowPlayingResolver<S: PlayerSource> {
    source: S,
    cache: TrackCacheManager,
}

impl<S: PlayerSource> NowPlayingResolver<S> {
    pub fn new(source: S, cache: TrackCacheManager) -> Self {
        Self { source, cache }
    }

    /// Runs the pipeline once and returns the best available answer.
    pub async fn resolve(&self) -> Resolution {
        match self.source.current_playback().await {
            Ok(PlaybackStatus::Active(playing)) => match playing.item {
                Some(item) => {
                    self.live_stage(playing.is_playing, playing.progress_ms, item)
                        .await
                }
                // A playback body without an item means a hanging session;
                // history would repeat the same nothing, so go to the cache.
                None => self.cache_stage().await,
            },
            Ok(PlaybackStatus::Empty) => self.recent_stage().await,
            Ok(PlaybackStatus::Failed(status)) => {
                warning!("Playback endpoint returned {}", status);
                self.recent_stage().await
            }
            Err(e) => {
                warning!("Playback lookup failed: {}", e);
                self.cache_stage().await
            }
        }
    }

    async fn live_stage(
        &self,
        is_playing: bool,
        progress_ms: Option<u64>,
        item: TrackItem,
    ) -> Resolution {
        let snapshot = build_snapshot(item, is_playing, progress_ms.unwrap_or(0), None);
        self.persist(&snapshot).await;
        Resolution::Track(snapshot)
    }

    async fn recent_stage(&self) -> Resolution {
        let recent = match self.source.recently_played().await {
            Ok(recent) => recent,
            Err(e) => {
                warning!("Recently-played lookup failed: {}", e);
                return self.cache_stage().await;
            }
        };

        let Some(entry) = recent.items.into_iter().next() else {
            return self.cache_stage().await;
        };

        let snapshot = build_snapshot(entry.track, false, 0, Some(entry.played_at));
        self.persist(&snapshot).await;
        Resolution::Track(snapshot)
    }

    // Any cache error means "absent"; a missing file is the normal cold
    // start and not worth a log line.
    async fn cache_stage(&self) -> Resolution {
        match self.cache.read().await {
            Ok(mut snapshot) => {
                // A cached entry is never a live "now playing" state.
                snapshot.is_playing = false;
                Resolution::Track(snapshot)
            }
            Err(CacheError::Io(e)) if e.kind() == ErrorKind::NotFound => Resolution::Idle,
            Err(e) => {
                warning!("Discarding unreadable track cache: {}", e);
                Resolution::Idle
            }
        }
    }

    async fn persist(&self, snapshot: &TrackSnapshot) {
        if let Err(e) = self.cache.write(snapshot).await {
            warning!("Failed to persist track snapshot: {}", e);
        }
    }
}

fn build_snapshot(
    item: TrackItem,
    is_playing: bool,
    progress: u64,
    played_at: Option<String>,
) -> TrackSnapshot {
    TrackSnapshot {
        album: item.album.name,
        album_image_url: item
            .album
            .images
            .first()
            .map(|image| image.url.clone())
            .unwrap_or_default(),
        artist: join_artists(&item.artists),
        is_playing,
        song_url: item.external_urls.spotify,
        title: item.name,
        played_at,
        progress,
        duration: item.duration_ms,
        cached_at: Utc::now().timestamp_millis() as u64,
    }
}

fn join_artists(artists: &[ArtistInfo]) -> String {
    artists
        .iter()
        .map(|artist| artist.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}
