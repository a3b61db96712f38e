use axum::{Extension, Router, routing::get};
use std::{net::SocketAddr, str::FromStr, sync::Arc};

use crate::{
    api, config, error,
    github::GithubClient,
    info,
    management::{KvStore, TokenManager, TrackCacheManager, VisitorManager},
    resolver::NowPlayingResolver,
    spotify::SpotifyClient,
};

pub struct AppState {
    pub resolver: NowPlayingResolver<SpotifyClient>,
    pub github: GithubClient,
    pub visitors: VisitorManager,
    pub kv: Option<KvStore>,
}

pub fn build_state() -> AppState {
    let tokens = TokenManager::new(config::spotify_credentials(), config::spotify_token_url());
    let spotify = SpotifyClient::new(tokens, config::spotify_api_url());
    let resolver = NowPlayingResolver::new(
        spotify,
        TrackCacheManager::new(TrackCacheManager::default_path()),
    );

    let github = GithubClient::new(config::github_token(), config::github_graphql_url());

    let kv = config::jsonbin_credentials()
        .map(|credentials| KvStore::new(credentials, config::jsonbin_base_url()));
    let visitors = match kv.clone() {
        Some(store) => VisitorManager::remote(store),
        None => VisitorManager::file(VisitorManager::default_path()),
    };

    AppState {
        resolver,
        github,
        visitors,
        kv,
    }
}

pub async fn start_api_server(state: Arc<AppState>) {
    let app = Router::new()
        .route("/now-playing", get(api::now_playing))
        .route("/contribution-stats", get(api::contribution_stats))
        .route(
            "/visitor-count",
            get(api::visitor_count).post(api::bump_visitor_count),
        )
        .route("/kv-visitors", get(api::kv_record).post(api::put_kv_record))
        .route("/health", get(api::health))
        .layer(Extension(state));

    let addr = match SocketAddr::from_str(&config::server_addr()) {
        Ok(addr) => addr,
        Err(e) => error!("Failed to parse server address: {}", e),
    };

    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
