mod auth;
mod track;
mod visitors;

pub use auth::TokenManager;
pub use track::TrackCacheManager;
pub use visitors::KvStore;
pub use visitors::VisitorManager;
