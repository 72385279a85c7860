/// Per-viewer state: favorites and resume points

pub mod favorites;
pub mod progress;

pub use favorites::{FavoriteManager, FavoriteState};
pub use progress::{InProgressFilm, ProgressState, ProgressUpdate, WatchProgressTracker};
