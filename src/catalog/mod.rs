/// Film library and curation
///
/// Films are created, edited and deleted by admins; collections are
/// admin-curated, explicitly ordered sets of films. Private films are only
/// listed for admins.

pub mod collections;
pub mod films;

pub use collections::{
    CollectionEntry, CollectionInput, CollectionManager, CollectionPatch, CollectionWithFilms,
};
pub use films::{FilmInput, FilmManager, FilmPatch};
