//! scenelib-client - scene library data layer
//!
//! Request orchestration against the scene service, the cached library
//! snapshot, search routing and the derived dashboard view. Presentation
//! (dialogs, notices) is injected through [`notify`].

pub mod client;
pub mod dashboard;
pub mod error;
pub mod notify;
pub mod search;
pub mod store;
pub mod view;

pub use client::{RemoteClient, SceneBackend, SearchResults};
pub use error::{ClientError, LibraryError, LibraryResult};
pub use search::SearchController;
pub use store::{
    LibraryEvent, LibrarySnapshot, LibraryStore, Mutation, MutationOutcome, StoreStatus,
};
