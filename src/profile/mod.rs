//! Obtaining edit snapshots from the user's public profile.
//!
//! - [`payload`]: the profile payload and its mapping to an [`EditSnapshot`]
//! - [`provider`]: the [`ProfileProvider`] capability (HTTP, file)
//! - [`worker`]: the [`FetchWorker`] that serialises fetches in the background
//!
//! [`EditSnapshot`]: crate::monitor::EditSnapshot

pub mod payload;
pub mod provider;
pub mod worker;

pub use payload::{extract_embedded_profile, CountSource, EditsByType, ProfilePayload};
pub use provider::{
    FileProfileProvider, HttpProfileProvider, HttpProfileProviderBuilder, ProfileFormat,
    ProfileProvider, SnapshotMapping, DEFAULT_PROFILE_URL,
};
pub use worker::{FetchResult, FetchWorker};
