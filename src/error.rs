//! Error taxonomy for the tracking engine.
//!
//! Only `PermissionDenied` is fatal to a session. Service failures are
//! non-fatal: the previous value is retained and the operation retries
//! naturally on the next qualifying position change.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrackError {
    /// Location permission was denied. Fatal: the session halts and the
    /// frontend must show a remediation message. No automatic retry.
    #[error("location permission denied")]
    PermissionDenied,

    /// The place search service failed or returned malformed data.
    #[error("place search failed: {0}")]
    PlaceSearch(String),

    /// The reverse geocoding service failed or returned malformed data.
    #[error("reverse geocoding failed: {0}")]
    Geocoding(String),

    /// The route geometry or route guide service failed.
    #[error("route fetch failed: {0}")]
    RouteFetch(String),

    /// The underlying position feed stopped delivering fixes.
    #[error("position feed ended: {0}")]
    FeedEnded(String),
}

impl TrackError {
    /// Whether the session can keep operating on stale state after this
    /// error, or must stop until the user intervenes.
    pub fn is_fatal(&self) -> bool {
        matches!(self, TrackError::PermissionDenied | TrackError::FeedEnded(_))
    }
}
