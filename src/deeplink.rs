//! External map application deep links.
//!
//! When the user wants full turn-by-turn voice navigation we hand the
//! destination to the OS's native maps app instead of reimplementing it.

use crate::model::Point;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Android,
    Ios,
}

/// URL that opens the platform's native maps app in driving-directions
/// mode for the given destination.
pub fn external_map_url(dest: &Point, platform: Platform) -> String {
    match platform {
        Platform::Android => format!("google.navigation:q={},{}", dest.lat, dest.lon),
        Platform::Ios => format!(
            "http://maps.apple.com/?daddr={},{}&dirflg=d",
            dest.lat, dest.lon
        ),
    }
}
