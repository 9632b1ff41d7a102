//! Text rendering helpers shared by the subcommands.

use modhist_core::Timestamp;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Render a timestamp as RFC 3339 in UTC. Values outside the supported
/// calendar range fall back to raw seconds.
pub(crate) fn timestamp(ts: Timestamp) -> String {
    OffsetDateTime::from_unix_timestamp(ts.0)
        .ok()
        .and_then(|dt| dt.format(&Rfc3339).ok())
        .unwrap_or_else(|| ts.0.to_string())
}
