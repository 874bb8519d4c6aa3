use chrono::{SecondsFormat, Utc};

/// Current instant as a fixed-width UTC RFC-3339 string.
///
/// All persisted timestamps use this format so that lexicographic ordering
/// of the stored strings matches chronological ordering.
pub fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}
