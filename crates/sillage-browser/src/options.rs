use tracing::warn;

use crate::cursor::CursorAdvance;

pub const DEFAULT_TRACING_INIT_MARK: &str = "sillage-tracing-init";

const CURSOR_ADVANCE_ENV: &str = "SILLAGE_CURSOR_ADVANCE";
const TRACING_INIT_MARK_ENV: &str = "SILLAGE_TRACING_INIT_MARK";
const TRACK_VITALS_ENV: &str = "SILLAGE_TRACK_VITALS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserTracingOptions {
    /// Where the entry cursor lands after each scan.
    pub cursor_advance: CursorAdvance,
    /// Name of the mark placed on the timeline when tracing starts.
    pub tracing_init_mark: String,
    /// Subscribe to largest-contentful-paint and first-input-delay.
    pub track_vitals: bool,
}

impl Default for BrowserTracingOptions {
    fn default() -> Self {
        Self {
            cursor_advance: CursorAdvance::PastEnd,
            tracing_init_mark: DEFAULT_TRACING_INIT_MARK.to_string(),
            track_vitals: true,
        }
    }
}

impl BrowserTracingOptions {
    /// Defaults overlaid with `SILLAGE_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut options = Self::default();

        if let Some(value) = lookup(CURSOR_ADVANCE_ENV) {
            match parse_cursor_advance(&value) {
                Some(advance) => options.cursor_advance = advance,
                None => warn!(
                    env = CURSOR_ADVANCE_ENV,
                    %value,
                    "ignoring unknown cursor advance; expected `past-end` or `reexamine-last`"
                ),
            }
        }

        if let Some(value) = lookup(TRACING_INIT_MARK_ENV) {
            if value.is_empty() {
                warn!(env = TRACING_INIT_MARK_ENV, "ignoring empty tracing init mark");
            } else {
                options.tracing_init_mark = value;
            }
        }

        if let Some(value) = lookup(TRACK_VITALS_ENV) {
            match parse_flag(&value) {
                Some(flag) => options.track_vitals = flag,
                None => warn!(env = TRACK_VITALS_ENV, %value, "ignoring non-boolean value"),
            }
        }

        options
    }
}

pub fn parse_cursor_advance(value: &str) -> Option<CursorAdvance> {
    match value.trim() {
        "past-end" => Some(CursorAdvance::PastEnd),
        "reexamine-last" => Some(CursorAdvance::ReexamineLast),
        _ => None,
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
