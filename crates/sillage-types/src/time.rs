/// Converts a platform-relative millisecond value into seconds.
pub fn ms_to_sec(ms: f64) -> f64 {
    ms / 1000.0
}
