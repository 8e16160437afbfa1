/// Format seconds on court as `mm:ss`. Minutes are never wrapped into hours.
pub fn format_toc(seconds: u32) -> String {
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}

/// Inverse of [`format_toc`].
pub fn parse_toc(value: &str) -> Option<u32> {
    let (minutes, seconds) = value.trim().split_once(':')?;
    let minutes: u32 = minutes.parse().ok()?;
    let seconds: u32 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}
