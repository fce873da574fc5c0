//! Single byte-range requests.

/// Outcome of matching a `Range` header against a content length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ByteRange {
    /// Serve the whole content.
    Full,
    /// Serve bytes `start..=end`.
    Partial { start: u64, end: u64 },
    /// The range lies outside the content.
    Unsatisfiable,
}

impl ByteRange {
    /// Interpret a `Range` header value for content of `size` bytes.
    ///
    /// Only a single `bytes=` range is honoured. Multiple ranges, other units
    /// and malformed values fall back to the full content.
    pub(crate) fn parse(header: Option<&str>, size: u64) -> Self {
        let Some(ranges) = header.and_then(|h| h.trim().strip_prefix("bytes=")) else {
            return Self::Full;
        };
        if ranges.contains(',') {
            return Self::Full;
        }
        let Some((first, last)) = ranges.trim().split_once('-') else {
            return Self::Full;
        };

        match (first.trim(), last.trim()) {
            ("", "") => Self::Full,
            // Suffix range: the last N bytes
            ("", suffix) => match suffix.parse::<u64>() {
                Ok(0) => Self::Unsatisfiable,
                Ok(_) if size == 0 => Self::Unsatisfiable,
                Ok(n) => Self::Partial {
                    start: size.saturating_sub(n),
                    end: size - 1,
                },
                Err(_) => Self::Full,
            },
            (start, end) => {
                let Ok(start) = start.parse::<u64>() else {
                    return Self::Full;
                };
                let end = if end.is_empty() {
                    None
                } else {
                    match end.parse::<u64>() {
                        Ok(end) if end >= start => Some(end),
                        _ => return Self::Full,
                    }
                };
                if start >= size {
                    return Self::Unsatisfiable;
                }
                let end = end.map_or(size - 1, |end| end.min(size - 1));
                Self::Partial { start, end }
            }
        }
    }
}
