//! Reading-time profiles.
//!
//! A reading time controls how verbose a summary is: how many bullets the
//! backend is asked for, how many tokens it may spend, and how long the
//! headline may be. Exactly three profiles exist; anything the caller sends
//! that is not `quick` or `long` falls back to `default`.

/// Named reading-time selector supplied with each request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ReadingTime {
    Quick,
    #[default]
    Default,
    Long,
}

/// Verbosity bundle for one reading time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadingTimeProfile {
    /// Maximum number of bullets in a summary.
    pub bullet_count: usize,
    /// Token budget handed to the summarization backend.
    pub max_tokens: u32,
    /// Maximum headline length, in characters.
    pub headline_max_length: usize,
}

const QUICK: ReadingTimeProfile = ReadingTimeProfile {
    bullet_count: 2,
    max_tokens: 120,
    headline_max_length: 90,
};

const DEFAULT: ReadingTimeProfile = ReadingTimeProfile {
    bullet_count: 3,
    max_tokens: 220,
    headline_max_length: 120,
};

const LONG: ReadingTimeProfile = ReadingTimeProfile {
    bullet_count: 5,
    max_tokens: 360,
    headline_max_length: 160,
};

impl ReadingTime {
    /// Coerce an arbitrary selector into a reading time.
    ///
    /// Matching is exact: `"Quick"` is not `quick` and becomes `default`.
    pub fn coerce(value: Option<&str>) -> Self {
        match value {
            Some("quick") => ReadingTime::Quick,
            Some("long") => ReadingTime::Long,
            _ => ReadingTime::Default,
        }
    }

    /// The profile shared read-only by every task of a request.
    pub fn profile(self) -> &'static ReadingTimeProfile {
        match self {
            ReadingTime::Quick => &QUICK,
            ReadingTime::Default => &DEFAULT,
            ReadingTime::Long => &LONG,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReadingTime::Quick => "quick",
            ReadingTime::Default => "default",
            ReadingTime::Long => "long",
        }
    }
}

impl std::fmt::Display for ReadingTime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_unknown_values_to_default() {
        assert_eq!(ReadingTime::coerce(Some("unknown")), ReadingTime::Default);
        assert_eq!(ReadingTime::coerce(None), ReadingTime::Default);
        assert_eq!(ReadingTime::coerce(Some("QUICK")), ReadingTime::Default);
    }

    #[test]
    fn test_coerce_keeps_valid_values() {
        assert_eq!(ReadingTime::coerce(Some("quick")), ReadingTime::Quick);
        assert_eq!(ReadingTime::coerce(Some("long")), ReadingTime::Long);
        assert_eq!(ReadingTime::coerce(Some("default")), ReadingTime::Default);
    }

    #[test]
    fn test_profiles_are_ordered_by_length() {
        let quick = ReadingTime::Quick.profile();
        let default = ReadingTime::Default.profile();
        let long = ReadingTime::Long.profile();

        assert!(quick.max_tokens < default.max_tokens);
        assert!(default.max_tokens < long.max_tokens);
        assert_eq!(default.bullet_count, 3);
        assert_eq!(quick.bullet_count, 2);
        assert_eq!(long.headline_max_length, 160);
    }
}
