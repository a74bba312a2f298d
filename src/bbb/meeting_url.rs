use regex::Regex;
use std::fmt;
use std::sync::OnceLock;
use thiserror::Error;
use url::Url;

/// Recording IDs are a 40 character hash followed by the creation timestamp.
const MEETING_ID_PATTERN: &str = r"\w{40}-\d+";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MeetingUrlError {
    #[error("Invalid meeting URL \"{url}\": {reason}")]
    Malformed { url: String, reason: String },
    #[error("Unsupported URL scheme \"{0}\", expected http or https")]
    UnsupportedScheme(String),
    #[error("Unable to find meeting id in the url \"{0}\"")]
    MissingId(String),
}

/// A parsed reference to a recorded meeting: the server it lives on and its ID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingUrl {
    origin: Url,
    id: String,
}

impl MeetingUrl {
    pub fn parse(raw: &str) -> Result<Self, MeetingUrlError> {
        let parsed = Url::parse(raw.trim()).map_err(|err| MeetingUrlError::Malformed {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(MeetingUrlError::UnsupportedScheme(
                parsed.scheme().to_string(),
            ));
        }

        let origin = Url::parse(&format!("{}/", parsed.origin().ascii_serialization()))
            .map_err(|err| MeetingUrlError::Malformed {
                url: raw.to_string(),
                reason: err.to_string(),
            })?;

        let id = meeting_id_regex()
            .find(parsed.as_str())
            .map(|m| m.as_str().to_string())
            .ok_or_else(|| MeetingUrlError::MissingId(raw.to_string()))?;

        Ok(Self { origin, id })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Server origin with a trailing slash, e.g. `https://bbb.example.org/`.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// URL of a file inside the meeting's published presentation directory.
    pub fn presentation_file(&self, relative: &str) -> Result<Url, MeetingUrlError> {
        self.origin
            .join(&format!("presentation/{}/{}", self.id, relative))
            .map_err(|err| MeetingUrlError::Malformed {
                url: relative.to_string(),
                reason: err.to_string(),
            })
    }
}

impl fmt::Display for MeetingUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {}", self.id, self.origin)
    }
}

fn meeting_id_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(MEETING_ID_PATTERN).expect("meeting id pattern is valid"))
}
