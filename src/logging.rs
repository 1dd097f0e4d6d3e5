use std::fmt;

use tracing_subscriber::EnvFilter;

const MAX_LOGGED_URL_CHARS: usize = 96;

/// Installs the global fmt subscriber. Verbosity comes from `RUST_LOG`,
/// falling back to `info`.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Content URL wrapper that drops credentials, query and fragment
#[derive(Debug, Clone)]
pub struct SanitizedUrl(String);

impl SanitizedUrl {
    pub fn new(url: impl AsRef<str>) -> Self {
        Self(Self::sanitize(url.as_ref()))
    }

    fn sanitize(url: &str) -> String {
        let cut = url.find(['?', '#']).unwrap_or(url.len());
        let url = &url[..cut];

        // Strip `user:password@` from the authority, if any
        let stripped = match url.split_once("://") {
            Some((scheme, rest)) => {
                let authority_end = rest.find('/').unwrap_or(rest.len());
                match rest[..authority_end].rfind('@') {
                    Some(at) => format!("{}://{}", scheme, &rest[at + 1..]),
                    None => url.to_string(),
                }
            }
            None => url.to_string(),
        };

        if stripped.chars().count() > MAX_LOGGED_URL_CHARS {
            let truncated: String = stripped.chars().take(MAX_LOGGED_URL_CHARS).collect();
            format!("{}...", truncated)
        } else {
            stripped
        }
    }
}

impl fmt::Display for SanitizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Note lifecycle events for structured logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteEvent {
    Created,
    Fetched,
    Missing,
    Listed,
    DecodeRejected,
    StorageFailure,
}

impl NoteEvent {
    pub fn as_str(&self) -> &'static str {
        match self {
            NoteEvent::Created => "note_created",
            NoteEvent::Fetched => "note_fetched",
            NoteEvent::Missing => "note_missing",
            NoteEvent::Listed => "notes_listed",
            NoteEvent::DecodeRejected => "decode_rejected",
            NoteEvent::StorageFailure => "storage_failure",
        }
    }

    pub fn is_critical(&self) -> bool {
        matches!(self, NoteEvent::StorageFailure)
    }
}

impl fmt::Display for NoteEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Log a note event; critical events go out at warn level
#[macro_export]
macro_rules! log_note_event {
    ($event:expr, $($field:tt)*) => {
        if $event.is_critical() {
            tracing::warn!(
                note_event = %$event,
                event_type = "notes",
                $($field)*
            );
        } else {
            tracing::info!(
                note_event = %$event,
                event_type = "notes",
                $($field)*
            );
        }
    };
}
