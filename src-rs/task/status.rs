use super::types::TaskStatus;

#[derive(Debug)]
pub struct StatusVocabulary {
    pub provider: &'static str,
    entries: &'static [(&'static str, TaskStatus, &'static str)],
    echo_unknown: bool,
}

impl StatusVocabulary {
    pub const fn new(provider: &'static str, entries: &'static [(&'static str, TaskStatus, &'static str)]) -> Self {
        Self {
            provider,
            entries,
            echo_unknown: false,
        }
    }

    pub const fn echoing_unknown(provider: &'static str, entries: &'static [(&'static str, TaskStatus, &'static str)]) -> Self {
        Self {
            provider,
            entries,
            echo_unknown: true,
        }
    }

    pub fn map(&self, literal: &str) -> Option<TaskStatus> {
        let literal = literal.trim();
        self.entries
            .iter()
            .find(|(lit, _, _)| *lit == literal)
            .map(|(_, status, _)| *status)
    }

    /// Display text for a literal. Undocumented literals give `"unknown status"`,
    /// or the trimmed literal itself for echoing vocabularies.
    pub fn display_text<'a>(&self, literal: &'a str) -> &'a str {
        let literal = literal.trim();
        match self.entries.iter().find(|(lit, _, _)| *lit == literal) {
            Some((_, _, text)) => *text,
            None if self.echo_unknown => literal,
            None => "unknown status",
        }
    }

    pub fn literals(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|(lit, _, _)| *lit)
    }
}

pub static KLING: StatusVocabulary = StatusVocabulary::new(
    "kling",
    &[
        ("submitted", TaskStatus::Submitted, "submitted"),
        ("processing", TaskStatus::InProgress, "generating"),
        ("succeed", TaskStatus::Succeeded, "completed"),
        ("failed", TaskStatus::Failed, "generation failed"),
    ],
);

// NOT_START and SUBMITTED are the same state as far as a client can tell.
pub static JIMENG: StatusVocabulary = StatusVocabulary::new(
    "jimeng",
    &[
        ("NOT_START", TaskStatus::Submitted, "not started"),
        ("SUBMITTED", TaskStatus::Submitted, "submitted"),
        ("QUEUED", TaskStatus::Queued, "queued"),
        ("IN_PROGRESS", TaskStatus::InProgress, "generating"),
        ("SUCCESS", TaskStatus::Succeeded, "completed"),
        ("FAILURE", TaskStatus::Failed, "generation failed"),
    ],
);

pub static MIDJOURNEY: StatusVocabulary = StatusVocabulary::new(
    "midjourney",
    &[
        ("submitted", TaskStatus::Submitted, "submitted"),
        ("processing", TaskStatus::InProgress, "processing"),
        ("completed", TaskStatus::Succeeded, "completed"),
        ("failed", TaskStatus::Failed, "failed"),
        ("cancelled", TaskStatus::Cancelled, "cancelled"),
    ],
);

pub static SEEDREAM: StatusVocabulary = StatusVocabulary::echoing_unknown(
    "seedream",
    &[
        ("submitted", TaskStatus::Submitted, "submitted"),
        ("processing", TaskStatus::InProgress, "processing"),
        ("completed", TaskStatus::Succeeded, "completed"),
        ("failed", TaskStatus::Failed, "failed"),
    ],
);

pub static PPT: StatusVocabulary = StatusVocabulary::new(
    "ppt",
    &[
        ("pending", TaskStatus::Queued, "waiting"),
        ("processing", TaskStatus::InProgress, "processing"),
        ("completed", TaskStatus::Succeeded, "completed"),
        ("failed", TaskStatus::Failed, "failed"),
    ],
);
