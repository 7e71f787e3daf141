pub mod profile;
pub mod prompt;

pub use profile::{AgentProfile, AgentProfiles, DEFAULT_FALLBACK};
pub use prompt::{GenericPrompt, LessonPlanLabels, LessonPlanPrompt, PromptBuilder, PromptStyle};
