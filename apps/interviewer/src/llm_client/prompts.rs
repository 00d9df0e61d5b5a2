// Shared prompt constants.
// Each service that needs completion calls defines its own prompts.rs alongside it.
// This file contains cross-cutting prompt fragments.

/// System prompt sent with every completion call.
pub const INTERVIEWER_SYSTEM: &str = "You are an AI assistant designed to conduct professional \
    job interviews. Your goal is to assess candidates based on their skills, experience, and \
    fit for specific job roles. Be professional, courteous, and thorough in your questioning.";

/// Common instruction appended to prompts whose output is read by the response parser.
pub const PLAIN_TEXT_INSTRUCTION: &str = "Respond in plain text. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies beyond what is asked.";
