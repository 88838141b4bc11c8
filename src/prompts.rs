//! Prompts sent to the text and image models.
//!
//! Every prompt lives here so wording changes happen in one place and unit
//! tests can inspect prompts without calling a model. Callers can replace
//! the system prompt via [`crate::config::KitConfig::system_prompt`].

use crate::brief::BrandBrief;

/// System message for chat-style text backends.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a professional brand strategist. \
Write concise, vivid brand copy in plain text. Do not use Markdown formatting.";

/// Copy used in the kit when text generation fails.
pub const FALLBACK_COPY: &str = "Error: No branding text generated.";

/// Build the request for tagline, mission statement and brand story.
pub fn brand_copy_prompt(brief: &BrandBrief) -> String {
    format!(
        "You are a professional brand strategist. Create a branding kit for a {vibe} brand.\n\
         Brand Name: {name}\n\
         Industry: {industry}\n\
         Provide:\n\
         - A catchy tagline\n\
         - A 2–3 sentence mission statement\n\
         - A short brand story (4–5 sentences)\n",
        vibe = brief.vibe(),
        name = brief.brand_name(),
        industry = brief.industry(),
    )
}

/// Build the text-to-image prompt for the logo.
pub fn logo_prompt(brief: &BrandBrief) -> String {
    format!(
        "Minimal modern logo design for {name}, {vibe} style, {industry} industry, \
         theme color {color}, flat vector, clean lines",
        name = brief.brand_name(),
        vibe = brief.vibe(),
        industry = brief.industry(),
        color = brief.theme_color(),
    )
}
