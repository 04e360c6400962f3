// Fixed analysis instruction and the answer schema it asks for
// Author: nofomo contributors

use serde::{Deserialize, Serialize};

/// Instruction sent as the text part of every analysis request.
pub const ANALYSIS_INSTRUCTION: &str = r#"Examine the attached image and detect its graphic style, artistic movement (or period), font families, chromatic character, colors and tags.
Respond with ONLY a JSON object with exactly these keys, all string values:

{
  "graphic_style": "pop art, swiss style, grunge, minimal, japanese, comic book, etc.",
  "art_style": "try to understand the artistic style in some way, do not respond with 'no artistic style'",
  "font_family": "serif, sans serif, script, etc.",
  "chromatic": "bright, dark, pastel, monochrome, neutral, ...",
  "colors": "main color codes, e.g. #cc00ff, #0000dd",
  "tags": "bauhaus, red, vector and every tag that helps categorize the image in a database for search",
  "description": "description of the image",
  "review": "artistic review of the image",
  "visual_analysis": "visual analysis of the image as if you were describing it in a design brief for your team",
  "search_text": "a short query (a few words) to find visually similar images with an image search engine"
}"#;

/// The object the instruction asks the model to produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisReport {
    pub graphic_style: String,
    pub art_style: String,
    pub font_family: String,
    pub chromatic: String,
    pub colors: String,
    pub tags: String,
    pub description: String,
    pub review: String,
    pub visual_analysis: String,
    pub search_text: String,
}

impl AnalysisReport {
    /// Best-effort parse of a model answer; `None` when it does not match.
    pub fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text.trim()).ok()
    }
}
