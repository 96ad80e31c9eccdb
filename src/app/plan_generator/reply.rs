//! Parsing of free-text completion replies into plan and analysis structures

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};

use crate::domain::model::*;

fn fence_pattern() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE
        .get_or_init(|| Regex::new(r"```(?:json|JSON)?[ \t]*\r?\n?([\s\S]*?)```").ok())
        .as_ref()
}

/// JSON payload of a reply: the first fenced block if any, else the whole text
pub fn extract_json(reply: &str) -> &str {
    fence_pattern()
        .and_then(|re| re.captures(reply))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or_else(|| reply.trim())
}

/// Parse a reply into a JSON object
pub fn parse_object(reply: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(extract_json(reply)) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", type_name(&other))),
        Err(e) => Err(e.to_string()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Number field, accepting numeric strings
fn number(obj: &Map<String, Value>, key: &str) -> Option<f64> {
    match obj.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('s').parse().ok(),
        _ => None,
    }
}

fn string(obj: &Map<String, Value>, key: &str) -> Option<String> {
    match obj.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn objects<'a>(obj: &'a Map<String, Value>, key: &str) -> impl Iterator<Item = &'a Map<String, Value>> {
    obj.get(key)
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_object)
}

/// Build a plan from the model's JSON, filling gaps with defaults
pub fn plan_from_object(
    obj: &Map<String, Value>,
    duration: f64,
    style: EditingStyle,
    target_duration: f64,
    options: &EditOptions,
) -> EditingPlan {
    let mut plan = EditingPlan::empty(style, target_duration, options);

    plan.cuts = objects(obj, "cuts")
        .map(|c| Cut::new(number(c, "start").unwrap_or(0.0), number(c, "end").unwrap_or(duration)))
        .collect();

    plan.transitions = obj
        .get("transitions")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(|t| match t {
            Value::String(name) => Some(Transition {
                name: name.clone(),
                duration: 0.5,
            }),
            Value::Object(t) => Some(Transition {
                name: string(t, "name")
                    .or_else(|| string(t, "type"))
                    .unwrap_or_else(|| "fade".to_string()),
                duration: number(t, "duration").unwrap_or(0.5),
            }),
            _ => None,
        })
        .collect();

    plan.text_elements = objects(obj, "text_elements")
        .filter_map(|t| {
            let text = string(t, "text").filter(|s| !s.trim().is_empty())?;
            Some(TextElement {
                text,
                start: number(t, "start").unwrap_or(0.0),
                end: number(t, "end").unwrap_or(5.0),
                font: string(t, "font").unwrap_or_else(|| "Source Han Sans".to_string()),
                color: string(t, "color").unwrap_or_else(|| "#FFFFFF".to_string()),
                size: number(t, "size").unwrap_or(30.0),
            })
        })
        .collect();

    plan.effects = objects(obj, "effects")
        .map(|e| Effect {
            effect_type: string(e, "type").unwrap_or_else(|| "transition".to_string()),
            name: string(e, "name").unwrap_or_else(|| "fade".to_string()),
            start: number(e, "start").unwrap_or(0.0),
            end: number(e, "end").unwrap_or(1.0),
        })
        .collect();

    plan.stickers = objects(obj, "stickers")
        .map(|s| Sticker {
            sticker_type: string(s, "type").unwrap_or_else(|| "emoji".to_string()),
            content: string(s, "content").unwrap_or_else(|| "😀".to_string()),
            start: number(s, "start").unwrap_or(0.0),
            end: number(s, "end").unwrap_or(3.0),
            x: number(s, "x").unwrap_or(100.0),
            y: number(s, "y").unwrap_or(100.0),
        })
        .collect();

    if let Some(audio) = obj.get("audio").and_then(Value::as_object) {
        if let Some(volume) = number(audio, "music_volume").or_else(|| number(audio, "volume")) {
            plan.audio.music_volume = volume;
        }
    }

    if let Some(grading) = obj.get("color_grading").and_then(Value::as_object) {
        plan.color_grading = ColorGrading {
            brightness: number(grading, "brightness").unwrap_or(0.0),
            contrast: number(grading, "contrast").unwrap_or(0.0),
            saturation: number(grading, "saturation").unwrap_or(0.0),
        };
    }

    plan
}

/// Style named in prose, if any
pub fn infer_style_from_text(text: &str) -> Option<EditingStyle> {
    let lower = text.to_lowercase();
    if lower.contains("social media") {
        Some(EditingStyle::SocialMedia)
    } else if lower.contains("highlight") {
        Some(EditingStyle::HighlightReel)
    } else if lower.contains("tutorial") {
        Some(EditingStyle::Tutorial)
    } else if lower.contains("vlog") {
        Some(EditingStyle::Vlog)
    } else {
        None
    }
}

/// Bullet lines of a prose reply, at most five
pub fn bullet_points(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter_map(|line| {
            line.strip_prefix('-')
                .or_else(|| line.strip_prefix('•'))
                .or_else(|| line.strip_prefix('*'))
        })
        .map(|rest| rest.trim().to_string())
        .filter(|s| !s.is_empty())
        .take(5)
        .collect()
}

/// Analysis fields read from a JSON reply
pub struct AnalysisFields {
    pub content_type: Option<String>,
    pub recommended_style: Option<EditingStyle>,
    pub suggestions: Option<Vec<String>>,
    pub complexity_score: Option<f64>,
}

pub fn analysis_from_object(obj: &Map<String, Value>) -> AnalysisFields {
    let recommended_style = string(obj, "recommended_style").and_then(|s| {
        EditingStyle::parse(&s)
            .ok()
            .or_else(|| infer_style_from_text(&s))
    });

    let suggestions = obj.get("suggestions").and_then(Value::as_array).map(|items| {
        items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Object(o) => string(o, "text").or_else(|| string(o, "description")),
                _ => None,
            })
            .collect()
    });

    AnalysisFields {
        content_type: string(obj, "content_type"),
        recommended_style,
        suggestions,
        complexity_score: number(obj, "complexity_score"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_fenced_json() {
        let reply = "Here is the plan:\n```json\n{\"cuts\": []}\n```\nEnjoy!";
        assert_eq!(extract_json(reply), "{\"cuts\": []}");
    }

    #[test]
    fn test_extract_bare_fence() {
        let reply = "```\n{\"a\": 1}\n```";
        assert_eq!(extract_json(reply), "{\"a\": 1}");
    }

    #[test]
    fn test_extract_unfenced() {
        assert_eq!(extract_json("  {\"a\": 1}\n"), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_object_rejects_non_objects() {
        assert!(parse_object("[1, 2]").is_err());
        assert!(parse_object("I cannot help with that").is_err());
        assert!(parse_object("{\"cuts\": []}").is_ok());
    }

    #[test]
    fn test_plan_defaults_and_lenient_numbers() {
        let obj = parse_object(
            r#"{
                "cuts": [{"start": "2.5", "end": 8}, {"start": 10}],
                "transitions": ["dissolve", {"name": "wipe", "duration": 1.0}],
                "text_elements": [{"text": "Hello", "start": 1}, {"text": ""}],
                "effects": [{"name": "glow"}],
                "stickers": [{"content": "🔥", "start": 2, "end": 4}],
                "audio": {"add_music": true, "music_volume": 0.5},
                "color_grading": {"brightness": 0.1}
            }"#,
        )
        .unwrap();

        let options = EditOptions::default();
        let plan = plan_from_object(&obj, 30.0, EditingStyle::Vlog, 24.0, &options);

        assert_eq!(plan.cuts, vec![Cut::new(2.5, 8.0), Cut::new(10.0, 30.0)]);
        assert_eq!(plan.transitions[0].name, "dissolve");
        assert_eq!(plan.transitions[1].duration, 1.0);
        assert_eq!(plan.text_elements.len(), 1);
        assert_eq!(plan.text_elements[0].end, 5.0);
        assert_eq!(plan.text_elements[0].font, "Source Han Sans");
        assert_eq!(plan.effects[0].effect_type, "transition");
        assert_eq!(plan.stickers[0].x, 100.0);
        assert_eq!(plan.audio.music_volume, 0.5);
        assert!(!plan.audio.add_music);
        assert_eq!(plan.color_grading.brightness, 0.1);
    }

    #[test]
    fn test_infer_style_from_text() {
        assert_eq!(
            infer_style_from_text("Great for Social Media clips"),
            Some(EditingStyle::SocialMedia)
        );
        assert_eq!(infer_style_from_text("make a highlight"), Some(EditingStyle::HighlightReel));
        assert_eq!(infer_style_from_text("nothing useful"), None);
    }

    #[test]
    fn test_bullet_points_limit() {
        let text = "Intro\n- one\n* two\n• three\n- four\n- five\n- six\nplain";
        assert_eq!(bullet_points(text), vec!["one", "two", "three", "four", "five"]);
    }

    #[test]
    fn test_analysis_fields() {
        let obj = parse_object(
            r#"{"content_type": "sports", "recommended_style": "Highlight reel",
                "suggestions": ["Trim the intro", {"text": "Add score overlay"}],
                "complexity_score": "7"}"#,
        )
        .unwrap();
        let fields = analysis_from_object(&obj);
        assert_eq!(fields.content_type.as_deref(), Some("sports"));
        assert_eq!(fields.recommended_style, Some(EditingStyle::HighlightReel));
        assert_eq!(fields.suggestions.unwrap().len(), 2);
        assert_eq!(fields.complexity_score, Some(7.0));
    }
}
