//! Purpose: Render pretty JSON with optional ANSI colorization for CLI output.
//! Exports: `JsonStyle`, `render_json`, `paint`.
//! Role: Small, pure formatter shared by result output and text debug events.
//! Invariants: With color off and no string limit, output equals serde_json::to_string_pretty.
//! Invariants: ANSI escapes appear only when explicitly enabled.
use serde_json::{Map, Value};

const INDENT: &str = "  ";

// Conservative 8/16-color palette for broad terminal compatibility.
const COLOR_KEY: &str = "36";
const COLOR_STRING: &str = "32";
const COLOR_NUMBER: &str = "33";
const COLOR_BOOL: &str = "35";
const COLOR_NULL: &str = "39";
const COLOR_PUNCT: &str = "39";

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonStyle {
    pub color: bool,
    /// Longest string value (in chars) printed before eliding the rest.
    pub max_string_chars: Option<usize>,
}

impl JsonStyle {
    #[cfg(test)]
    pub fn plain() -> Self {
        Self::default()
    }

    pub fn colored(color: bool) -> Self {
        Self {
            color,
            max_string_chars: None,
        }
    }

    pub fn with_max_string_chars(mut self, limit: usize) -> Self {
        self.max_string_chars = Some(limit);
        self
    }
}

/// Wraps `text` in an ANSI color sequence when `enabled`.
pub fn paint(text: &str, color: &str, enabled: bool) -> String {
    if !enabled {
        return text.to_string();
    }
    format!("\u{1b}[{color}m{text}\u{1b}[0m")
}

pub fn render_json(value: &Value, style: JsonStyle) -> String {
    let mut writer = Writer {
        style,
        out: String::new(),
    };
    writer.value(value, 0);
    writer.out
}

struct Writer {
    style: JsonStyle,
    out: String,
}

impl Writer {
    fn value(&mut self, value: &Value, indent: usize) {
        match value {
            Value::Null => self.colored("null", COLOR_NULL),
            Value::Bool(val) => self.colored(if *val { "true" } else { "false" }, COLOR_BOOL),
            Value::Number(num) => self.colored(&num.to_string(), COLOR_NUMBER),
            Value::String(text) => {
                let encoded = encode_string(&self.elide(text));
                self.colored(&encoded, COLOR_STRING);
            }
            Value::Array(items) => self.array(items, indent),
            Value::Object(map) => self.object(map, indent),
        }
    }

    fn array(&mut self, items: &[Value], indent: usize) {
        if items.is_empty() {
            self.colored("[]", COLOR_PUNCT);
            return;
        }
        self.colored("[", COLOR_PUNCT);
        self.out.push('\n');
        for (idx, item) in items.iter().enumerate() {
            self.indent(indent + 1);
            self.value(item, indent + 1);
            if idx + 1 < items.len() {
                self.colored(",", COLOR_PUNCT);
            }
            self.out.push('\n');
        }
        self.indent(indent);
        self.colored("]", COLOR_PUNCT);
    }

    fn object(&mut self, map: &Map<String, Value>, indent: usize) {
        if map.is_empty() {
            self.colored("{}", COLOR_PUNCT);
            return;
        }
        self.colored("{", COLOR_PUNCT);
        self.out.push('\n');
        let len = map.len();
        for (idx, (key, value)) in map.iter().enumerate() {
            self.indent(indent + 1);
            self.colored(&encode_string(key), COLOR_KEY);
            self.colored(":", COLOR_PUNCT);
            self.out.push(' ');
            self.value(value, indent + 1);
            if idx + 1 < len {
                self.colored(",", COLOR_PUNCT);
            }
            self.out.push('\n');
        }
        self.indent(indent);
        self.colored("}", COLOR_PUNCT);
    }

    fn elide(&self, text: &str) -> String {
        let Some(limit) = self.style.max_string_chars else {
            return text.to_string();
        };
        let total = text.chars().count();
        if total <= limit {
            return text.to_string();
        }
        let kept: String = text.chars().take(limit).collect();
        format!("{kept}… ({} more chars)", total - limit)
    }

    fn indent(&mut self, level: usize) {
        for _ in 0..level {
            self.out.push_str(INDENT);
        }
    }

    fn colored(&mut self, text: &str, color: &str) {
        let painted = paint(text, color, self.style.color);
        self.out.push_str(&painted);
    }
}

fn encode_string(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| "\"\"".to_string())
}

#[cfg(test)]
mod tests {
    use super::{JsonStyle, paint, render_json};
    use serde_json::json;

    #[test]
    fn plain_render_matches_pretty() {
        let value = json!({
            "novel_ids": ["1", "2"],
            "series": { "title": "t", "isConcluded": null }
        });
        let plain = render_json(&value, JsonStyle::plain());
        let pretty = serde_json::to_string_pretty(&value).expect("pretty");
        assert_eq!(plain, pretty);
    }

    #[test]
    fn colored_render_emits_ansi() {
        let value = json!({"k":"v","n":1,"b":true,"z":null});
        let colored = render_json(&value, JsonStyle::colored(true));
        assert!(colored.contains("\u{1b}[36m\"k\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[32m\"v\"\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[33m1\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[35mtrue\u{1b}[0m"));
        assert!(colored.contains("\u{1b}[39mnull\u{1b}[0m"));
    }

    #[test]
    fn long_strings_are_elided() {
        let value = json!({"content": "abcdefghij"});
        let rendered = render_json(&value, JsonStyle::plain().with_max_string_chars(4));
        assert!(rendered.contains("\"abcd… (6 more chars)\""));

        let short = render_json(&json!("abc"), JsonStyle::plain().with_max_string_chars(4));
        assert_eq!(short, "\"abc\"");
    }

    #[test]
    fn paint_wraps_only_when_enabled() {
        assert_eq!(paint("error:", "31", false), "error:");
        assert_eq!(paint("error:", "31", true), "\u{1b}[31merror:\u{1b}[0m");
    }
}
