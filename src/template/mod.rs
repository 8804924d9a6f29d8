//! Handlebars-style prompt templates.
//!
//! Supported tags:
//! - `{{path}}` substitution, dotted paths and `this`
//! - `{{#if path}}...{{else}}...{{/if}}`
//! - `{{#each path}}...{{else}}...{{/each}}`
//!
//! A block tag alone on its line removes that whole line from the output.
//! Whole-valued floats render without a fractional part.

use crate::error::{NavarahError, Result};
use serde_json::Value;

/// Rendered in place of a placeholder whose value is absent
pub const NO_DATA: &str = "[no data]";

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Text(String),
    Var(String),
    If {
        path: String,
        then: Vec<Node>,
        otherwise: Vec<Node>,
    },
    Each {
        path: String,
        body: Vec<Node>,
        otherwise: Vec<Node>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BlockKind {
    If,
    Each,
}

impl BlockKind {
    fn tag(self) -> &'static str {
        match self {
            BlockKind::If => "if",
            BlockKind::Each => "each",
        }
    }
}

struct Frame {
    kind: BlockKind,
    path: String,
    then: Vec<Node>,
    otherwise: Option<Vec<Node>>,
}

impl Frame {
    fn nodes(&mut self) -> &mut Vec<Node> {
        match self.otherwise {
            Some(ref mut nodes) => nodes,
            None => &mut self.then,
        }
    }

    fn finish(self) -> Node {
        let otherwise = self.otherwise.unwrap_or_default();
        match self.kind {
            BlockKind::If => Node::If {
                path: self.path,
                then: self.then,
                otherwise,
            },
            BlockKind::Each => Node::Each {
                path: self.path,
                body: self.then,
                otherwise,
            },
        }
    }
}

enum Token<'a> {
    Text(&'a str),
    Tag(&'a str),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    nodes: Vec<Node>,
}

impl Template {
    /// Parse template source, rejecting unbalanced or malformed blocks
    pub fn parse(source: &str) -> Result<Self> {
        let mut root: Vec<Node> = Vec::new();
        let mut stack: Vec<Frame> = Vec::new();

        for token in tokenize(source)? {
            match token {
                Token::Text(text) => {
                    let nodes = stack.last_mut().map(Frame::nodes).unwrap_or(&mut root);
                    nodes.push(Node::Text(text.to_string()));
                }
                Token::Tag(tag) => {
                    if let Some(open) = tag.strip_prefix('#') {
                        let (kind, path) = parse_open_tag(open)?;
                        stack.push(Frame {
                            kind,
                            path,
                            then: Vec::new(),
                            otherwise: None,
                        });
                    } else if let Some(close) = tag.strip_prefix('/') {
                        let frame = stack.pop().ok_or_else(|| {
                            NavarahError::Template(format!("unexpected {{{{/{}}}}}", close.trim()))
                        })?;
                        if frame.kind.tag() != close.trim() {
                            return Err(NavarahError::Template(format!(
                                "{{{{#{}}}}} closed by {{{{/{}}}}}",
                                frame.kind.tag(),
                                close.trim()
                            )));
                        }
                        let node = frame.finish();
                        let nodes = stack.last_mut().map(Frame::nodes).unwrap_or(&mut root);
                        nodes.push(node);
                    } else if tag == "else" {
                        let frame = stack.last_mut().ok_or_else(|| {
                            NavarahError::Template("{{else}} outside of a block".to_string())
                        })?;
                        if frame.otherwise.is_some() {
                            return Err(NavarahError::Template(format!(
                                "duplicate {{{{else}}}} in {{{{#{} {}}}}}",
                                frame.kind.tag(),
                                frame.path
                            )));
                        }
                        frame.otherwise = Some(Vec::new());
                    } else {
                        let nodes = stack.last_mut().map(Frame::nodes).unwrap_or(&mut root);
                        nodes.push(Node::Var(tag.to_string()));
                    }
                }
            }
        }

        if let Some(frame) = stack.last() {
            return Err(NavarahError::Template(format!(
                "unclosed {{{{#{} {}}}}}",
                frame.kind.tag(),
                frame.path
            )));
        }

        Ok(Template { nodes: root })
    }

    /// Render against a JSON context; never fails once parsed
    pub fn render(&self, context: &Value) -> String {
        let mut out = String::new();
        let mut scopes = vec![context];
        render_nodes(&self.nodes, &mut scopes, &mut out);
        out
    }
}

fn parse_open_tag(open: &str) -> Result<(BlockKind, String)> {
    let mut parts = open.split_whitespace();
    let kind = match parts.next() {
        Some("if") => BlockKind::If,
        Some("each") => BlockKind::Each,
        other => {
            return Err(NavarahError::Template(format!(
                "unknown block helper '{}'",
                other.unwrap_or_default()
            )))
        }
    };
    let path = parts.next().ok_or_else(|| {
        NavarahError::Template(format!("{{{{#{}}}}} requires a field path", kind.tag()))
    })?;
    if parts.next().is_some() {
        return Err(NavarahError::Template(format!(
            "{{{{#{}}}}} takes exactly one field path",
            kind.tag()
        )));
    }
    Ok((kind, path.to_string()))
}

fn is_block_tag(tag: &str) -> bool {
    tag.starts_with('#') || tag.starts_with('/') || tag == "else"
}

fn tokenize(source: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens = Vec::new();
    let mut rest = source;
    let mut at_line_start = true;

    while let Some(open) = rest.find("{{") {
        let mut text = &rest[..open];
        let after_open = &rest[open + 2..];
        let close = after_open
            .find("}}")
            .ok_or_else(|| NavarahError::Template("unclosed '{{' tag".to_string()))?;
        let tag = after_open[..close].trim();
        if tag.is_empty() {
            return Err(NavarahError::Template("empty '{{}}' tag".to_string()));
        }
        let mut remainder = &after_open[close + 2..];

        let prefix_start = text.rfind('\n').map(|i| i + 1);
        let line_prefix = &text[prefix_start.unwrap_or(0)..];
        let suffix_end = remainder.find('\n');
        let line_suffix = &remainder[..suffix_end.unwrap_or(remainder.len())];
        let standalone = is_block_tag(tag)
            && (prefix_start.is_some() || at_line_start)
            && line_prefix.trim().is_empty()
            && line_suffix.trim().is_empty();

        if standalone {
            text = &text[..prefix_start.unwrap_or(0)];
            remainder = &remainder[suffix_end.map(|i| i + 1).unwrap_or(remainder.len())..];
        }

        if !text.is_empty() {
            tokens.push(Token::Text(text));
        }
        tokens.push(Token::Tag(tag));
        at_line_start = standalone;
        rest = remainder;
    }

    if !rest.is_empty() {
        tokens.push(Token::Text(rest));
    }
    Ok(tokens)
}

fn render_nodes<'a>(nodes: &'a [Node], scopes: &mut Vec<&'a Value>, out: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Var(path) => match lookup(path, scopes) {
                Some(value) => push_value(value, out),
                None => out.push_str(NO_DATA),
            },
            Node::If {
                path,
                then,
                otherwise,
            } => {
                if is_truthy(lookup(path, scopes)) {
                    render_nodes(then, scopes, out);
                } else {
                    render_nodes(otherwise, scopes, out);
                }
            }
            Node::Each {
                path,
                body,
                otherwise,
            } => match lookup(path, scopes) {
                Some(Value::Array(items)) if !items.is_empty() => {
                    for item in items {
                        scopes.push(item);
                        render_nodes(body, scopes, out);
                        scopes.pop();
                    }
                }
                _ => render_nodes(otherwise, scopes, out),
            },
        }
    }
}

/// Resolve a dotted path from the innermost scope outward; `null` counts as absent
fn lookup<'a>(path: &str, scopes: &[&'a Value]) -> Option<&'a Value> {
    let found = if path == "this" {
        scopes.last().copied()
    } else if let Some(inner) = path.strip_prefix("this.") {
        scopes.last().copied().and_then(|scope| resolve(scope, inner))
    } else {
        let first = path.split('.').next().unwrap_or(path);
        scopes
            .iter()
            .rev()
            .copied()
            .find(|scope| scope.get(first).is_some())
            .and_then(|scope| resolve(scope, path))
    };
    found.filter(|v| !v.is_null())
}

fn resolve<'a>(scope: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(scope, |value, segment| value.get(segment))
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

fn push_value(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => out.push_str(s),
        // 72.0 reads better as 72
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => {
                out.push_str(&format!("{}", f as i64))
            }
            _ => out.push_str(&n.to_string()),
        },
        other => out.push_str(&other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(source: &str, context: Value) -> String {
        Template::parse(source).unwrap().render(&context)
    }

    #[test]
    fn test_substitution_and_dotted_paths() {
        let out = render(
            "Age: {{age}}, BMI: {{report.bmi}}, BP: {{report.bp}}",
            json!({"age": 29, "report": {"bmi": 22.5, "bp": "120/80"}}),
        );
        assert_eq!(out, "Age: 29, BMI: 22.5, BP: 120/80");
    }

    #[test]
    fn test_missing_placeholder_renders_marker() {
        let out = render("Concerns: {{concerns}}", json!({"age": 29}));
        assert_eq!(out, format!("Concerns: {}", NO_DATA));

        let out = render("Concerns: {{concerns}}", json!({"concerns": null}));
        assert_eq!(out, format!("Concerns: {}", NO_DATA));
    }

    #[test]
    fn test_if_else() {
        let source = "{{#if concerns}}Concerns: {{concerns}}{{else}}Concerns: None reported{{/if}}";
        assert_eq!(render(source, json!({"concerns": "nausea"})), "Concerns: nausea");
        assert_eq!(render(source, json!({})), "Concerns: None reported");
        assert_eq!(render(source, json!({"concerns": ""})), "Concerns: None reported");
    }

    #[test]
    fn test_whole_floats_render_without_fraction() {
        let out = render("{{rate}} BPM, {{hb}} g/dL", json!({"rate": 72.0, "hb": 12.5}));
        assert_eq!(out, "72 BPM, 12.5 g/dL");
    }

    #[test]
    fn test_zero_is_truthy() {
        let out = render("{{#if rate}}rate {{rate}}{{else}}none{{/if}}", json!({"rate": 0}));
        assert_eq!(out, "rate 0");
    }

    #[test]
    fn test_each_preserves_order_and_resolves_item_fields() {
        let source = "{{#each meds}}- {{name}} ({{dosage}})\n{{/each}}";
        let out = render(
            source,
            json!({"meds": [
                {"name": "Folic Acid", "dosage": "800 mcg"},
                {"name": "Iron", "dosage": "60 mg"},
            ]}),
        );
        assert_eq!(out, "- Folic Acid (800 mcg)\n- Iron (60 mg)\n");
    }

    #[test]
    fn test_each_this_and_outer_scope() {
        let out = render(
            "{{#each tips}}[{{owner}}: {{this}}]{{/each}}",
            json!({"owner": "mom", "tips": ["rest", "water"]}),
        );
        assert_eq!(out, "[mom: rest][mom: water]");
    }

    #[test]
    fn test_each_else_on_empty_or_missing() {
        let source = "{{#each items}}{{this}}{{else}}nothing{{/each}}";
        assert_eq!(render(source, json!({"items": []})), "nothing");
        assert_eq!(render(source, json!({})), "nothing");
    }

    #[test]
    fn test_standalone_block_lines_are_removed() {
        let source = "Header\n{{#if show}}\nShown line\n{{else}}\nHidden line\n{{/if}}\nFooter\n";
        assert_eq!(render(source, json!({"show": true})), "Header\nShown line\nFooter\n");
        assert_eq!(render(source, json!({"show": false})), "Header\nHidden line\nFooter\n");
    }

    #[test]
    fn test_nested_blocks() {
        let source = "{{#if report}}{{#each report.points}}{{month}} {{/each}}{{/if}}";
        let out = render(
            source,
            json!({"report": {"points": [{"month": "Mar"}, {"month": "Apr"}]}}),
        );
        assert_eq!(out, "Mar Apr ");
    }

    #[test]
    fn test_parse_errors() {
        assert!(Template::parse("{{#if a}}open").is_err());
        assert!(Template::parse("{{/if}}").is_err());
        assert!(Template::parse("{{#if a}}x{{/each}}").is_err());
        assert!(Template::parse("{{else}}").is_err());
        assert!(Template::parse("{{#if a}}x{{else}}y{{else}}z{{/if}}").is_err());
        assert!(Template::parse("{{#with a}}x{{/with}}").is_err());
        assert!(Template::parse("{{#if}}x{{/if}}").is_err());
        assert!(Template::parse("unclosed {{tag").is_err());
        assert!(Template::parse("{{}}").is_err());
    }
}
