use serde::de::IgnoredAny;

/// Extract the JSON document from a model response, handling markdown code
/// blocks and prose around the object.
///
/// Candidates are tried in order (fenced blocks, then every balanced `{...}`
/// span) and the first one that parses as JSON wins. When none parses, the
/// first fenced block or the trimmed text is returned so serde can report
/// the problem.
pub fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();

    let blocks = fenced_blocks(trimmed);
    if let Some(block) = blocks.iter().copied().find(|b| b.starts_with('{') && parses(b)) {
        return block;
    }

    if let Some(span) = object_spans(trimmed).find(|span| parses(span)) {
        return span;
    }

    blocks.first().copied().unwrap_or(trimmed)
}

fn parses(candidate: &str) -> bool {
    serde_json::from_str::<IgnoredAny>(candidate).is_ok()
}

/// Bodies of ``` fenced blocks, each ended by the first closing fence after its opening line
fn fenced_blocks(text: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = text;
    while let Some(open) = rest.find("```") {
        let after_open = &rest[open + 3..];
        // skip the info string (e.g. "json")
        let Some(line_end) = after_open.find('\n') else {
            break;
        };
        let body_start = &after_open[line_end + 1..];
        let Some(close) = body_start.find("```") else {
            break;
        };
        blocks.push(body_start[..close].trim());
        rest = &body_start[close + 3..];
    }
    blocks
}

/// Every balanced `{...}` span, in order of its opening brace, ignoring braces inside strings
fn object_spans(text: &str) -> impl Iterator<Item = &str> {
    text.match_indices('{')
        .filter_map(move |(start, _)| balanced_end(&text[start..]).map(|end| &text[start..start + end]))
}

/// Byte length of the object starting at the first char of `text`, if it closes
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;
    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_json_plain() {
        let input = r#"{"suggestions": ["Rest"]}"#;
        assert_eq!(extract_json(input), input);
    }

    #[test]
    fn test_extract_json_markdown() {
        let input = "```json\n{\"suggestions\": [\"Rest\"]}\n```";
        assert_eq!(extract_json(input), r#"{"suggestions": ["Rest"]}"#);
    }

    #[test]
    fn test_extract_json_with_text() {
        let input = "Here are your suggestions:\n{\"suggestions\": [\"Rest\"]}\nStay well!";
        assert_eq!(extract_json(input), r#"{"suggestions": ["Rest"]}"#);
    }

    #[test]
    fn test_extract_json_braces_inside_strings() {
        let input = r#"Result: {"results": [{"title": "Use {curly} braces", "summary": "a \"quoted\" }"}]} done"#;
        assert_eq!(
            extract_json(input),
            r#"{"results": [{"title": "Use {curly} braces", "summary": "a \"quoted\" }"}]}"#
        );
    }

    #[test]
    fn test_extract_json_skips_braces_in_leading_prose() {
        let input = r#"I used {placeholders} here. {"suggestions": ["Rest"]}"#;
        assert_eq!(extract_json(input), r#"{"suggestions": ["Rest"]}"#);
    }

    #[test]
    fn test_extract_json_stops_at_first_closing_fence() {
        let input = "```json\n{\"suggestions\": [\"Rest\"]}\n```\nSee also:\n```\nnotes\n```";
        assert_eq!(extract_json(input), r#"{"suggestions": ["Rest"]}"#);
    }

    #[test]
    fn test_extract_json_fence_after_prose() {
        let input = "Sure! Here it is:\n```json\n{\"results\": []}\n```";
        assert_eq!(extract_json(input), r#"{"results": []}"#);
    }

    #[test]
    fn test_extract_json_invalid_fence_is_returned_for_reporting() {
        let input = "```json\n{\"suggestions\": [\n```";
        assert_eq!(extract_json(input), r#"{"suggestions": ["#);
    }

    #[test]
    fn test_extract_json_without_object_returns_trimmed() {
        assert_eq!(extract_json("  no json here \n"), "no json here");
    }
}
