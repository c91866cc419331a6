use std::sync::LazyLock;

use regex::Regex;

use crate::error::ParseError;

/// Id of the element holding one previous answer per line
pub const CORPUS_CONTAINER_ID: &str = "alphalist";

static TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<(/?)([A-Za-z][A-Za-z0-9-]*)([^>]*)>").expect("tag pattern is valid")
});

static ID_ATTRIBUTE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)(?:^|\s)id\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>/]+))"#)
        .expect("id pattern is valid")
});

static LINE_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)<br\s*/?>").expect("line break pattern is valid"));

/// Extract the previous answers from the corpus page.
///
/// Words come back lowercased, in page order, one per `<br>`-separated line.
/// Markup inside a line is dropped and only its first token is kept.
pub fn parse_word_list(html: &str) -> Result<Vec<String>, ParseError> {
    let inner = container_inner_html(html, CORPUS_CONTAINER_ID)
        .ok_or_else(|| ParseError::MissingContainer(CORPUS_CONTAINER_ID.to_string()))?;

    let words: Vec<String> = LINE_BREAK
        .split(inner)
        .map(|line| TAG.replace_all(line, " "))
        .filter_map(|line| line.split_whitespace().next().map(str::to_lowercase))
        .collect();

    tracing::debug!("Parsed {} words from HTML", words.len());
    Ok(words)
}

fn id_of(attributes: &str) -> Option<&str> {
    let caps = ID_ATTRIBUTE.captures(attributes)?;
    caps.get(1)
        .or_else(|| caps.get(2))
        .or_else(|| caps.get(3))
        .map(|m| m.as_str())
}

/// Inner HTML of the first element whose id is `id`
fn container_inner_html<'a>(html: &'a str, id: &str) -> Option<&'a str> {
    let mut tags = TAG.captures_iter(html);

    let (name, content_start) = loop {
        let caps = tags.next()?;
        if caps[1].is_empty() && id_of(&caps[3]) == Some(id) {
            if caps[3].trim_end().ends_with('/') {
                return Some("");
            }
            break (caps[2].to_ascii_lowercase(), caps.get(0)?.end());
        }
    };

    let mut depth = 1usize;
    for caps in tags {
        if !caps[2].eq_ignore_ascii_case(&name) {
            continue;
        }
        if caps[1].is_empty() {
            if !caps[3].trim_end().ends_with('/') {
                depth += 1;
            }
        } else {
            depth -= 1;
            if depth == 0 {
                return Some(&html[content_start..caps.get(0)?.start()]);
            }
        }
    }

    // Unclosed container runs to the end of the document
    Some(&html[content_start..])
}
