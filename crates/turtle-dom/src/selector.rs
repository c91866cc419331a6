/// Compound selector: every part must match the same element.
///
/// Supports `tag`, `.class`, `#id`, `[attr]` and `[attr="value"]`, e.g.
/// `.Tile-module_tile__UWEHN[data-state="tbd"]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    parts: Vec<SimpleSelector>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SimpleSelector {
    Tag(String),
    Class(String),
    Id(String),
    Attribute { name: String, value: Option<String> },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("Empty selector")]
    Empty,

    #[error("Unexpected character '{ch}' at {pos} in selector `{input}`")]
    Unexpected { input: String, ch: char, pos: usize },

    #[error("Unterminated attribute selector in `{0}`")]
    Unterminated(String),
}

impl Selector {
    pub fn parse(input: &str) -> Result<Self, SelectorError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(SelectorError::Empty);
        }

        let chars: Vec<char> = input.chars().collect();
        let mut parts = Vec::new();
        let mut pos = 0;

        while pos < chars.len() {
            match chars[pos] {
                '.' => {
                    let (name, next) = read_ident(&chars, pos + 1);
                    if name.is_empty() {
                        return Err(unexpected(input, &chars, pos));
                    }
                    parts.push(SimpleSelector::Class(name));
                    pos = next;
                }
                '#' => {
                    let (name, next) = read_ident(&chars, pos + 1);
                    if name.is_empty() {
                        return Err(unexpected(input, &chars, pos));
                    }
                    parts.push(SimpleSelector::Id(name));
                    pos = next;
                }
                '[' => {
                    let close = chars[pos..]
                        .iter()
                        .position(|&c| c == ']')
                        .map(|offset| pos + offset)
                        .ok_or_else(|| SelectorError::Unterminated(input.to_string()))?;
                    let body: String = chars[pos + 1..close].iter().collect();
                    parts.push(parse_attribute(&body));
                    pos = close + 1;
                }
                c if is_ident_char(c) && parts.is_empty() => {
                    let (name, next) = read_ident(&chars, pos);
                    parts.push(SimpleSelector::Tag(name.to_ascii_lowercase()));
                    pos = next;
                }
                _ => return Err(unexpected(input, &chars, pos)),
            }
        }

        Ok(Self { parts })
    }

    /// Match against an element described by its tag and attribute lookup
    pub(crate) fn matches<'a>(&self, tag: &str, attribute: impl Fn(&str) -> Option<&'a str>) -> bool {
        self.parts.iter().all(|part| match part {
            SimpleSelector::Tag(name) => tag.eq_ignore_ascii_case(name),
            SimpleSelector::Class(name) => attribute("class")
                .is_some_and(|classes| classes.split_whitespace().any(|c| c == name)),
            SimpleSelector::Id(id) => attribute("id") == Some(id.as_str()),
            SimpleSelector::Attribute { name, value: None } => attribute(name).is_some(),
            SimpleSelector::Attribute {
                name,
                value: Some(expected),
            } => attribute(name) == Some(expected.as_str()),
        })
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_'
}

fn read_ident(chars: &[char], start: usize) -> (String, usize) {
    let mut end = start;
    while end < chars.len() && is_ident_char(chars[end]) {
        end += 1;
    }
    (chars[start..end].iter().collect(), end)
}

fn unexpected(input: &str, chars: &[char], pos: usize) -> SelectorError {
    SelectorError::Unexpected {
        input: input.to_string(),
        ch: chars.get(pos).copied().unwrap_or(' '),
        pos,
    }
}

fn parse_attribute(body: &str) -> SimpleSelector {
    match body.split_once('=') {
        Some((name, value)) => {
            let value = value.trim();
            let value = value
                .strip_prefix('"')
                .and_then(|v| v.strip_suffix('"'))
                .or_else(|| value.strip_prefix('\'').and_then(|v| v.strip_suffix('\'')))
                .unwrap_or(value);
            SimpleSelector::Attribute {
                name: name.trim().to_string(),
                value: Some(value.to_string()),
            }
        }
        None => SimpleSelector::Attribute {
            name: body.trim().to_string(),
            value: None,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn attrs<'a>(pairs: &'a [(&'a str, &'a str)]) -> impl Fn(&str) -> Option<&'a str> {
        move |name| pairs.iter().find(|(k, _)| *k == name).map(|(_, v)| *v)
    }

    #[test]
    fn compound_class_and_attribute() {
        let selector = Selector::parse(r#".Tile-module_tile__UWEHN[data-state="tbd"]"#).unwrap();

        assert!(selector.matches(
            "div",
            attrs(&[("class", "Tile-module_tile__UWEHN"), ("data-state", "tbd")])
        ));
        assert!(!selector.matches(
            "div",
            attrs(&[("class", "Tile-module_tile__UWEHN"), ("data-state", "absent")])
        ));
        assert!(!selector.matches("div", attrs(&[("data-state", "tbd")])));
    }

    #[test]
    fn tag_id_and_bare_attribute() {
        assert!(Selector::parse("game-app").unwrap().matches("GAME-APP", attrs(&[])));
        assert!(Selector::parse("#alphalist").unwrap().matches("div", attrs(&[("id", "alphalist")])));
        assert!(Selector::parse("[role='img']").unwrap().matches("div", attrs(&[("role", "img")])));
        assert!(Selector::parse("[hidden]").unwrap().matches("div", attrs(&[("hidden", "")])));
    }

    #[test]
    fn rejects_malformed() {
        assert_eq!(Selector::parse("  "), Err(SelectorError::Empty));
        assert!(matches!(
            Selector::parse("[data-state"),
            Err(SelectorError::Unterminated(_))
        ));
        assert!(matches!(
            Selector::parse("div > span"),
            Err(SelectorError::Unexpected { ch: ' ', .. })
        ));
    }
}
