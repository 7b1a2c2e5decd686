//! Parser for the GS1 Syntax Dictionary line format.
//!
//! Each non-comment line defines one AI or AI range:
//!
//! ```text
//! 253  ?  N13,csum,key [X..17]  dlpkey  # GDTI
//! 91-99  ?  X..90  # INTERNAL
//! ```
//!
//! An optional flags token follows the AI (`*` = FNC1 not required, `?` =
//! permitted DL data attribute), then the value components, then attribute
//! tokens up to a `#` that introduces the data title.

use gs1_syntax_linters::linter_from_name;

use crate::{AiEntry, Component, Cset, DlAttr, TableError, MAX_AI_LEN, MIN_AI_LEN};

/// Characters that may make up a flags token.
const FLAG_CHARS: &str = "*?!\"$%&'()+,-./:;<=>@[\\]^_`{|}~";

/// Characters permitted in an attribute value.
const ATTR_VALUE_CHARS: &str = "abcdefghijklmnopqrstuvwxyz0123456789-+_,|";

/// Parse complete Syntax Dictionary text into entries, expanding AI ranges.
pub(crate) fn parse(text: &str) -> Result<Vec<AiEntry>, TableError> {
    let mut entries = Vec::new();
    for (i, line) in text.lines().enumerate() {
        parse_line(line, &mut entries).map_err(|msg| TableError::Syntax { line: i + 1, msg })?;
    }
    Ok(entries)
}

fn parse_line(line: &str, out: &mut Vec<AiEntry>) -> Result<(), String> {
    let mut tokens = line.split_ascii_whitespace().peekable();

    // Nothing to do for empty and comment-only lines.
    let first = match tokens.next() {
        Some(t) if !t.starts_with('#') => t,
        _ => return Ok(()),
    };

    let (ai, range_end) = parse_ai_token(first)?;

    // Optional flags token.
    let mut fnc1 = true;
    let mut dl_attr = DlAttr::None;
    if let Some(t) = tokens.peek() {
        if t.chars().all(|c| FLAG_CHARS.contains(c)) {
            let flags = tokens.next().unwrap();
            fnc1 = !flags.contains('*');
            if flags.contains('?') {
                dl_attr = DlAttr::Permitted;
            }
        }
    }

    // Value components.
    let mut components = Vec::new();
    while let Some(t) = tokens.peek() {
        if !(t.starts_with(|c: char| c.is_ascii_uppercase()) || t.starts_with('[')) {
            break;
        }
        components.push(parse_component(tokens.next().unwrap())?);
    }
    if components.is_empty() {
        return Err("AI is missing components".into());
    }
    for (i, c) in components.iter().enumerate() {
        if i + 1 < components.len() && c.min != c.max {
            return Err("only the final component may have variable length".into());
        }
        if !c.optional && i > 0 && components[i - 1].optional {
            return Err("a mandatory component cannot follow optional components".into());
        }
    }

    // Attribute tokens until the title delimiter.
    let mut attrs = String::new();
    for t in tokens.by_ref() {
        if t == "#" {
            break;
        }
        validate_attr(t)?;
        if !attrs.is_empty() {
            attrs.push(' ');
        }
        attrs.push_str(t);
    }

    // Whatever remains is the title.
    let title = tokens.collect::<Vec<_>>().join(" ");

    // Expand an AI range by filling down to the end of the range.
    let mut code = ai.to_string();
    loop {
        out.push(AiEntry {
            ai: code.clone(),
            fnc1,
            dl_attr,
            components: components.clone(),
            attrs: attrs.clone(),
            title: title.clone(),
        });
        let last = code.pop().unwrap();
        if last == range_end {
            break;
        }
        code.push((last as u8 + 1) as char);
    }
    Ok(())
}

/// Parse the leading AI or AI-range token, returning the first AI and the
/// final digit of the range (equal to the AI's own final digit when the
/// token is a single AI).
fn parse_ai_token(token: &str) -> Result<(&str, char), String> {
    if let Some((start, end)) = token.split_once('-') {
        if start.len() != end.len() {
            return Err("AIs in range must have equal width".into());
        }
        if !(MIN_AI_LEN..=MAX_AI_LEN).contains(&start.len()) {
            return Err("AI range has wrong width".into());
        }
        if !is_digits(start) || !is_digits(end) {
            return Err("AIs must be numeric".into());
        }
        if start[..start.len() - 1] != end[..end.len() - 1] {
            return Err("AI range parts may only differ in their last digit".into());
        }
        let (s, e) = (last_char(start), last_char(end));
        if s >= e {
            return Err("AI range end must exceed range start".into());
        }
        Ok((start, e))
    } else {
        if !(MIN_AI_LEN..=MAX_AI_LEN).contains(&token.len()) {
            return Err("AI has wrong width".into());
        }
        if !is_digits(token) {
            return Err("AI must be numeric".into());
        }
        Ok((token, last_char(token)))
    }
}

/// Parse one component token such as `N13,csum,key` or `[X..17]`.
fn parse_component(token: &str) -> Result<Component, String> {
    let mut parts = token.split(',');
    let mut format = parts.next().unwrap_or_default();

    let optional = format.starts_with('[');
    if optional {
        format = format
            .strip_prefix('[')
            .and_then(|f| f.strip_suffix(']'))
            .ok_or_else(|| format!("optional component is missing ']': {token}"))?;
    }

    let mut chars = format.chars();
    let cset = match chars.next() {
        Some('N') => Cset::N,
        Some('X') => Cset::X,
        Some('Y') => Cset::Y,
        Some('Z') => Cset::Z,
        Some(c) => return Err(format!("unknown character set {c}")),
        None => return Err(format!("component format is too short: {token}")),
    };

    let spec = chars.as_str();
    let (min, max) = if let Some(max) = spec.strip_prefix("..") {
        (1, parse_len(max, token)?)
    } else {
        let n = parse_len(spec, token)?;
        (n, n)
    };

    let linters = parts
        .map(|name| {
            if linter_from_name(name).is_none() {
                return Err(format!("unknown linter '{name}'"));
            }
            Ok(name.to_string())
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Component {
        cset,
        min,
        max,
        optional,
        linters,
    })
}

/// A component length: one or two digits, not zero-leading.
fn parse_len(spec: &str, token: &str) -> Result<usize, String> {
    if spec.is_empty() || spec.len() > 2 || !is_digits(spec) {
        return Err(format!("unrecognised component format: {token}"));
    }
    if spec.starts_with('0') {
        return Err(format!("component length must not start with 0: {token}"));
    }
    spec.parse()
        .map_err(|_| format!("component length is not a number: {token}"))
}

fn validate_attr(token: &str) -> Result<(), String> {
    let (name, value) = match token.split_once('=') {
        Some((n, v)) => (n, Some(v)),
        None => (token, None),
    };
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_lowercase()) {
        return Err(format!("attribute name contains illegal characters: {token}"));
    }
    if let Some(v) = value {
        if v.is_empty() {
            return Err(format!("attribute value required on RHS of assignment: {token}"));
        }
        if !v.chars().all(|c| ATTR_VALUE_CHARS.contains(c)) {
            return Err(format!("attribute value contains illegal characters: {token}"));
        }
    }
    Ok(())
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn last_char(s: &str) -> char {
    s.chars().next_back().unwrap_or('\0')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_one(line: &str) -> Result<Vec<AiEntry>, String> {
        let mut out = Vec::new();
        parse_line(line, &mut out).map(|()| out)
    }

    #[test]
    fn empty_and_comment_lines() {
        assert!(parse_one("").unwrap().is_empty());
        assert!(parse_one("#").unwrap().is_empty());
        assert!(parse_one("# COMMENT").unwrap().is_empty());
    }

    #[test]
    fn single_ai() {
        let out = parse_one("90  ?  X..30  # INTERNAL").unwrap();
        assert_eq!(out.len(), 1);
        let e = &out[0];
        assert_eq!(e.ai, "90");
        assert!(e.fnc1);
        assert_eq!(e.dl_attr, DlAttr::Permitted);
        assert_eq!(e.components.len(), 1);
        assert_eq!((e.components[0].min, e.components[0].max), (1, 30));
        assert_eq!(e.title, "INTERNAL");
    }

    #[test]
    fn ai_range_expands() {
        let out = parse_one("91-99  ?  X..90  # INTERNAL").unwrap();
        assert_eq!(out.len(), 9);
        assert_eq!(out[0].ai, "91");
        assert_eq!(out[8].ai, "99");
        assert!(out.iter().all(|e| e.title == "INTERNAL"));
    }

    #[test]
    fn optional_component_and_linters() {
        let out = parse_one("253  ?  N13,csum,key [X..17]  dlpkey  # GDTI").unwrap();
        let e = &out[0];
        assert_eq!(e.components.len(), 2);
        assert_eq!(e.components[0].linters, vec!["csum", "key"]);
        assert!(!e.components[0].optional);
        assert!(e.components[1].optional);
        assert_eq!((e.components[1].min, e.components[1].max), (1, 17));
        assert_eq!(e.attrs, "dlpkey");
    }

    #[test]
    fn fnc1_not_required_flag() {
        let out =
            parse_one("01  *?  N14,csum,key  ex=02,255,37  dlpkey=22,10,21|235  # GTIN").unwrap();
        let e = &out[0];
        assert!(!e.fnc1);
        assert_eq!(e.attrs, "ex=02,255,37 dlpkey=22,10,21|235");
    }

    #[test]
    fn no_data_attr_without_question_mark() {
        let out = parse_one("8200  X..70  req=01  # PRODUCT URL").unwrap();
        assert_eq!(out[0].dl_attr, DlAttr::None);
        assert_eq!(out[0].title, "PRODUCT URL");
    }

    #[test]
    fn attrs_without_title() {
        let out = parse_one("90  ?  X..30  req=999").unwrap();
        assert_eq!(out[0].attrs, "req=999");
        assert_eq!(out[0].title, "");
    }

    #[test]
    fn max_components_and_linters() {
        let out = parse_one(
            "8001  ?  N4,nonzero N5,nonzero N3,nonzero N1,winding N1  req=01  # DIMENSIONS",
        )
        .unwrap();
        assert_eq!(out[0].components.len(), 5);
        assert_eq!(out[0].min_length(), 14);

        let out = parse_one("8014  X..25,csumalpha,key,hasnondigit  req=01  # MUDI").unwrap();
        assert_eq!(out[0].components[0].linters.len(), 3);
    }

    #[test]
    fn rejects_malformed_lines() {
        // Non-final variable-length component.
        assert!(parse_one("90  ?  N..5 X..30").is_err());
        // Mandatory component after optional component.
        assert!(parse_one("90  ?  [N5] X5").is_err());
        // Unknown linter.
        assert!(parse_one("90  ?  X..30,nosuchlinter").is_err());
        // Bad range.
        assert!(parse_one("99-91  ?  X..30").is_err());
        assert!(parse_one("9-19  ?  X..30").is_err());
        assert!(parse_one("91-919  ?  X..30").is_err());
        // Missing components.
        assert!(parse_one("90  ?").is_err());
        // Attribute violations.
        assert!(parse_one("90  ?  X..30  Req=01").is_err());
        assert!(parse_one("90  ?  X..30  req=").is_err());
    }

    #[test]
    fn range_parts_must_share_stem() {
        assert!(parse_one("3100-3205  *?  N6").is_err());
        assert!(parse_one("3100-3105  *?  N6").map(|v| v.len()).unwrap() == 6);
    }
}
