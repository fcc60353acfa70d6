//! Instruction markup handling. The data source is trusted: markup is
//! interpreted, never sanitized.

/// A run of text sharing one style.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextLine {
    pub runs: Vec<TextRun>,
}

impl TextLine {
    pub fn plain(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    fn is_blank(&self) -> bool {
        self.runs.iter().all(|r| r.text.trim().is_empty())
    }

    fn push(&mut self, text: &str, bold: bool) {
        match self.runs.last_mut() {
            Some(last) if last.bold == bold => last.text.push_str(text),
            _ => self.runs.push(TextRun {
                text: text.to_string(),
                bold,
            }),
        }
    }

    fn trim_end(&mut self) {
        while let Some(last) = self.runs.last_mut() {
            let trimmed = last.text.trim_end().len();
            last.text.truncate(trimmed);
            if last.text.is_empty() {
                self.runs.pop();
            } else {
                break;
            }
        }
    }
}

/// Remove every `<...>` tag, leaving text and entities untouched. Used
/// for narration.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        match rest[open..].find('>') {
            Some(close) => rest = &rest[open + close + 1..],
            None => {
                rest = &rest[open..];
                break;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Lay markup out as lines: block tags break lines, list items get a
/// bullet, `<b>`/`<strong>` are bold, whitespace collapses.
pub fn to_lines(html: &str) -> Vec<TextLine> {
    let mut lines: Vec<TextLine> = Vec::new();
    let mut current = TextLine::default();
    let mut bold_depth = 0usize;
    let mut rest = html;

    loop {
        let (text, tag) = match rest.find('<') {
            Some(open) => match rest[open..].find('>') {
                Some(close) => {
                    let tag = &rest[open + 1..open + close];
                    let text = &rest[..open];
                    rest = &rest[open + close + 1..];
                    (text, Some(tag))
                }
                None => {
                    let text = rest;
                    rest = "";
                    (text, None)
                }
            },
            None => {
                let text = rest;
                rest = "";
                (text, None)
            }
        };

        push_text(&mut current, &decode_entities(text), bold_depth > 0);

        let Some(tag) = tag else { break };
        let closing = tag.starts_with('/');
        let name: String = tag
            .trim_start_matches('/')
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match name.as_str() {
            "br" => flush_line(&mut current, &mut lines),
            "li" => {
                flush_line(&mut current, &mut lines);
                if !closing {
                    current.push("• ", false);
                }
            }
            "p" | "div" | "ul" | "ol" | "tr" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                flush_line(&mut current, &mut lines)
            }
            "b" | "strong" => {
                if closing {
                    bold_depth = bold_depth.saturating_sub(1);
                } else if !tag.ends_with('/') {
                    bold_depth += 1;
                }
            }
            _ => {}
        }
    }
    flush_line(&mut current, &mut lines);
    lines
}

fn flush_line(current: &mut TextLine, lines: &mut Vec<TextLine>) {
    current.trim_end();
    if current.is_blank() {
        current.runs.clear();
    } else {
        lines.push(std::mem::take(current));
    }
}

fn push_text(line: &mut TextLine, text: &str, bold: bool) {
    let mut collapsed = String::with_capacity(text.len());
    let mut last_space = line
        .runs
        .last()
        .is_none_or(|r| r.text.ends_with(' '));
    for ch in text.chars() {
        if ch.is_whitespace() && ch != '\u{a0}' {
            if !last_space {
                collapsed.push(' ');
                last_space = true;
            }
        } else {
            collapsed.push(if ch == '\u{a0}' { ' ' } else { ch });
            last_space = false;
        }
    }
    if !collapsed.is_empty() {
        line.push(&collapsed, bold);
    }
}

/// Decode named and numeric character references. Unknown references
/// are kept verbatim.
pub fn decode_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let after = &rest[amp + 1..];
        let decoded = after
            .find(';')
            .filter(|&semi| semi > 0 && semi <= 10)
            .and_then(|semi| decode_entity(&after[..semi]).map(|ch| (ch, semi)));
        match decoded {
            Some((ch, semi)) => {
                out.push(ch);
                rest = &after[semi + 1..];
            }
            None => {
                out.push('&');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    let named = match entity.to_ascii_lowercase().as_str() {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some('\u{a0}'),
        "ndash" | "mdash" => Some('-'),
        _ => None,
    };
    if named.is_some() {
        return named;
    }
    match entity {
        "aacute" => Some('á'),
        "Aacute" => Some('Á'),
        "eacute" => Some('é'),
        "Eacute" => Some('É'),
        "iacute" => Some('í'),
        "oacute" => Some('ó'),
        "uacute" => Some('ú'),
        "atilde" => Some('ã'),
        "Atilde" => Some('Ã'),
        "otilde" => Some('õ'),
        "acirc" => Some('â'),
        "ecirc" => Some('ê'),
        "ocirc" => Some('ô'),
        "agrave" => Some('à'),
        "ccedil" => Some('ç'),
        "Ccedil" => Some('Ç'),
        "ntilde" => Some('ñ'),
        "uuml" => Some('ü'),
        "iexcl" => Some('¡'),
        "iquest" => Some('¿'),
        _ => decode_numeric(entity),
    }
}

fn decode_numeric(entity: &str) -> Option<char> {
    let digits = entity.strip_prefix('#')?;
    let value = match digits.strip_prefix(['x', 'X']) {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_tags_keeps_text() {
        assert_eq!(strip_tags("<b>Ligue</b> para o <i>192</i>."), "Ligue para o 192.");
        assert_eq!(strip_tags("sem tags"), "sem tags");
        assert_eq!(strip_tags("a < b"), "a < b");
        assert_eq!(strip_tags("1<br/>2"), "12");
    }

    #[test]
    fn test_lines_break_on_blocks() {
        let lines = to_lines("<p>Primeiro passo</p><p>Segundo<br>passo</p>");
        let plain: Vec<String> = lines.iter().map(TextLine::plain).collect();
        assert_eq!(plain, vec!["Primeiro passo", "Segundo", "passo"]);
    }

    #[test]
    fn test_list_items_get_bullets() {
        let lines = to_lines("<ul>\n  <li>Afaste curiosos</li>\n  <li>Ligue 192</li>\n</ul>");
        let plain: Vec<String> = lines.iter().map(TextLine::plain).collect();
        assert_eq!(plain, vec!["• Afaste curiosos", "• Ligue 192"]);
    }

    #[test]
    fn test_bold_runs() {
        let lines = to_lines("Pressione <strong>forte</strong> e rápido");
        assert_eq!(lines.len(), 1);
        let runs = &lines[0].runs;
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[0], TextRun { text: "Pressione ".into(), bold: false });
        assert_eq!(runs[1], TextRun { text: "forte".into(), bold: true });
        assert_eq!(runs[2], TextRun { text: " e rápido".into(), bold: false });
    }

    #[test]
    fn test_entities_are_decoded() {
        assert_eq!(decode_entities("5&nbsp;cm &amp; 100&#8211;120"), "5\u{a0}cm & 100–120");
        assert_eq!(decode_entities("compress&atilde;o"), "compressão");
        assert_eq!(decode_entities("R&D &unknown; &#x41;"), "R&D &unknown; A");
    }
}
