use crate::error::{TemplateError, TemplateResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    Text(String),
    /// Trimmed action body and the line it starts on
    Action { body: String, line: usize },
}

/// Split template source into text and `{{ }}` actions
///
/// Comments are dropped here. Trim markers (`{{- ` and ` -}}`) remove the
/// whitespace of the neighbouring text.
pub(crate) fn tokenize(source: &str) -> TemplateResult<Vec<Token>> {
    let mut tokens = Vec::new();
    let mut cursor = 0;
    let mut trim_next = false;

    while let Some(found) = source[cursor..].find("{{") {
        let open = cursor + found;
        let line = line_of(source, open);

        let mut text = &source[cursor..open];
        if trim_next {
            text = text.trim_start();
        }

        let mut inner_start = open + 2;
        let trim_left = source[inner_start..].starts_with("- ")
            || source[inner_start..].starts_with("-\n")
            || source[inner_start..].starts_with("-\t");
        if trim_left {
            text = text.trim_end();
            inner_start += 1;
        }
        if !text.is_empty() {
            tokens.push(Token::Text(text.to_string()));
        }

        let rest = &source[inner_start..];
        let body_trimmed = rest.trim_start();
        let (body, close_at) = if body_trimmed.starts_with("/*") {
            let comment_start = inner_start + (rest.len() - body_trimmed.len());
            let end = source[comment_start..]
                .find("*/")
                .ok_or_else(|| TemplateError::parse(line, "unclosed comment"))?;
            let after = comment_start + end + 2;
            let close = source[after..]
                .find("}}")
                .ok_or_else(|| TemplateError::parse(line, "unclosed action"))?;
            if !source[after..after + close].trim().trim_end_matches('-').trim().is_empty() {
                return Err(TemplateError::parse(line, "text after comment"));
            }
            (None, after + close)
        } else {
            let close = rest
                .find("}}")
                .ok_or_else(|| TemplateError::parse(line, "unclosed action"))?;
            (Some(&source[inner_start..inner_start + close]), inner_start + close)
        };

        let before_close = &source[..close_at];
        trim_next = before_close.ends_with(" -")
            || before_close.ends_with("\n-")
            || before_close.ends_with("\t-");

        if let Some(body) = body {
            let mut body = body.trim();
            if trim_next {
                body = body.trim_end_matches('-').trim_end();
            }
            if body.is_empty() {
                return Err(TemplateError::parse(line, "empty action"));
            }
            tokens.push(Token::Action {
                body: body.to_string(),
                line,
            });
        }

        cursor = close_at + 2;
    }

    let mut tail = &source[cursor..];
    if trim_next {
        tail = tail.trim_start();
    }
    if !tail.is_empty() {
        tokens.push(Token::Text(tail.to_string()));
    }
    Ok(tokens)
}

fn line_of(source: &str, offset: usize) -> usize {
    source[..offset].matches('\n').count() + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    fn action(body: &str, line: usize) -> Token {
        Token::Action {
            body: body.to_string(),
            line,
        }
    }

    #[test]
    fn test_text_and_actions() {
        let tokens = tokenize("<p>{{ .Name }}</p>").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("<p>".into()),
                action(".Name", 1),
                Token::Text("</p>".into())
            ]
        );
    }

    #[test]
    fn test_comments_dropped() {
        let tokens = tokenize("a{{/* note }} here */}}b").unwrap();
        assert_eq!(tokens, vec![Token::Text("a".into()), Token::Text("b".into())]);
    }

    #[test]
    fn test_trim_markers() {
        let tokens = tokenize("<ul>\n  {{- range .Items -}}\n  <li>{{.}}</li>\n{{- end}}\n</ul>").unwrap();
        assert_eq!(
            tokens,
            vec![
                Token::Text("<ul>".into()),
                action("range .Items", 2),
                Token::Text("<li>".into()),
                action(".", 3),
                Token::Text("</li>".into()),
                action("end", 4),
                Token::Text("\n</ul>".into()),
            ]
        );
    }

    #[test]
    fn test_unclosed_action() {
        assert!(matches!(
            tokenize("<p>{{.Name</p>"),
            Err(TemplateError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_line_numbers() {
        let tokens = tokenize("a\nb\n{{.X}}").unwrap();
        assert_eq!(tokens[1], action(".X", 3));
    }
}
