use crate::ast::{Expr, FieldPath, Node};
use crate::error::{TemplateError, TemplateResult};
use crate::lexer::{tokenize, Token};

/// Keywords that would need a fuller template engine
const UNSUPPORTED_KEYWORDS: &[&str] = &["define", "template", "block", "break", "continue"];

pub(crate) fn parse(source: &str) -> TemplateResult<Vec<Node>> {
    let tokens = tokenize(source)?;
    let mut parser = Parser { tokens, pos: 0 };
    let (nodes, terminator) = parser.parse_block()?;
    match terminator {
        Terminator::Eof => Ok(nodes),
        Terminator::End(line) => Err(TemplateError::parse(line, "unexpected {{end}}")),
        Terminator::Else(line, _) => Err(TemplateError::parse(line, "unexpected {{else}}")),
    }
}

enum Terminator {
    Eof,
    End(usize),
    /// `{{else}}` or `{{else if cond}}`
    Else(usize, Option<Expr>),
}

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn next(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        token
    }

    /// Parse nodes until `{{end}}`, `{{else ...}}` or end of input
    fn parse_block(&mut self) -> TemplateResult<(Vec<Node>, Terminator)> {
        let mut nodes: Vec<Node> = Vec::new();
        while let Some(token) = self.next() {
            match token {
                Token::Text(text) => push_text(&mut nodes, text),
                Token::Action { body, line } => {
                    let (keyword, rest) = split_keyword(&body);
                    match keyword {
                        "end" if rest.is_empty() => return Ok((nodes, Terminator::End(line))),
                        "else" => {
                            let cond = if rest.is_empty() {
                                None
                            } else {
                                let (sub, sub_rest) = split_keyword(rest);
                                if sub != "if" {
                                    return Err(TemplateError::unsupported(line, format!("else {sub}")));
                                }
                                Some(parse_expr(sub_rest, line)?)
                            };
                            return Ok((nodes, Terminator::Else(line, cond)));
                        }
                        "if" => {
                            let cond = parse_expr(rest, line)?;
                            nodes.push(self.parse_if(cond, line)?);
                        }
                        "range" => {
                            let expr = parse_path_expr(rest, line, "range")?;
                            let (body, otherwise) = self.parse_branches("range", line)?;
                            nodes.push(Node::Range {
                                expr,
                                body,
                                otherwise,
                            });
                        }
                        "with" => {
                            let expr = parse_path_expr(rest, line, "with")?;
                            let (body, otherwise) = self.parse_branches("with", line)?;
                            nodes.push(Node::With {
                                expr,
                                body,
                                otherwise,
                            });
                        }
                        kw if UNSUPPORTED_KEYWORDS.contains(&kw) => {
                            return Err(TemplateError::unsupported(line, kw.to_string()));
                        }
                        _ => nodes.push(Node::Output(parse_expr(&body, line)?)),
                    }
                }
            }
        }
        Ok((nodes, Terminator::Eof))
    }

    fn parse_if(&mut self, cond: Expr, line: usize) -> TemplateResult<Node> {
        let (then, terminator) = self.parse_block()?;
        let otherwise = match terminator {
            Terminator::End(_) => Vec::new(),
            Terminator::Else(_, None) => self.parse_else_body(line)?,
            // `else if` chains share the outer `end`
            Terminator::Else(else_line, Some(next_cond)) => vec![self.parse_if(next_cond, else_line)?],
            Terminator::Eof => return Err(TemplateError::parse(line, "unclosed {{if}}")),
        };
        Ok(Node::If {
            cond,
            then,
            otherwise,
        })
    }

    fn parse_branches(&mut self, name: &str, line: usize) -> TemplateResult<(Vec<Node>, Vec<Node>)> {
        let (body, terminator) = self.parse_block()?;
        let otherwise = match terminator {
            Terminator::End(_) => Vec::new(),
            Terminator::Else(_, None) => self.parse_else_body(line)?,
            Terminator::Else(else_line, Some(_)) => {
                return Err(TemplateError::unsupported(else_line, format!("else if inside {name}")))
            }
            Terminator::Eof => return Err(TemplateError::parse(line, format!("unclosed {{{{{name}}}}}"))),
        };
        Ok((body, otherwise))
    }

    fn parse_else_body(&mut self, line: usize) -> TemplateResult<Vec<Node>> {
        let (otherwise, terminator) = self.parse_block()?;
        match terminator {
            Terminator::End(_) => Ok(otherwise),
            Terminator::Else(else_line, _) => Err(TemplateError::parse(else_line, "duplicate {{else}}")),
            Terminator::Eof => Err(TemplateError::parse(line, "missing {{end}}")),
        }
    }
}

fn push_text(nodes: &mut Vec<Node>, text: String) {
    if let Some(Node::Text(previous)) = nodes.last_mut() {
        previous.push_str(&text);
    } else {
        nodes.push(Node::Text(text));
    }
}

fn split_keyword(body: &str) -> (&str, &str) {
    match body.find(char::is_whitespace) {
        Some(i) => (&body[..i], body[i..].trim()),
        None => (body, ""),
    }
}

fn parse_expr(text: &str, line: usize) -> TemplateResult<Expr> {
    let text = text.trim();
    if text.is_empty() {
        return Err(TemplateError::parse(line, "missing expression"));
    }
    let (word, rest) = split_keyword(text);
    if word == "not" {
        if rest.is_empty() {
            return Err(TemplateError::parse(line, "not requires an argument"));
        }
        return Ok(Expr::Not(Box::new(parse_expr(rest, line)?)));
    }
    if !rest.is_empty() || text.contains('|') || text.contains('(') {
        return Err(TemplateError::unsupported(line, text.to_string()));
    }
    parse_path(text, line).map(Expr::Path)
}

fn parse_path_expr(text: &str, line: usize, keyword: &str) -> TemplateResult<Expr> {
    let expr = parse_expr(text, line)?;
    if matches!(expr, Expr::Not(_)) {
        return Err(TemplateError::unsupported(line, format!("{keyword} {text}")));
    }
    Ok(expr)
}

fn parse_path(text: &str, line: usize) -> TemplateResult<FieldPath> {
    let (root, rest) = if let Some(rest) = text.strip_prefix('$') {
        (true, rest)
    } else if text.starts_with('.') {
        (false, text)
    } else {
        // literals, function names, variables other than `$`
        return Err(TemplateError::unsupported(line, text.to_string()));
    };

    if rest.is_empty() || rest == "." {
        if root && rest == "." {
            return Err(TemplateError::parse(line, "trailing dot in $."));
        }
        return Ok(FieldPath {
            root,
            segments: Vec::new(),
        });
    }

    let Some(rest) = rest.strip_prefix('.') else {
        return Err(TemplateError::unsupported(line, text.to_string()));
    };
    let segments: Vec<String> = rest.split('.').map(str::to_string).collect();
    for segment in &segments {
        if segment.is_empty() || !segment.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return Err(TemplateError::parse(line, format!("invalid field path {text}")));
        }
    }
    Ok(FieldPath { root, segments })
}
