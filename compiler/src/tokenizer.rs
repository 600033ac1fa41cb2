use crate::error::CompileError;
use crate::types::{Token, TokenKind};
use crate::utils::{error, quote, unescape};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::VecDeque;
use tokio::sync::mpsc;

lazy_static! {
    static ref PROLOG:      Regex = Regex::new(r"^<\?[\s\S]*?\?>").unwrap();
    static ref COMMENT:     Regex = Regex::new(r"^<!--[\s\S]*?-->").unwrap();
    static ref DECLARATION: Regex = Regex::new(r"^<![^>]*>").unwrap();
    static ref OPEN_TAG:    Regex = Regex::new(r"^<([A-Za-z_][\w:.-]*)").unwrap();
    static ref CLOSE_TAG:   Regex = Regex::new(r"^</\s*([A-Za-z_][\w:.-]*)\s*>").unwrap();
    static ref ATTRIBUTE:   Regex = Regex::new(r#"^\s*([A-Za-z_][\w:.-]*)\s*=\s*(?:"([^"]*)"|'([^']*)')"#).unwrap();
    static ref TAG_END:     Regex = Regex::new(r"^\s*>").unwrap();
    static ref SELF_CLOSE:  Regex = Regex::new(r"^\s*/>").unwrap();
    static ref TEXT:        Regex = Regex::new(r"^[^<]+").unwrap();
}

/// Lazily turns schema text into tokens, in document order.
///
/// Inside an open tag the tokenizer yields attribute name/value pairs; a
/// self-closing tag yields a `StructureClose` with empty text. Text is
/// trimmed, entity-decoded and dropped when blank. The last item is always
/// a single `EndOfStream` token unless an error ended the stream first.
pub struct Tokenizer<'a> {
    text:    &'a str,
    pos:     usize,
    line:    usize,
    column:  usize,
    depth:   usize,
    in_tag:  bool,
    done:    bool,
    pending: VecDeque<Token>,
}

impl<'a> Tokenizer<'a> {
    pub fn new(text: &'a str) -> Tokenizer<'a> {
        Tokenizer {
            text,
            pos: 0,
            line: 1,
            column: 1,
            depth: 0,
            in_tag: false,
            done: false,
            pending: VecDeque::new(),
        }
    }

    fn advance(&mut self, part: &str) {
        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            self.line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                self.column = last_line_part.len() + 1;
            }
        } else {
            self.column += part.len();
        }
        self.pos += part.len();
    }

    fn fail(&mut self, msg: &str) -> Option<Result<Token, CompileError>> {
        self.done = true;
        Some(Err(error(msg, self.line, self.column)))
    }

    fn scan(&mut self) -> Option<Result<Token, CompileError>> {
        loop {
            let text = self.text;
            let rest = &text[self.pos..];
            let (line, column) = (self.line, self.column);

            if rest.is_empty() {
                if self.in_tag {
                    return self.fail("Unexpected end of input inside a tag");
                }
                self.done = true;
                return Some(Ok(Token::new(TokenKind::EndOfStream, "", line, column)));
            }

            if self.in_tag {
                if let Some(caps) = ATTRIBUTE.captures(rest) {
                    let name = caps[1].to_string();
                    let value = caps.get(2).or_else(|| caps.get(3)).map_or("", |m| m.as_str());
                    let value = unescape(value);
                    self.advance(&caps[0]);
                    self.pending.push_back(Token::new(TokenKind::AttributeValue, value, line, column));
                    return Some(Ok(Token::new(TokenKind::AttributeName, name, line, column)));
                }
                if let Some(m) = SELF_CLOSE.find(rest) {
                    self.advance(m.as_str());
                    self.in_tag = false;
                    self.depth = self.depth.saturating_sub(1);
                    return Some(Ok(Token::new(TokenKind::StructureClose, "", line, column)));
                }
                if let Some(m) = TAG_END.find(rest) {
                    self.advance(m.as_str());
                    self.in_tag = false;
                    continue;
                }
                let unexpected: String = rest.chars().take(16).collect();
                return self.fail(&format!("Malformed attribute near {}", quote(&unexpected)));
            }

            if let Some(m) = PROLOG.find(rest).or_else(|| COMMENT.find(rest)) {
                self.advance(m.as_str());
                continue;
            }
            if let Some(m) = DECLARATION.find(rest) {
                self.advance(m.as_str());
                continue;
            }
            if let Some(caps) = CLOSE_TAG.captures(rest) {
                let name = caps[1].to_string();
                self.advance(&caps[0]);
                self.depth = self.depth.saturating_sub(1);
                return Some(Ok(Token::new(TokenKind::StructureClose, name, line, column)));
            }
            if let Some(caps) = OPEN_TAG.captures(rest) {
                let name = caps[1].to_string();
                self.advance(&caps[0]);
                self.depth += 1;
                self.in_tag = true;
                return Some(Ok(Token::new(TokenKind::StructureOpen, name, line, column)));
            }
            if rest.starts_with('<') {
                let unexpected: String = rest.chars().take(16).collect();
                return self.fail(&format!("Syntax error: {}", quote(&unexpected)));
            }
            let part = match TEXT.find(rest) {
                Some(m) => m.as_str(),
                None => return self.fail("Syntax error"),
            };
            self.advance(part);
            let trimmed = part.trim();
            if trimmed.is_empty() {
                continue;
            }
            let kind = if self.depth > 0 {
                TokenKind::DescriptionText
            } else {
                TokenKind::FreeText
            };
            return Some(Ok(Token::new(kind, unescape(trimmed), line, column)));
        }
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Result<Token, CompileError>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(token) = self.pending.pop_front() {
            return Some(Ok(token));
        }
        if self.done {
            return None;
        }
        self.scan()
    }
}

/// Tokenizes the whole text eagerly.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, CompileError> {
    Tokenizer::new(text).collect()
}

/// Starts the producer side of the pipeline: a background task tokenizes
/// `text` and feeds a channel holding at most `bound` tokens in flight. A
/// tokenizer error is delivered in place of the next token and ends the
/// stream.
pub fn spawn_token_stream(text: String, bound: usize) -> mpsc::Receiver<Result<Token, CompileError>> {
    let (tx, rx) = mpsc::channel(bound);
    tokio::spawn(async move {
        for item in Tokenizer::new(&text) {
            let failed = item.is_err();
            if tx.send(item).await.is_err() {
                tracing::debug!("token consumer dropped the stream early");
                return;
            }
            if failed {
                return;
            }
        }
    });
    rx
}
