use crate::error::CompileError;
use crate::types::{Token, TokenKind};
use std::collections::VecDeque;
use tokio::sync::mpsc;

pub type TokenSource = mpsc::Receiver<Result<Token, CompileError>>;

/// A bounded, randomly addressable view over a strictly ordered token stream.
///
/// The front of the window is the forward cursor: [current](Self::current)
/// yields every token exactly once as [advance](Self::advance) moves along.
/// [get](Self::get) reads ahead of the cursor without consuming anything.
/// Until the source is exhausted the window always holds `capacity` tokens.
pub struct LookaheadWindow {
    capacity:  usize,
    retained:  VecDeque<Token>,
    source:    TokenSource,
    exhausted: bool,
}

impl LookaheadWindow {
    /// Pulls from `source` until the window holds `capacity` tokens or the
    /// stream ends.
    pub async fn start(source: TokenSource, capacity: usize) -> Result<LookaheadWindow, CompileError> {
        if capacity == 0 {
            return Err(CompileError::Config("lookahead window capacity must be at least 1".to_string()));
        }
        let mut window = LookaheadWindow {
            capacity,
            retained: VecDeque::with_capacity(capacity),
            source,
            exhausted: false,
        };
        while window.retained.len() < capacity && window.pull().await? {}
        Ok(window)
    }

    /// Pulls one token into the back of the window. Returns `false` once the
    /// source has nothing left. The end-of-stream token is the last one ever
    /// pulled, even if the producer has not hung up yet.
    async fn pull(&mut self) -> Result<bool, CompileError> {
        if self.exhausted {
            return Ok(false);
        }
        match self.source.recv().await {
            Some(Ok(token)) => {
                if token.kind == TokenKind::EndOfStream {
                    self.exhausted = true;
                }
                self.retained.push_back(token);
                Ok(true)
            }
            Some(Err(err)) => {
                self.exhausted = true;
                Err(err)
            }
            None => {
                self.exhausted = true;
                Ok(false)
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.retained.len()
    }

    pub fn is_empty(&self) -> bool {
        self.retained.is_empty()
    }

    /// The token under the forward cursor.
    pub fn current(&self) -> Option<&Token> {
        self.retained.front()
    }

    /// Reads the token `index` positions ahead of the cursor (0 is the
    /// cursor itself). `Ok(None)` means the stream ended before that
    /// position. Asking beyond the capacity is a configuration error: the
    /// window could never have held that token.
    pub fn get(&self, index: usize) -> Result<Option<&Token>, CompileError> {
        if index >= self.capacity {
            return Err(CompileError::LookaheadExceeded {
                needed:   index + 1,
                capacity: self.capacity,
            });
        }
        Ok(self.retained.get(index))
    }

    /// Discards the oldest token and refills one from the source. Returns the
    /// discarded token.
    pub async fn advance(&mut self) -> Result<Option<Token>, CompileError> {
        let oldest = self.retained.pop_front();
        self.pull().await?;
        Ok(oldest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::spawn_token_stream;

    async fn window(text: &str, capacity: usize) -> LookaheadWindow {
        LookaheadWindow::start(spawn_token_stream(text.to_string(), 2), capacity)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn fills_to_capacity() {
        let w = window("<a x=\"1\" y=\"2\"/><b/>", 3).await;
        assert_eq!(w.len(), 3);
        assert_eq!(w.current().map(|t| t.text.as_str()), Some("a"));
        assert_eq!(w.get(2).unwrap().map(|t| t.text.as_str()), Some("1"));
    }

    #[tokio::test]
    async fn forward_cursor_sees_every_token_once() {
        let text = "<a x=\"1\"/><b/>";
        let expected: Vec<Token> = crate::tokenizer::tokenize_schema(text).unwrap();

        let mut w = window(text, 2).await;
        let mut seen = Vec::new();
        while let Some(token) = w.advance().await.unwrap() {
            seen.push(token);
        }
        assert_eq!(seen, expected);
        assert!(w.is_empty());
    }

    #[tokio::test]
    async fn lookahead_past_capacity_fails() {
        let w = window("<a x=\"1\" y=\"2\"/>", 2).await;
        assert!(w.get(1).is_ok());
        assert!(matches!(
            w.get(2),
            Err(CompileError::LookaheadExceeded { needed: 3, capacity: 2 })
        ));
    }

    #[tokio::test]
    async fn shrinks_once_exhausted() {
        let mut w = window("<a/>", 8).await;
        assert_eq!(w.len(), 3);
        assert!(matches!(w.get(5), Ok(None)));
        w.advance().await.unwrap();
        assert_eq!(w.len(), 2);
    }

    #[tokio::test]
    async fn zero_capacity_is_rejected() {
        let result = LookaheadWindow::start(spawn_token_stream(String::new(), 1), 0).await;
        assert!(matches!(result, Err(CompileError::Config(_))));
    }

    #[tokio::test]
    async fn lexer_errors_surface_through_the_window() {
        let result = LookaheadWindow::start(spawn_token_stream("<a b=c>".to_string(), 1), 4).await;
        assert!(matches!(result, Err(CompileError::ParseError { .. })));
    }
}
