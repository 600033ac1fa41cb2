use crate::error::CompileError;
use crate::types::{Token, TokenKind};
use crate::window::LookaheadWindow;

/// Tag of the element whose attributes document the element before it.
pub const COMMENT_TAG: &str = "comment";

/// The two token runs read ahead of a structural-open event: the element's
/// own block (the open token, its attributes and any text up to the next
/// structural token) and the sibling block that starts at that boundary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialWindow {
    pub own:     Vec<Token>,
    pub sibling: Vec<Token>,
}

/// Index of the first boundary token strictly after `start`, or the index
/// just past the end of an exhausted stream.
fn next_boundary(window: &LookaheadWindow, start: usize) -> Result<usize, CompileError> {
    let mut index = start + 1;
    loop {
        match window.get(index)? {
            Some(token) if token.is_boundary() => return Ok(index),
            Some(_) => index += 1,
            None => return Ok(index),
        }
    }
}

fn collect(window: &LookaheadWindow, from: usize, to: usize) -> Result<Vec<Token>, CompileError> {
    let mut tokens = Vec::with_capacity(to - from);
    for index in from..to {
        if let Some(token) = window.get(index)? {
            tokens.push(token.clone());
        }
    }
    Ok(tokens)
}

/// Attribute name/value pairs found in a run of tokens, in order.
pub fn attribute_pairs(tokens: &[Token]) -> Vec<(&str, &str)> {
    tokens
        .windows(2)
        .filter(|pair| {
            pair[0].kind == TokenKind::AttributeName && pair[1].kind == TokenKind::AttributeValue
        })
        .map(|pair| (pair[0].text.as_str(), pair[1].text.as_str()))
        .collect()
}

impl PartialWindow {
    /// Carves both runs out of the window, which must sit on a
    /// `StructureOpen`. Only reads the window; the cursor does not move.
    pub fn extract(window: &LookaheadWindow) -> Result<PartialWindow, CompileError> {
        let own_end = next_boundary(window, 0)?;
        let own = collect(window, 0, own_end)?;

        let sibling = match window.get(own_end)? {
            Some(token) if token.kind != TokenKind::EndOfStream => {
                let sibling_end = next_boundary(window, own_end)?;
                collect(window, own_end, sibling_end)?
            }
            _ => Vec::new(),
        };

        Ok(PartialWindow { own, sibling })
    }

    /// Value of the first attribute called `name` in the element's own block.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        attribute_pairs(&self.own)
            .into_iter()
            .find(|(key, _)| *key == name)
            .map(|(_, value)| value)
    }

    /// Text directly inside the element, before its first child.
    pub fn descriptions(&self) -> Vec<&str> {
        self.own
            .iter()
            .filter(|t| t.kind == TokenKind::DescriptionText)
            .map(|t| t.text.as_str())
            .collect()
    }

    /// Lines from an adjacent `comment` element, one `"<name> : <value>"`
    /// per attribute. Empty when the sibling block is anything else.
    pub fn comment_lines(&self) -> Vec<String> {
        match self.sibling.first() {
            Some(first) if first.is_open(COMMENT_TAG) => attribute_pairs(&self.sibling)
                .into_iter()
                .map(|(name, value)| format!("{} : {}", name, value))
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Everything that documents the element: its own text first, then the
    /// adjacent comment block.
    pub fn leading_comment(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.descriptions().into_iter().map(str::to_string).collect();
        lines.extend(self.comment_lines());
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::spawn_token_stream;

    async fn window(text: &str, capacity: usize) -> LookaheadWindow {
        LookaheadWindow::start(spawn_token_stream(text.to_string(), 4), capacity)
            .await
            .unwrap()
    }

    const TAKE_OFF: &str = r#"<cmd name="TakeOff" id="1">
        <comment title="Take off" desc="Ask the drone to take off."/>
    </cmd>"#;

    #[tokio::test]
    async fn extracts_own_block_and_comment_sibling() {
        let w = window(TAKE_OFF, 32).await;
        let block = PartialWindow::extract(&w).unwrap();

        assert_eq!(block.own.len(), 5);
        assert_eq!(block.attribute("name"), Some("TakeOff"));
        assert_eq!(block.attribute("id"), Some("1"));
        assert_eq!(block.attribute("type"), None);
        assert_eq!(
            block.comment_lines(),
            vec!["title : Take off".to_string(), "desc : Ask the drone to take off.".to_string()]
        );
        // Extraction leaves the cursor alone.
        assert_eq!(w.current().map(|t| t.text.as_str()), Some("cmd"));
    }

    #[tokio::test]
    async fn description_text_belongs_to_own_block() {
        let w = window(r#"<class name="Piloting" id="0">All piloting commands<cmd/></class>"#, 32).await;
        let block = PartialWindow::extract(&w).unwrap();
        assert_eq!(block.descriptions(), vec!["All piloting commands"]);
        assert!(block.comment_lines().is_empty());
        assert_eq!(block.sibling.len(), 1);
        assert!(block.sibling[0].is_open("cmd"));
    }

    #[tokio::test]
    async fn comment_beyond_capacity_is_an_error() {
        let w = window(TAKE_OFF, 8).await;
        assert!(matches!(
            PartialWindow::extract(&w),
            Err(CompileError::LookaheadExceeded { capacity: 8, .. })
        ));
    }

    #[tokio::test]
    async fn stops_at_end_of_stream() {
        let w = window(r#"<project name="p" id="1">"#, 32).await;
        let block = PartialWindow::extract(&w).unwrap();
        assert_eq!(block.own.len(), 5);
        assert!(block.sibling.is_empty());
    }
}
