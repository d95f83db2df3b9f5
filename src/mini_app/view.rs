//! Headless view surfaces.
//!
//! Views render into a [`ViewFrame`]: a title, plain-text lines and the
//! background token. Front ends paint frames however they like. A view keeps
//! its latest frame in a watch channel, so a painter can wait for changes
//! instead of polling.

use std::{fmt, str::FromStr};

use tokio::sync::watch;

use crate::{HubError, HubResult};

use super::ColorToken;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ViewFrame {
    pub title: String,
    pub lines: Vec<String>,
    pub background: ColorToken,
}

impl ViewFrame {
    pub fn new<S: Into<String>>(title: S, background: ColorToken) -> Self {
        Self {
            title: title.into(),
            lines: Vec::new(),
            background,
        }
    }

    pub fn line<S: Into<String>>(mut self, line: S) -> Self {
        self.lines.push(line.into());
        self
    }

    pub fn lines<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.lines.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.title.contains(needle) || self.lines.iter().any(|line| line.contains(needle))
    }
}

impl fmt::Display for ViewFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "[{}] ({})", self.title, self.background)?;
        for line in &self.lines {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

/// User actions an inline widget may react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewAction {
    Erase,
    SelectCity(usize),
    Refresh,
}

impl FromStr for ViewAction {
    type Err = HubError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split_whitespace();
        match (parts.next(), parts.next()) {
            (Some("erase"), None) => Ok(ViewAction::Erase),
            (Some("refresh"), None) => Ok(ViewAction::Refresh),
            (Some("select"), Some(index)) => index
                .parse()
                .map(ViewAction::SelectCity)
                .map_err(|_| HubError::invalid_input("view action", s)),
            _ => Err(HubError::invalid_input("view action", s)),
        }
    }
}

/// Inline widget shown in an expanded list row.
pub trait InteractiveView: Send + Sync {
    fn frame(&self) -> ViewFrame;

    fn frames(&self) -> watch::Receiver<ViewFrame>;

    /// Returns `false` when the widget does not support the action.
    fn handle_action(&self, action: &ViewAction) -> bool;
}

/// Full-screen experience pushed on the navigation stack.
pub trait FullScreenController: Send + Sync {
    fn title(&self) -> String;

    fn frame(&self) -> ViewFrame;

    fn frames(&self) -> watch::Receiver<ViewFrame>;

    /// Free-form text input typed by the user while the controller is on top.
    fn handle_input(&self, input: &str) -> HubResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_view_actions() {
        assert_eq!("erase".parse::<ViewAction>().unwrap(), ViewAction::Erase);
        assert_eq!(
            "select 3".parse::<ViewAction>().unwrap(),
            ViewAction::SelectCity(3)
        );
        assert!("select x".parse::<ViewAction>().is_err());
        assert!("dance".parse::<ViewAction>().is_err());
    }

    #[test]
    fn test_frame_rendering() {
        let frame = ViewFrame::new("Guess Number", ColorToken::system_background())
            .line("Best score: n/a");
        assert!(frame.contains("n/a"));
        assert_eq!(
            frame.to_string(),
            "[Guess Number] (system_background)\n  Best score: n/a\n"
        );
    }
}
