use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

#[derive(Debug, Clone)]
pub enum Event {
    /// First event after startup; opens the initial route
    Init,
    Render,
    Key(KeyEvent),
    /// Bracketed paste, delivered as one chunk
    Paste(String),
}

impl Event {
    pub fn is_quit(&self) -> bool {
        matches!(
            self,
            Event::Key(KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            })
        )
    }
}

/// Paste text as it should land in a single-line field: newlines and tabs
/// become spaces, other control characters are dropped.
pub fn sanitize_paste(text: &str) -> String {
    text.chars()
        .filter_map(|c| match c {
            '\r' => None,
            '\n' | '\t' => Some(' '),
            c if c.is_control() => None,
            c => Some(c),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ctrl_c_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(Event::Key(key).is_quit());
    }

    #[test]
    fn plain_c_does_not_quit() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::NONE);
        assert!(!Event::Key(key).is_quit());
        assert!(!Event::Paste("c".into()).is_quit());
    }

    #[test]
    fn paste_flattens_lines() {
        assert_eq!(sanitize_paste("hello\r\nworld\tagain"), "hello world again");
        assert_eq!(sanitize_paste("bell\u{7}"), "bell");
    }
}
