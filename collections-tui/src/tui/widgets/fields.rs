use crossterm::event::KeyCode;

/// Cursor state for a single-line text input.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    pub cursor: usize,
}

impl TextInputState {
    /// Apply a key to `value`, returning the new value when it changed.
    pub fn handle_key(
        &mut self,
        key: KeyCode,
        value: &str,
        max_length: Option<usize>,
    ) -> Option<String> {
        match key {
            KeyCode::Char(c) => {
                if max_length.is_some_and(|max| value.chars().count() >= max) {
                    return None;
                }
                let mut chars: Vec<char> = value.chars().collect();
                let at = self.cursor.min(chars.len());
                chars.insert(at, c);
                self.cursor = at + 1;
                Some(chars.into_iter().collect())
            }
            KeyCode::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let mut chars: Vec<char> = value.chars().collect();
                if self.cursor > chars.len() {
                    self.cursor = chars.len();
                }
                chars.remove(self.cursor - 1);
                self.cursor -= 1;
                Some(chars.into_iter().collect())
            }
            KeyCode::Delete => {
                let mut chars: Vec<char> = value.chars().collect();
                if self.cursor >= chars.len() {
                    return None;
                }
                chars.remove(self.cursor);
                Some(chars.into_iter().collect())
            }
            KeyCode::Left => {
                self.cursor = self.cursor.saturating_sub(1);
                None
            }
            KeyCode::Right => {
                self.cursor = (self.cursor + 1).min(value.chars().count());
                None
            }
            KeyCode::Home => {
                self.cursor = 0;
                None
            }
            KeyCode::End => {
                self.cursor = value.chars().count();
                None
            }
            _ => None,
        }
    }

    pub fn set_cursor_to_end(&mut self, value: &str) {
        self.cursor = value.chars().count();
    }
}

/// Value + cursor state for a text input.
#[derive(Debug, Clone, Default)]
pub struct TextInputField {
    pub value: String,
    pub state: TextInputState,
}

impl TextInputField {
    pub fn handle_key(&mut self, key: KeyCode, max_length: Option<usize>) {
        if let Some(new_value) = self.state.handle_key(key, &self.value, max_length) {
            self.value = new_value;
        }
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn set_value(&mut self, value: String) {
        self.value = value;
        self.state.set_cursor_to_end(&self.value);
    }

    pub fn clear(&mut self) {
        self.value.clear();
        self.state.cursor = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.value.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typing_advances_cursor() {
        let mut field = TextInputField::default();
        for c in "call.wav".chars() {
            field.handle_key(KeyCode::Char(c), None);
        }
        assert_eq!(field.value(), "call.wav");
        assert_eq!(field.state.cursor, 8);
    }

    #[test]
    fn test_backspace_in_the_middle() {
        let mut field = TextInputField::default();
        field.set_value("abc".into());
        field.handle_key(KeyCode::Left, None);
        field.handle_key(KeyCode::Backspace, None);
        assert_eq!(field.value(), "ac");
        assert_eq!(field.state.cursor, 1);
    }

    #[test]
    fn test_max_length_is_enforced() {
        let mut field = TextInputField::default();
        field.set_value("ab".into());
        field.handle_key(KeyCode::Char('c'), Some(2));
        assert_eq!(field.value(), "ab");
    }

    #[test]
    fn test_clear_resets_cursor() {
        let mut field = TextInputField::default();
        field.set_value("abc".into());
        field.clear();
        assert!(field.is_empty());
        assert_eq!(field.state.cursor, 0);
    }
}
