// ABOUTME: Encodes crossterm key events as the byte sequences a terminal sends to a PTY

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Terminal input for `key`, or `None` for keys with no terminal encoding
pub fn encode_key(key: KeyEvent) -> Option<String> {
    if key.kind == KeyEventKind::Release {
        return None;
    }

    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let alt = key.modifiers.contains(KeyModifiers::ALT);

    let encoded = match key.code {
        KeyCode::Char(c) if ctrl => control_char(c)?.to_string(),
        KeyCode::Char(c) => c.to_string(),
        KeyCode::Enter => "\r".to_string(),
        KeyCode::Tab => "\t".to_string(),
        KeyCode::BackTab => "\x1b[Z".to_string(),
        KeyCode::Backspace => "\x7f".to_string(),
        KeyCode::Esc => "\x1b".to_string(),
        KeyCode::Up => "\x1b[A".to_string(),
        KeyCode::Down => "\x1b[B".to_string(),
        KeyCode::Right => "\x1b[C".to_string(),
        KeyCode::Left => "\x1b[D".to_string(),
        KeyCode::Home => "\x1b[H".to_string(),
        KeyCode::End => "\x1b[F".to_string(),
        KeyCode::Insert => "\x1b[2~".to_string(),
        KeyCode::Delete => "\x1b[3~".to_string(),
        KeyCode::PageUp => "\x1b[5~".to_string(),
        KeyCode::PageDown => "\x1b[6~".to_string(),
        KeyCode::F(n) => function_key(n)?.to_string(),
        _ => return None,
    };

    if alt {
        Some(format!("\x1b{encoded}"))
    } else {
        Some(encoded)
    }
}

fn control_char(c: char) -> Option<char> {
    match c.to_ascii_lowercase() {
        c @ 'a'..='z' => char::from_u32(c as u32 - 'a' as u32 + 1),
        ' ' | '@' | '2' => Some('\x00'),
        '[' | '3' => Some('\x1b'),
        '\\' | '4' => Some('\x1c'),
        ']' | '5' => Some('\x1d'),
        '^' | '6' => Some('\x1e'),
        '_' | '7' | '/' => Some('\x1f'),
        _ => None,
    }
}

fn function_key(n: u8) -> Option<&'static str> {
    Some(match n {
        1 => "\x1bOP",
        2 => "\x1bOQ",
        3 => "\x1bOR",
        4 => "\x1bOS",
        5 => "\x1b[15~",
        6 => "\x1b[17~",
        7 => "\x1b[18~",
        8 => "\x1b[19~",
        9 => "\x1b[20~",
        10 => "\x1b[21~",
        11 => "\x1b[23~",
        12 => "\x1b[24~",
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn with(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn printable_characters_pass_through() {
        assert_eq!(encode_key(key(KeyCode::Char('x'))).as_deref(), Some("x"));
        assert_eq!(encode_key(with(KeyCode::Char('X'), KeyModifiers::SHIFT)).as_deref(), Some("X"));
        assert_eq!(encode_key(key(KeyCode::Char('é'))).as_deref(), Some("é"));
    }

    #[test]
    fn editing_keys() {
        assert_eq!(encode_key(key(KeyCode::Enter)).as_deref(), Some("\r"));
        assert_eq!(encode_key(key(KeyCode::Backspace)).as_deref(), Some("\x7f"));
        assert_eq!(encode_key(key(KeyCode::Tab)).as_deref(), Some("\t"));
        assert_eq!(encode_key(key(KeyCode::Esc)).as_deref(), Some("\x1b"));
    }

    #[test]
    fn control_combinations() {
        assert_eq!(encode_key(with(KeyCode::Char('c'), KeyModifiers::CONTROL)).as_deref(), Some("\x03"));
        assert_eq!(encode_key(with(KeyCode::Char('D'), KeyModifiers::CONTROL)).as_deref(), Some("\x04"));
        assert_eq!(encode_key(with(KeyCode::Char('['), KeyModifiers::CONTROL)).as_deref(), Some("\x1b"));
    }

    #[test]
    fn navigation_and_function_keys() {
        assert_eq!(encode_key(key(KeyCode::Up)).as_deref(), Some("\x1b[A"));
        assert_eq!(encode_key(key(KeyCode::PageDown)).as_deref(), Some("\x1b[6~"));
        assert_eq!(encode_key(key(KeyCode::F(1))).as_deref(), Some("\x1bOP"));
        assert_eq!(encode_key(key(KeyCode::F(12))).as_deref(), Some("\x1b[24~"));
        assert_eq!(encode_key(key(KeyCode::F(20))), None);
    }

    #[test]
    fn alt_prefixes_escape() {
        assert_eq!(encode_key(with(KeyCode::Char('b'), KeyModifiers::ALT)).as_deref(), Some("\x1bb"));
    }

    #[test]
    fn releases_are_ignored() {
        let mut release = key(KeyCode::Char('a'));
        release.kind = KeyEventKind::Release;
        assert_eq!(encode_key(release), None);
    }
}
