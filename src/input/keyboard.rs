use super::{InputSource, RawFrame, RawKey, RawSignal};
use crate::input::InputError;
use crossterm::event::{
    self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
    ModifierKeyCode, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
};
use crossterm::execute;
use crossterm::terminal::{self, disable_raw_mode, enable_raw_mode};
use log::{info, trace, warn};
use std::io;
use std::time::Duration;

pub fn map_key_event(key: KeyEvent) -> Option<RawSignal> {
    let pressed = match key.kind {
        KeyEventKind::Press => true,
        KeyEventKind::Release => false,
        KeyEventKind::Repeat => return None,
    };

    // Raw mode swallows SIGINT, so Ctrl+C has to be handled here.
    if pressed
        && key.modifiers.contains(KeyModifiers::CONTROL)
        && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('C'))
    {
        return Some(RawSignal::Quit);
    }

    let raw = match key.code {
        KeyCode::Esc => RawKey::Escape,
        KeyCode::Char(c) => RawKey::Char(c.to_ascii_lowercase()),
        KeyCode::Modifier(ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift) => {
            RawKey::Shift
        }
        KeyCode::Modifier(ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt) => RawKey::Alt,
        KeyCode::Modifier(ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl) => {
            RawKey::Control
        }
        _ => return None,
    };

    Some(if pressed {
        RawSignal::KeyDown(raw)
    } else {
        RawSignal::KeyUp(raw)
    })
}

/// Fails unless the terminal reports key releases. Without them triggers,
/// modifiers and the latch would never see their key-up.
pub fn require_enhancement(supported: io::Result<bool>) -> Result<(), InputError> {
    match supported {
        Ok(true) => Ok(()),
        Ok(false) => Err(InputError::Unsupported(
            "terminal does not report key releases (kitty keyboard protocol required)"
                .to_string(),
        )),
        Err(e) => Err(InputError::Unsupported(format!(
            "could not query keyboard enhancement support: {}",
            e
        ))),
    }
}

/// Terminal keyboard in raw mode. Key releases and bare modifier presses are
/// only reported by terminals that speak the kitty keyboard protocol.
pub struct KeyboardInput {
    enhanced: bool,
    failed: bool,
}

impl KeyboardInput {
    pub fn enable() -> Result<Self, InputError> {
        enable_raw_mode()?;
        // Any early return below drops this value, which restores the terminal.
        let mut keyboard = KeyboardInput {
            enhanced: false,
            failed: false,
        };

        require_enhancement(terminal::supports_keyboard_enhancement())?;
        let mut stdout = io::stdout();
        execute!(
            stdout,
            PushKeyboardEnhancementFlags(
                KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                    | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                    | KeyboardEnhancementFlags::REPORT_ALL_KEYS_AS_ESCAPE_CODES
            )
        )?;
        keyboard.enhanced = true;
        info!("Keyboard enhancement enabled, key releases will be reported");

        Ok(keyboard)
    }

    fn read_pending(&mut self) -> Result<RawFrame, InputError> {
        let mut frame = RawFrame::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                trace!("Key event: {:?}", key);
                frame.extend(map_key_event(key));
            }
        }
        Ok(frame)
    }
}

impl InputSource for KeyboardInput {
    fn poll(&mut self) -> RawFrame {
        if self.failed {
            return RawFrame::new();
        }
        match self.read_pending() {
            Ok(frame) => frame,
            Err(e) => {
                warn!("Keyboard input failed, disabling it: {}", e);
                self.failed = true;
                RawFrame::new()
            }
        }
    }
}

impl Drop for KeyboardInput {
    fn drop(&mut self) {
        if self.enhanced {
            let mut stdout = io::stdout();
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        if let Err(e) = disable_raw_mode() {
            warn!("Failed to restore terminal: {}", e);
        }
        info!("Terminal restored");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, kind: KeyEventKind) -> KeyEvent {
        KeyEvent::new_with_kind(code, KeyModifiers::NONE, kind)
    }

    #[test]
    fn test_press_and_release_map_to_down_and_up() {
        assert_eq!(
            map_key_event(key(KeyCode::Char('a'), KeyEventKind::Press)),
            Some(RawSignal::KeyDown(RawKey::Char('a')))
        );
        assert_eq!(
            map_key_event(key(KeyCode::Char('a'), KeyEventKind::Release)),
            Some(RawSignal::KeyUp(RawKey::Char('a')))
        );
    }

    #[test]
    fn test_repeat_is_ignored() {
        assert!(map_key_event(key(KeyCode::Char('a'), KeyEventKind::Repeat)).is_none());
    }

    #[test]
    fn test_ctrl_c_quits() {
        let event = KeyEvent::new_with_kind(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
            KeyEventKind::Press,
        );
        assert_eq!(map_key_event(event), Some(RawSignal::Quit));
    }

    #[test]
    fn test_modifier_keys() {
        assert_eq!(
            map_key_event(key(
                KeyCode::Modifier(ModifierKeyCode::RightShift),
                KeyEventKind::Press
            )),
            Some(RawSignal::KeyDown(RawKey::Shift))
        );
        assert_eq!(
            map_key_event(key(
                KeyCode::Modifier(ModifierKeyCode::LeftAlt),
                KeyEventKind::Release
            )),
            Some(RawSignal::KeyUp(RawKey::Alt))
        );
    }

    #[test]
    fn test_terminal_without_key_releases_is_rejected() {
        assert!(require_enhancement(Ok(true)).is_ok());
        assert!(matches!(
            require_enhancement(Ok(false)),
            Err(InputError::Unsupported(_))
        ));
        let query_failed = io::Error::new(io::ErrorKind::TimedOut, "no reply");
        assert!(matches!(
            require_enhancement(Err(query_failed)),
            Err(InputError::Unsupported(_))
        ));
    }

    #[test]
    fn test_dropping_unenhanced_keyboard_skips_flag_pop() {
        // Mirrors the early-return path of `enable`: nothing was pushed, and
        // restoring raw mode that was never enabled is a no-op.
        let keyboard = KeyboardInput {
            enhanced: false,
            failed: false,
        };
        drop(keyboard);
    }

    #[test]
    fn test_other_key_returns_none() {
        assert!(map_key_event(key(KeyCode::F(1), KeyEventKind::Press)).is_none());
    }
}
