//! Global shortcut handling
//!
//! Two reconfigurable key combinations: one translates the current
//! selection, one enters screenshot-selection mode. Events map to
//! [`ContentCommand`]s for the content controller.

use anyhow::{anyhow, Result};
use global_hotkey::{
    hotkey::{Code, HotKey, Modifiers},
    GlobalHotKeyEvent, GlobalHotKeyManager, HotKeyState,
};
use tracing::info;

use crate::config::Settings;
use crate::shared::ContentCommand;

/// Parses a shortcut string like "Alt+T" or "Alt+Shift+S" into a HotKey.
pub fn parse_hotkey(hotkey_str: &str) -> Result<HotKey> {
    let parts: Vec<&str> = hotkey_str.split('+').map(|s| s.trim()).collect();

    let mut modifiers = Modifiers::empty();
    let mut key_code: Option<Code> = None;

    for part in parts {
        let upper = part.to_uppercase();
        match upper.as_str() {
            "CTRL" | "CONTROL" => modifiers |= Modifiers::CONTROL,
            "SHIFT" => modifiers |= Modifiers::SHIFT,
            "ALT" => modifiers |= Modifiers::ALT,
            "WIN" | "SUPER" | "META" => modifiers |= Modifiers::SUPER,
            _ => key_code = Some(parse_key_code(&upper)?),
        }
    }

    let code = key_code.ok_or_else(|| anyhow!("No key code found in shortcut string"))?;
    Ok(HotKey::new(Some(modifiers), code))
}

/// Parse a key name into a Code.
fn parse_key_code(key: &str) -> Result<Code> {
    let code = match key {
        "F1" => Code::F1,
        "F2" => Code::F2,
        "F3" => Code::F3,
        "F4" => Code::F4,
        "F5" => Code::F5,
        "F6" => Code::F6,
        "F7" => Code::F7,
        "F8" => Code::F8,
        "F9" => Code::F9,
        "F10" => Code::F10,
        "F11" => Code::F11,
        "F12" => Code::F12,

        "A" => Code::KeyA,
        "B" => Code::KeyB,
        "C" => Code::KeyC,
        "D" => Code::KeyD,
        "E" => Code::KeyE,
        "F" => Code::KeyF,
        "G" => Code::KeyG,
        "H" => Code::KeyH,
        "I" => Code::KeyI,
        "J" => Code::KeyJ,
        "K" => Code::KeyK,
        "L" => Code::KeyL,
        "M" => Code::KeyM,
        "N" => Code::KeyN,
        "O" => Code::KeyO,
        "P" => Code::KeyP,
        "Q" => Code::KeyQ,
        "R" => Code::KeyR,
        "S" => Code::KeyS,
        "T" => Code::KeyT,
        "U" => Code::KeyU,
        "V" => Code::KeyV,
        "W" => Code::KeyW,
        "X" => Code::KeyX,
        "Y" => Code::KeyY,
        "Z" => Code::KeyZ,

        "0" => Code::Digit0,
        "1" => Code::Digit1,
        "2" => Code::Digit2,
        "3" => Code::Digit3,
        "4" => Code::Digit4,
        "5" => Code::Digit5,
        "6" => Code::Digit6,
        "7" => Code::Digit7,
        "8" => Code::Digit8,
        "9" => Code::Digit9,

        "SPACE" => Code::Space,
        "ENTER" | "RETURN" => Code::Enter,
        "TAB" => Code::Tab,
        "ESCAPE" | "ESC" => Code::Escape,
        "BACKSPACE" => Code::Backspace,
        "DELETE" | "DEL" => Code::Delete,
        "INSERT" | "INS" => Code::Insert,
        "HOME" => Code::Home,
        "END" => Code::End,
        "PAGEUP" | "PGUP" => Code::PageUp,
        "PAGEDOWN" | "PGDN" => Code::PageDown,
        "UP" => Code::ArrowUp,
        "DOWN" => Code::ArrowDown,
        "LEFT" => Code::ArrowLeft,
        "RIGHT" => Code::ArrowRight,

        _ => return Err(anyhow!("Unknown key code: {}", key)),
    };

    Ok(code)
}

/// Map a received event to the command it dispatches. The receiver yields
/// one event on key press and another on release; only the press dispatches,
/// otherwise every keystroke would fire its command twice.
fn command_for(
    id: u32,
    state: HotKeyState,
    translate: &HotKey,
    screenshot: &HotKey,
) -> Option<ContentCommand> {
    if state != HotKeyState::Pressed {
        return None;
    }
    if id == translate.id() {
        Some(ContentCommand::TriggerTranslation)
    } else if id == screenshot.id() {
        Some(ContentCommand::ShowScreenshotOverlay)
    } else {
        None
    }
}

/// Registers the two shortcuts and turns their events into commands.
pub struct HotkeyDispatcher {
    manager: GlobalHotKeyManager,
    translate: HotKey,
    screenshot: HotKey,
}

impl HotkeyDispatcher {
    /// Register both shortcuts from settings.
    pub fn new(settings: &Settings) -> Result<Self> {
        let manager = GlobalHotKeyManager::new()
            .map_err(|e| anyhow!("Failed to create hotkey manager: {:?}", e))?;

        let translate = parse_hotkey(&settings.translate_shortcut)?;
        let screenshot = parse_hotkey(&settings.screenshot_shortcut)?;

        if translate.id() == screenshot.id() {
            return Err(anyhow!(
                "Translate and screenshot shortcuts are identical: {}",
                settings.translate_shortcut
            ));
        }

        manager
            .register(translate)
            .map_err(|e| anyhow!("Failed to register translate shortcut: {:?}", e))?;
        manager
            .register(screenshot)
            .map_err(|e| anyhow!("Failed to register screenshot shortcut: {:?}", e))?;

        info!(
            "Registered shortcuts: translate={}, screenshot={}",
            settings.translate_shortcut, settings.screenshot_shortcut
        );

        Ok(Self {
            manager,
            translate,
            screenshot,
        })
    }

    /// Drain pending hotkey events until one dispatches a command, if any.
    pub fn poll_event(&self) -> Option<ContentCommand> {
        while let Ok(event) = GlobalHotKeyEvent::receiver().try_recv() {
            if let Some(command) =
                command_for(event.id, event.state, &self.translate, &self.screenshot)
            {
                return Some(command);
            }
        }
        None
    }
}

impl Drop for HotkeyDispatcher {
    fn drop(&mut self) {
        let _ = self.manager.unregister(self.translate);
        let _ = self.manager.unregister(self.screenshot);
    }
}
