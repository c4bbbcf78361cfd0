//! Global hotkey definition and registration

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Hotkey id used with `RegisterHotKey`
pub const HOTKEY_ID: i32 = 9000;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HotkeyParseError {
    #[error("Hotkey is empty")]
    Empty,

    #[error("Unknown modifier '{0}'")]
    UnknownModifier(String),

    #[error("Unknown key '{0}'")]
    UnknownKey(String),

    #[error("Hotkey needs at least one modifier")]
    NoModifier,
}

/// Modifier keys held together with the hotkey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
}

impl Modifiers {
    pub const CTRL_SHIFT: Modifiers = Modifiers { ctrl: true, alt: false, shift: true, win: false };
    pub const CTRL_ALT: Modifiers = Modifiers { ctrl: true, alt: true, shift: false, win: false };
    pub const ALT_SHIFT: Modifiers = Modifiers { ctrl: false, alt: true, shift: true, win: false };
    pub const CTRL: Modifiers = Modifiers { ctrl: true, alt: false, shift: false, win: false };
    pub const ALT: Modifiers = Modifiers { ctrl: false, alt: true, shift: false, win: false };

    /// Combinations offered in the settings dialog
    pub const CHOICES: [Modifiers; 5] = [
        Self::CTRL_SHIFT,
        Self::CTRL_ALT,
        Self::ALT_SHIFT,
        Self::CTRL,
        Self::ALT,
    ];

    pub fn is_empty(&self) -> bool {
        !(self.ctrl || self.alt || self.shift || self.win)
    }

    /// `MOD_*` flags for `RegisterHotKey`
    pub fn flags(&self) -> u32 {
        let mut flags = 0;
        if self.alt {
            flags |= 0x0001;
        }
        if self.ctrl {
            flags |= 0x0002;
        }
        if self.shift {
            flags |= 0x0004;
        }
        if self.win {
            flags |= 0x0008;
        }
        flags
    }

    fn names(&self) -> Vec<&'static str> {
        let mut names = Vec::with_capacity(4);
        if self.ctrl {
            names.push("Ctrl");
        }
        if self.alt {
            names.push("Alt");
        }
        if self.shift {
            names.push("Shift");
        }
        if self.win {
            names.push("Win");
        }
        names
    }
}

impl fmt::Display for Modifiers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.names().join("+"))
    }
}

/// Keys that can trigger a capture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyKey {
    C,
    X,
    S,
    A,
    Q,
    Z,
    F1,
    F2,
    F3,
    F4,
}

impl HotkeyKey {
    pub const ALL: [HotkeyKey; 10] = [
        HotkeyKey::C,
        HotkeyKey::X,
        HotkeyKey::S,
        HotkeyKey::A,
        HotkeyKey::Q,
        HotkeyKey::Z,
        HotkeyKey::F1,
        HotkeyKey::F2,
        HotkeyKey::F3,
        HotkeyKey::F4,
    ];

    /// Windows virtual-key code
    pub fn vk(self) -> u32 {
        match self {
            HotkeyKey::C => 0x43,
            HotkeyKey::X => 0x58,
            HotkeyKey::S => 0x53,
            HotkeyKey::A => 0x41,
            HotkeyKey::Q => 0x51,
            HotkeyKey::Z => 0x5A,
            HotkeyKey::F1 => 0x70,
            HotkeyKey::F2 => 0x71,
            HotkeyKey::F3 => 0x72,
            HotkeyKey::F4 => 0x73,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            HotkeyKey::C => "C",
            HotkeyKey::X => "X",
            HotkeyKey::S => "S",
            HotkeyKey::A => "A",
            HotkeyKey::Q => "Q",
            HotkeyKey::Z => "Z",
            HotkeyKey::F1 => "F1",
            HotkeyKey::F2 => "F2",
            HotkeyKey::F3 => "F3",
            HotkeyKey::F4 => "F4",
        }
    }
}

impl fmt::Display for HotkeyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HotkeyKey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        HotkeyKey::ALL
            .into_iter()
            .find(|k| k.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| HotkeyParseError::UnknownKey(s.to_string()))
    }
}

/// Modifier combination plus key, stored as text such as `Ctrl+Shift+C`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: HotkeyKey,
}

impl Hotkey {
    pub fn new(modifiers: Modifiers, key: HotkeyKey) -> Self {
        Self { modifiers, key }
    }
}

impl Default for Hotkey {
    fn default() -> Self {
        Self::new(Modifiers::CTRL_SHIFT, HotkeyKey::C)
    }
}

impl fmt::Display for Hotkey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.is_empty() {
            write!(f, "{}", self.key)
        } else {
            write!(f, "{}+{}", self.modifiers, self.key)
        }
    }
}

impl FromStr for Hotkey {
    type Err = HotkeyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let (key, mods) = match parts.split_last() {
            Some((key, mods)) if !key.is_empty() => (key, mods),
            _ => return Err(HotkeyParseError::Empty),
        };

        let mut modifiers = Modifiers::default();
        for m in mods {
            match m.to_ascii_lowercase().as_str() {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "win" | "windows" => modifiers.win = true,
                _ => return Err(HotkeyParseError::UnknownModifier(m.to_string())),
            }
        }
        if modifiers.is_empty() {
            return Err(HotkeyParseError::NoModifier);
        }

        Ok(Self::new(modifiers, key.parse()?))
    }
}

impl TryFrom<String> for Hotkey {
    type Error = HotkeyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Hotkey> for String {
    fn from(hotkey: Hotkey) -> Self {
        hotkey.to_string()
    }
}

#[cfg(windows)]
pub use registration::GlobalHotkey;

#[cfg(windows)]
mod registration {
    use super::Hotkey;
    use windows::Win32::Foundation::HWND;
    use windows::Win32::UI::Input::KeyboardAndMouse::{
        RegisterHotKey, UnregisterHotKey, HOT_KEY_MODIFIERS, MOD_NOREPEAT,
    };

    /// Registered system-wide hotkey, released on drop
    pub struct GlobalHotkey {
        hwnd: HWND,
        id: i32,
    }

    impl GlobalHotkey {
        /// Register `hotkey`; `WM_HOTKEY` with `id` is posted to `hwnd`
        pub fn register(hwnd: HWND, id: i32, hotkey: Hotkey) -> windows::core::Result<Self> {
            let modifiers = HOT_KEY_MODIFIERS(hotkey.modifiers.flags()) | MOD_NOREPEAT;
            unsafe {
                RegisterHotKey(hwnd, id, modifiers, hotkey.key.vk())?;
            }
            log::info!("Registered hotkey {}", hotkey);
            Ok(Self { hwnd, id })
        }
    }

    impl Drop for GlobalHotkey {
        fn drop(&mut self) {
            unsafe {
                let _ = UnregisterHotKey(self.hwnd, self.id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_ctrl_shift_c() {
        assert_eq!(Hotkey::default().to_string(), "Ctrl+Shift+C");
    }

    #[test]
    fn parse_ignores_case_and_order() {
        let hotkey: Hotkey = "shift + CTRL + f2".parse().unwrap();
        assert_eq!(hotkey, Hotkey::new(Modifiers::CTRL_SHIFT, HotkeyKey::F2));
        assert_eq!(hotkey.to_string(), "Ctrl+Shift+F2");
    }

    #[test]
    fn parse_accepts_win() {
        let hotkey: Hotkey = "Win+Alt+Z".parse().unwrap();
        assert!(hotkey.modifiers.win && hotkey.modifiers.alt);
        assert_eq!(hotkey.to_string(), "Alt+Win+Z");
        assert_eq!(hotkey.modifiers.flags(), 0x0009);
    }

    #[test]
    fn parse_errors() {
        assert_eq!("".parse::<Hotkey>(), Err(HotkeyParseError::Empty));
        assert_eq!("Ctrl+".parse::<Hotkey>(), Err(HotkeyParseError::Empty));
        assert_eq!("C".parse::<Hotkey>(), Err(HotkeyParseError::NoModifier));
        assert_eq!(
            "Meta+C".parse::<Hotkey>(),
            Err(HotkeyParseError::UnknownModifier("Meta".into()))
        );
        assert_eq!(
            "Ctrl+F12".parse::<Hotkey>(),
            Err(HotkeyParseError::UnknownKey("F12".into()))
        );
    }

    #[test]
    fn every_choice_round_trips_through_text() {
        for modifiers in Modifiers::CHOICES {
            for key in HotkeyKey::ALL {
                let hotkey = Hotkey::new(modifiers, key);
                assert_eq!(hotkey.to_string().parse::<Hotkey>(), Ok(hotkey));
            }
        }
    }

    #[test]
    fn serializes_as_string() {
        let json = serde_json::to_string(&Hotkey::new(Modifiers::CTRL_ALT, HotkeyKey::S)).unwrap();
        assert_eq!(json, "\"Ctrl+Alt+S\"");
        let back: Hotkey = serde_json::from_str(&json).unwrap();
        assert_eq!(back.key, HotkeyKey::S);
        assert!(serde_json::from_str::<Hotkey>("\"Ctrl+Nope\"").is_err());
    }

    #[test]
    fn virtual_key_codes() {
        assert_eq!(HotkeyKey::C.vk(), 'C' as u32);
        assert_eq!(HotkeyKey::Z.vk(), 'Z' as u32);
        assert_eq!(HotkeyKey::F4.vk(), 0x73);
    }
}
