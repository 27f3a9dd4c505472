#![forbid(unsafe_code)]

//! Host platform detection.
//!
//! The only platform distinction the engine cares about is which modifier
//! acts as the "primary" shortcut key: Command on macOS, Ctrl everywhere
//! else. Detection is compile-time by default and can be overridden with the
//! `CHOICE_PLATFORM` environment variable (`macos`, `windows`, `linux`,
//! `other`), which is mainly useful for exercising macOS bindings in CI.

use std::fmt;
use std::str::FromStr;

use crate::event::Modifiers;

/// Environment variable that overrides platform detection.
pub const PLATFORM_ENV_VAR: &str = "CHOICE_PLATFORM";

/// A host platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Platform {
    /// Apple macOS.
    MacOs,
    /// Microsoft Windows.
    Windows,
    /// Linux and other Unix desktops.
    Linux,
    /// Anything else (web, mobile, unknown).
    #[default]
    Other,
}

impl Platform {
    /// The platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// The compiled platform, unless `CHOICE_PLATFORM` names another one.
    ///
    /// Unrecognized values are ignored.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(PLATFORM_ENV_VAR)
            .ok()
            .and_then(|val| val.parse().ok())
            .unwrap_or_else(Self::current)
    }

    /// The modifier used for shortcuts such as select-all.
    #[must_use]
    pub const fn primary_modifier(self) -> Modifiers {
        match self {
            Self::MacOs => Modifiers::SUPER,
            Self::Windows | Self::Linux | Self::Other => Modifiers::CTRL,
        }
    }

    /// Whether this is macOS.
    #[must_use]
    pub const fn is_mac(self) -> bool {
        matches!(self, Self::MacOs)
    }
}

/// Error returned when a platform name is not recognized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPlatform(pub String);

impl fmt::Display for UnknownPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown platform {:?}", self.0)
    }
}

impl std::error::Error for UnknownPlatform {}

impl FromStr for Platform {
    type Err = UnknownPlatform;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "macos" | "mac" | "darwin" => Ok(Self::MacOs),
            "windows" | "win" => Ok(Self::Windows),
            "linux" => Ok(Self::Linux),
            "other" => Ok(Self::Other),
            _ => Err(UnknownPlatform(s.to_owned())),
        }
    }
}
