use rand::seq::SliceRandom as _;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::StoreError;

/// Index into [`THEMES`], between 1 and 6 inclusive.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct ThemeId(u8);

impl ThemeId {
    pub fn new(value: u8) -> Result<Self, StoreError> {
        if THEMES.iter().any(|theme| theme.id.0 == value) {
            Ok(Self(value))
        } else {
            Err(StoreError::InvalidTheme(value))
        }
    }

    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

#[derive(Serialize, Debug, PartialEq, Eq)]
pub struct Theme {
    pub id: ThemeId,
    pub name: &'static str,
    pub description: &'static str,
}

pub static THEMES: [Theme; 6] = [
    Theme {
        id: ThemeId(1),
        name: "Futuristic Glassmorphism",
        description: "Translucent glass panels over a gradient background",
    },
    Theme {
        id: ThemeId(2),
        name: "Neural Network Theme",
        description: "Dark theme visualising a neural network",
    },
    Theme {
        id: ThemeId(3),
        name: "Minimalist Professional",
        description: "Clean and professional layout",
    },
    Theme {
        id: ThemeId(4),
        name: "Vibrant Innovation",
        description: "Bold colours and lively animations",
    },
    Theme {
        id: ThemeId(5),
        name: "3D Modern Cards",
        description: "Cards with depth and soft shadows",
    },
    Theme {
        id: ThemeId(6),
        name: "Cosmic Tech",
        description: "Space and star motifs",
    },
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeSettings {
    pub selected: ThemeId,
    /// Ignores `selected` and draws a theme per page load.
    pub random: bool,
}

impl ThemeSettings {
    /// The theme a participant should see right now.
    pub fn resolve<R: Rng + ?Sized>(self, rng: &mut R) -> &'static Theme {
        if self.random {
            if let Some(theme) = THEMES.choose(rng) {
                return theme;
            }
        }
        THEMES
            .iter()
            .find(|theme| theme.id == self.selected)
            .unwrap_or(&THEMES[THEMES.len() - 1])
    }
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            selected: ThemeId(6),
            random: false,
        }
    }
}
