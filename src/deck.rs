// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fs::read_to_string;
use std::path::Path;

use flipscore_core::error::Fallible;
use flipscore_core::error::fail;
use serde::Deserialize;

/// The largest rating scale a deck may use.
const MAX_SCALE: u32 = 10;

fn default_scale() -> u32 {
    5
}

/// A TOML file describing the cards to render.
///
/// ```toml
/// title = "Tonight's picks"
/// scale = 5
///
/// [[card]]
/// front = "**Heat** (1995)"
/// back = "Crime, thriller. 170 minutes."
/// ```
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Deck {
    pub title: String,
    /// Number of rating buttons per card.
    #[serde(default = "default_scale")]
    pub scale: u32,
    #[serde(default, rename = "card")]
    pub cards: Vec<DeckCard>,
}

/// One flip card. Both faces are Markdown.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeckCard {
    pub front: String,
    pub back: String,
}

impl Deck {
    pub fn from_toml(source: &str) -> Fallible<Self> {
        let deck: Deck = toml::from_str(source)?;
        if deck.scale == 0 || deck.scale > MAX_SCALE {
            return fail(format!(
                "rating scale must be between 1 and {MAX_SCALE}, got {}.",
                deck.scale
            ));
        }
        Ok(deck)
    }

    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail(format!("deck file {} does not exist.", path.display()));
        }
        let source = read_to_string(path)?;
        Self::from_toml(&source)
    }
}
