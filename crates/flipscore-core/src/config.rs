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

use serde::Deserialize;
use serde::Serialize;

use crate::error::Fallible;
use crate::error::fail;

/// The markup contract between the page and the widgets: which attributes
/// mark widgets, which classes signal state, and which field mirrors the
/// selected rating.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct WidgetConfig {
    /// Presence-only attribute marking a flip card.
    pub flip_marker: String,
    /// Class toggled on a flip card when clicked.
    pub flipped_class: String,
    /// Presence-only attribute marking a rating group container.
    pub rating_group_marker: String,
    /// Attribute on each rating button holding its integer value.
    pub rating_value_attr: String,
    /// Optional attribute on a rating group naming the id of its field.
    pub target_attr: String,
    /// Class applied to every button at or below the selected value.
    pub active_class: String,
    /// The `name` of the input that mirrors the selected value.
    pub score_field: String,
    /// Fail discovery on invalid rating values instead of skipping them.
    pub strict: bool,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            flip_marker: "data-flip".to_string(),
            flipped_class: "flipped".to_string(),
            rating_group_marker: "data-rating-group".to_string(),
            rating_value_attr: "data-rating-value".to_string(),
            target_attr: "data-rating-target".to_string(),
            active_class: "active".to_string(),
            score_field: "score".to_string(),
            strict: false,
        }
    }
}

impl WidgetConfig {
    pub fn from_toml(source: &str) -> Fallible<Self> {
        let config: WidgetConfig = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Fallible<Self> {
        if !path.exists() {
            return fail(format!("config file {} does not exist.", path.display()));
        }
        let source = read_to_string(path)?;
        Self::from_toml(&source)
    }

    fn validate(&self) -> Fallible<()> {
        let names = [
            ("flip_marker", &self.flip_marker),
            ("rating_group_marker", &self.rating_group_marker),
            ("rating_value_attr", &self.rating_value_attr),
            ("target_attr", &self.target_attr),
            ("score_field", &self.score_field),
        ];
        for (key, value) in names {
            if !is_attribute_name(value) {
                return fail(format!("`{key}` is not a valid attribute name: {value:?}"));
            }
        }
        for (key, value) in [
            ("flipped_class", &self.flipped_class),
            ("active_class", &self.active_class),
        ] {
            if value.is_empty() || value.contains(char::is_whitespace) {
                return fail(format!("`{key}` is not a valid class name: {value:?}"));
            }
        }
        Ok(())
    }
}

/// Attribute names end up inside `[...]` selectors in the browser, so keep
/// them to a conservative alphabet.
fn is_attribute_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
