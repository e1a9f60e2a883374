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

use std::fmt::Display;
use std::fmt::Formatter;

use serde::Serialize;

use crate::config::WidgetConfig;
use crate::dom::Dom;
use crate::error::Fallible;
use crate::error::fail;

/// Whether a button with `value` is highlighted when `selected` is the
/// group's current value.
pub fn is_active(value: u32, selected: u32) -> bool {
    value <= selected
}

pub fn parse_rating_value(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok()
}

/// An element whose "flipped" class is toggled on every click.
#[derive(Clone, Debug)]
pub struct FlipCard<N> {
    node: N,
    class: String,
}

impl<N: Clone> FlipCard<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    /// Toggles the flipped state, returning the new state.
    pub fn toggle<D: Dom<Node = N>>(&self, dom: &mut D) -> bool {
        dom.toggle_class(&self.node, &self.class)
    }

    pub fn is_flipped<D: Dom<Node = N>>(&self, dom: &D) -> bool {
        dom.has_class(&self.node, &self.class)
    }
}

#[derive(Clone, Debug)]
pub struct RatingButton<N> {
    node: N,
    value: u32,
}

impl<N> RatingButton<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn value(&self) -> u32 {
        self.value
    }
}

/// How a rating group's mirrored field was found.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSource {
    /// Named by the group's target attribute.
    Declared,
    /// Found inside the nearest enclosing form.
    Form,
    /// Found inside the group itself, which has no enclosing form.
    Group,
}

impl Display for FieldSource {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldSource::Declared => write!(f, "declared"),
            FieldSource::Form => write!(f, "form"),
            FieldSource::Group => write!(f, "group"),
        }
    }
}

#[derive(Clone, Debug)]
pub struct MirroredField<N> {
    node: N,
    source: FieldSource,
}

impl<N> MirroredField<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn source(&self) -> FieldSource {
        self.source
    }
}

/// An ordered set of rating buttons and the field mirroring the selection.
#[derive(Clone, Debug)]
pub struct RatingGroup<N> {
    node: N,
    buttons: Vec<RatingButton<N>>,
    /// Buttons whose value could not be parsed. They get no handlers and
    /// are never highlighted.
    inert: Vec<N>,
    field: Option<MirroredField<N>>,
    active_class: String,
}

impl<N: Clone> RatingGroup<N> {
    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn buttons(&self) -> &[RatingButton<N>] {
        &self.buttons
    }

    pub fn inert_buttons(&self) -> &[N] {
        &self.inert
    }

    pub fn field(&self) -> Option<&MirroredField<N>> {
        self.field.as_ref()
    }

    /// Highlights every button whose value is at most `value`, clears the
    /// rest (inert buttons included), and writes `value` into the mirrored field if there is one.
    /// Returns the number of highlighted buttons.
    pub fn set_active<D: Dom<Node = N>>(&self, dom: &mut D, value: u32) -> usize {
        let mut count = 0;
        for button in &self.buttons {
            let on = is_active(button.value, value);
            dom.set_class(&button.node, &self.active_class, on);
            if on {
                count += 1;
            }
        }
        for node in &self.inert {
            dom.set_class(node, &self.active_class, false);
        }
        if let Some(field) = &self.field {
            dom.set_value(&field.node, &value.to_string());
        }
        count
    }

    /// The value currently recorded in the mirrored field.
    pub fn selected<D: Dom<Node = N>>(&self, dom: &D) -> Option<u32> {
        let field = self.field.as_ref()?;
        dom.value(&field.node)
            .as_deref()
            .and_then(parse_rating_value)
    }

    pub fn is_button_active<D: Dom<Node = N>>(&self, dom: &D, button: &RatingButton<N>) -> bool {
        dom.has_class(&button.node, &self.active_class)
    }
}

/// A problem found while scanning the page. None of these stop the page
/// from working, except an invalid rating value in strict mode.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Diagnostic {
    InvalidRating { group: usize, raw: String },
    MissingTarget { group: usize, target: String },
    MissingField { group: usize, field: String },
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Diagnostic::InvalidRating { group, raw } => write!(
                f,
                "rating group #{group}: button has invalid rating value {raw:?}"
            ),
            Diagnostic::MissingTarget { group, target } => write!(
                f,
                "rating group #{group}: declared field {target:?} does not exist"
            ),
            Diagnostic::MissingField { group, field } => write!(
                f,
                "rating group #{group}: no `{field}` field, the selection will not be recorded"
            ),
        }
    }
}

pub struct Discovery<N> {
    pub flip_cards: Vec<FlipCard<N>>,
    pub rating_groups: Vec<RatingGroup<N>>,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scans `root` for flip cards and rating groups.
pub fn discover<D: Dom>(
    dom: &D,
    root: &D::Node,
    config: &WidgetConfig,
) -> Fallible<Discovery<D::Node>> {
    let flip_cards: Vec<FlipCard<D::Node>> = dom
        .find_all(root, &config.flip_marker)
        .into_iter()
        .map(|node| FlipCard {
            node,
            class: config.flipped_class.clone(),
        })
        .collect();

    let mut diagnostics = Vec::new();
    let mut rating_groups = Vec::new();
    for (index, node) in dom
        .find_all(root, &config.rating_group_marker)
        .into_iter()
        .enumerate()
    {
        let mut buttons = Vec::new();
        let mut inert = Vec::new();
        for button in dom.find_all(&node, &config.rating_value_attr) {
            let raw = dom
                .attribute(&button, &config.rating_value_attr)
                .unwrap_or_default();
            match parse_rating_value(&raw) {
                Some(value) => buttons.push(RatingButton {
                    node: button,
                    value,
                }),
                None => {
                    let diagnostic = Diagnostic::InvalidRating { group: index, raw };
                    if config.strict {
                        return fail(diagnostic.to_string());
                    }
                    log::warn!("{diagnostic}");
                    diagnostics.push(diagnostic);
                    inert.push(button);
                }
            }
        }
        let field = resolve_field(dom, &node, index, config, &mut diagnostics);
        rating_groups.push(RatingGroup {
            node,
            buttons,
            inert,
            field,
            active_class: config.active_class.clone(),
        });
    }

    log::debug!(
        "Discovered {} flip cards and {} rating groups.",
        flip_cards.len(),
        rating_groups.len()
    );
    Ok(Discovery {
        flip_cards,
        rating_groups,
        diagnostics,
    })
}

/// Search order: the declared target, then the nearest enclosing form, then
/// the group itself.
fn resolve_field<D: Dom>(
    dom: &D,
    group: &D::Node,
    index: usize,
    config: &WidgetConfig,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<MirroredField<D::Node>> {
    if let Some(target) = dom.attribute(group, &config.target_attr) {
        let target = target.trim();
        match dom.element_by_id(target) {
            Some(node) => {
                return Some(MirroredField {
                    node,
                    source: FieldSource::Declared,
                });
            }
            None => {
                let diagnostic = Diagnostic::MissingTarget {
                    group: index,
                    target: target.to_string(),
                };
                log::warn!("{diagnostic}");
                diagnostics.push(diagnostic);
            }
        }
    }

    let (scope, source) = match dom.closest(group, "form") {
        Some(form) => (form, FieldSource::Form),
        None => (group.clone(), FieldSource::Group),
    };
    match dom.find_input(&scope, &config.score_field) {
        Some(node) => Some(MirroredField { node, source }),
        None => {
            let diagnostic = Diagnostic::MissingField {
                group: index,
                field: config.score_field.clone(),
            };
            log::debug!("{diagnostic}");
            diagnostics.push(diagnostic);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::Document;
    use crate::dom::NodeId;

    /// A form holding a five-star rating group and a `score` field that is a
    /// sibling of the group rather than a child of it.
    fn five_star_form() -> (Document, Vec<NodeId>, NodeId) {
        let mut doc = Document::new();
        let root = doc.root();
        let form = doc.append_element(root, "form", &[]);
        let group = doc.append_element(form, "div", &[("data-rating-group", "")]);
        let mut buttons = Vec::new();
        for value in ["1", "2", "3", "4", "5"] {
            buttons.push(doc.append_element(
                group,
                "button",
                &[("type", "button"), ("data-rating-value", value)],
            ));
        }
        let input = doc.append_element(form, "input", &[("type", "hidden"), ("name", "score")]);
        (doc, buttons, input)
    }

    fn active_values(doc: &Document, group: &RatingGroup<NodeId>) -> Vec<u32> {
        group
            .buttons()
            .iter()
            .filter(|b| group.is_button_active(doc, b))
            .map(|b| b.value())
            .collect()
    }

    #[test]
    fn test_is_active() {
        assert!(is_active(1, 3));
        assert!(is_active(3, 3));
        assert!(!is_active(4, 3));
        assert!(is_active(0, 0));
    }

    #[test]
    fn test_parse_rating_value() {
        assert_eq!(parse_rating_value("3"), Some(3));
        assert_eq!(parse_rating_value(" 4 "), Some(4));
        assert_eq!(parse_rating_value("0"), Some(0));
        assert_eq!(parse_rating_value(""), None);
        assert_eq!(parse_rating_value("abc"), None);
        assert_eq!(parse_rating_value("-1"), None);
        assert_eq!(parse_rating_value("2.5"), None);
    }

    #[test]
    fn test_discover_empty_page() -> Fallible<()> {
        let doc = Document::new();
        let found = discover(&doc, &doc.root(), &WidgetConfig::default())?;
        assert!(found.flip_cards.is_empty());
        assert!(found.rating_groups.is_empty());
        assert!(found.diagnostics.is_empty());
        Ok(())
    }

    #[test]
    fn test_flip_card_toggles() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let a = doc.append_element(root, "div", &[("data-flip", ""), ("class", "card")]);
        doc.append_element(root, "div", &[("data-flip", "")]);
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        assert_eq!(found.flip_cards.len(), 2);
        let card = &found.flip_cards[0];
        let other = &found.flip_cards[1];
        assert_eq!(*card.node(), a);
        assert!(card.toggle(&mut doc));
        assert!(card.is_flipped(&doc));
        assert!(!other.is_flipped(&doc));
        assert!(!card.toggle(&mut doc));
        assert!(!card.is_flipped(&doc));
        assert_eq!(doc.classes(a), vec!["card"]);
        Ok(())
    }

    #[test]
    fn test_set_active_marks_prefix() -> Fallible<()> {
        let (mut doc, _, input) = five_star_form();
        let root = doc.root();
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let group = &found.rating_groups[0];
        assert_eq!(group.buttons().len(), 5);
        assert_eq!(group.field().map(|f| f.source()), Some(FieldSource::Form));
        for v in 1..=5 {
            assert_eq!(group.set_active(&mut doc, v), v as usize);
            assert_eq!(active_values(&doc, group), (1..=v).collect::<Vec<_>>());
            assert_eq!(doc.get_attribute(input, "value"), Some(v.to_string().as_str()));
            assert_eq!(group.selected(&doc), Some(v));
        }
        Ok(())
    }

    #[test]
    fn test_example_scenario() -> Fallible<()> {
        let (mut doc, _, input) = five_star_form();
        let root = doc.root();
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let group = &found.rating_groups[0];
        group.set_active(&mut doc, 3);
        assert_eq!(active_values(&doc, group), vec![1, 2, 3]);
        assert_eq!(doc.get_attribute(input, "value"), Some("3"));
        group.set_active(&mut doc, 1);
        assert_eq!(active_values(&doc, group), vec![1]);
        assert_eq!(doc.get_attribute(input, "value"), Some("1"));
        Ok(())
    }

    #[test]
    fn test_no_field_still_highlights() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let group = doc.append_element(root, "div", &[("data-rating-group", "")]);
        doc.append_element(group, "button", &[("data-rating-value", "1")]);
        doc.append_element(group, "button", &[("data-rating-value", "2")]);
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let group = &found.rating_groups[0];
        assert!(group.field().is_none());
        assert_eq!(
            found.diagnostics,
            vec![Diagnostic::MissingField {
                group: 0,
                field: "score".to_string()
            }]
        );
        assert_eq!(group.set_active(&mut doc, 2), 2);
        assert_eq!(group.selected(&doc), None);
        Ok(())
    }

    #[test]
    fn test_field_inside_group_without_form() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let group = doc.append_element(root, "div", &[("data-rating-group", "")]);
        doc.append_element(group, "button", &[("data-rating-value", "1")]);
        let input = doc.append_element(group, "input", &[("name", "score")]);
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let field = found.rating_groups[0].field().unwrap();
        assert_eq!(field.source(), FieldSource::Group);
        assert_eq!(*field.node(), input);
        Ok(())
    }

    #[test]
    fn test_field_outside_group_without_form_is_not_found() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let group = doc.append_element(root, "div", &[("data-rating-group", "")]);
        doc.append_element(group, "button", &[("data-rating-value", "1")]);
        doc.append_element(root, "input", &[("name", "score")]);
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        assert!(found.rating_groups[0].field().is_none());
        Ok(())
    }

    #[test]
    fn test_declared_target_wins() -> Fallible<()> {
        let (mut doc, _, form_input) = five_star_form();
        let root = doc.root();
        let elsewhere = doc.append_element(root, "input", &[("id", "elsewhere"), ("name", "x")]);
        let group = doc.find_all(&root, "data-rating-group")[0];
        doc.set_attribute(group, "data-rating-target", "elsewhere");
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let group = &found.rating_groups[0];
        let field = group.field().unwrap();
        assert_eq!(field.source(), FieldSource::Declared);
        assert_eq!(*field.node(), elsewhere);
        group.set_active(&mut doc, 4);
        assert_eq!(doc.get_attribute(elsewhere, "value"), Some("4"));
        assert_eq!(doc.get_attribute(form_input, "value"), None);
        Ok(())
    }

    #[test]
    fn test_missing_target_falls_back_to_form() -> Fallible<()> {
        let (mut doc, _, input) = five_star_form();
        let root = doc.root();
        let group = doc.find_all(&root, "data-rating-group")[0];
        doc.set_attribute(group, "data-rating-target", "ghost");
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let field = found.rating_groups[0].field().unwrap();
        assert_eq!(field.source(), FieldSource::Form);
        assert_eq!(*field.node(), input);
        assert_eq!(
            found.diagnostics,
            vec![Diagnostic::MissingTarget {
                group: 0,
                target: "ghost".to_string()
            }]
        );
        Ok(())
    }

    #[test]
    fn test_invalid_value_is_inert_by_default() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let group = doc.append_element(root, "div", &[("data-rating-group", "")]);
        doc.append_element(group, "button", &[("data-rating-value", "1")]);
        let bad = doc.append_element(group, "button", &[("data-rating-value", "lots")]);
        doc.append_element(group, "input", &[("name", "score")]);
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let rating = &found.rating_groups[0];
        assert_eq!(rating.buttons().len(), 1);
        assert_eq!(
            found.diagnostics,
            vec![Diagnostic::InvalidRating {
                group: 0,
                raw: "lots".to_string()
            }]
        );
        assert_eq!(rating.inert_buttons(), &[bad]);
        rating.set_active(&mut doc, u32::MAX);
        assert!(!doc.has_class(&bad, "active"));
        Ok(())
    }

    #[test]
    fn test_invalid_value_loses_prerendered_highlight() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let form = doc.append_element(root, "form", &[]);
        let group = doc.append_element(form, "div", &[("data-rating-group", "")]);
        let good = doc.append_element(group, "button", &[("data-rating-value", "1")]);
        let bad = doc.append_element(
            group,
            "button",
            &[("data-rating-value", "x"), ("class", "star active")],
        );
        doc.append_element(form, "input", &[("name", "score")]);
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let rating = &found.rating_groups[0];
        assert_eq!(rating.set_active(&mut doc, 1), 1);
        assert!(doc.has_class(&good, "active"));
        assert!(!doc.has_class(&bad, "active"));
        assert_eq!(doc.classes(bad), vec!["star"]);
        Ok(())
    }

    #[test]
    fn test_invalid_value_fails_in_strict_mode() {
        let mut doc = Document::new();
        let root = doc.root();
        let group = doc.append_element(root, "div", &[("data-rating-group", "")]);
        doc.append_element(group, "button", &[("data-rating-value", "")]);
        let config = WidgetConfig {
            strict: true,
            ..WidgetConfig::default()
        };
        let result = discover(&doc, &root, &config);
        assert!(result.is_err());
        assert_eq!(
            result.err().unwrap().to_string(),
            "error: rating group #0: button has invalid rating value \"\""
        );
    }

    #[test]
    fn test_duplicate_values_compare_independently() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let group = doc.append_element(root, "div", &[("data-rating-group", "")]);
        for value in ["2", "2", "3"] {
            doc.append_element(group, "button", &[("data-rating-value", value)]);
        }
        let found = discover(&doc, &root, &WidgetConfig::default())?;
        let rating = &found.rating_groups[0];
        assert_eq!(rating.set_active(&mut doc, 2), 2);
        assert_eq!(active_values(&doc, rating), vec![2, 2]);
        Ok(())
    }

    #[test]
    fn test_custom_markers() -> Fallible<()> {
        let mut doc = Document::new();
        let root = doc.root();
        let group = doc.append_element(root, "div", &[("data-stars", "")]);
        let button = doc.append_element(group, "button", &[("data-star", "2")]);
        let input = doc.append_element(group, "input", &[("name", "stars")]);
        let config = WidgetConfig::from_toml(
            "rating_group_marker = \"data-stars\"\nrating_value_attr = \"data-star\"\nscore_field = \"stars\"\nactive_class = \"lit\"\n",
        )?;
        let found = discover(&doc, &root, &config)?;
        found.rating_groups[0].set_active(&mut doc, 2);
        assert!(doc.has_class(&button, "lit"));
        assert_eq!(doc.get_attribute(input, "value"), Some("2"));
        Ok(())
    }
}
