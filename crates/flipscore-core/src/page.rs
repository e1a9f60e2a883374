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
use std::str::FromStr;

use serde::Serialize;

use crate::config::WidgetConfig;
use crate::dom::Dom;
use crate::error::ErrorReport;
use crate::error::Fallible;
use crate::error::fail;
use crate::widget::Diagnostic;
use crate::widget::FieldSource;
use crate::widget::FlipCard;
use crate::widget::RatingGroup;
use crate::widget::discover;

/// The user interactions the widgets respond to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PageEvent {
    Click,
    PointerEnter,
    Focus,
}

impl PageEvent {
    /// Clicks propagate to ancestors. Pointer-enter and focus do not.
    pub fn bubbles(self) -> bool {
        matches!(self, PageEvent::Click)
    }

    /// The DOM event type name.
    pub fn as_str(self) -> &'static str {
        match self {
            PageEvent::Click => "click",
            PageEvent::PointerEnter => "mouseenter",
            PageEvent::Focus => "focus",
        }
    }
}

impl Display for PageEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PageEvent {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "click" => Ok(PageEvent::Click),
            "hover" | "mouseenter" | "pointerenter" => Ok(PageEvent::PointerEnter),
            "focus" => Ok(PageEvent::Focus),
            _ => fail(format!("unknown event: {s}")),
        }
    }
}

#[derive(Clone, Copy, Debug)]
enum Binding {
    FlipCard(usize),
    RatingButton { group: usize, value: u32 },
}

impl Binding {
    /// Flip cards only flip on click. Rating buttons react to all three.
    fn reacts_to(self, event: PageEvent) -> bool {
        match self {
            Binding::FlipCard(_) => event == PageEvent::Click,
            Binding::RatingButton { .. } => true,
        }
    }
}

/// What a dispatched event changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum Effect {
    Flipped {
        card: usize,
        flipped: bool,
    },
    Rated {
        group: usize,
        value: u32,
        active: usize,
    },
}

/// A document with its widgets discovered and wired.
///
/// Constructed once per document by [`Page::init`]. Handlers run to
/// completion inside [`Page::dispatch`], so the last event wins.
pub struct Page<D: Dom> {
    dom: D,
    flip_cards: Vec<FlipCard<D::Node>>,
    rating_groups: Vec<RatingGroup<D::Node>>,
    diagnostics: Vec<Diagnostic>,
    /// Handlers per bound element, in discovery order.
    bindings: Vec<(D::Node, Vec<Binding>)>,
}

impl<D: Dom> Page<D>
where
    D::Node: PartialEq,
{
    pub fn init(dom: D, root: &D::Node, config: &WidgetConfig) -> Fallible<Self> {
        let found = discover(&dom, root, config)?;
        let mut bindings: Vec<(D::Node, Vec<Binding>)> = Vec::new();
        let mut bind = |node: &D::Node, binding: Binding| {
            match bindings.iter_mut().find(|(bound, _)| *bound == *node) {
                Some((_, list)) => list.push(binding),
                None => bindings.push((node.clone(), vec![binding])),
            }
        };
        for (index, card) in found.flip_cards.iter().enumerate() {
            bind(card.node(), Binding::FlipCard(index));
        }
        for (index, group) in found.rating_groups.iter().enumerate() {
            for button in group.buttons() {
                bind(
                    button.node(),
                    Binding::RatingButton {
                        group: index,
                        value: button.value(),
                    },
                );
            }
        }
        Ok(Self {
            dom,
            flip_cards: found.flip_cards,
            rating_groups: found.rating_groups,
            diagnostics: found.diagnostics,
            bindings,
        })
    }

    pub fn dom(&self) -> &D {
        &self.dom
    }

    pub fn into_dom(self) -> D {
        self.dom
    }

    pub fn flip_cards(&self) -> &[FlipCard<D::Node>] {
        &self.flip_cards
    }

    pub fn rating_groups(&self) -> &[RatingGroup<D::Node>] {
        &self.rating_groups
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Every (element, event) pair that has a handler. A host with its own
    /// event propagation registers one listener per pair and forwards it to
    /// [`Page::handle`].
    pub fn listeners(&self) -> Vec<(D::Node, PageEvent)> {
        let mut listeners = Vec::new();
        for (node, bindings) in &self.bindings {
            for event in [PageEvent::PointerEnter, PageEvent::Focus, PageEvent::Click] {
                if bindings.iter().any(|binding| binding.reacts_to(event)) {
                    listeners.push((node.clone(), event));
                }
            }
        }
        listeners
    }

    /// Delivers `event` to `target` and returns the resulting changes, in
    /// the order the handlers ran. Unbound targets yield nothing.
    pub fn dispatch(&mut self, target: &D::Node, event: PageEvent) -> Vec<Effect> {
        let mut path = vec![target.clone()];
        if event.bubbles() {
            let mut cursor = self.dom.parent(target);
            while let Some(node) = cursor {
                cursor = self.dom.parent(&node);
                path.push(node);
            }
        }

        let mut effects = Vec::new();
        for node in &path {
            effects.extend(self.handle(node, event));
        }
        log::debug!("{event} dispatched: {} effects.", effects.len());
        effects
    }

    /// Runs the handlers bound to `node` itself, without propagation.
    pub fn handle(&mut self, node: &D::Node, event: PageEvent) -> Vec<Effect> {
        let Some((_, bindings)) = self.bindings.iter().find(|(bound, _)| bound == node) else {
            return Vec::new();
        };
        let mut effects = Vec::new();
        for binding in bindings {
            if !binding.reacts_to(event) {
                continue;
            }
            match *binding {
                Binding::FlipCard(card) => {
                    let flipped = self.flip_cards[card].toggle(&mut self.dom);
                    effects.push(Effect::Flipped { card, flipped });
                }
                Binding::RatingButton { group, value } => {
                    let active = self.rating_groups[group].set_active(&mut self.dom, value);
                    effects.push(Effect::Rated {
                        group,
                        value,
                        active,
                    });
                }
            }
        }
        effects
    }

    pub fn report(&self) -> PageReport {
        let flip_cards = self
            .flip_cards
            .iter()
            .enumerate()
            .map(|(index, card)| FlipCardReport {
                index,
                id: self.dom.attribute(card.node(), "id"),
                flipped: card.is_flipped(&self.dom),
            })
            .collect();
        let rating_groups = self
            .rating_groups
            .iter()
            .enumerate()
            .map(|(index, group)| RatingGroupReport {
                index,
                id: self.dom.attribute(group.node(), "id"),
                buttons: group
                    .buttons()
                    .iter()
                    .map(|button| ButtonReport {
                        value: button.value(),
                        active: group.is_button_active(&self.dom, button),
                    })
                    .collect(),
                field: group.field().map(|field| field.source()),
                selected: group.selected(&self.dom),
            })
            .collect();
        PageReport {
            flip_cards,
            rating_groups,
            diagnostics: self.diagnostics.clone(),
        }
    }
}

/// A snapshot of every widget's state.
#[derive(Debug, Serialize)]
pub struct PageReport {
    pub flip_cards: Vec<FlipCardReport>,
    pub rating_groups: Vec<RatingGroupReport>,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug, Serialize)]
pub struct FlipCardReport {
    pub index: usize,
    pub id: Option<String>,
    pub flipped: bool,
}

#[derive(Debug, Serialize)]
pub struct RatingGroupReport {
    pub index: usize,
    pub id: Option<String>,
    pub buttons: Vec<ButtonReport>,
    pub field: Option<FieldSource>,
    pub selected: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct ButtonReport {
    pub value: u32,
    pub active: bool,
}
