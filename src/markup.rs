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

use flipscore_core::error::Fallible;
use flipscore_core::error::fail;
use flipscore_core::widget::is_active;
use maud::DOCTYPE;
use maud::Markup;
use maud::PreEscaped;
use maud::html;

use crate::deck::Deck;
use crate::markdown::markdown_to_html;

pub const STYLESHEET: &str = include_str!("style.css");

pub enum Stylesheet {
    /// Embedded in a `<style>` element, for standalone files.
    Inline,
    /// Linked from `/style.css`.
    Linked,
}

/// URL of the wasm-pack module that wires the widgets, kept as the JS
/// string literal the loader imports it with.
#[derive(Clone, Debug)]
pub struct ModuleUrl {
    literal: String,
}

impl ModuleUrl {
    pub fn new(url: &str) -> Fallible<Self> {
        if url.trim().is_empty() {
            return fail("script URL is empty.");
        }
        if url.contains('<') {
            return fail(format!("script URL {url:?} must not contain '<'."));
        }
        Ok(Self {
            literal: serde_json::to_string(url)?,
        })
    }
}

pub struct PageOptions {
    pub stylesheet: Stylesheet,
    /// Whether rating forms post to `/`.
    pub submit: bool,
    pub script: Option<ModuleUrl>,
}

/// How a rating form reaches the server.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RatingSubmit {
    /// Not at all.
    None,
    /// The script mirrors the choice into `score`; a Rate button posts it.
    Button,
    /// No script: each star is itself a submit button carrying `star`.
    Stars,
}

impl PageOptions {
    fn rating_submit(&self) -> RatingSubmit {
        match (self.submit, &self.script) {
            (false, _) => RatingSubmit::None,
            (true, Some(_)) => RatingSubmit::Button,
            (true, None) => RatingSubmit::Stars,
        }
    }
}

pub fn page_template(title: &str, body: Markup, options: &PageOptions) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                @match options.stylesheet {
                    Stylesheet::Inline => {
                        style { (PreEscaped(STYLESHEET)) }
                    }
                    Stylesheet::Linked => {
                        link rel="stylesheet" href="/style.css";
                    }
                }
            }
            body {
                (body)
                @if let Some(module) = &options.script {
                    script type="module" {
                        (PreEscaped(loader_script(module)))
                    }
                }
            }
        }
    }
}

fn loader_script(module: &ModuleUrl) -> String {
    format!(
        "import load, {{ init }} from {};\nawait load();\ninit();\n",
        module.literal
    )
}

pub fn flip_card(index: usize, front: &str, back: &str) -> Markup {
    html! {
        div.flip-card id=(format!("card-{index}")) data-flip {
            div.face.front.rich-text {
                (PreEscaped(markdown_to_html(front)))
            }
            div.face.back.rich-text {
                (PreEscaped(markdown_to_html(back)))
            }
        }
    }
}

/// Buttons `1..=scale`. Those at or below `selected` are rendered active,
/// matching what the client-side handler would show.
pub fn rating_group(index: usize, scale: u32, selected: Option<u32>, mode: RatingSubmit) -> Markup {
    let stars = mode == RatingSubmit::Stars;
    html! {
        div.rating id=(format!("rating-{index}")) data-rating-group {
            @for value in 1..=scale {
                @let active = selected.is_some_and(|s| is_active(value, s));
                button.star.active[active]
                    type=(if stars { "submit" } else { "button" })
                    name=[stars.then_some("star")]
                    value=[stars.then_some(value)]
                    id=(format!("rating-{index}-{value}"))
                    data-rating-value=(value)
                    aria-label=(format!("{value} of {scale}")) {
                    "★"
                }
            }
        }
    }
}

/// The mirrored `score` field sits beside the group, inside the form.
pub fn rating_form(index: usize, scale: u32, selected: Option<u32>, mode: RatingSubmit) -> Markup {
    html! {
        form.rate action="/" method="post" {
            input type="hidden" name="card" value=(index);
            input type="hidden" name="score" value=[selected];
            (rating_group(index, scale, selected, mode))
            @if mode == RatingSubmit::Button {
                input type="submit" name="action" value="Rate";
            }
        }
    }
}

pub fn deck_page(deck: &Deck, scores: &[Option<u32>], options: &PageOptions) -> Markup {
    let rated = scores.iter().filter(|score| score.is_some()).count();
    let progress = format!("{rated} / {} rated", deck.cards.len());
    let body = html! {
        div.root {
            header {
                h1 {
                    (deck.title)
                }
                div.progress {
                    (progress)
                }
                @if options.submit {
                    form action="/" method="post" {
                        input id="reset" type="submit" name="action" value="Reset";
                    }
                }
            }
            main.cards {
                @for (index, card) in deck.cards.iter().enumerate() {
                    @let selected = scores.get(index).copied().flatten();
                    article.entry {
                        (flip_card(index, &card.front, &card.back))
                        (rating_form(index, deck.scale, selected, options.rating_submit()))
                    }
                }
            }
        }
    };
    page_template(&deck.title, body, options)
}
