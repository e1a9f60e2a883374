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

use axum::Form;
use axum::extract::State;
use axum::response::Redirect;
use flipscore_core::error::Fallible;
use flipscore_core::error::fail;
use serde::Deserialize;

use crate::cmd::preview::state::ServerState;

#[derive(Debug, Default, Deserialize)]
enum Action {
    /// Also what a star button submits, since it carries no `action`.
    #[default]
    Rate,
    Reset,
}

#[derive(Deserialize)]
pub struct FormData {
    #[serde(default)]
    action: Action,
    card: Option<String>,
    /// The mirrored field.
    score: Option<String>,
    /// The star button that submitted the form, when there is no script.
    star: Option<String>,
}

pub async fn post_handler(
    State(state): State<ServerState>,
    Form(form): Form<FormData>,
) -> Redirect {
    match action_handler(&state, form) {
        Ok(_) => {}
        Err(e) => {
            log::error!("{e}");
        }
    }
    Redirect::to("/")
}

fn action_handler(state: &ServerState, form: FormData) -> Fallible<()> {
    let mut mutable = state.mutable.lock().unwrap();
    match form.action {
        Action::Reset => {
            log::debug!("Clearing all scores.");
            mutable.scores.fill(None);
        }
        Action::Rate => {
            let Some(card) = form
                .card
                .as_deref()
                .and_then(|card| card.trim().parse::<usize>().ok())
            else {
                return fail("missing or invalid card index.");
            };
            if card >= mutable.scores.len() {
                return fail(format!("no card at index {card}."));
            }
            let raw = form.star.as_deref().or(form.score.as_deref());
            match parse_score(raw) {
                None => {
                    log::debug!("Card {card} submitted without a score.");
                }
                Some(score) if score == 0 || score > state.deck.scale => {
                    log::warn!("Ignoring out-of-range score {score} for card {card}.");
                }
                Some(score) => {
                    log::info!("Card {card} rated {score}.");
                    mutable.scores[card] = Some(score);
                }
            }
        }
    }
    Ok(())
}

/// An empty or non-numeric score counts as no score at all.
fn parse_score(raw: Option<&str>) -> Option<u32> {
    raw.map(str::trim)
        .filter(|raw| !raw.is_empty())
        .and_then(|raw| raw.parse::<u32>().ok())
}
