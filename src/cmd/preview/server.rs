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

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;

use axum::Router;
use axum::http::HeaderName;
use axum::http::StatusCode;
use axum::http::header::CACHE_CONTROL;
use axum::http::header::CONTENT_TYPE;
use axum::response::Html;
use axum::routing::get;
use axum::routing::post;
use flipscore_core::error::Fallible;
use flipscore_core::error::fail;
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::time::sleep;

use crate::cmd::preview::get::get_handler;
use crate::cmd::preview::pkg::PKG_MODULE;
use crate::cmd::preview::pkg::pkg_handler;
use crate::cmd::preview::post::post_handler;
use crate::cmd::preview::state::MutableState;
use crate::cmd::preview::state::ServerState;
use crate::deck::Deck;
use crate::markup::ModuleUrl;
use crate::markup::STYLESHEET;

pub struct PreviewOptions {
    pub deck_path: PathBuf,
    pub port: u16,
    pub pkg_dir: Option<PathBuf>,
    pub open_browser: bool,
}

pub async fn start_server(options: PreviewOptions) -> Fallible<()> {
    log::debug!("Loading deck...");
    let deck = Deck::load(&options.deck_path)?;
    log::debug!("Deck has {} cards.", deck.cards.len());

    if let Some(pkg_dir) = &options.pkg_dir {
        if !pkg_dir.is_dir() {
            return fail(format!(
                "package directory {} does not exist.",
                pkg_dir.display()
            ));
        }
    }

    let module = match &options.pkg_dir {
        Some(_) => Some(ModuleUrl::new(PKG_MODULE)?),
        None => {
            log::info!("No package directory given, stars will submit the form directly.");
            None
        }
    };
    let state = ServerState {
        pkg_dir: options.pkg_dir,
        module,
        mutable: Arc::new(Mutex::new(MutableState {
            scores: vec![None; deck.cards.len()],
        })),
        deck: Arc::new(deck),
    };
    let app = Router::new();
    let app = app.route("/", get(get_handler));
    let app = app.route("/", post(post_handler));
    let app = app.route("/style.css", get(stylesheet));
    let app = app.route("/pkg/{*path}", get(pkg_handler));
    let app = app.fallback(not_found_handler);
    let app = app.with_state(state);
    let bind = format!("127.0.0.1:{}", options.port);

    if options.open_browser {
        let url = format!("http://{bind}/");
        let addr = bind.clone();
        tokio::spawn(async move {
            loop {
                if let Ok(stream) = TcpStream::connect(&addr).await {
                    drop(stream);
                    break;
                }
                sleep(Duration::from_millis(1)).await;
            }
            if let Err(e) = open::that(&url) {
                log::warn!("Failed to open {url}: {e}");
            }
        });
    }

    log::info!("Serving deck on http://{bind}/");
    let listener = TcpListener::bind(&bind).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn stylesheet() -> (StatusCode, [(HeaderName, &'static str); 2], &'static str) {
    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, "text/css"),
            (CACHE_CONTROL, "public, max-age=604800, immutable"),
        ],
        STYLESHEET,
    )
}

async fn not_found_handler() -> (StatusCode, Html<String>) {
    (StatusCode::NOT_FOUND, Html("Not Found".to_string()))
}
