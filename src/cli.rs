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

use clap::Parser;
use flipscore_core::config::WidgetConfig;
use flipscore_core::error::Fallible;

use crate::cmd::check::check_page;
use crate::cmd::preview::server::PreviewOptions;
use crate::cmd::preview::server::start_server;
use crate::cmd::render::render_deck;
use crate::cmd::simulate::SimulateFormat;
use crate::cmd::simulate::Step;
use crate::cmd::simulate::simulate;

#[derive(Parser)]
#[command(version, about, long_about = None)]
enum Command {
    /// List the flip cards and rating groups an HTML page declares.
    Check {
        /// Path to the HTML page.
        file: PathBuf,
        /// Optional path to a TOML file overriding the marker attributes.
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Replay interactions against an HTML page and print the result.
    Simulate {
        /// Path to the HTML page.
        file: PathBuf,
        /// Optional path to a TOML file overriding the marker attributes.
        #[arg(long)]
        config: Option<PathBuf>,
        #[arg(long, default_value_t = SimulateFormat::Html)]
        format: SimulateFormat,
        /// Interactions, each written `<event>:<element id>`.
        events: Vec<Step>,
    },
    /// Render a deck file to a standalone HTML page.
    Render {
        /// Path to the deck TOML file.
        deck: PathBuf,
        /// Write to this file instead of standard output.
        #[arg(long)]
        output: Option<PathBuf>,
        /// Module URL of the widget script to load.
        #[arg(long)]
        script: Option<String>,
    },
    /// Serve a deck in the browser and record ratings.
    Preview {
        /// Path to the deck TOML file.
        deck: PathBuf,
        #[arg(long, default_value_t = 8000)]
        port: u16,
        /// Directory holding the `wasm-pack` build of the widget crate.
        #[arg(long)]
        pkg: Option<PathBuf>,
        /// Don't open the browser.
        #[arg(long)]
        no_open: bool,
    },
}

pub async fn entrypoint() -> Fallible<()> {
    let cli: Command = Command::parse();
    match cli {
        Command::Check { file, config } => {
            let config = load_config(config)?;
            check_page(&file, &config)
        }
        Command::Simulate {
            file,
            config,
            format,
            events,
        } => {
            let config = load_config(config)?;
            simulate(&file, &config, &events, format)
        }
        Command::Render {
            deck,
            output,
            script,
        } => render_deck(&deck, output.as_deref(), script),
        Command::Preview {
            deck,
            port,
            pkg,
            no_open,
        } => {
            let options = PreviewOptions {
                deck_path: deck,
                port,
                pkg_dir: pkg,
                open_browser: !no_open,
            };
            start_server(options).await
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Fallible<WidgetConfig> {
    match path {
        Some(path) => {
            log::debug!("Loading configuration from {}.", path.display());
            WidgetConfig::load(&path)
        }
        None => Ok(WidgetConfig::default()),
    }
}
