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

use std::fs::write;
use std::path::Path;

use flipscore_core::error::Fallible;
use maud::Markup;

use crate::deck::Deck;
use crate::markup::ModuleUrl;
use crate::markup::PageOptions;
use crate::markup::Stylesheet;
use crate::markup::deck_page;

/// Renders a deck to a self-contained page. Without `output`, the page is
/// printed to stdout.
pub fn render_deck(deck_path: &Path, output: Option<&Path>, script: Option<String>) -> Fallible<()> {
    let script = script.as_deref().map(ModuleUrl::new).transpose()?;
    let deck = Deck::load(deck_path)?;
    let html = standalone_page(&deck, script).into_string();
    match output {
        Some(path) => {
            write(path, html)?;
            println!("Wrote {}.", path.display());
        }
        None => println!("{html}"),
    }
    Ok(())
}

fn standalone_page(deck: &Deck, script: Option<ModuleUrl>) -> Markup {
    let scores = vec![None; deck.cards.len()];
    let options = PageOptions {
        stylesheet: Stylesheet::Inline,
        submit: false,
        script,
    };
    deck_page(deck, &scores, &options)
}

#[cfg(test)]
mod tests {
    use std::fs::read_to_string;

    use super::*;
    use crate::helper::create_tmp_directory;

    #[test]
    fn test_render_deck() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let deck_path = dir.join("deck.toml");
        write(
            &deck_path,
            "title = \"Picks\"\n[[card]]\nfront = \"Heat\"\nback = \"1995\"\n",
        )?;
        let output = dir.join("deck.html");
        render_deck(&deck_path, Some(&output), None)?;
        let html = read_to_string(&output)?;
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Picks</title>"));
        assert!(html.contains("data-rating-value=\"5\""));
        assert!(!html.contains("<script"));
        Ok(())
    }

    #[test]
    fn test_render_with_script() -> Fallible<()> {
        let deck = Deck::from_toml("title = \"Picks\"")?;
        let script = ModuleUrl::new("./pkg/flipscore_wasm.js")?;
        let html = standalone_page(&deck, Some(script)).into_string();
        assert!(html.contains("from \"./pkg/flipscore_wasm.js\";"));
        Ok(())
    }

    #[test]
    fn test_script_cannot_close_element() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let deck_path = dir.join("deck.toml");
        write(&deck_path, "title = \"Picks\"\n")?;
        let output = dir.join("deck.html");
        let script = Some("x.js\";</script><script>alert(1)//".to_string());
        assert!(render_deck(&deck_path, Some(&output), script).is_err());
        assert!(!output.exists());
        Ok(())
    }

    #[test]
    fn test_missing_deck() {
        assert!(render_deck(Path::new("./derpherp.toml"), None, None).is_err());
    }
}
