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
use std::path::Path;
use std::str::FromStr;

use clap::ValueEnum;
use flipscore_core::config::WidgetConfig;
use flipscore_core::dom::Document;
use flipscore_core::dom::Dom;
use flipscore_core::error::ErrorReport;
use flipscore_core::error::Fallible;
use flipscore_core::error::fail;
use flipscore_core::page::Page;
use flipscore_core::page::PageEvent;

use crate::html::read_document;

#[derive(ValueEnum, Clone)]
pub enum SimulateFormat {
    /// The document after the events, as HTML.
    Html,
    /// A JSON report of every widget's state.
    Json,
}

impl Display for SimulateFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulateFormat::Html => write!(f, "html"),
            SimulateFormat::Json => write!(f, "json"),
        }
    }
}

/// One scripted interaction, written `<event>:<element id>`, e.g.
/// `hover:star-3`.
#[derive(Clone, Debug, PartialEq)]
pub struct Step {
    pub event: PageEvent,
    pub id: String,
}

impl FromStr for Step {
    type Err = ErrorReport;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((event, id)) = s.split_once(':') else {
            return fail(format!("invalid step {s:?}, expected <event>:<id>."));
        };
        if id.is_empty() {
            return fail(format!("invalid step {s:?}, missing element id."));
        }
        Ok(Step {
            event: event.parse()?,
            id: id.to_string(),
        })
    }
}

pub fn simulate(
    file: &Path,
    config: &WidgetConfig,
    steps: &[Step],
    format: SimulateFormat,
) -> Fallible<()> {
    let document = read_document(file)?;
    let output = run_steps(document, config, steps, format)?;
    println!("{output}");
    Ok(())
}

fn run_steps(
    document: Document,
    config: &WidgetConfig,
    steps: &[Step],
    format: SimulateFormat,
) -> Fallible<String> {
    let root = document.root();
    let mut page = Page::init(document, &root, config)?;
    for step in steps {
        let Some(target) = page.dom().element_by_id(&step.id) else {
            return fail(format!("no element with id {:?}.", step.id));
        };
        let effects = page.dispatch(&target, step.event);
        if effects.is_empty() {
            log::info!("{} #{}: no effect", step.event, step.id);
        }
        for effect in effects {
            log::info!("{} #{}: {effect:?}", step.event, step.id);
        }
    }
    match format {
        SimulateFormat::Html => Ok(page.into_dom().to_html()),
        SimulateFormat::Json => Ok(serde_json::to_string_pretty(&page.report())?),
    }
}

#[cfg(test)]
mod tests {
    use std::fs::write;

    use super::*;
    use crate::helper::create_tmp_directory;
    use crate::html::parse_document;

    const PAGE: &str = r#"<form><div data-rating-group><button id="s1" data-rating-value="1"></button><button id="s2" data-rating-value="2"></button><button id="s3" data-rating-value="3"></button></div><input name="score" type="hidden"></form><div id="card" data-flip></div>"#;

    fn steps(specs: &[&str]) -> Fallible<Vec<Step>> {
        specs.iter().map(|s| s.parse()).collect()
    }

    #[test]
    fn test_parse_step() -> Fallible<()> {
        let step: Step = "hover:s1".parse()?;
        assert_eq!(
            step,
            Step {
                event: PageEvent::PointerEnter,
                id: "s1".to_string()
            }
        );
        assert!("hover".parse::<Step>().is_err());
        assert!("hover:".parse::<Step>().is_err());
        assert!("wiggle:s1".parse::<Step>().is_err());
        Ok(())
    }

    #[test]
    fn test_example_scenario_as_json() -> Fallible<()> {
        let output = run_steps(
            parse_document(PAGE),
            &WidgetConfig::default(),
            &steps(&["click:s3", "hover:s1"])?,
            SimulateFormat::Json,
        )?;
        let json: serde_json::Value = serde_json::from_str(&output)?;
        let group = &json["rating_groups"][0];
        assert_eq!(group["selected"], 1);
        assert_eq!(group["buttons"][0]["active"], true);
        assert_eq!(group["buttons"][1]["active"], false);
        assert_eq!(group["buttons"][2]["active"], false);
        assert_eq!(json["flip_cards"][0]["flipped"], false);
        Ok(())
    }

    #[test]
    fn test_html_output() -> Fallible<()> {
        let output = run_steps(
            parse_document(PAGE),
            &WidgetConfig::default(),
            &steps(&["focus:s2", "click:card"])?,
            SimulateFormat::Html,
        )?;
        let document = parse_document(&output);
        let s2 = document.element_by_id("s2").unwrap();
        let s3 = document.element_by_id("s3").unwrap();
        let card = document.element_by_id("card").unwrap();
        assert!(document.has_class(&s2, "active"));
        assert!(!document.has_class(&s3, "active"));
        assert!(document.has_class(&card, "flipped"));
        let root = document.root();
        let input = document.find_input(&root, "score").unwrap();
        assert_eq!(document.get_attribute(input, "value"), Some("2"));
        Ok(())
    }

    #[test]
    fn test_unknown_id() -> Fallible<()> {
        let result = run_steps(
            parse_document(PAGE),
            &WidgetConfig::default(),
            &steps(&["click:nope"])?,
            SimulateFormat::Html,
        );
        assert_eq!(
            result.err().unwrap().to_string(),
            "error: no element with id \"nope\"."
        );
        Ok(())
    }

    #[test]
    fn test_simulate_file() -> Fallible<()> {
        let dir = create_tmp_directory()?;
        let path = dir.join("page.html");
        write(&path, PAGE)?;
        simulate(
            &path,
            &WidgetConfig::default(),
            &steps(&["click:s1"])?,
            SimulateFormat::Json,
        )
    }
}
