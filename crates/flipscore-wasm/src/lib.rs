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

//! Browser binding: runs widget discovery against the live document and
//! registers real event listeners that call into the core handlers.
//!
//! ```js
//! import load, { init } from "/pkg/flipscore_wasm.js";
//! await load();
//! init();
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use flipscore_core::config::WidgetConfig;
use flipscore_core::dom::Dom;
use flipscore_core::error::ErrorReport;
use flipscore_core::page::Page;
use flipscore_core::page::PageEvent;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::Element;
use web_sys::Event;
use web_sys::HtmlInputElement;
use web_sys::console;

/// Set on the root element once the widgets are wired, so a second `init`
/// does not register every listener twice.
const READY_MARKER: &str = "data-flipscore-ready";

struct WebDom {
    document: web_sys::Document,
}

impl Dom for WebDom {
    type Node = Element;

    fn find_all(&self, root: &Element, attribute: &str) -> Vec<Element> {
        let Ok(list) = root.query_selector_all(&format!("[{attribute}]")) else {
            return Vec::new();
        };
        (0..list.length())
            .filter_map(|index| list.get(index))
            .filter_map(|node| node.dyn_into::<Element>().ok())
            .collect()
    }

    fn attribute(&self, node: &Element, name: &str) -> Option<String> {
        node.get_attribute(name)
    }

    fn parent(&self, node: &Element) -> Option<Element> {
        node.parent_element()
    }

    fn tag_name(&self, node: &Element) -> Option<String> {
        Some(node.tag_name().to_ascii_lowercase())
    }

    fn element_by_id(&self, id: &str) -> Option<Element> {
        self.document.get_element_by_id(id)
    }

    fn has_class(&self, node: &Element, class: &str) -> bool {
        node.class_list().contains(class)
    }

    fn set_class(&mut self, node: &Element, class: &str, on: bool) {
        if let Err(e) = node.class_list().toggle_with_force(class, on) {
            console::warn_2(&JsValue::from_str("failed to set class"), &e);
        }
    }

    fn value(&self, node: &Element) -> Option<String> {
        match node.dyn_ref::<HtmlInputElement>() {
            Some(input) => Some(input.value()),
            None => node.get_attribute("value"),
        }
    }

    fn set_value(&mut self, node: &Element, value: &str) {
        match node.dyn_ref::<HtmlInputElement>() {
            Some(input) => input.set_value(value),
            None => {
                if let Err(e) = node.set_attribute("value", value) {
                    console::warn_2(&JsValue::from_str("failed to set value"), &e);
                }
            }
        }
    }
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
}

/// Wires flip cards and rating groups once the document has been parsed.
/// `config` is an optional TOML widget configuration.
#[wasm_bindgen]
pub fn init(config: Option<String>) -> Result<(), JsValue> {
    let config = match config {
        Some(source) => WidgetConfig::from_toml(&source).map_err(to_js)?,
        None => WidgetConfig::default(),
    };
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| JsValue::from_str("no document"))?;
    if document.ready_state() == "loading" {
        let target = document.clone();
        let callback = Closure::<dyn FnMut()>::new(move || {
            if let Err(e) = wire(&target, &config) {
                console::error_1(&e);
            }
        });
        document.add_event_listener_with_callback(
            "DOMContentLoaded",
            callback.as_ref().unchecked_ref(),
        )?;
        callback.forget();
        Ok(())
    } else {
        wire(&document, &config)
    }
}

fn wire(document: &web_sys::Document, config: &WidgetConfig) -> Result<(), JsValue> {
    let root = document
        .document_element()
        .ok_or_else(|| JsValue::from_str("document has no root element"))?;
    if root.has_attribute(READY_MARKER) {
        return Ok(());
    }
    root.set_attribute(READY_MARKER, "")?;

    let dom = WebDom {
        document: document.clone(),
    };
    let page = Page::init(dom, &root, config).map_err(to_js)?;
    for diagnostic in page.diagnostics() {
        console::warn_1(&JsValue::from_str(&diagnostic.to_string()));
    }

    // The browser propagates events itself, so each listener runs only the
    // handlers bound to its own element.
    let listeners = page.listeners();
    let page = Rc::new(RefCell::new(page));
    for (node, event) in listeners {
        let page = Rc::clone(&page);
        let target = node.clone();
        listen(&node, event, move || match page.try_borrow_mut() {
            Ok(mut page) => {
                page.handle(&target, event);
            }
            Err(_) => {
                console::warn_1(&JsValue::from_str("nested widget event ignored"));
            }
        })?;
    }
    Ok(())
}

fn listen(
    target: &Element,
    event: PageEvent,
    mut handler: impl FnMut() + 'static,
) -> Result<(), JsValue> {
    let closure = Closure::<dyn FnMut(Event)>::new(move |_: Event| handler());
    target.add_event_listener_with_callback(event.as_str(), closure.as_ref().unchecked_ref())?;
    // The listener lives as long as the page.
    closure.forget();
    Ok(())
}

fn to_js(error: ErrorReport) -> JsValue {
    JsValue::from_str(&error.to_string())
}
