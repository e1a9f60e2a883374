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

use flipscore_core::dom::Document;
use flipscore_core::dom::NodeId;
use flipscore_core::error::Fallible;
use flipscore_core::error::fail;
use scraper::ElementRef;
use scraper::Html;
use scraper::Node;

/// Parses HTML the way a browser would (missing `<html>`, `<head>`, and
/// `<body>` are supplied) and copies the result into a [`Document`].
pub fn parse_document(source: &str) -> Document {
    let html = Html::parse_document(source);
    let mut document = Document::new();
    let has_doctype = html
        .tree
        .root()
        .children()
        .any(|child| child.value().is_doctype());
    document.set_doctype(has_doctype);
    let root = document.root();
    append_element(&mut document, root, html.root_element());
    document
}

pub fn read_document(path: &Path) -> Fallible<Document> {
    if !path.exists() {
        return fail(format!("file {} does not exist.", path.display()));
    }
    let source = read_to_string(path)?;
    Ok(parse_document(&source))
}

fn append_element(document: &mut Document, parent: NodeId, element: ElementRef<'_>) {
    let attrs: Vec<(&str, &str)> = element.value().attrs().collect();
    let node = document.append_element(parent, element.value().name(), &attrs);
    for child in element.children() {
        match child.value() {
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    append_element(document, node, child);
                }
            }
            Node::Text(text) => {
                document.append_text(node, text);
            }
            Node::Comment(comment) => {
                document.append_comment(node, comment);
            }
            _ => {}
        }
    }
}
