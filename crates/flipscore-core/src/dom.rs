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

//! The document seam.
//!
//! Widget logic never touches a concrete DOM. It is written against the
//! [`Dom`] trait, which the browser binding implements over `web_sys` and
//! which [`Document`] implements as an arena-backed tree for the command
//! line and for tests.

use serde::Serialize;

/// The operations widget discovery and the widget handlers need from a
/// document.
pub trait Dom {
    type Node: Clone;

    /// Descendants of `root`, excluding `root` itself, that carry the
    /// attribute, in document order.
    fn find_all(&self, root: &Self::Node, attribute: &str) -> Vec<Self::Node>;

    fn attribute(&self, node: &Self::Node, name: &str) -> Option<String>;

    fn parent(&self, node: &Self::Node) -> Option<Self::Node>;

    /// Lowercase tag name, or `None` if the node is not an element.
    fn tag_name(&self, node: &Self::Node) -> Option<String>;

    fn element_by_id(&self, id: &str) -> Option<Self::Node>;

    fn has_class(&self, node: &Self::Node, class: &str) -> bool;

    fn set_class(&mut self, node: &Self::Node, class: &str, on: bool);

    /// The current value of a form control.
    fn value(&self, node: &Self::Node) -> Option<String>;

    fn set_value(&mut self, node: &Self::Node, value: &str);

    /// Flips `class` on `node` and returns whether it is now present.
    fn toggle_class(&mut self, node: &Self::Node, class: &str) -> bool {
        let on = !self.has_class(node, class);
        self.set_class(node, class, on);
        on
    }

    /// The nearest ancestor-or-self element with the given tag.
    fn closest(&self, node: &Self::Node, tag: &str) -> Option<Self::Node> {
        let mut cursor = Some(node.clone());
        while let Some(current) = cursor {
            if self.tag_name(&current).is_some_and(|t| t == tag) {
                return Some(current);
            }
            cursor = self.parent(&current);
        }
        None
    }

    /// The first `input` under `scope` whose `name` is `name`.
    fn find_input(&self, scope: &Self::Node, name: &str) -> Option<Self::Node> {
        self.find_all(scope, "name").into_iter().find(|node| {
            self.tag_name(node).as_deref() == Some("input")
                && self.attribute(node, "name").as_deref() == Some(name)
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
enum NodeKind {
    Document,
    Element(Element),
    Text(String),
    Comment(String),
}

#[derive(Debug, Clone)]
struct Element {
    tag_name: String,
    /// Kept in source order so serialization is stable.
    attrs: Vec<(String, String)>,
}

#[derive(Debug, Clone)]
struct Node {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

const VOID_ELEMENTS: [&str; 14] = [
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param", "source",
    "track", "wbr",
];

const RAW_TEXT_ELEMENTS: [&str; 2] = ["script", "style"];

/// An in-memory document tree.
///
/// Form control values are reflected into the `value` attribute, so a
/// serialized document shows what a submission would carry.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
    doctype: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            kind: NodeKind::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            doctype: false,
        }
    }

    /// The document node. Its only element child is usually `<html>`.
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn set_doctype(&mut self, doctype: bool) {
        self.doctype = doctype;
    }

    fn push(&mut self, parent: NodeId, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn append_element(
        &mut self,
        parent: NodeId,
        tag_name: &str,
        attrs: &[(&str, &str)],
    ) -> NodeId {
        let element = Element {
            tag_name: tag_name.to_ascii_lowercase(),
            attrs: attrs
                .iter()
                .map(|(k, v)| (k.to_ascii_lowercase(), v.to_string()))
                .collect(),
        };
        self.push(parent, NodeKind::Element(element))
    }

    pub fn append_text(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Text(text.to_string()))
    }

    pub fn append_comment(&mut self, parent: NodeId, text: &str) -> NodeId {
        self.push(parent, NodeKind::Comment(text.to_string()))
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.0].children
    }

    fn element(&self, node: NodeId) -> Option<&Element> {
        match &self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node.0].kind {
            NodeKind::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn get_attribute(&self, node: NodeId, name: &str) -> Option<&str> {
        self.element(node)?
            .attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attribute(&mut self, node: NodeId, name: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            match element.attrs.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => element.attrs.push((name.to_string(), value.to_string())),
            }
        }
    }

    pub fn classes(&self, node: NodeId) -> Vec<&str> {
        self.get_attribute(node, "class")
            .map(|class| class.split_whitespace().collect())
            .unwrap_or_default()
    }

    /// Descendants of `node` in document (pre-)order, excluding `node`.
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node.0].children.iter().rev().copied().collect();
        while let Some(current) = stack.pop() {
            out.push(current);
            stack.extend(self.nodes[current.0].children.iter().rev().copied());
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        if self.doctype {
            out.push_str("<!DOCTYPE html>");
        }
        self.write_children(self.root, &mut out, false);
        out
    }

    fn write_children(&self, node: NodeId, out: &mut String, raw: bool) {
        for child in &self.nodes[node.0].children {
            self.write_node(*child, out, raw);
        }
    }

    fn write_node(&self, node: NodeId, out: &mut String, raw: bool) {
        match &self.nodes[node.0].kind {
            NodeKind::Document => self.write_children(node, out, raw),
            NodeKind::Text(text) => {
                if raw {
                    out.push_str(text);
                } else {
                    out.push_str(&escape_text(text));
                }
            }
            NodeKind::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
            NodeKind::Element(element) => {
                out.push('<');
                out.push_str(&element.tag_name);
                for (name, value) in &element.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');
                let tag = element.tag_name.as_str();
                if VOID_ELEMENTS.contains(&tag) {
                    return;
                }
                self.write_children(node, out, RAW_TEXT_ELEMENTS.contains(&tag));
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
        }
    }
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

fn escape_attribute(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

impl Dom for Document {
    type Node = NodeId;

    fn find_all(&self, root: &NodeId, attribute: &str) -> Vec<NodeId> {
        self.descendants(*root)
            .into_iter()
            .filter(|node| self.get_attribute(*node, attribute).is_some())
            .collect()
    }

    fn attribute(&self, node: &NodeId, name: &str) -> Option<String> {
        self.get_attribute(*node, name).map(str::to_string)
    }

    fn parent(&self, node: &NodeId) -> Option<NodeId> {
        self.nodes[node.0].parent
    }

    fn tag_name(&self, node: &NodeId) -> Option<String> {
        self.element(*node).map(|e| e.tag_name.clone())
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants(self.root)
            .into_iter()
            .find(|node| self.get_attribute(*node, "id") == Some(id))
    }

    fn has_class(&self, node: &NodeId, class: &str) -> bool {
        self.classes(*node).contains(&class)
    }

    fn set_class(&mut self, node: &NodeId, class: &str, on: bool) {
        let present = self.has_class(node, class);
        if on == present {
            return;
        }
        let mut classes: Vec<String> = self
            .classes(*node)
            .into_iter()
            .map(str::to_string)
            .collect();
        if on {
            classes.push(class.to_string());
        } else {
            classes.retain(|c| c != class);
        }
        self.set_attribute(*node, "class", &classes.join(" "));
    }

    fn value(&self, node: &NodeId) -> Option<String> {
        self.attribute(node, "value")
    }

    fn set_value(&mut self, node: &NodeId, value: &str) {
        self.set_attribute(*node, "value", value);
    }
}
