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

use std::path::Path;

use flipscore_core::config::WidgetConfig;
use flipscore_core::error::Fallible;
use flipscore_core::page::Page;
use flipscore_core::page::PageReport;

use crate::html::read_document;

pub fn check_page(file: &Path, config: &WidgetConfig) -> Fallible<()> {
    let document = read_document(file)?;
    let root = document.root();
    let page = Page::init(document, &root, config)?;
    for line in summarize(&page.report()) {
        println!("{line}");
    }
    println!("ok");
    Ok(())
}

fn summarize(report: &PageReport) -> Vec<String> {
    let mut lines = Vec::new();
    for card in &report.flip_cards {
        lines.push(format!("flip card #{}{}", card.index, describe_id(&card.id)));
    }
    for group in &report.rating_groups {
        let values: Vec<String> = group.buttons.iter().map(|b| b.value.to_string()).collect();
        let field = match group.field {
            Some(source) => source.to_string(),
            None => "none".to_string(),
        };
        lines.push(format!(
            "rating group #{}{}: values [{}], field: {field}",
            group.index,
            describe_id(&group.id),
            values.join(", ")
        ));
    }
    for diagnostic in &report.diagnostics {
        lines.push(format!("warning: {diagnostic}"));
    }
    lines
}

fn describe_id(id: &Option<String>) -> String {
    match id {
        Some(id) => format!(" (#{id})"),
        None => String::new(),
    }
}
