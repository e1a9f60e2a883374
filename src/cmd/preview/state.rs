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

use crate::deck::Deck;
use crate::markup::ModuleUrl;

#[derive(Clone)]
pub struct ServerState {
    pub deck: Arc<Deck>,
    /// A wasm-pack output directory served under `/pkg/`.
    pub pkg_dir: Option<PathBuf>,
    /// The module the page loads, set when `pkg_dir` is.
    pub module: Option<ModuleUrl>,
    pub mutable: Arc<Mutex<MutableState>>,
}

pub struct MutableState {
    /// One entry per card in the deck.
    pub scores: Vec<Option<u32>>,
}
