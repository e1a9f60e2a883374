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

//! Flip cards and rating groups, independent of any particular DOM.
//!
//! A page is scanned once with [`page::Page::init`] (or
//! [`widget::discover`] when the host wires its own listeners), after which
//! each widget reacts to clicks, pointer-enter, and focus.

pub mod config;
pub mod dom;
pub mod error;
pub mod page;
pub mod widget;
