// Copyright 2026 The Skein Authors.
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

//! The buffer/window/input engine core: a single-threaded, cooperative
//! library with no locks anywhere (spec §5). Plugins and a front end embed
//! it; this crate owns buffers, windows, input editing, hooks and the
//! main-loop tick, and emits signals the embedder reacts to.

pub mod arena;
pub mod buffer;
pub mod config;
pub mod dirty;
pub mod error;
pub mod hdata;
pub mod history;
pub mod hooks;
pub mod input;
pub mod layout;
pub mod mainloop;
pub mod search;
pub mod signal;
pub mod undo;
pub mod window;

pub mod engine;
