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

//! The window tree (spec §3 "Window", "Window tree", §4.F): `window` owns
//! one window's rectangle, scroll-list and coordinate map; `tree` the
//! binary split tree and resize/focus traversal; `scroll` the per-(window,
//! buffer) scroll bookkeeping and the relative-scroll command grammar.

pub mod scroll;
pub mod tree;
pub mod window;

pub use scroll::{parse_horizontal_scroll, parse_relative_scroll, HorizontalScroll, RelativeScroll, ScrollState, ScrollUnit};
pub use tree::{Direction, NodeKind, Orientation, TreeNode, WindowTree};
pub use window::{fill_coords, get_context_at, word_at, Context, CoordCell, Rect, Window};
