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

//! The buffer store (spec §3 "Buffer", §4.E): the largest single component
//! of the engine. `buffer` owns one buffer's data; `line` its message
//! rows; `property` the typed get/set surface plugins drive; `store`
//! creation, numbering, merge/zoom and lookup across every open buffer.

pub mod buffer;
pub mod line;
pub mod property;
pub mod store;

pub use buffer::{Buffer, CloseCallback, HotlistPriority, InputCallback};
pub use line::{Line, LineFlags, LineList};
pub use property::{ActiveState, BufferFlags, BufferKind, HighlightPolicy, HotlistOp, NotifyLevel, SetProperty, UnreadOp};
pub use store::{BufferStore, SetEffect};
