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

//! Signals emitted by mutations (spec §6.2), and the scoped suppression
//! guard that replaces the original's global `gui_buffer_set_signals` flag
//! (Design Notes: "prefer an explicit scoped guard... in the rewrite").

use crate::arena::Handle;
use crate::buffer::Buffer;
use crate::window::Window;

/// Payload-carrying signal. Unit-ish variants carry the handle of the
/// entity the signal concerns; a few carry extra data.
#[derive(Debug, Clone)]
pub enum Signal {
    BufferOpened(Handle<Buffer>),
    BufferClosing(Handle<Buffer>),
    BufferClosed(Handle<Buffer>),
    BufferCleared(Handle<Buffer>),
    BufferRenamed(Handle<Buffer>),
    BufferMoved(Handle<Buffer>),
    BufferMerged(Handle<Buffer>),
    BufferUnmerged(Handle<Buffer>),
    BufferZoomed(Handle<Buffer>),
    BufferUnzoomed(Handle<Buffer>),
    BufferHidden(Handle<Buffer>),
    BufferUnhidden(Handle<Buffer>),
    BufferTitleChanged(Handle<Buffer>),
    BufferModesChanged(Handle<Buffer>),
    BufferTypeChanged(Handle<Buffer>),
    BufferLocalvarAdded(Handle<Buffer>, String),
    BufferLocalvarChanged(Handle<Buffer>, String),
    BufferLocalvarRemoved(Handle<Buffer>, String),
    InputPromptChanged(Handle<Buffer>),
    InputTextChanged(Handle<Buffer>),
    InputTextCursorMoved(Handle<Buffer>),
    InputPastePending(Handle<Buffer>),
    InputSearch(Handle<Buffer>, bool /* found */),
    WindowOpened(Handle<Window>),
    WindowClosing(Handle<Window>),
    WindowClosed(Handle<Window>),
    WindowSwitch(Handle<Window>),
    WindowZoom(Handle<Window>),
    WindowZoomed(Handle<Window>),
    WindowUnzoom(Handle<Window>),
    WindowUnzoomed(Handle<Window>),
    WindowResized(Handle<Window>),
    WindowScrolled(Handle<Window>),
    SignalSigwinch,
}

/// A process for consuming emitted signals. The engine's own bookkeeping
/// (hotlist, dirty-region flags) is one sink; hook dispatch (§4.G `signal`
/// hooks) is another. Kept as a trait so tests can install a recording sink.
pub trait SignalSink {
    fn emit(&mut self, signal: Signal);
}

/// A sink that just records signals, useful in tests and as the default
/// when no hook registry is wired up yet.
#[derive(Default)]
pub struct RecordingSink {
    pub signals: Vec<Signal>,
}

impl SignalSink for RecordingSink {
    fn emit(&mut self, signal: Signal) {
        self.signals.push(signal);
    }
}

/// Bulk emission gate (spec §4.E "Signals"). While `enabled` is false,
/// `Bus::emit` drops signals on the floor instead of forwarding them.
pub struct Bus<S: SignalSink> {
    sink: S,
    enabled: bool,
}

impl<S: SignalSink> Bus<S> {
    pub fn new(sink: S) -> Self {
        Self { sink, enabled: true }
    }

    pub fn emit(&mut self, signal: Signal) {
        if self.enabled {
            self.sink.emit(signal);
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    /// Suppress emission for the lifetime of the returned guard; dropping
    /// the guard restores whatever suppression state existed before (so
    /// nested `suppress()` calls compose correctly).
    pub fn suppress(&mut self) -> SignalGuard<'_, S> {
        let was_enabled = self.enabled;
        self.enabled = false;
        SignalGuard { bus: self, was_enabled }
    }
}

pub struct SignalGuard<'a, S: SignalSink> {
    bus: &'a mut Bus<S>,
    was_enabled: bool,
}

impl<'a, S: SignalSink> Drop for SignalGuard<'a, S> {
    fn drop(&mut self) {
        self.bus.enabled = self.was_enabled;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suppression_restores_on_drop() {
        let mut bus = Bus::new(RecordingSink::default());
        bus.emit(Signal::SignalSigwinch);
        {
            let _guard = bus.suppress();
            bus.emit(Signal::SignalSigwinch);
        }
        bus.emit(Signal::SignalSigwinch);
        assert_eq!(bus.sink().signals.len(), 2);
    }

    #[test]
    fn nested_suppression_composes() {
        let mut bus = Bus::new(RecordingSink::default());
        {
            let _outer = bus.suppress();
            {
                let _inner = bus.suppress();
            }
            // still suppressed: outer guard hasn't dropped yet
            bus.emit(Signal::SignalSigwinch);
        }
        bus.emit(Signal::SignalSigwinch);
        assert_eq!(bus.sink().signals.len(), 1);
    }
}
