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

//! The hook registry (spec §4.G): every plugin-visible callback — timers,
//! fd watches, child process reaping, POSIX signals, string modifiers,
//! printed-line filters, commands, completions — is one tagged-union
//! entry in a single ordered table. Iteration is stable under
//! unhook-during-iteration: `unhook` only flips a `disabled` bit, and a
//! `sweep` pass reclaims disabled slots once no iteration is in flight.

use crate::error::HookResult;

pub type HookId = u64;

/// A plugin-supplied callback. Implemented for any `FnMut(Args) ->
/// HookResult`, so most call sites never name the trait directly; it
/// exists so non-closure callback types (e.g. one struct implementing
/// several hook kinds) can participate too.
pub trait Callback<Args> {
    fn call(&mut self, args: Args) -> HookResult;
}

impl<Args, F: FnMut(Args) -> HookResult> Callback<Args> for F {
    fn call(&mut self, args: Args) -> HookResult {
        self(args)
    }
}

pub struct TimerArgs {
    pub remaining_calls: i64,
}

pub struct FdArgs {
    pub fd: i32,
    pub readable: bool,
    pub writable: bool,
}

pub struct ProcessArgs {
    pub pid: u32,
    pub return_code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

pub struct SignalArgs {
    pub name: String,
    pub data: String,
}

pub struct ModifierArgs {
    pub name: String,
    pub data: String,
    pub input: String,
}

pub struct LineArgs {
    pub buffer_id: u64,
    pub tags: Vec<String>,
    pub prefix: String,
    pub message: String,
}

pub struct CommandArgs {
    pub buffer_id: u64,
    pub args: Vec<String>,
}

pub struct CompletionArgs {
    pub buffer_id: u64,
    pub base_word: String,
}

pub struct PrintArgs {
    pub buffer_id: u64,
    pub tags: Vec<String>,
    pub message: String,
}

/// Which fd readiness states a `Fd` hook was registered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdInterest {
    pub read: bool,
    pub write: bool,
}

/// `process` hook completion condition: a hook also fires once the
/// timeout elapses even if the child hasn't exited (spec §4.G "Process").
#[derive(Debug, Clone, Copy)]
pub struct ProcessTimeout {
    pub ms: i64,
}

enum HookKind {
    Timer {
        interval_ms: i64,
        next_due_ms: i64,
        max_calls: i64,
        calls_done: i64,
        callback: Box<dyn Callback<TimerArgs>>,
    },
    Fd {
        fd: i32,
        interest: FdInterest,
        callback: Box<dyn Callback<FdArgs>>,
    },
    Process {
        pid: u32,
        timeout: Option<ProcessTimeout>,
        callback: Box<dyn Callback<ProcessArgs>>,
    },
    Signal {
        /// `None` matches every signal (spec §4.G "a hook registered with no
        /// name fires on every signal").
        name: Option<String>,
        callback: Box<dyn Callback<SignalArgs>>,
    },
    Modifier {
        name: String,
        /// Modifiers transform text rather than signal eat/ok, so they get
        /// their own callback shape instead of `Callback<Args>`.
        callback: Box<dyn FnMut(ModifierArgs) -> String>,
    },
    Line {
        callback: Box<dyn Callback<LineArgs>>,
    },
    Command {
        name: String,
        callback: Box<dyn Callback<CommandArgs>>,
    },
    Completion {
        name: String,
        callback: Box<dyn Callback<CompletionArgs>>,
    },
    Print {
        buffer_id: Option<u64>,
        tags: Vec<String>,
        callback: Box<dyn Callback<PrintArgs>>,
    },
}

struct HookEntry {
    id: HookId,
    priority: i32,
    sequence: u64,
    disabled: bool,
    kind: HookKind,
}

/// The single ordered table backing every hook kind (spec §4.G).
/// Iteration order within a kind is priority descending, insertion order
/// ascending on ties — the same rule the original core's `hook_exec`
/// walks use.
#[derive(Default)]
pub struct HookRegistry {
    entries: Vec<HookEntry>,
    next_id: HookId,
    next_sequence: u64,
    /// Set while a dispatch loop is iterating `entries`; `sweep` refuses
    /// to compact while this is true so indices stay stable mid-iteration.
    iterating: bool,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, priority: i32, kind: HookKind) -> HookId {
        let id = self.next_id;
        self.next_id += 1;
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.entries.push(HookEntry { id, priority, sequence, disabled: false, kind });
        id
    }

    pub fn hook_timer(&mut self, priority: i32, interval_ms: i64, max_calls: i64, now_ms: i64, callback: Box<dyn Callback<TimerArgs>>) -> HookId {
        self.insert(
            priority,
            HookKind::Timer { interval_ms, next_due_ms: now_ms + interval_ms, max_calls, calls_done: 0, callback },
        )
    }

    pub fn hook_fd(&mut self, priority: i32, fd: i32, interest: FdInterest, callback: Box<dyn Callback<FdArgs>>) -> HookId {
        self.insert(priority, HookKind::Fd { fd, interest, callback })
    }

    pub fn hook_process(&mut self, priority: i32, pid: u32, timeout: Option<ProcessTimeout>, callback: Box<dyn Callback<ProcessArgs>>) -> HookId {
        self.insert(priority, HookKind::Process { pid, timeout, callback })
    }

    pub fn hook_signal(&mut self, priority: i32, name: Option<&str>, callback: Box<dyn Callback<SignalArgs>>) -> HookId {
        self.insert(priority, HookKind::Signal { name: name.map(str::to_string), callback })
    }

    pub fn hook_modifier(&mut self, priority: i32, name: &str, callback: Box<dyn FnMut(ModifierArgs) -> String>) -> HookId {
        self.insert(priority, HookKind::Modifier { name: name.to_string(), callback })
    }

    pub fn hook_line(&mut self, priority: i32, callback: Box<dyn Callback<LineArgs>>) -> HookId {
        self.insert(priority, HookKind::Line { callback })
    }

    pub fn hook_command(&mut self, priority: i32, name: &str, callback: Box<dyn Callback<CommandArgs>>) -> HookId {
        self.insert(priority, HookKind::Command { name: name.to_string(), callback })
    }

    pub fn hook_completion(&mut self, priority: i32, name: &str, callback: Box<dyn Callback<CompletionArgs>>) -> HookId {
        self.insert(priority, HookKind::Completion { name: name.to_string(), callback })
    }

    pub fn hook_print(&mut self, priority: i32, buffer_id: Option<u64>, tags: Vec<String>, callback: Box<dyn Callback<PrintArgs>>) -> HookId {
        self.insert(priority, HookKind::Print { buffer_id, tags, callback })
    }

    /// Marks a hook inactive. Safe to call from inside a dispatch loop that
    /// is itself iterating over `entries` (spec §4.G "unhook during
    /// iteration must not invalidate the remaining walk").
    pub fn unhook(&mut self, id: HookId) {
        if let Some(e) = self.entries.iter_mut().find(|e| e.id == id) {
            e.disabled = true;
        }
    }

    pub fn is_active(&self, id: HookId) -> bool {
        self.entries.iter().any(|e| e.id == id && !e.disabled)
    }

    /// Reclaims disabled entries. Only safe between dispatch passes.
    pub fn sweep(&mut self) {
        if self.iterating {
            return;
        }
        self.entries.retain(|e| !e.disabled);
    }

    /// Indices into `entries` for live hooks of one predicate, sorted
    /// priority descending then insertion ascending.
    fn ordered_indices(&self, pred: impl Fn(&HookKind) -> bool) -> Vec<usize> {
        let mut idxs: Vec<usize> =
            (0..self.entries.len()).filter(|&i| !self.entries[i].disabled && pred(&self.entries[i].kind)).collect();
        idxs.sort_by_key(|&i| (std::cmp::Reverse(self.entries[i].priority), self.entries[i].sequence));
        idxs
    }

    /// Advances due timers, invoking each at most once per tick even if
    /// multiple intervals elapsed (spec §4.H step 1: "catches up without
    /// bursting"). Hooks whose `max_calls` is exhausted unhook themselves.
    pub fn run_due_timers(&mut self, now_ms: i64) {
        self.iterating = true;
        let idxs = self.ordered_indices(|k| matches!(k, HookKind::Timer { .. }));
        let mut to_unhook = Vec::new();
        for i in idxs {
            let (fire, id, remaining) = match &mut self.entries[i].kind {
                HookKind::Timer { next_due_ms, interval_ms, max_calls, calls_done, .. } if *next_due_ms <= now_ms => {
                    *next_due_ms += *interval_ms;
                    *calls_done += 1;
                    let remaining = if *max_calls <= 0 { -1 } else { *max_calls - *calls_done };
                    (true, self.entries[i].id, remaining)
                }
                _ => (false, 0, 0),
            };
            if fire {
                if let HookKind::Timer { callback, max_calls, calls_done, .. } = &mut self.entries[i].kind {
                    callback.call(TimerArgs { remaining_calls: remaining });
                    if *max_calls > 0 && *calls_done >= *max_calls {
                        to_unhook.push(id);
                    }
                }
            }
        }
        self.iterating = false;
        for id in to_unhook {
            self.unhook(id);
        }
    }

    /// Milliseconds until the earliest due timer, for the main loop's fd
    /// poll timeout (spec §4.H "fd poll with computed timeout").
    pub fn next_timer_due_in(&self, now_ms: i64) -> Option<i64> {
        self.entries
            .iter()
            .filter_map(|e| match &e.kind {
                HookKind::Timer { next_due_ms, .. } if !e.disabled => Some((*next_due_ms - now_ms).max(0)),
                _ => None,
            })
            .min()
    }

    pub fn dispatch_signal(&mut self, name: &str, data: &str) {
        self.iterating = true;
        let idxs = self.ordered_indices(|k| matches!(k, HookKind::Signal { .. }));
        for i in idxs {
            if let HookKind::Signal { name: pattern, callback } = &mut self.entries[i].kind {
                if pattern.as_deref().map(|p| p == name).unwrap_or(true) {
                    callback.call(SignalArgs { name: name.to_string(), data: data.to_string() });
                }
            }
        }
        self.iterating = false;
    }

    pub fn dispatch_line(&mut self, buffer_id: u64, tags: Vec<String>, prefix: String, message: String) -> HookResult {
        self.iterating = true;
        let idxs = self.ordered_indices(|k| matches!(k, HookKind::Line { .. }));
        let mut outcome = HookResult::Ok;
        for i in idxs {
            if let HookKind::Line { callback } = &mut self.entries[i].kind {
                let result = callback.call(LineArgs {
                    buffer_id,
                    tags: tags.clone(),
                    prefix: prefix.clone(),
                    message: message.clone(),
                });
                let eat = result.is_eat();
                outcome = result;
                if eat {
                    break;
                }
            }
        }
        self.iterating = false;
        outcome
    }

    /// Chains every hook registered for `name`, feeding each one's output
    /// text into the next (spec §4.G "Modifier chain").
    pub fn dispatch_modifier(&mut self, name: &str, data: &str, mut input: String) -> String {
        self.iterating = true;
        let idxs = self.ordered_indices(|k| matches!(k, HookKind::Modifier { name: n, .. } if n == name));
        for i in idxs {
            if let HookKind::Modifier { callback, .. } = &mut self.entries[i].kind {
                input = callback(ModifierArgs { name: name.to_string(), data: data.to_string(), input });
            }
        }
        self.iterating = false;
        input
    }

    pub fn dispatch_command(&mut self, name: &str, buffer_id: u64, args: Vec<String>) -> bool {
        self.iterating = true;
        let idxs = self.ordered_indices(|k| matches!(k, HookKind::Command { name: n, .. } if n == name));
        let ran = !idxs.is_empty();
        for i in idxs {
            if let HookKind::Command { callback, .. } = &mut self.entries[i].kind {
                callback.call(CommandArgs { buffer_id, args: args.clone() });
            }
        }
        self.iterating = false;
        ran
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[test]
    fn timer_fires_once_per_tick_and_respects_priority_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut reg = HookRegistry::new();
        let l1 = log.clone();
        reg.hook_timer(0, 1000, 0, 0, Box::new(move |_: TimerArgs| {
            l1.borrow_mut().push("low");
            HookResult::Ok
        }));
        let l2 = log.clone();
        reg.hook_timer(10, 1000, 0, 0, Box::new(move |_: TimerArgs| {
            l2.borrow_mut().push("high");
            HookResult::Ok
        }));
        reg.run_due_timers(500);
        assert!(log.borrow().is_empty(), "not yet due");
        reg.run_due_timers(1000);
        assert_eq!(*log.borrow(), vec!["high", "low"]);
        log.borrow_mut().clear();
        reg.run_due_timers(1999);
        assert!(log.borrow().is_empty(), "fires only once per elapsed interval, not per overdue ms");
        reg.run_due_timers(2000);
        assert_eq!(*log.borrow(), vec!["high", "low"]);
    }

    #[test]
    fn timer_with_max_calls_unhooks_itself() {
        let mut reg = HookRegistry::new();
        let id = reg.hook_timer(0, 100, 2, 0, Box::new(|_: TimerArgs| HookResult::Ok));
        reg.run_due_timers(100);
        assert!(reg.is_active(id));
        reg.run_due_timers(200);
        assert!(!reg.is_active(id), "second call exhausts max_calls");
    }

    #[test]
    fn unhook_during_iteration_does_not_break_the_walk() {
        let mut reg = HookRegistry::new();
        let fired = Rc::new(RefCell::new(0));
        let f1 = fired.clone();
        let self_id: Rc<RefCell<Option<HookId>>> = Rc::new(RefCell::new(None));
        let self_id_inner = self_id.clone();
        let id = reg.hook_signal(
            10,
            None,
            Box::new(move |_: SignalArgs| {
                *f1.borrow_mut() += 1;
                HookResult::Ok
            }),
        );
        *self_id.borrow_mut() = Some(id);
        let f2 = fired.clone();
        reg.hook_signal(0, None, Box::new(move |_: SignalArgs| {
            *f2.borrow_mut() += 1;
            HookResult::Ok
        }));
        let _ = self_id_inner;
        reg.dispatch_signal("test", "");
        assert_eq!(*fired.borrow(), 2);
        reg.unhook(id);
        reg.dispatch_signal("test", "");
        assert_eq!(*fired.borrow(), 3, "only the still-active hook fires");
        reg.sweep();
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn modifier_chain_feeds_output_forward() {
        let mut reg = HookRegistry::new();
        reg.hook_modifier(0, "colorize", Box::new(|args: ModifierArgs| format!("[{}]", args.input)));
        reg.hook_modifier(10, "colorize", Box::new(|args: ModifierArgs| args.input.to_uppercase()));
        let out = reg.dispatch_modifier("colorize", "", "hi".to_string());
        assert_eq!(out, "[HI]", "priority 10 runs first, priority 0 wraps its output");
    }

    #[test]
    fn line_hook_eat_stops_further_dispatch() {
        let mut reg = HookRegistry::new();
        let log = Rc::new(RefCell::new(Vec::new()));
        let l1 = log.clone();
        reg.hook_line(10, Box::new(move |_: LineArgs| {
            l1.borrow_mut().push("first");
            HookResult::OkEat
        }));
        let l2 = log.clone();
        reg.hook_line(0, Box::new(move |_: LineArgs| {
            l2.borrow_mut().push("second");
            HookResult::Ok
        }));
        reg.dispatch_line(1, vec![], "nick".to_string(), "hi".to_string());
        assert_eq!(*log.borrow(), vec!["first"]);
    }
}
