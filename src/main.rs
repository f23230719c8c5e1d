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

//! Thin reference binary: wires one `Engine` to stdin/stdout so the core
//! can be exercised without a real curses front end. Each stdin line is
//! inserted into the current window's input editor and immediately
//! submitted, running the same `input_dispatch`/`buffer_input_submit`
//! pipeline a real front end's keypress handling would drive; the loop
//! exits on `/quit`. A real terminal client would drive `Engine::tick`
//! from an actual `poll(2)` loop over the pty and network fds instead of
//! this blocking stdin read.

use std::io::{self, BufRead, Write};

use skein_core::buffer::BufferKind;
use skein_core::config::EngineConfig;
use skein_core::engine::Engine;
use skein_core::input::InputOp;
use skein_core::window::Rect;

fn now_us() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_micros() as u64)
        .unwrap_or(0)
}

fn main() {
    env_logger::init();

    let config = EngineConfig::default();
    let rect = Rect { x: 0, y: 0, width: 80, height: 24 };
    let mut engine = match Engine::new(config, rect, now_us()) {
        Ok(e) => e,
        Err(e) => {
            log::error!("failed to start engine: {e}");
            std::process::exit(1);
        }
    };

    log::info!("skein engine started");
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        if line == "/quit" {
            engine.request_quit();
        }

        let window = engine.windows.current();
        if let Some(win) = engine.windows.get(window) {
            let buffer = win.buffer;
            if let Err(e) = engine.input_dispatch(buffer, InputOp::Insert(line.clone())) {
                log::warn!("input_dispatch failed: {e}");
            }
            if let Err(e) = engine.buffer_input_submit(buffer, now_us() as i64) {
                log::warn!("buffer_input_submit failed: {e}");
            }
        }

        let _ = writeln!(stdout, "{line}");
        engine.tick(now_us() as i64 / 1000, |_timeout_ms| Vec::new());

        if engine.should_quit() {
            break;
        }
    }

    log::info!("skein engine stopped");
}
