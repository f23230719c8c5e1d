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

//! The error taxonomy of spec §7. Every fallible public operation in this
//! crate returns `Result<_, EngineError>`; bulk operations collect failures
//! into a `Vec<EngineError>` rather than aborting (best-effort semantics).

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("resource limit reached: {0}")]
    ResourceLimit(&'static str),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("regex compile error: {0}")]
    Compile(#[from] regex::Error),

    #[error("plugin callback error: {0}")]
    Callback(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown signal: {0}")]
    Signal(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Outcome of a best-effort bulk operation (spec §7 "Propagation").
#[derive(Debug, Default)]
pub struct BestEffort {
    pub errors: Vec<EngineError>,
}

impl BestEffort {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, err: EngineError) {
        self.errors.push(err);
    }

    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Result of invoking a plugin-supplied hook callback (§9 open question 4).
#[derive(Debug)]
pub enum HookResult {
    Ok,
    OkEat,
    Err(EngineError),
}

impl HookResult {
    pub fn is_eat(&self) -> bool {
        matches!(self, HookResult::OkEat)
    }

    /// Logs unobserved errors rather than silently dropping them, per
    /// SPEC_FULL's open-question decision.
    pub fn log_if_err(&self, context: &str) {
        if let HookResult::Err(e) = self {
            log::warn!("hook callback error in {context}: {e}");
        }
    }
}
