// SPDX-FileCopyrightText: 2025 Semiotic AI, Inc.
//
// SPDX-License-Identifier: Apache-2.0

//! Tokio-based clock implementation.

use async_trait::async_trait;
use std::time::Duration;
use tokio::time::Instant;

use crate::traits::Clock;

/// Production clock using Tokio's timer.
///
/// Because it reads [`tokio::time::Instant`], a runtime started with paused
/// time (`#[tokio::test(start_paused = true)]`) drives it virtually.
///
/// ```rust
/// use cctp_orchestrator::TokioClock;
///
/// let clock = TokioClock::new();
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl TokioClock {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Clock for TokioClock {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }

    fn now(&self) -> Instant {
        Instant::now()
    }
}
