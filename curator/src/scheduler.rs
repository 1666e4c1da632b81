//! Fixed-interval scheduler
//!
//! Drives a [`CycleRunner`] forever: run a cycle, wait the interval, repeat.
//! Each cycle runs in its own task so a panicking cycle is contained and the
//! loop continues. A stop signal is honoured between cycles only; an
//! in-flight cycle always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use shared::logging::{log_error, log_shutdown};
use shared::{component_debug, component_info, Component};
use tokio::sync::{mpsc, Mutex};

use crate::traits::{CycleRunner, Sleeper};

/// Scheduler lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running { cycle: u64 },
    Stopped,
}

/// What ended the loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Signal,
    CycleLimit,
}

/// Summary returned once the scheduler has stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerReport {
    pub cycles: u64,
    /// Cycles that panicked and were contained
    pub aborted_cycles: u64,
    pub reason: StopReason,
}

pub struct Scheduler<R, Z>
where
    R: CycleRunner + 'static,
    Z: Sleeper,
{
    runner: Arc<Mutex<R>>,
    sleeper: Z,
    interval: Duration,
    max_cycles: Option<u64>,

    state: SchedulerState,
    cycles_started: u64,
    aborted_cycles: u64,

    /// Shutdown signal
    shutdown_tx: mpsc::Sender<()>,
    shutdown_rx: mpsc::Receiver<()>,
}

impl<R, Z> Scheduler<R, Z>
where
    R: CycleRunner + 'static,
    Z: Sleeper,
{
    pub fn new(runner: R, sleeper: Z, interval: Duration) -> Self {
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);
        Self {
            runner: Arc::new(Mutex::new(runner)),
            sleeper,
            interval,
            max_cycles: None,
            state: SchedulerState::Idle,
            cycles_started: 0,
            aborted_cycles: 0,
            shutdown_tx,
            shutdown_rx,
        }
    }

    /// Stop after `max_cycles` cycles instead of running forever
    pub fn with_max_cycles(mut self, max_cycles: Option<u64>) -> Self {
        self.max_cycles = max_cycles;
        self
    }

    /// Sender that requests a stop at the next cycle boundary
    pub fn get_shutdown_sender(&self) -> mpsc::Sender<()> {
        self.shutdown_tx.clone()
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn runner(&self) -> Arc<Mutex<R>> {
        Arc::clone(&self.runner)
    }

    fn limit_reached(&self) -> bool {
        self.max_cycles
            .map(|max| self.cycles_started >= max)
            .unwrap_or(false)
    }

    /// Run until stopped, then shut the runner down
    pub async fn run(&mut self) -> SchedulerReport {
        component_info!(
            Component::Scheduler,
            "⏱️ Scheduler started, interval {}s",
            self.interval.as_secs()
        );

        let reason = loop {
            if self.shutdown_rx.try_recv().is_ok() {
                break StopReason::Signal;
            }
            if self.limit_reached() {
                break StopReason::CycleLimit;
            }

            self.run_one_cycle().await;

            if self.limit_reached() {
                break StopReason::CycleLimit;
            }

            component_debug!(Component::Scheduler, "💤 Waiting {:?} before next cycle", self.interval);
            tokio::select! {
                biased;
                _ = self.shutdown_rx.recv() => break StopReason::Signal,
                _ = self.sleeper.sleep(self.interval) => {}
            }
        };

        log_shutdown(
            Component::Scheduler,
            match reason {
                StopReason::Signal => "stop signal received",
                StopReason::CycleLimit => "cycle limit reached",
            },
        );
        self.runner.lock().await.shutdown().await;
        self.state = SchedulerState::Stopped;

        SchedulerReport {
            cycles: self.cycles_started,
            aborted_cycles: self.aborted_cycles,
            reason,
        }
    }

    async fn run_one_cycle(&mut self) {
        self.cycles_started += 1;
        let cycle = self.cycles_started;
        self.state = SchedulerState::Running { cycle };

        let runner = Arc::clone(&self.runner);
        let handle = tokio::spawn(async move {
            let mut runner = runner.lock().await;
            runner.run_cycle().await
        });

        match handle.await {
            Ok(result) => {
                component_debug!(Component::Scheduler, "Cycle {} finished: {}", cycle, result);
            }
            Err(e) => {
                self.aborted_cycles += 1;
                log_error(Component::Scheduler, &format!("Cycle {cycle}"), &e);
            }
        }

        self.state = SchedulerState::Idle;
    }
}
