//! Simulation thread behind a command channel
//!
//! Callers on other threads never touch the coordinator. They send commands;
//! the thread applies them one at a time and answers with post-tick snapshots.

use super::intent_queue::Intent;
use super::snapshot::SimulationSnapshot;
use super::FireSimulation;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info};

/// Commands accepted by the simulation thread
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimCommand {
    /// Queue an intent for the next tick
    Submit(Intent),
    /// Run this many fixed ticks (stopping early if the session ends), then
    /// publish a snapshot
    Step(u32),
    /// Publish a snapshot without advancing
    Snapshot,
    /// Stop the thread
    Shutdown,
}

/// Handle for controlling the simulation thread
pub struct SimulationHandle {
    thread: Option<JoinHandle<FireSimulation>>,
    command_tx: Sender<SimCommand>,
    snapshot_rx: Receiver<SimulationSnapshot>,
}

impl SimulationHandle {
    /// Move `sim` onto a new thread
    pub fn spawn(sim: FireSimulation) -> Self {
        let (command_tx, command_rx) = mpsc::channel();
        let (snapshot_tx, snapshot_rx) = mpsc::channel();

        let thread = thread::spawn(move || run_simulation(sim, &command_rx, &snapshot_tx));

        Self {
            thread: Some(thread),
            command_tx,
            snapshot_rx,
        }
    }

    /// Send a command; `false` if the thread has stopped
    pub fn send(&self, command: SimCommand) -> bool {
        self.command_tx.send(command).is_ok()
    }

    pub fn submit(&self, intent: Intent) -> bool {
        self.send(SimCommand::Submit(intent))
    }

    pub fn step(&self, ticks: u32) -> bool {
        self.send(SimCommand::Step(ticks))
    }

    /// Try to receive the next snapshot (non-blocking)
    pub fn try_recv_snapshot(&self) -> Option<SimulationSnapshot> {
        match self.snapshot_rx.try_recv() {
            Ok(snapshot) => Some(snapshot),
            Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
        }
    }

    /// Wait up to `timeout` for the next snapshot
    pub fn recv_snapshot_timeout(&self, timeout: Duration) -> Option<SimulationSnapshot> {
        match self.snapshot_rx.recv_timeout(timeout) {
            Ok(snapshot) => Some(snapshot),
            Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => None,
        }
    }

    /// Drain pending snapshots, keeping only the newest
    pub fn latest_snapshot(&self) -> Option<SimulationSnapshot> {
        self.snapshot_rx.try_iter().last()
    }

    /// Stop the thread and take the simulation back
    pub fn shutdown(mut self) -> Option<FireSimulation> {
        let _ = self.command_tx.send(SimCommand::Shutdown);
        self.thread.take().and_then(|t| t.join().ok())
    }
}

impl Drop for SimulationHandle {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = self.command_tx.send(SimCommand::Shutdown);
            let _ = thread.join();
        }
    }
}

fn run_simulation(
    mut sim: FireSimulation,
    command_rx: &Receiver<SimCommand>,
    snapshot_tx: &Sender<SimulationSnapshot>,
) -> FireSimulation {
    info!("Simulation thread started");

    for command in command_rx {
        match command {
            SimCommand::Submit(intent) => sim.submit(intent),
            SimCommand::Step(ticks) => {
                for _ in 0..ticks {
                    if sim.is_over() {
                        break;
                    }
                    sim.tick();
                }
                let _ = snapshot_tx.send(sim.snapshot());
            }
            SimCommand::Snapshot => {
                let _ = snapshot_tx.send(sim.snapshot());
            }
            SimCommand::Shutdown => break,
        }
    }

    debug!("Simulation thread stopped at frame {}", sim.frame());
    sim
}
