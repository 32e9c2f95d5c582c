//! Runs a [`GameBoy`] on its own thread.
//!
//! The core stays single-threaded; the host only talks to it through a
//! command channel, a double-buffered frame and a snapshot slot.

use std::io;
use std::sync::mpsc::{self, RecvTimeoutError, Sender, TryRecvError};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use super::gameboy::{FrameOutcome, GameBoy, StepOutcome};
use super::ppu::FrameBuffer;
use super::snapshot::Snapshot;

const THREAD_NAME: &str = "tickboy-core";
/// How long an idle core waits for a command before looking again.
const IDLE_WAIT: Duration = Duration::from_millis(10);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HostCommand {
    Pause,
    Resume,
    /// Execute one instruction, then publish a snapshot.
    Step,
    Reset,
    AddBreakpoint(u16),
    RemoveBreakpoint(u16),
    SetBreakpointEnabled(u16, bool),
    SetSnapshotRange(u16, u16),
    SetFrameLimit(bool),
    RequestSnapshot,
    Shutdown,
}

type SnapshotSlot = Arc<Mutex<Option<Arc<Snapshot>>>>;

/// A poisoned lock only means the other side panicked mid-copy; the data
/// is plain bytes, so keep going.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct EmulatorHost {
    commands: Sender<HostCommand>,
    frame: Arc<Mutex<FrameBuffer>>,
    snapshot: SnapshotSlot,
    handle: Option<JoinHandle<GameBoy>>,
}

impl EmulatorHost {
    /// Move `gb` onto a background thread and start running frames.
    pub fn spawn(gb: GameBoy) -> io::Result<Self> {
        let (commands, rx) = mpsc::channel();
        let frame = Arc::new(Mutex::new(FrameBuffer::default()));
        let snapshot: SnapshotSlot = Arc::new(Mutex::new(None));

        let worker = Worker {
            gb,
            frame: Arc::clone(&frame),
            snapshot: Arc::clone(&snapshot),
            frames_published: 0,
        };
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || worker.run(rx))?;

        Ok(Self {
            commands,
            frame,
            snapshot,
            handle: Some(handle),
        })
    }

    /// Queue a command. Returns false once the core thread has exited.
    pub fn send(&self, command: HostCommand) -> bool {
        self.commands.send(command).is_ok()
    }

    /// Copy of the most recently published frame.
    pub fn latest_frame(&self) -> Vec<u8> {
        lock(&self.frame).front().to_vec()
    }

    /// Copy the most recent frame into `out` without allocating.
    pub fn copy_frame(&self, out: &mut [u8]) {
        let frame = lock(&self.frame);
        let front = frame.front();
        let len = out.len().min(front.len());
        out[..len].copy_from_slice(&front[..len]);
    }

    pub fn latest_snapshot(&self) -> Option<Arc<Snapshot>> {
        lock(&self.snapshot).clone()
    }

    /// Stop the core thread and take the machine back.
    pub fn join(mut self) -> Option<GameBoy> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> Option<GameBoy> {
        let handle = self.handle.take()?;
        let _ = self.commands.send(HostCommand::Shutdown);
        match handle.join() {
            Ok(gb) => Some(gb),
            Err(_) => {
                log::warn!("emulator thread panicked");
                None
            }
        }
    }
}

impl Drop for EmulatorHost {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    gb: GameBoy,
    frame: Arc<Mutex<FrameBuffer>>,
    snapshot: SnapshotSlot,
    frames_published: u64,
}

impl Worker {
    fn run(mut self, rx: mpsc::Receiver<HostCommand>) -> GameBoy {
        log::info!("emulator thread started");
        loop {
            if !self.drain_commands(&rx) {
                break;
            }
            if self.idle() {
                continue;
            }

            match self.gb.run_frame() {
                Ok(FrameOutcome::Completed) => self.publish_frame(),
                Ok(FrameOutcome::Breakpoint(addr)) => {
                    log::info!("stopped at breakpoint {addr:04X}");
                    self.publish_snapshot();
                }
                Ok(FrameOutcome::Paused) => {}
                Err(err) => {
                    log::warn!("core halted: {err}");
                    self.publish_snapshot();
                }
            }
        }
        log::info!("emulator thread stopped");
        self.gb
    }

    fn idle(&self) -> bool {
        self.gb.is_paused() || self.gb.cartridge().is_none()
    }

    /// Handle every queued command; an idle core blocks briefly for the
    /// first one. Returns false on shutdown or a dropped sender.
    fn drain_commands(&mut self, rx: &mpsc::Receiver<HostCommand>) -> bool {
        loop {
            let command = if self.idle() {
                match rx.recv_timeout(IDLE_WAIT) {
                    Ok(command) => command,
                    Err(RecvTimeoutError::Timeout) => return true,
                    Err(RecvTimeoutError::Disconnected) => return false,
                }
            } else {
                match rx.try_recv() {
                    Ok(command) => command,
                    Err(TryRecvError::Empty) => return true,
                    Err(TryRecvError::Disconnected) => return false,
                }
            };
            if !self.handle(command) {
                return false;
            }
        }
    }

    fn handle(&mut self, command: HostCommand) -> bool {
        log::debug!("host command {command:?}");
        match command {
            HostCommand::Pause => {
                self.gb.pause();
                self.publish_snapshot();
            }
            HostCommand::Resume => self.gb.resume(),
            HostCommand::Step => {
                self.gb.pause();
                match self.gb.step_instruction() {
                    Ok(StepOutcome::Breakpoint(addr)) => {
                        log::info!("stopped at breakpoint {addr:04X}");
                    }
                    Ok(_) => {}
                    Err(err) => log::warn!("core halted: {err}"),
                }
                self.publish_frame();
                self.publish_snapshot();
            }
            HostCommand::Reset => {
                self.gb.reset();
                self.frames_published = 0;
                if self.gb.is_paused() {
                    self.publish_snapshot();
                }
            }
            HostCommand::AddBreakpoint(addr) => self.gb.add_breakpoint(addr),
            HostCommand::RemoveBreakpoint(addr) => {
                self.gb.remove_breakpoint(addr);
            }
            HostCommand::SetBreakpointEnabled(addr, enabled) => {
                self.gb.set_breakpoint_enabled(addr, enabled);
            }
            HostCommand::SetSnapshotRange(start, end) => {
                if let Err(err) = self.gb.set_snapshot_range(start, end) {
                    log::warn!("{err}");
                }
            }
            HostCommand::SetFrameLimit(enabled) => self.gb.set_frame_limit(enabled),
            HostCommand::RequestSnapshot => self.publish_snapshot(),
            HostCommand::Shutdown => return false,
        }
        true
    }

    /// Copy a newly completed frame into the shared back plane and flip.
    fn publish_frame(&mut self) {
        let completed = self.gb.ppu().frames_completed();
        if completed == self.frames_published {
            return;
        }
        self.frames_published = completed;

        let mut shared = lock(&self.frame);
        shared.back_mut().copy_from_slice(self.gb.frame());
        shared.swap();
    }

    fn publish_snapshot(&mut self) {
        let snapshot = Arc::new(self.gb.snapshot());
        *lock(&self.snapshot) = Some(snapshot);
    }
}
