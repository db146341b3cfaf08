//! Background scheduling pump
//!
//! A thread that wakes every quantum and delivers whatever is due. It only
//! touches the simulation while holding its lock, so handlers never overlap
//! with each other or with the host posting input.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::error::{SimError, SimResult};
use crate::renderer::Renderer;
use crate::sim::{Clock, Simulation};

/// Shared handle to a running simulation
pub type SharedSimulation<C, R> = Arc<Mutex<Simulation<C, R>>>;

/// Owns the pump thread; dropping it stops the pump
pub struct PumpHandle {
    stop: Arc<AtomicBool>,
    thread: Option<JoinHandle<SimResult<()>>>,
}

/// Start pumping `sim` every `quantum`
pub fn spawn<C, R>(sim: SharedSimulation<C, R>, quantum: Duration) -> SimResult<PumpHandle>
where
    C: Clock + Send + 'static,
    R: Renderer + Send + 'static,
{
    let stop = Arc::new(AtomicBool::new(false));
    let flag = Arc::clone(&stop);

    let thread = thread::Builder::new()
        .name("sim-pump".into())
        .spawn(move || -> SimResult<()> {
            log::info!("pump started, quantum {:?}", quantum);
            while !flag.load(Ordering::Acquire) {
                {
                    let mut guard = sim.lock().map_err(|_| SimError::PumpPoisoned)?;
                    if let Err(err) = guard.dispatch_due() {
                        log::error!("pump stopped: {err}");
                        return Err(err);
                    }
                }
                // Woken early by `stop`
                thread::park_timeout(quantum);
            }
            log::info!("pump stopped");
            Ok(())
        })?;

    Ok(PumpHandle {
        stop,
        thread: Some(thread),
    })
}

impl PumpHandle {
    /// False once the pump has exited, normally or on error
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the pump and wait for it. Returns the error that stopped it
    /// early, if any.
    pub fn stop(mut self) -> SimResult<()> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> SimResult<()> {
        self.stop.store(true, Ordering::Release);
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };
        thread.thread().unpark();
        thread.join().map_err(|_| SimError::PumpPoisoned)?
    }
}

impl Drop for PumpHandle {
    fn drop(&mut self) {
        if let Err(err) = self.shutdown() {
            log::warn!("pump exited with error: {err}");
        }
    }
}
