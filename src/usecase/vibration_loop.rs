use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arc_swap::ArcSwap;
use crossbeam_channel::{bounded, select, Receiver, Sender};
use log::{error, info};
use rand::Rng;

use crate::domain::errors::{DriverError, VibrationError};
use crate::domain::interfaces::{IntensityProvider, VibrationDriver};
use crate::domain::models::{ControllerHandle, LoopState, MotorLevels, VibrationPattern};
use crate::domain::patterns::virtual_time;
use crate::usecase::notices::{Notice, NoticeLog};

/// Snapshot of the loop for UI consumption.
#[derive(Debug, Clone, Default)]
pub struct VibrationStatus {
    pub state: LoopState,
    pub controller: Option<ControllerHandle>,
    pub pattern: VibrationPattern,
    pub last_levels: MotorLevels,
    pub virtual_time: f64,
    pub ticks: u64,
}

/// Cross-thread Stopped/Running cell.
#[derive(Debug, Default)]
struct RunState(AtomicBool);

impl RunState {
    fn is_running(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn try_start(&self) -> bool {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Only the caller that wins this transition performs the final zero write.
    fn try_stop(&self) -> bool {
        self.0
            .compare_exchange(true, false, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

struct Worker {
    controller: ControllerHandle,
    handle: JoinHandle<()>,
    // Dropping the sender wakes the loop out of its tick wait.
    wake_tx: Sender<()>,
}

impl Worker {
    fn join(self) {
        drop(self.wake_tx);
        if let Err(e) = self.handle.join() {
            error!("Vibration loop panicked: {:?}", e);
        }
    }
}

/// Owns the vibration loop thread and its start/stop lifecycle.
///
/// At most one loop runs at a time. `stop` blocks until the loop thread has
/// exited and then sends a final (0, 0) write, so once it returns the
/// controller is at rest.
pub struct VibrationController<D: VibrationDriver + 'static> {
    driver: Arc<D>,
    tick_interval: Duration,
    run_state: Arc<RunState>,
    worker: Mutex<Option<Worker>>,
    status: Arc<ArcSwap<VibrationStatus>>,
    notices: NoticeLog,
}

impl<D: VibrationDriver + 'static> VibrationController<D> {
    pub fn new(driver: Arc<D>, tick_interval: Duration, notice_tx: Sender<Notice>) -> Self {
        Self {
            driver,
            tick_interval,
            run_state: Arc::new(RunState::default()),
            worker: Mutex::new(None),
            status: Arc::new(ArcSwap::from_pointee(VibrationStatus::default())),
            notices: NoticeLog::new(notice_tx),
        }
    }

    pub fn driver(&self) -> &Arc<D> {
        &self.driver
    }

    pub fn is_running(&self) -> bool {
        self.run_state.is_running()
    }

    pub fn state(&self) -> LoopState {
        if self.is_running() {
            LoopState::Running
        } else {
            LoopState::Stopped
        }
    }

    pub fn status(&self) -> Arc<VibrationStatus> {
        self.status.load_full()
    }

    pub fn list_connected_controllers(&self) -> Vec<ControllerHandle> {
        self.driver.list_connected_controllers()
    }

    pub fn start(
        &self,
        controller: Option<ControllerHandle>,
        pattern: VibrationPattern,
        intensity: Arc<dyn IntensityProvider>,
    ) -> Result<(), VibrationError> {
        let mut worker = self.lock_worker();

        if self.run_state.is_running() {
            self.notices.info("Vibration is already running.");
            return Err(VibrationError::AlreadyRunning);
        }

        let Some(controller) = controller else {
            self.notices.warn("No controller selected.");
            return Err(VibrationError::InvalidSelection);
        };

        // A loop that stopped itself after a driver failure still has to be joined.
        if let Some(stale) = worker.take() {
            stale.join();
        }

        if !self.run_state.try_start() {
            self.notices.info("Vibration is already running.");
            return Err(VibrationError::AlreadyRunning);
        }

        self.status.store(Arc::new(VibrationStatus {
            state: LoopState::Running,
            controller: Some(controller),
            pattern,
            ..VibrationStatus::default()
        }));
        self.notices.info(format!("Starting {} vibration on {}", pattern, controller));

        let (wake_tx, wake_rx) = bounded(0);
        let pattern_loop = PatternLoop {
            driver: self.driver.clone(),
            intensity,
            controller,
            pattern,
            tick_interval: self.tick_interval,
            run_state: self.run_state.clone(),
            wake_rx,
            status: self.status.clone(),
            notices: self.notices.clone(),
            tick: 0,
        };

        let handle = thread::spawn(move || {
            pattern_loop.run();
        });

        *worker = Some(Worker {
            controller,
            handle,
            wake_tx,
        });
        Ok(())
    }

    pub fn stop(&self) -> Result<(), VibrationError> {
        let mut worker = self.lock_worker();

        if !self.run_state.try_stop() {
            if let Some(stale) = worker.take() {
                stale.join();
            }
            self.notices.info("Vibration is already stopped.");
            return Err(VibrationError::AlreadyStopped);
        }

        // Running is only ever set together with a stored worker.
        let Some(current) = worker.take() else {
            return Ok(());
        };
        let controller = current.controller;
        current.join();

        rest_controller(self.driver.as_ref(), controller, &self.notices, &self.status);
        Ok(())
    }

    /// Stops a running loop without reporting a redundant stop.
    pub fn shutdown(&self) {
        if self.is_running() {
            let _ = self.stop();
        } else if let Some(stale) = self.lock_worker().take() {
            stale.join();
        }
    }

    fn lock_worker(&self) -> MutexGuard<'_, Option<Worker>> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<D: VibrationDriver + 'static> Drop for VibrationController<D> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Final (0, 0) write after the loop has ended. A failure is reported, not retried.
fn rest_controller<D: VibrationDriver + ?Sized>(
    driver: &D,
    controller: ControllerHandle,
    notices: &NoticeLog,
    status: &ArcSwap<VibrationStatus>,
) {
    notices.info(format!("Stopping vibration of {}", controller));

    let mut next = VibrationStatus::clone(&status.load());
    next.state = LoopState::Stopped;
    match driver.set_vibration(controller, MotorLevels::OFF) {
        Ok(()) => next.last_levels = MotorLevels::OFF,
        Err(e) => notices.error(format!("Error: {}", e)),
    }
    status.store(Arc::new(next));
}

struct PatternLoop<D: VibrationDriver + 'static> {
    driver: Arc<D>,
    intensity: Arc<dyn IntensityProvider>,
    controller: ControllerHandle,
    pattern: VibrationPattern,
    tick_interval: Duration,
    run_state: Arc<RunState>,
    wake_rx: Receiver<()>,
    status: Arc<ArcSwap<VibrationStatus>>,
    notices: NoticeLog,
    tick: u64,
}

impl<D: VibrationDriver + 'static> PatternLoop<D> {
    fn run(mut self) {
        info!("Vibration loop started ({}, {})", self.controller, self.pattern);
        let mut rng = rand::thread_rng();

        while self.run_state.is_running() {
            if let Err(e) = self.tick(&mut rng) {
                self.notices.error(format!("Error: {}", e));
                // A concurrent stop() that already cleared the flag does the final write itself.
                if self.run_state.try_stop() {
                    rest_controller(self.driver.as_ref(), self.controller, &self.notices, &self.status);
                }
                break;
            }

            select! {
                recv(self.wake_rx) -> _woken => {},
                default(self.tick_interval) => {},
            }
        }

        info!("Vibration loop exited after {} ticks", self.tick);
    }

    fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<MotorLevels, DriverError> {
        let t = virtual_time(self.tick);
        let manual = self.intensity.manual_levels();
        let levels = self.pattern.levels_at(t, manual, rng);

        self.driver.set_vibration(self.controller, levels)?;

        self.tick += 1;
        self.status.store(Arc::new(VibrationStatus {
            state: LoopState::Running,
            controller: Some(self.controller),
            pattern: self.pattern,
            last_levels: levels,
            virtual_time: t,
            ticks: self.tick,
        }));
        Ok(levels)
    }
}
