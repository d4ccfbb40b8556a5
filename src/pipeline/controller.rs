use super::clock::Clock;
use super::cycle::{CycleOutcome, InferenceCycle};
use super::gate::ThrottleGate;
use super::state::{PublishedState, SharedState};
use crate::detection::FaceDetector;
use crate::estimation::AgeModel;
use anyhow::{Context, Result};
use image::RgbImage;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::mpsc::{self, SyncSender, TrySendError};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Result of handing a frame to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// A cycle was started for this frame
    Accepted,
    /// Arrived within the minimum interval of the last processed frame
    Throttled,
    /// A cycle is still running
    Busy,
    /// The worker has stopped
    Closed,
}

struct AdmissionState {
    gate: ThrottleGate,
    busy: Arc<AtomicBool>,
}

/// Clears the busy flag when a cycle ends, on every exit path
struct BusyGuard(Arc<AtomicBool>);

impl Drop for BusyGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Throttles incoming frames and runs at most one inference cycle at a time
/// on a dedicated worker thread.
pub struct PipelineController<K> {
    clock: K,
    admission: Mutex<AdmissionState>,
    sender: Option<SyncSender<RgbImage>>,
    worker: Option<JoinHandle<()>>,
    state: Arc<SharedState>,
    completed: Arc<AtomicU64>,
}

impl<K: Clock> PipelineController<K> {
    pub fn spawn<D, M>(cycle: InferenceCycle<D, M>, min_interval: Duration, clock: K) -> Result<Self>
    where
        D: FaceDetector + 'static,
        M: AgeModel + 'static,
    {
        let state = Arc::clone(cycle.state());
        let busy = Arc::new(AtomicBool::new(false));
        let completed = Arc::new(AtomicU64::new(0));

        // Capacity 1: the busy flag already guarantees nothing waits behind a cycle
        let (sender, receiver) = mpsc::sync_channel::<RgbImage>(1);

        let worker = {
            let busy = Arc::clone(&busy);
            let completed = Arc::clone(&completed);
            let mut cycle = cycle;
            thread::Builder::new()
                .name("age-inference".into())
                .spawn(move || {
                    tracing::debug!("Inference worker started");
                    for frame in receiver {
                        let busy_guard = BusyGuard(Arc::clone(&busy));
                        let outcome =
                            panic::catch_unwind(AssertUnwindSafe(|| cycle.run(&frame)));
                        drop(frame);
                        match outcome {
                            Ok(CycleOutcome::Published(prediction)) => {
                                tracing::debug!("Published age {}", prediction.age);
                            }
                            Ok(_) => {}
                            Err(_) => tracing::error!("Inference cycle panicked, frame skipped"),
                        }
                        drop(busy_guard);
                        completed.fetch_add(1, Ordering::AcqRel);
                    }
                    tracing::debug!("Inference worker stopped");
                })
                .context("Failed to spawn inference worker")?
        };

        Ok(Self {
            clock,
            admission: Mutex::new(AdmissionState {
                gate: ThrottleGate::new(min_interval),
                busy,
            }),
            sender: Some(sender),
            worker: Some(worker),
            state,
            completed,
        })
    }

    /// Offer a frame. Frames that are not admitted are dropped immediately.
    pub fn submit(&self, frame: RgbImage) -> Admission {
        let Some(sender) = self.sender.as_ref() else {
            return Admission::Closed;
        };

        let mut admission = self.admission.lock().unwrap_or_else(|e| e.into_inner());
        let now = self.clock.now();

        if !admission.gate.is_open(now) {
            return Admission::Throttled;
        }
        if admission
            .busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Admission::Busy;
        }

        match sender.try_send(frame) {
            Ok(()) => {
                admission.gate.mark(now);
                Admission::Accepted
            }
            Err(TrySendError::Full(_)) => {
                // Only reachable while the worker is between cycles
                admission.busy.store(false, Ordering::Release);
                Admission::Busy
            }
            Err(TrySendError::Disconnected(_)) => {
                admission.busy.store(false, Ordering::Release);
                tracing::warn!("Inference worker is gone, dropping frame");
                Admission::Closed
            }
        }
    }

    pub fn state(&self) -> &Arc<SharedState> {
        &self.state
    }

    pub fn snapshot(&self) -> PublishedState {
        self.state.snapshot()
    }

    /// Whether a cycle is currently running
    pub fn is_busy(&self) -> bool {
        self.admission
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .busy
            .load(Ordering::Acquire)
    }

    /// Number of cycles that have run to completion
    pub fn completed_cycles(&self) -> u64 {
        self.completed.load(Ordering::Acquire)
    }

    /// Stop accepting frames and wait for the in-flight cycle to finish
    pub fn shutdown(mut self) -> PublishedState {
        self.stop();
        self.state.snapshot()
    }

    fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                tracing::error!("Inference worker panicked");
            }
        }
    }
}

impl<K> Drop for PipelineController<K> {
    fn drop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
