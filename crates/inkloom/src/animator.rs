//! The frame loop thread and its host-facing lifecycle.
//!
//! ## Rust Lesson #12: Sharing State Between Threads
//!
//! `Arc<Mutex<T>>` is the workhorse: `Arc` lets several threads own the
//! same value, `Mutex` makes sure only one of them touches it at a time.
//! The lock guard releases itself when it goes out of scope, so there is
//! no unlock call to forget.
//!
//! ```rust,ignore
//! let frame = {
//!     let mut scene = scene.lock()?; // blocks until we own it
//!     scene.step(dt);
//!     scene.snapshot()
//! }; // guard dropped here, lock released
//! sink.present(&frame); // slow work happens outside the lock
//! ```
//!
//! The compositor (both layers plus every player) sits behind a single
//! mutex. The loop thread takes it once per frame; `on_resize` takes it
//! to rebuild everything. A resize can therefore never observe half a
//! frame. Once the loop has been joined, `on_close` takes the compositor
//! out of the mutex and drops it, which frees both raster layers.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use log::{debug, error, info, warn};

use crate::catalog::PatternCatalog;
use crate::compositor::{CompositorSettings, FrameCompositor};
use crate::config::DoodleConfig;
use crate::error::{DoodleError, Result};
use crate::present::{Frame, NullSink, PresentationSink};
use crate::timing::{FixedRefreshRate, FramePacer, RefreshRateProvider, resolve_refresh_rate};

/// Name of the frame loop thread.
pub const FRAME_LOOP_THREAD: &str = "inkloom-frame-loop";

/// Everything `Animator::initialize` needs besides the canvas size.
pub struct AnimatorOptions {
    pub config: DoodleConfig,
    pub catalog: Arc<dyn PatternCatalog>,
    /// Consulted only when the config doesn't pin a refresh rate.
    pub refresh_rate: Box<dyn RefreshRateProvider>,
    pub sink: Box<dyn PresentationSink>,
}

impl AnimatorOptions {
    /// Options with no display rate (60 Hz unless configured) and no sink.
    pub fn new(config: DoodleConfig, catalog: Arc<dyn PatternCatalog>) -> Self {
        Self {
            config,
            catalog,
            refresh_rate: Box::new(FixedRefreshRate(None)),
            sink: Box::new(NullSink),
        }
    }

    /// Build options from the config alone, loading its layout.
    pub fn from_config(config: DoodleConfig) -> Result<Self> {
        let catalog = config.layout.to_catalog()?;
        Ok(Self::new(config, catalog))
    }

    pub fn with_sink(mut self, sink: impl PresentationSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn with_refresh_rate(mut self, provider: impl RefreshRateProvider + 'static) -> Self {
        self.refresh_rate = Box::new(provider);
        self
    }
}

/// Runs a compositor on its own thread at the display refresh rate.
///
/// Every method takes `&self` and may be called from any thread.
pub struct Animator {
    /// `None` after a completed `on_close`.
    scene: Arc<Mutex<Option<FrameCompositor>>>,
    running: Arc<AtomicBool>,
    worker: Mutex<Option<JoinHandle<()>>>,
    latest: Arc<Mutex<Option<Frame>>>,
    join_timeout: Duration,
    refresh_rate: u32,
}

impl Animator {
    /// Build the scene for a `width` x `height` surface and start the loop.
    pub fn initialize(width: u32, height: u32, options: AnimatorOptions) -> Result<Self> {
        let AnimatorOptions {
            config,
            catalog,
            refresh_rate,
            sink,
        } = options;
        config.validate()?;

        let compositor =
            FrameCompositor::new(width, height, catalog, CompositorSettings::from(&config))?;

        let rate = match config.refresh_rate {
            Some(rate) if rate > 0 => rate,
            _ => resolve_refresh_rate(refresh_rate.as_ref()),
        };
        let pacer = FramePacer::new(rate);

        let scene = Arc::new(Mutex::new(Some(compositor)));
        let running = Arc::new(AtomicBool::new(true));
        let latest = Arc::new(Mutex::new(None));

        let worker = {
            let scene = Arc::clone(&scene);
            let running = Arc::clone(&running);
            let latest = Arc::clone(&latest);
            thread::Builder::new()
                .name(FRAME_LOOP_THREAD.to_string())
                .spawn(move || frame_loop(scene, running, latest, sink, pacer))?
        };

        info!(
            "animator started: {}x{} at {} Hz, join timeout {}ms",
            width, height, rate, config.join_timeout_ms
        );

        Ok(Self {
            scene,
            running,
            worker: Mutex::new(Some(worker)),
            latest,
            join_timeout: Duration::from_millis(config.join_timeout_ms),
            refresh_rate: rate,
        })
    }

    /// Rebuild everything for a new surface size. In-progress animation is
    /// discarded.
    ///
    /// Fails with `Closed` once `on_close` has been called.
    pub fn on_resize(&self, width: u32, height: u32) -> Result<()> {
        if !self.is_running() {
            return Err(DoodleError::Closed);
        }
        let mut scene = self.scene()?;
        let compositor = scene.as_mut().ok_or(DoodleError::Closed)?;
        compositor.reinitialize(width, height)?;
        info!("resized to {}x{}", width, height);
        Ok(())
    }

    /// Stop the loop, wait for it at most `join_timeout_ms`, then release
    /// the compositor and its layers.
    ///
    /// Safe to call more than once; later calls return `Ok(())`. On a
    /// timeout the layers stay put, since the loop may still be using them.
    pub fn on_close(&self) -> Result<()> {
        self.running.store(false, Ordering::Release);

        let handle = self
            .worker
            .lock()
            .map_err(|_| DoodleError::LockPoisoned)?
            .take();
        let Some(handle) = handle else {
            return Ok(());
        };

        // Cut the current frame's sleep short.
        handle.thread().unpark();

        let started = Instant::now();
        while !handle.is_finished() {
            if started.elapsed() >= self.join_timeout {
                let waited_ms = self.join_timeout.as_millis() as u64;
                error!("frame loop still running after {}ms, detaching", waited_ms);
                return Err(DoodleError::JoinTimeout { waited_ms });
            }
            thread::sleep(Duration::from_millis(1));
        }

        let joined = handle.join().map_err(|_| {
            error!("frame loop thread panicked");
            DoodleError::WorkerPanicked
        });

        // The loop is gone either way. A panic inside the lock poisons it,
        // but the layers still need freeing.
        let released = self
            .scene
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if released.is_some() {
            debug!("released frame layers");
        }
        joined
    }

    /// Whether the loop thread has been asked to keep going.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    /// The refresh rate the loop is paced to.
    pub fn refresh_rate(&self) -> u32 {
        self.refresh_rate
    }

    /// The most recently produced frame, if any.
    pub fn latest_frame(&self) -> Option<Frame> {
        self.latest.lock().ok().and_then(|frame| frame.clone())
    }

    /// Run `f` against the compositor while holding the scene lock.
    pub fn with_compositor<R>(&self, f: impl FnOnce(&FrameCompositor) -> R) -> Result<R> {
        let scene = self.scene()?;
        scene.as_ref().map(f).ok_or(DoodleError::Closed)
    }

    fn scene(&self) -> Result<MutexGuard<'_, Option<FrameCompositor>>> {
        self.scene.lock().map_err(|_| {
            error!("scene lock poisoned");
            DoodleError::LockPoisoned
        })
    }
}

impl Drop for Animator {
    fn drop(&mut self) {
        if let Err(e) = self.on_close() {
            error!("animator teardown failed: {}", e);
        }
    }
}

fn frame_loop(
    scene: Arc<Mutex<Option<FrameCompositor>>>,
    running: Arc<AtomicBool>,
    latest: Arc<Mutex<Option<Frame>>>,
    mut sink: Box<dyn PresentationSink>,
    pacer: FramePacer,
) {
    info!("frame loop running, dt = {:.4}s", pacer.dt());
    let mut slow_frames: u64 = 0;

    while running.load(Ordering::Acquire) {
        let started = Instant::now();

        let frame = match scene.lock() {
            Ok(mut guard) => match guard.as_mut() {
                Some(compositor) => {
                    compositor.step(pacer.dt());
                    compositor.snapshot()
                }
                None => break,
            },
            Err(_) => {
                error!("scene lock poisoned, stopping frame loop");
                break;
            }
        };

        sink.present(&frame);
        if let Ok(mut slot) = latest.lock() {
            *slot = Some(frame);
        }

        let elapsed = started.elapsed();
        if pacer.is_overrun(elapsed) {
            slow_frames += 1;
            // 1st, 2nd, 4th, 8th... so a slow machine doesn't flood the log.
            if slow_frames.is_power_of_two() {
                warn!(
                    "slow frame: {:?} against a {:?} budget ({} so far)",
                    elapsed,
                    pacer.interval(),
                    slow_frames
                );
            }
        }

        // Sleep off the rest of the interval. No catch-up for slow frames.
        loop {
            let remaining = pacer.sleep_after(started.elapsed());
            if remaining.is_zero() || !running.load(Ordering::Acquire) {
                break;
            }
            thread::park_timeout(remaining);
        }
    }

    info!("frame loop stopped");
}
