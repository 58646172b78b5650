
use log::{debug, warn};
use shared::error::{Error, Result};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// TimerHandler is the host-supplied callback through which transports ask
/// for the periodic timer pump to be started or stopped.
///
/// `on` starts (or retargets) the host's periodic timer with the given
/// interval in milliseconds; `!on` stops it. While the timer runs the host
/// must call [`Runtime::tick`] with the milliseconds elapsed between
/// invocations, otherwise retransmission and partial-reliability expiry
/// silently degrade.
pub type TimerHandler = Rc<dyn Fn(bool, u16) -> Result<()>>;

/// TransportEngine is the process-wide face of the underlying transport
/// implementation: one-time bring-up and teardown plus the timer-advance
/// entry point that drives its retransmission and expiry clocks.
pub trait TransportEngine {
    /// Brings the engine up. Invoked for the first transport acquiring the
    /// engine.
    fn start(&self) -> Result<()>;

    /// Tears the engine down. Invoked when the last transport releases the
    /// engine.
    fn stop(&self);

    /// Advances the engine's internal timers by `delta` milliseconds.
    fn advance_time(&self, delta: i32);
}

/// ReentrantGuard tracks upcall nesting on the runtime's thread.
///
/// An upcall delivered by the transport may call back into this layer
/// before it returns (a message handler calling `send`, for example). The
/// guard accounts for such nested reentry on one thread; it serializes, it
/// does not make the layer safe for concurrent calls from multiple
/// threads.
#[derive(Default)]
pub struct ReentrantGuard {
    depth: Cell<u32>,
}

impl ReentrantGuard {
    /// Enters the guard for the duration of the returned scope.
    pub fn enter(&self) -> GuardScope<'_> {
        self.depth.set(self.depth.get() + 1);
        GuardScope { guard: self }
    }

    /// Current upcall nesting depth. Zero outside any upcall.
    pub fn depth(&self) -> u32 {
        self.depth.get()
    }
}

/// GuardScope marks one level of upcall nesting; dropping it exits the
/// guard.
pub struct GuardScope<'a> {
    guard: &'a ReentrantGuard,
}

impl Drop for GuardScope<'_> {
    fn drop(&mut self) {
        self.guard.depth.set(self.guard.depth.get() - 1);
    }
}

/// Runtime is the explicitly passed context bracketing all use of the
/// channel layer: it owns the host timer handler, the upcall reentrancy
/// guard and the bring-up reference count of the underlying transport
/// engine.
///
/// One runtime serves any number of transports over the same engine; the
/// engine is started on the first acquire and stopped on the last release.
pub struct Runtime {
    timer_handler: RefCell<Option<TimerHandler>>,
    engine: Rc<dyn TransportEngine>,
    engine_refs: Cell<u32>,
    guard: ReentrantGuard,
}

impl Runtime {
    /// Creates a runtime around `engine`. Must be called before any other
    /// use of the layer; transports request the timer pump through
    /// [`Runtime::request_timer`] once they need it running.
    pub fn new(engine: Rc<dyn TransportEngine>, timer_handler: TimerHandler) -> Rc<Self> {
        Rc::new(Self {
            timer_handler: RefCell::new(Some(timer_handler)),
            engine,
            engine_refs: Cell::new(0),
            guard: ReentrantGuard::default(),
        })
    }

    /// Closes the runtime: drops the timer handler and stops the engine if
    /// any transport still holds it. Outstanding channels are the caller's
    /// responsibility to close beforehand; teardown is best-effort and
    /// never fails.
    pub fn close(&self) {
        if self.guard.depth() != 0 {
            warn!(
                "closing runtime from within an upcall (depth {})",
                self.guard.depth()
            );
        }

        self.timer_handler.borrow_mut().take();

        if self.engine_refs.replace(0) > 0 {
            self.engine.stop();
        }
    }

    /// Handles a timer tick: forwards the milliseconds elapsed since the
    /// previous tick to the engine's timer-advance routine.
    ///
    /// The engine accepts a narrower signed interval; a larger `delta` is
    /// clamped, never wrapped.
    pub fn tick(&self, delta: u64) {
        self.engine.advance_time(delta.min(i32::MAX as u64) as i32);
    }

    /// Asks the host to start or stop the periodic timer. Transports call
    /// this when their first channel needs the clocks moving and when the
    /// last one goes away.
    pub fn request_timer(&self, on: bool, interval_ms: u16) -> Result<()> {
        let handler = self.timer_handler.borrow().clone();
        match handler {
            Some(handler) => handler(on, interval_ms),
            None => Err(Error::ErrRuntimeClosed),
        }
    }

    /// Acquires the underlying engine, starting it on the first acquire.
    /// Every transport instance pairs this with
    /// [`Runtime::release_engine`].
    pub fn acquire_engine(&self) -> Result<()> {
        if self.timer_handler.borrow().is_none() {
            return Err(Error::ErrRuntimeClosed);
        }

        let refs = self.engine_refs.get();
        if refs == 0 {
            if let Err(err) = self.engine.start() {
                warn!("transport engine start failed: {err}");
                return Err(Error::ErrInitializeFailed);
            }
            debug!("transport engine started");
        }
        self.engine_refs.set(refs + 1);
        Ok(())
    }

    /// Releases the engine, stopping it when the last transport lets go.
    pub fn release_engine(&self) {
        let refs = self.engine_refs.get();
        if refs == 0 {
            warn!("transport engine released more often than acquired");
            return;
        }

        self.engine_refs.set(refs - 1);
        if refs == 1 {
            self.engine.stop();
            debug!("transport engine stopped");
        }
    }

    /// Enters the upcall guard. Transports hold the returned scope while
    /// delivering upcalls so nested reentry is accounted for.
    pub fn upcall_scope(&self) -> GuardScope<'_> {
        self.guard.enter()
    }

    /// Current upcall nesting depth.
    pub fn upcall_depth(&self) -> u32 {
        self.guard.depth()
    }

    /// Number of transports currently holding the engine.
    pub fn engine_refs(&self) -> u32 {
        self.engine_refs.get()
    }
}
