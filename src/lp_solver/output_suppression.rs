//! Control of solver console output
//!
//! Backends such as CBC print their search log straight to the process stdout. A solve
//! either lets that log through, usually while a [`LogCapture`] sends it into a report
//! file, or holds a [`SilenceGuard`] while the backend runs. Trial solves of conflict
//! refinement are always silenced.
//!
//! `gag` allows a single live gag or redirect per stream per process, so stdout has one
//! owner at a time. Silence guards share one reference-counted [`Gag`]: the first guard
//! creates it, later guards reuse it, and the stream is restored once the last guard is
//! dropped. A capture waits until no guard is alive, and guards wait while a capture is
//! alive. A thread must not hold a guard and a capture at once.

use gag::{Gag, Redirect};
use std::fs::File;
use std::io::{self, Write};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError, Weak};

/// Keeps stdout silenced for as long as it lives.
pub struct SilenceGuard {
    gag: Option<Arc<Gag>>,
}

impl SilenceGuard {
    /// Silence stdout, sharing the gag with any other live guard.
    pub fn stdout() -> io::Result<Self> {
        let mut state = STDOUT.wait_while(|state| state.captured);

        if let Some(gag) = state.gag.upgrade() {
            return Ok(SilenceGuard { gag: Some(gag) });
        }

        let gag = Arc::new(Gag::stdout()?);
        state.gag = Arc::downgrade(&gag);
        Ok(SilenceGuard { gag: Some(gag) })
    }
}

impl Drop for SilenceGuard {
    fn drop(&mut self) {
        // The last guard restores stdout here, before waiting captures are woken
        drop(self.gag.take());
        STDOUT.release();
    }
}

/// Sends everything written to stdout into a file for as long as it lives.
///
/// The file descriptor is duplicated, so writes land at the current end of whatever
/// the caller already wrote through its own handle.
pub struct LogCapture {
    redirect: Option<Redirect<File>>,
}

impl LogCapture {
    pub fn stdout_into(file: &File) -> io::Result<Self> {
        let target = file.try_clone()?;
        let mut state =
            STDOUT.wait_while(|state| state.captured || state.gag.upgrade().is_some());

        io::stdout().flush()?;
        let redirect = Redirect::stdout(target).map_err(|e| e.error)?;
        state.captured = true;

        Ok(LogCapture {
            redirect: Some(redirect),
        })
    }
}

impl Drop for LogCapture {
    fn drop(&mut self) {
        // Nothing buffered may leak past the redirect
        let _ = io::stdout().flush();
        drop(self.redirect.take());

        STDOUT.lock().captured = false;
        STDOUT.release();
    }
}

/// Who currently owns the process stdout.
struct StdoutState {
    gag: Weak<Gag>,
    captured: bool,
}

struct StdoutOwner {
    state: Mutex<StdoutState>,
    released: Condvar,
}

impl StdoutOwner {
    const fn new() -> Self {
        Self {
            state: Mutex::new(StdoutState {
                gag: Weak::new(),
                captured: false,
            }),
            released: Condvar::new(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StdoutState> {
        // A panic while holding the lock cannot leave the state half-written
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait_while(
        &self,
        busy: impl FnMut(&mut StdoutState) -> bool,
    ) -> MutexGuard<'_, StdoutState> {
        self.released
            .wait_while(self.lock(), busy)
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn release(&self) {
        // Taking the lock orders the wake-up after any waiter's last check
        drop(self.lock());
        self.released.notify_all();
    }
}

static STDOUT: StdoutOwner = StdoutOwner::new();
