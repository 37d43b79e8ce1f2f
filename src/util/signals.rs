//! Signal forwarding to the running driver
//!
//! The driver runs in its own process group, so a Ctrl-C on the terminal
//! reaches only nbacross. SIGINT, SIGTERM and SIGHUP sent to nbacross are
//! passed on to the driver's group: the first one as SIGINT so the driver
//! can report what it has, any later one as SIGKILL. nbacross keeps relaying
//! until the driver has exited, so the driver never outlives it.
//!
//! The handler is installed before the driver is spawned. A signal that
//! lands between spawn and `track` is held and delivered by `track`.

use std::sync::{Mutex, MutexGuard, Once, PoisonError};

static STATE: Mutex<State> = Mutex::new(State::IDLE);
static INSTALL: Once = Once::new();

/// What to send to the driver's group
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Forward {
    Interrupt,
    Kill,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Send(u32, Forward),
    Hold,
    Exit,
}

#[derive(Debug)]
struct State {
    /// Process group of the running child
    child: Option<u32>,
    /// Between `arm` and `track`
    launching: bool,
    pending: bool,
    received: u32,
}

impl State {
    const IDLE: State = State {
        child: None,
        launching: false,
        pending: false,
        received: 0,
    };

    fn arm(&mut self) {
        *self = State {
            launching: true,
            ..State::IDLE
        };
    }

    fn track(&mut self, pid: u32) -> Option<Action> {
        self.child = Some(pid);
        self.launching = false;
        std::mem::take(&mut self.pending).then(|| Action::Send(pid, self.escalation()))
    }

    fn untrack(&mut self) {
        *self = State::IDLE;
    }

    fn on_signal(&mut self) -> Action {
        self.received += 1;
        match self.child {
            Some(pid) => Action::Send(pid, self.escalation()),
            None if self.launching => {
                self.pending = true;
                Action::Hold
            }
            None => Action::Exit,
        }
    }

    fn escalation(&self) -> Forward {
        if self.received <= 1 {
            Forward::Interrupt
        } else {
            Forward::Kill
        }
    }
}

fn state() -> MutexGuard<'static, State> {
    STATE.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Make the child lead a new process group
#[cfg(unix)]
pub fn own_process_group(cmd: &mut std::process::Command) {
    use std::os::unix::process::CommandExt;
    cmd.process_group(0);
}

/// Install the handler and hold signals until `track`; call before spawning
pub fn arm() {
    INSTALL.call_once(|| {
        if let Err(e) = ctrlc::set_handler(on_signal) {
            tracing::debug!(error = %e, "signal forwarding unavailable");
        }
    });
    state().arm();
}

/// Start forwarding to the group led by `pid`
pub fn track(pid: u32) {
    let action = state().track(pid);
    if let Some(action) = action {
        perform(action);
    }
}

/// Stop forwarding; the child has exited or never started
pub fn untrack() {
    state().untrack();
}

fn on_signal() {
    let action = state().on_signal();
    perform(action);
}

fn perform(action: Action) {
    match action {
        Action::Send(pid, forward) => {
            tracing::debug!(pid, ?forward, "forwarding signal to driver");
            #[cfg(unix)]
            {
                let signal = match forward {
                    Forward::Interrupt => libc::SIGINT,
                    Forward::Kill => libc::SIGKILL,
                };
                // SAFETY: killpg only sends a signal; the group id came from spawn
                unsafe {
                    libc::killpg(pid as libc::pid_t, signal);
                }
            }
        }
        Action::Hold => {}
        // Nothing running; behave like an unhandled Ctrl-C
        Action::Exit => std::process::exit(130),
    }
}
