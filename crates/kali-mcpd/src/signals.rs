//! Interrupt handling.
//!
//! The transport loop blocks on stdin, so interrupts are observed on a
//! dedicated listener thread. On `SIGINT` or `SIGTERM` the listener kills
//! any in-flight child process group and exits the server with success
//! status.

use std::io;
use std::os::raw::c_int;
use std::process;
use std::thread;

use signal_hook::consts::signal::{SIGINT, SIGTERM};
use signal_hook::iterator::{Handle, Signals};
use thiserror::Error;
use tracing::info;

/// Tracing target for signal handling.
pub(crate) const SIGNALS_TARGET: &str = "kali_mcpd::signals";

/// Signals that stop the server.
pub const SHUTDOWN_SIGNALS: [c_int; 2] = [SIGINT, SIGTERM];

/// Errors reported while installing signal listeners.
#[derive(Debug, Error)]
pub enum SignalError {
    /// Registering the signal handlers failed.
    #[error("failed to install signal handlers: {source}")]
    Install {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The listener thread could not be spawned.
    #[error("failed to spawn signal listener: {source}")]
    Spawn {
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
}

/// Keeps a signal listener registered.
///
/// Dropping the handle leaves the listener running; call
/// [`SignalListener::close`] to stop it.
#[derive(Debug)]
pub struct SignalListener {
    handle: Handle,
}

impl SignalListener {
    /// Stops delivering signals to the callback.
    pub fn close(&self) {
        self.handle.close();
    }
}

/// Installs the production interrupt behaviour.
///
/// # Errors
///
/// Returns a [`SignalError`] when the handlers or the listener thread
/// cannot be set up.
pub fn install() -> Result<SignalListener, SignalError> {
    listen(&SHUTDOWN_SIGNALS, |signal| {
        info!(target: SIGNALS_TARGET, signal, "interrupt received, shutting down");
        kali_exec::terminate_active();
        process::exit(0);
    })
}

/// Runs `callback` on a listener thread for every delivery of `signals`.
///
/// # Errors
///
/// Returns a [`SignalError`] when the handlers or the listener thread
/// cannot be set up.
pub fn listen<F>(signals: &[c_int], callback: F) -> Result<SignalListener, SignalError>
where
    F: Fn(c_int) + Send + 'static,
{
    let mut signals = Signals::new(signals).map_err(|source| SignalError::Install { source })?;
    let handle = signals.handle();

    thread::Builder::new()
        .name(String::from("kali-mcpd-signals"))
        .spawn(move || {
            for signal in signals.forever() {
                callback(signal);
            }
        })
        .map_err(|source| SignalError::Spawn { source })?;

    Ok(SignalListener { handle })
}

#[cfg(test)]
mod tests {
    use std::sync::mpsc;
    use std::time::Duration;

    use signal_hook::consts::signal::SIGUSR1;
    use signal_hook::low_level::raise;

    use super::*;

    #[test]
    fn delivers_signals_to_the_callback() {
        let (sender, receiver) = mpsc::channel();
        let listener = listen(&[SIGUSR1], move |signal| {
            sender.send(signal).ok();
        })
        .expect("install listener");

        raise(SIGUSR1).expect("raise signal");

        let received = receiver
            .recv_timeout(Duration::from_secs(5))
            .expect("signal should be delivered");
        assert_eq!(received, SIGUSR1);
        listener.close();
    }
}
