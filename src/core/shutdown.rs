//! # OS termination signals.
//!
//! [`wait_for_shutdown_signal`] completes with the name of the first
//! termination signal the process receives. Bringup treats it exactly like
//! [`LauncherHandle::shutdown`](super::LauncherHandle::shutdown).
//!
//! | Platform | Signals                         |
//! |----------|---------------------------------|
//! | unix     | `SIGINT`, `SIGTERM`, `SIGQUIT`  |
//! | other    | Ctrl-C                          |

use std::io;

/// Waits for a termination signal and returns its name.
///
/// Fails if the listeners cannot be registered.
#[cfg(unix)]
pub(super) async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    use tokio::signal::unix::{SignalKind, signal};

    let mut interrupt = signal(SignalKind::interrupt())?;
    let mut terminate = signal(SignalKind::terminate())?;
    let mut quit = signal(SignalKind::quit())?;

    let name = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
        _ = quit.recv() => "SIGQUIT",
    };
    Ok(name)
}

/// Waits for Ctrl-C.
#[cfg(not(unix))]
pub(super) async fn wait_for_shutdown_signal() -> io::Result<&'static str> {
    tokio::signal::ctrl_c().await?;
    Ok("ctrl_c")
}
