//! Ctrl+C handling for the CLI.
//!
//! The process keeps running after the first interrupt so the active run can
//! stop at its next action boundary and record a cancelled history entry.

use crate::{Error, Result};
use std::sync::OnceLock;

static HANDLER_SET: OnceLock<()> = OnceLock::new();

/// Install `on_interrupt` as the process-wide SIGINT handler.
///
/// Only the first call installs anything; later calls return `Ok(())` and
/// drop their callback.
pub fn install_interrupt_handler<F>(on_interrupt: F) -> Result<()>
where
    F: Fn() + Send + 'static,
{
    if HANDLER_SET.get().is_some() {
        return Ok(());
    }

    ctrlc::set_handler(move || {
        log::info!("Interrupt received, cancelling backup");
        on_interrupt();
    })
    .map_err(|e| Error::InterruptHandler(e.to_string()))?;

    let _ = HANDLER_SET.set(());
    Ok(())
}
