use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use console::Term;
use crmsync::CancelFlag;

/// Set up the Ctrl+C handler for graceful shutdown.
///
/// Returns the cancellation flag the sync engine checks between pages and
/// between resource types. The first Ctrl+C flips the flag so the current
/// page and batch finish cleanly; a second Ctrl+C force-quits.
pub(crate) fn setup_shutdown_handler() -> CancelFlag {
    let flag: CancelFlag = Arc::new(AtomicBool::new(false));
    let handler_flag = Arc::clone(&flag);

    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");

        let is_tty = Term::stdout().is_term();
        if is_tty {
            eprintln!("\n\nShutdown requested, finishing current operations...");
            eprintln!("Press Ctrl+C again to force quit.");
        } else {
            tracing::warn!("Shutdown requested, finishing current operations");
        }

        handler_flag.store(true, Ordering::Release);

        // Wait for second Ctrl+C for force quit
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install second Ctrl+C handler");

        if is_tty {
            eprintln!("Force quit!");
        }
        std::process::exit(130);
    });

    flag
}
