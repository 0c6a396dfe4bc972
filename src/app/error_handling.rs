//! Error handling utilities

use tracing::debug;

use crate::error::TrellisError;

/// Report a fatal error on stderr and exit with its status code
///
/// `TrellisError` values print their user message, plus the full source
/// chain when `verbose >= 1`. Anything else exits with 1.
pub fn handle_fatal_error(error: anyhow::Error, verbose: u8) -> ! {
    debug!("Fatal error: {:#}", error);

    let exit_code = if let Some(err) = error.downcast_ref::<TrellisError>() {
        eprintln!("{}", err.user_message());

        if verbose >= 1 {
            eprintln!("\nContext Chain:\n{}", err.developer_message());
        }

        err.exit_code()
    } else {
        eprintln!("Error: {error}");

        if verbose >= 1 {
            eprintln!("\nError chain:");
            for (i, cause) in error.chain().enumerate() {
                eprintln!("  {i}: {cause}");
            }
        }

        1
    };

    std::process::exit(exit_code)
}
