use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Install the stderr fmt subscriber. `RUST_LOG` overrides the default filter.
/// Safe to call more than once; later calls are no-ops.
pub fn init(verbose: bool) {
    let default_filter = if verbose {
        "dispatch_qr_scanner_lib=debug,scan_cli=debug,dump_excel=debug"
    } else {
        "dispatch_qr_scanner_lib=info,scan_cli=info,dump_excel=info"
    };

    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();
}
