use std::panic;
use std::path::PathBuf;
use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::EnvFilter;

// Keeps the non-blocking writer alive for the process lifetime.
static FILE_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

fn env_truthy(name: &str) -> bool {
    std::env::var(name)
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false)
}

/// Route panics through `tracing::error!` so score computations that blow
/// up inside worker tasks still land in the structured log stream.
/// Idempotent; the hook is installed once per process. Set
/// `TM_LOG_INCLUDE_BACKTRACE=1` to chain into the default hook as well.
pub fn install_panic_hook(service: &'static str) {
    static ONCE: OnceLock<()> = OnceLock::new();

    ONCE.get_or_init(|| {
        let previous = panic::take_hook();
        let chain_default = env_truthy("TM_LOG_INCLUDE_BACKTRACE");

        panic::set_hook(Box::new(move |info| {
            let location = info
                .location()
                .map(|loc| format!("{}:{}", loc.file(), loc.line()))
                .unwrap_or_else(|| "unknown".into());
            let message = info
                .payload()
                .downcast_ref::<&str>()
                .map(|s| (*s).to_string())
                .or_else(|| info.payload().downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".into());

            tracing::error!(service, %location, panic_message = %message, "panic captured");

            if chain_default {
                previous(info);
            }
        }));
    });
}

fn daily_file_writer(service: &'static str) -> Option<BoxMakeWriter> {
    let dir = PathBuf::from(std::env::var_os("TM_LOG_DIR")?);
    if let Err(err) = std::fs::create_dir_all(&dir) {
        eprintln!("talentmatch: cannot create TM_LOG_DIR ({err}); logging to stdout");
        return None;
    }

    let (writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(dir, format!("{service}.log")));
    let _ = FILE_GUARD.set(guard);
    Some(BoxMakeWriter::new(writer))
}

/// Initialize the tracing subscriber for a service embedding this crate.
///
/// `RUST_LOG` controls filtering (default `info`). With `TM_LOG_DIR` set,
/// output rotates daily into `<TM_LOG_DIR>/<service>.log`; otherwise it
/// goes to stdout. Also installs the panic hook.
pub fn init(service: &'static str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    let initialized = match daily_file_writer(service) {
        Some(writer) => builder.with_writer(writer).try_init(),
        None => builder.try_init(),
    };
    // try_init fails when the host already set a subscriber; that is fine.
    let _ = initialized;

    install_panic_hook(service);
}
