use std::fmt::{self, Display, Write as _};
use std::io::{self, IsTerminal};

use chrono::Local;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::{
    EnvFilter,
    fmt::{
        FmtContext,
        format::{FormatEvent, FormatFields, Writer},
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
};

/// Default filter when neither `RUST_LOG` nor a level override is given.
pub const DEFAULT_FILTER: &str = "warn";

/// Single-line event format for the CLI.
///
/// `12:00:00.123  WARN tax_core::calculations::common:48 message field=value`
///
/// Runs are short, so only the wall-clock time is shown. The module path
/// replaces the file name since engine events come from another crate.
struct CliFormat;

const RESET: &str = "\x1b[0m";
const DIM: &str = "\x1b[2m";
const CYAN: &str = "\x1b[36m";

fn level_color(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "\x1b[1;31m",
        Level::WARN => "\x1b[1;33m",
        Level::INFO => "\x1b[1;32m",
        Level::DEBUG => "\x1b[1;34m",
        Level::TRACE => "\x1b[1;35m",
    }
}

/// Writes `text` wrapped in `color` when the writer supports ANSI escapes.
fn paint(
    writer: &mut Writer<'_>,
    color: &str,
    text: impl Display,
) -> fmt::Result {
    if writer.has_ansi_escapes() {
        write!(writer, "{color}{text}{RESET}")
    } else {
        write!(writer, "{text}")
    }
}

impl<S, N> FormatEvent<S, N> for CliFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        paint(&mut writer, DIM, Local::now().format("%H:%M:%S%.3f"))?;
        writer.write_char(' ')?;
        paint(
            &mut writer,
            level_color(meta.level()),
            format_args!("{:>5}", meta.level()),
        )?;
        writer.write_char(' ')?;

        let module = meta.module_path().unwrap_or_else(|| meta.target());
        match meta.line() {
            Some(line) => paint(&mut writer, CYAN, format_args!("{module}:{line}"))?,
            None => paint(&mut writer, CYAN, module)?,
        }
        writer.write_char(' ')?;

        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}

/// Builds the active filter.
///
/// `RUST_LOG` wins when set. Otherwise `level` is used, falling back to
/// [`DEFAULT_FILTER`]. Accepts a bare level or any `EnvFilter` directive.
pub fn make_filter(level: Option<&str>) -> anyhow::Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }

    let directive = level.unwrap_or(DEFAULT_FILTER);
    EnvFilter::try_new(directive)
        .map_err(|e| anyhow::anyhow!("invalid log level '{directive}': {e}"))
}

/// Initializes logging to stderr. Call once at startup.
///
/// Output is colored when stderr is a terminal and plain when redirected, so
/// calculation results on stdout stay clean. A second call is a no-op.
pub fn init_logging(level: Option<&str>) -> anyhow::Result<()> {
    let filter = make_filter(level)?;

    let stderr_layer = tracing_subscriber::fmt::layer()
        .event_format(CliFormat)
        .with_ansi(io::stderr().is_terminal())
        .with_writer(io::stderr);

    // Fails only when a global subscriber is already installed.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .try_init();

    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::sync::{Arc, Mutex, MutexGuard};

    use pretty_assertions::assert_eq;
    use tracing_subscriber::fmt::MakeWriter;

    use super::*;

    #[test]
    fn make_filter_accepts_bare_level() {
        let result = make_filter(Some("debug"));

        assert!(result.is_ok());
    }

    #[test]
    fn make_filter_accepts_directives() {
        let result = make_filter(Some("warn,tax_core=debug"));

        assert!(result.is_ok());
    }

    #[test]
    fn make_filter_uses_default_without_override() {
        let result = make_filter(None);

        assert!(result.is_ok());
    }

    #[test]
    fn make_filter_rejects_malformed_directive() {
        if std::env::var_os("RUST_LOG").is_some() {
            return;
        }

        let result = make_filter(Some("tax_core=loudest"));

        assert!(result.is_err());
    }

    // =========================================================================
    // CliFormat tests
    // =========================================================================

    /// Collects formatted output in memory.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    struct CapturedWriter<'a>(MutexGuard<'a, Vec<u8>>);

    impl Write for CapturedWriter<'_> {
        fn write(
            &mut self,
            buf: &[u8],
        ) -> io::Result<usize> {
            self.0.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for Captured {
        type Writer = CapturedWriter<'a>;

        fn make_writer(&'a self) -> Self::Writer {
            CapturedWriter(self.0.lock().unwrap_or_else(|e| e.into_inner()))
        }
    }

    impl Captured {
        fn text(&self) -> String {
            let bytes = self.0.lock().unwrap_or_else(|e| e.into_inner());
            String::from_utf8_lossy(&bytes).into_owned()
        }
    }

    fn capture(
        ansi: bool,
        emit: impl FnOnce(),
    ) -> String {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_ansi(ansi)
            .event_format(CliFormat)
            .with_writer(captured.clone())
            .with_max_level(Level::TRACE)
            .finish();

        tracing::subscriber::with_default(subscriber, emit);

        captured.text()
    }

    #[test]
    fn cli_format_plain_line() {
        let text = capture(false, || tracing::warn!(field = "magi", "Negative amount"));

        assert!(text.ends_with('\n'), "Expected one line, got: {text:?}");
        assert_eq!(text.lines().count(), 1);
        assert!(!text.contains('\x1b'), "Expected no escapes, got: {text:?}");
        assert!(text.contains(" WARN "), "Expected level, got: {text:?}");
        assert!(
            text.contains("tax_data::logging::tests:"),
            "Expected module path, got: {text:?}"
        );
        assert!(
            text.contains("Negative amount field=\"magi\""),
            "Expected message and fields, got: {text:?}"
        );
    }

    #[test]
    fn cli_format_pads_short_levels() {
        let text = capture(false, || tracing::info!("Loaded"));

        assert!(text.contains("  INFO "), "Expected padded level, got: {text:?}");
    }

    #[test]
    fn cli_format_colors_level_when_ansi() {
        let text = capture(true, || tracing::error!("Failed"));

        assert!(
            text.contains("\x1b[1;31mERROR\x1b[0m"),
            "Expected red level, got: {text:?}"
        );
    }
}
