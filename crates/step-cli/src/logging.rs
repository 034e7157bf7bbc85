//! Tracing setup
//!
//! Log output goes to stderr through a writer that masks every value
//! registered with the [`Redactor`], so secrets resolved during the run
//! never reach the terminal.

use std::io::{self, Write};
use std::sync::Arc;
use step_config::Redactor;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Buffers one formatted event and writes it redacted on flush or drop.
pub struct RedactingWriter {
    redactor: Arc<Redactor>,
    buffer: Vec<u8>,
}

impl Write for RedactingWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buffer.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if self.buffer.is_empty() {
            return Ok(());
        }
        let text = String::from_utf8_lossy(&self.buffer);
        let redacted = self.redactor.redact(&text);
        self.buffer.clear();
        let mut stderr = io::stderr().lock();
        stderr.write_all(redacted.as_bytes())?;
        stderr.flush()
    }
}

impl Drop for RedactingWriter {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}

/// [`MakeWriter`] handing out [`RedactingWriter`]s.
#[derive(Clone)]
pub struct RedactingMakeWriter {
    redactor: Arc<Redactor>,
}

impl RedactingMakeWriter {
    pub fn new(redactor: Arc<Redactor>) -> Self {
        Self { redactor }
    }
}

impl<'a> MakeWriter<'a> for RedactingMakeWriter {
    type Writer = RedactingWriter;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter {
            redactor: Arc::clone(&self.redactor),
            buffer: Vec::new(),
        }
    }
}

/// Install the global subscriber.
///
/// `RUST_LOG` wins when set; otherwise `debug` with `verbose`, else `warn`.
pub fn init(
    verbose: bool,
    redactor: Arc<Redactor>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let default_level = if verbose { "debug" } else { "warn" };

    let fmt_layer = fmt::layer()
        .with_writer(RedactingMakeWriter::new(redactor))
        .with_target(verbose)
        .with_level(true)
        .compact();

    let filter_layer =
        EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(default_level))?;

    tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
