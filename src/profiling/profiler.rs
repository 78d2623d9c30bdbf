//! Chrome Trace ("flame style") profiling.
//!
//! Feature-gated with `--features profiling`.
//!
//! Usage:
//!   reactive_ecs::profiler::init("profile/trace.json");
//!   {
//!     let _g = reactive_ecs::profiler::span("ECSManager::call_stage");
//!     // run ticks...
//!   }
//!   reactive_ecs::profiler::shutdown();
//!
//! The registry is single-threaded, so the recorder is thread-local: spans
//! opened on a thread that never called [`init`] are not recorded.

use std::borrow::Cow;
use std::path::Path;

#[cfg(feature = "profiling")]
mod enabled {
    use std::cell::RefCell;
    use std::fs::File;
    use std::io::{BufWriter, Write};
    use std::path::PathBuf;
    use std::time::Instant;

    use tracing::error;

    use super::*;


    /// A Chrome trace complete event (`ph:"X"`).
    #[derive(Debug)]
    struct CompleteEvent {
        name: String,
        ts_us: u64,
        dur_us: u64,
        args: Vec<(&'static str, super::Arg)>,
    }

    struct Recorder {
        start: Instant,
        out_path: PathBuf,
        events: Vec<CompleteEvent>,
    }

    thread_local! {
        static RECORDER: RefCell<Option<Recorder>> = const { RefCell::new(None) };
    }

    fn now_us() -> Option<u64> {
        RECORDER.with(|r| r.borrow().as_ref().map(|rec| rec.start.elapsed().as_micros() as u64))
    }

    /// Starts recording on this thread; the trace is written to `path` on
    /// [`shutdown`].
    pub fn init<P: AsRef<Path>>(path: P) {
        RECORDER.with(|r| {
            *r.borrow_mut() = Some(Recorder {
                start: Instant::now(),
                out_path: path.as_ref().to_path_buf(),
                events: Vec::new(),
            });
        });
    }

    /// Stops recording and writes the Chrome Trace JSON.
    pub fn shutdown() {
        let Some(recorder) = RECORDER.with(|r| r.borrow_mut().take()) else { return; };
        if let Err(e) = write_trace_file(&recorder) {
            error!(path = %recorder.out_path.display(), "profiler failed to write trace: {e}");
        }
    }

    fn write_trace_file(recorder: &Recorder) -> std::io::Result<()> {
        if let Some(parent) = recorder.out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut w = BufWriter::new(File::create(&recorder.out_path)?);

        write!(w, "{{\"traceEvents\":[")?;
        for (i, ev) in recorder.events.iter().enumerate() {
            if i > 0 {
                write!(w, ",")?;
            }
            write!(w, "{{\"name\":")?;
            write_json_string(&mut w, &ev.name)?;
            write!(
                w,
                ",\"cat\":\"ecs\",\"ph\":\"X\",\"ts\":{},\"dur\":{},\"pid\":1,\"tid\":1",
                ev.ts_us, ev.dur_us
            )?;
            if !ev.args.is_empty() {
                write!(w, ",\"args\":{{")?;
                for (j, (key, value)) in ev.args.iter().enumerate() {
                    if j > 0 {
                        write!(w, ",")?;
                    }
                    write_json_string(&mut w, key)?;
                    write!(w, ":")?;
                    write_arg(&mut w, value)?;
                }
                write!(w, "}}")?;
            }
            write!(w, "}}")?;
        }
        write!(w, "]}}")?;
        w.flush()
    }

    fn write_arg<W: Write>(w: &mut W, value: &super::Arg) -> std::io::Result<()> {
        match value {
            super::Arg::Str(s) => write_json_string(w, s),
            super::Arg::U64(v) => write!(w, "{v}"),
            super::Arg::I64(v) => write!(w, "{v}"),
            super::Arg::F64(v) if v.is_finite() => write!(w, "{v}"),
            super::Arg::F64(v) => write_json_string(w, &v.to_string()),
            super::Arg::Bool(v) => write!(w, "{v}"),
        }
    }

    fn write_json_string<W: Write>(w: &mut W, s: &str) -> std::io::Result<()> {
        write!(w, "\"")?;
        for ch in s.chars() {
            match ch {
                '"' => write!(w, "\\\"")?,
                '\\' => write!(w, "\\\\")?,
                '\n' => write!(w, "\\n")?,
                '\r' => write!(w, "\\r")?,
                '\t' => write!(w, "\\t")?,
                c if c.is_control() => write!(w, "\\u{:04x}", c as u32)?,
                c => write!(w, "{c}")?,
            }
        }
        write!(w, "\"")
    }

    /// Opens a profiling span, closed when the guard drops.
    pub fn span(name: impl Into<super::SpanName>) -> SpanGuard {
        match now_us() {
            Some(ts0) => SpanGuard { name: Some(name.into().0.into_owned()), ts0, args: Vec::new() },
            None => SpanGuard { name: None, ts0: 0, args: Vec::new() },
        }
    }

    /// A RAII guard that records a complete event on drop.
    pub struct SpanGuard {
        name: Option<String>,
        ts0: u64,
        args: Vec<(&'static str, super::Arg)>,
    }

    impl SpanGuard {
        /// Attaches an argument to this span (builder-style).
        #[inline]
        pub fn arg(mut self, key: &'static str, value: super::Arg) -> Self {
            if self.name.is_some() {
                self.args.push((key, value));
            }
            self
        }
    }

    impl Drop for SpanGuard {
        fn drop(&mut self) {
            let Some(name) = self.name.take() else { return; };
            let args = std::mem::take(&mut self.args);
            let ts0 = self.ts0;
            RECORDER.with(|r| {
                if let Some(rec) = r.borrow_mut().as_mut() {
                    let ts1 = rec.start.elapsed().as_micros() as u64;
                    rec.events.push(CompleteEvent { name, ts_us: ts0, dur_us: ts1.saturating_sub(ts0), args });
                }
            });
        }
    }
}

#[cfg(not(feature = "profiling"))]
mod disabled {
    use super::*;

    /// Initialize profiler (no-op when profiling is disabled).
    #[inline]
    pub fn init<P: AsRef<Path>>(_path: P) {}

    /// Shut down profiler (no-op).
    #[inline]
    pub fn shutdown() {}

    /// Create profiling span (no-op).
    #[inline]
    pub fn span(_name: impl Into<super::SpanName>) -> SpanGuard {
        SpanGuard
    }

    /// No-op span guard.
    pub struct SpanGuard;

    impl SpanGuard {
        /// Attach an argument to this span (builder-style; no-op).
        #[inline]
        pub fn arg(self, _key: &'static str, _value: super::Arg) -> Self {
            self
        }
    }
}

/// A span name; accepts `&'static str`, `String`, or `Cow<'static, str>`.
pub struct SpanName(pub Cow<'static, str>);

impl From<&'static str> for SpanName {
    fn from(s: &'static str) -> Self {
        SpanName(Cow::Borrowed(s))
    }
}

impl From<String> for SpanName {
    fn from(s: String) -> Self {
        SpanName(Cow::Owned(s))
    }
}

impl From<Cow<'static, str>> for SpanName {
    fn from(s: Cow<'static, str>) -> Self {
        SpanName(s)
    }
}

/// Argument value for profiling spans, written to the event's `args`.
#[derive(Debug)]
pub enum Arg {
    /// UTF-8 string value.
    Str(String),

    /// Unsigned 64-bit integer value.
    U64(u64),

    /// Signed 64-bit integer value.
    I64(i64),

    /// 64-bit floating-point value.
    F64(f64),

    /// Boolean value.
    Bool(bool),
}

#[cfg(feature = "profiling")]
pub use enabled::{init, shutdown, span, SpanGuard};

#[cfg(not(feature = "profiling"))]
pub use disabled::{init, shutdown, span, SpanGuard};
