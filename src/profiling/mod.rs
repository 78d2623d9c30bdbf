/// Chrome Trace (flame-style) execution profiler.
///
/// This module provides a **feature-gated** profiling API for the registry.
/// When enabled, it records execution spans around stage ticks, scene calls,
/// system calls and trigger dispatch, and emits a **Chrome Trace Event JSON**
/// file that can be inspected using:
///
/// - `chrome://tracing`
/// - <https://ui.perfetto.dev>
///
/// ## Feature flag
///
/// ```bash
/// cargo test --features profiling
/// ```
///
/// When the feature is disabled, all profiling calls compile to no-ops.
///
/// ## Usage
///
/// ```no_run
/// use reactive_ecs::profiler;
///
/// profiler::init("profile/trace.json");
///
/// {
///     let _g = profiler::span("host::frame");
///     // ecs.call_stage()?;
/// }
///
/// profiler::shutdown();
/// ```
pub mod profiler;
