//! Bounded-concurrency probe engine.
//!
//! Evaluates every token of a [`TokenSource`] against an [`Oracle`] with at
//! most `window` probes in flight.
//!
//! ## Algorithm
//!
//! ```text
//! seed:    pop + spawn until window is full or source is done
//! steady:  join one finished probe
//!            → pop + spawn a replacement (if source not done)
//!            → record result, progress.inc()
//! drain:   source done (or interrupted): keep joining until empty
//! ```
//!
//! A replacement is only spawned after a slot is freed by a completed probe,
//! so the in-flight count never exceeds the window. Results are consumed in
//! completion order; no ordering between tokens is promised.
//!
//! ## Interruption
//!
//! When the shutdown signal is raised no further probes are dispatched;
//! in-flight probes drain and the report is marked interrupted. Everything
//! recorded up to that point remains valid.

use std::{num::NonZeroUsize, sync::Arc};

use tokio::{sync::watch, task::JoinSet};

use crate::{
    oracle::{Oracle, ProbeResult},
    progress::Progress,
    source::TokenSource,
};

/// Default number of probes in flight.
pub const DEFAULT_WINDOW: usize = 1000;

/// Engine configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Maximum number of probes in flight.
    pub window: NonZeroUsize,
    /// Log every result at debug level.
    pub verbose: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { window: NonZeroUsize::new(DEFAULT_WINDOW).unwrap_or(NonZeroUsize::MIN), verbose: false }
    }
}

/// Outcome of one engine run.
#[derive(Debug)]
pub struct RunReport<M> {
    /// Probe results consumed.
    pub processed: u64,
    /// Results whose `flagged` bit was set.
    pub flagged: Vec<ProbeResult<M>>,
    /// Probe tasks that panicked or were cancelled (their token is lost).
    pub failed_tasks: u64,
    /// Largest number of probes observed in flight.
    pub peak_in_flight: usize,
    /// Whether dispatch stopped because of the shutdown signal.
    pub interrupted: bool,
}

impl<M> RunReport<M> {
    /// Number of flagged results.
    pub fn flagged_count(&self) -> usize {
        self.flagged.len()
    }
}

/// Why dispatch stopped (or didn't).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Spawned,
    Exhausted,
    Interrupted,
}

/// Runs token sources through oracles with a capped window.
#[derive(Debug, Clone, Default)]
pub struct ProbeEngine {
    config: EngineConfig,
}

impl ProbeEngine {
    /// Creates an engine.
    pub fn new(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Probes every token of `source` with `oracle`.
    ///
    /// Must be called within a tokio runtime; probes are spawned as tasks.
    /// Progress is advanced once per consumed result and finished before
    /// returning.
    pub async fn run<O: Oracle>(
        &self,
        source: &dyn TokenSource,
        oracle: Arc<O>,
        progress: &dyn Progress,
        shutdown: Option<watch::Receiver<bool>>,
    ) -> RunReport<O::Meta> {
        let window = self.config.window.get();
        tracing::info!(tokens = source.remaining(), window, "testing tokens");

        let mut report = RunReport {
            processed: 0,
            flagged: Vec::new(),
            failed_tasks: 0,
            peak_in_flight: 0,
            interrupted: false,
        };
        let mut in_flight = JoinSet::new();
        let mut dispatching = true;

        while dispatching && in_flight.len() < window {
            dispatching =
                Self::dispatch(&mut in_flight, source, &oracle, shutdown.as_ref(), &mut report);
        }
        report.peak_in_flight = in_flight.len();

        while let Some(joined) = in_flight.join_next().await {
            if dispatching {
                dispatching =
                    Self::dispatch(&mut in_flight, source, &oracle, shutdown.as_ref(), &mut report);
                report.peak_in_flight = report.peak_in_flight.max(in_flight.len());
            }

            match joined {
                Ok(result) => self.record(result, &mut report),
                Err(e) => {
                    report.failed_tasks += 1;
                    tracing::error!("probe task failed: {}", e);
                },
            }
            progress.inc();
        }

        progress.finish();
        report
    }

    /// Pops one token and spawns its probe.
    ///
    /// Returns false once dispatch should stop for good.
    fn dispatch<O: Oracle>(
        in_flight: &mut JoinSet<ProbeResult<O::Meta>>,
        source: &dyn TokenSource,
        oracle: &Arc<O>,
        shutdown: Option<&watch::Receiver<bool>>,
        report: &mut RunReport<O::Meta>,
    ) -> bool {
        match Self::try_dispatch(in_flight, source, oracle, shutdown) {
            Dispatch::Spawned => true,
            Dispatch::Exhausted => false,
            Dispatch::Interrupted => {
                tracing::warn!(
                    in_flight = in_flight.len(),
                    "interrupted; draining in-flight probes"
                );
                report.interrupted = true;
                false
            },
        }
    }

    fn try_dispatch<O: Oracle>(
        in_flight: &mut JoinSet<ProbeResult<O::Meta>>,
        source: &dyn TokenSource,
        oracle: &Arc<O>,
        shutdown: Option<&watch::Receiver<bool>>,
    ) -> Dispatch {
        if shutdown.is_some_and(|rx| *rx.borrow()) {
            return Dispatch::Interrupted;
        }
        if source.done() {
            return Dispatch::Exhausted;
        }

        match source.pop() {
            Ok(token) => {
                let oracle = Arc::clone(oracle);
                in_flight.spawn(async move { oracle.probe(token).await });
                Dispatch::Spawned
            },
            Err(e) => {
                // Another consumer drained the source between done() and pop()
                tracing::debug!("stopping dispatch: {}", e);
                Dispatch::Exhausted
            },
        }
    }

    fn record<M: std::fmt::Debug>(&self, result: ProbeResult<M>, report: &mut RunReport<M>) {
        report.processed += 1;

        if self.config.verbose {
            tracing::debug!(
                token = result.token_text(),
                message = %result.message,
                error = ?result.error,
                flagged = result.flagged,
                meta = ?result.meta,
                "probe result"
            );
        }

        if result.flagged {
            report.flagged.push(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::atomic::{AtomicUsize, Ordering},
        time::Duration,
    };

    use super::*;
    use crate::{
        NoProgress, Token,
        source::{GeneratedSource, NullSource, StaticSource},
    };

    /// Flags tokens whose text ends with a marker; tracks concurrency.
    #[derive(Default)]
    struct SuffixOracle {
        current: AtomicUsize,
        peak: AtomicUsize,
        calls: AtomicUsize,
    }

    impl Oracle for SuffixOracle {
        type Meta = ();

        async fn probe(&self, token: Option<Token>) -> ProbeResult<()> {
            let now = self.current.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            self.calls.fetch_add(1, Ordering::SeqCst);

            tokio::time::sleep(Duration::from_millis(2)).await;

            self.current.fetch_sub(1, Ordering::SeqCst);
            let flagged = token.as_ref().is_some_and(|t| t.full_text().ends_with('!'));
            ProbeResult::new(token, "checked", flagged, ())
        }
    }

    fn engine(window: usize) -> ProbeEngine {
        ProbeEngine::new(EngineConfig {
            window: NonZeroUsize::new(window).unwrap(),
            verbose: true,
        })
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn window_caps_in_flight_probes() {
        let oracle = Arc::new(SuffixOracle::default());
        let source = GeneratedSource::new(200, || Token::parse("ghp_x"));

        let report = engine(7).run(&source, Arc::clone(&oracle), &NoProgress, None).await;

        assert_eq!(report.processed, 200);
        assert_eq!(oracle.calls.load(Ordering::SeqCst), 200);
        assert!(oracle.peak.load(Ordering::SeqCst) <= 7);
        assert!(report.peak_in_flight <= 7);
        assert!(source.done());
    }

    #[tokio::test]
    async fn flagged_results_are_collected() {
        let tokens = ["a_1", "b_2!", "c_3", "d_4!"].into_iter().map(Token::parse).collect();
        let source = StaticSource::new(tokens);

        let report = engine(2).run(&source, Arc::new(SuffixOracle::default()), &NoProgress, None).await;

        assert_eq!(report.processed, 4);
        assert_eq!(report.flagged_count(), 2);
        assert!(report.flagged.iter().all(|r| r.token_text().ends_with('!')));
        assert!(!report.interrupted);
    }

    #[tokio::test]
    async fn null_source_drives_probes_without_tokens() {
        let oracle = Arc::new(SuffixOracle::default());
        let report = engine(3).run(&NullSource::new(5), Arc::clone(&oracle), &NoProgress, None).await;

        assert_eq!(report.processed, 5);
        assert_eq!(report.flagged_count(), 0);
    }

    #[tokio::test]
    async fn empty_source_finishes_immediately() {
        let report =
            engine(3).run(&StaticSource::default(), Arc::new(SuffixOracle::default()), &NoProgress, None).await;

        assert_eq!(report.processed, 0);
        assert_eq!(report.peak_in_flight, 0);
    }

    #[tokio::test]
    async fn raised_shutdown_stops_dispatch() {
        let (tx, rx) = watch::channel(false);
        tx.send(true).unwrap();

        let source = NullSource::new(50);
        let report = engine(4).run(&source, Arc::new(SuffixOracle::default()), &NoProgress, Some(rx)).await;

        assert!(report.interrupted);
        assert_eq!(report.processed, 0);
        assert_eq!(source.remaining(), 50);
    }
}
