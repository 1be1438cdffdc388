use crate::types::{AnalyticsInput, PerformanceReport};
use crate::{cumulative, daily, goals, risk_reward, sessions, tags, win_loss, window};
use risk::{DynamicRiskManager, RiskManager};
use std::sync::atomic::{AtomicUsize, Ordering};

/// Receives advisory progress updates while a report is being calculated.
///
/// Implementations must not block; the result of the calculation never
/// depends on what an observer does.
pub trait ProgressObserver: Sync {
    fn on_step(&self, step: &'static str, current: usize, total: usize);
}

/// An observer that ignores every update.
impl ProgressObserver for () {
    fn on_step(&self, _step: &'static str, _current: usize, _total: usize) {}
}

/// The steps a calculation reports, in no particular completion order.
pub const STEPS: [&str; 9] = [
    "filter",
    "win_loss",
    "risk_reward",
    "tags",
    "sessions",
    "daily_summary",
    "cumulative",
    "goals",
    "risk",
];

/// Number of progress steps a calculation reports.
pub const TOTAL_STEPS: usize = STEPS.len();

struct StepCounter<'a> {
    observer: &'a dyn ProgressObserver,
    done: AtomicUsize,
}

impl StepCounter<'_> {
    fn finish(&self, step: &'static str) {
        let current = self.done.fetch_add(1, Ordering::SeqCst) + 1;
        self.observer.on_step(step, current, TOTAL_STEPS);
    }
}

/// The engine responsible for calculating performance metrics from journal trades.
#[derive(Default)]
pub struct AnalyticsEngine;

impl AnalyticsEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calculates a full performance report for one time window.
    ///
    /// The trades are filtered once; every aggregator then runs on its own
    /// rayon task against the same filtered slice.
    pub fn calculate(&self, input: &AnalyticsInput<'_>, observer: &dyn ProgressObserver) -> PerformanceReport {
        let progress = StepCounter {
            observer,
            done: AtomicUsize::new(0),
        };

        let filtered = window::filter(input.trades, input.reference_date, input.period);
        let (range_start, range_end) =
            window::chart_range(&filtered, input.reference_date, input.period, input.today);
        progress.finish("filter");

        tracing::debug!(
            period = %input.period,
            reference_date = %input.reference_date,
            total = input.trades.len(),
            selected = filtered.len(),
            "Calculating performance report."
        );

        let trades = filtered.as_slice();
        let mut win_loss = None;
        let mut risk_reward = None;
        let mut tag_stats = None;
        let mut session_stats = None;
        let mut daily_summary = None;
        let mut cumulative = None;
        let mut goals = None;

        rayon::scope(|s| {
            s.spawn(|_| {
                win_loss = Some(win_loss::aggregate(trades));
                progress.finish("win_loss");
            });
            s.spawn(|_| {
                risk_reward = Some(risk_reward::aggregate(trades));
                progress.finish("risk_reward");
            });
            s.spawn(|_| {
                let stats = tags::compute_tag_stats(trades);
                let comparison = tags::filter_tag_stats(
                    &stats,
                    trades,
                    &input.comparison.primary,
                    &input.comparison.secondary,
                );
                tag_stats = Some((stats, comparison));
                progress.finish("tags");
            });
            s.spawn(|_| {
                session_stats = Some(sessions::compute(trades, input.account.account_equity));
                progress.finish("sessions");
            });
            s.spawn(|_| {
                daily_summary = Some(daily::summarize(trades));
                progress.finish("daily_summary");
            });
            s.spawn(|_| {
                cumulative = Some(cumulative::build(trades, range_start, range_end));
                progress.finish("cumulative");
            });
            s.spawn(|_| {
                goals = Some(goals::track(trades, input.reference_date, input.account));
                progress.finish("goals");
            });
        });

        // Every slot was filled inside the scope above.
        let win_loss = win_loss.unwrap_or_default();
        let (tag_stats, tag_comparison) = tag_stats.unwrap_or_default();

        let risk = match DynamicRiskManager::new(input.risk_settings.clone()) {
            Ok(manager) => manager.evaluate(input.account.account_equity, win_loss.total_pnl),
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring invalid risk settings.");
                None
            }
        };
        progress.finish("risk");

        PerformanceReport {
            period: input.period,
            reference_date: input.reference_date,
            range_start,
            range_end,
            win_loss,
            risk_reward: risk_reward.unwrap_or_default(),
            tag_stats,
            tag_comparison,
            session_stats: session_stats.unwrap_or_default(),
            daily_summary: daily_summary.unwrap_or_default(),
            cumulative: cumulative.unwrap_or_default(),
            goals: goals.unwrap_or_default(),
            risk,
        }
    }
}
