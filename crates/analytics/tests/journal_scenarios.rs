use analytics::{cumulative, daily, risk_reward, sessions, streaks, tags, win_loss, window};
use chrono::NaiveDate;
use core_types::{Outcome, TimePeriod, Trade, TradeRecord};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn record(id: &str, day: &str, outcome: &str, amount: Decimal, tags: &[&str], session: Option<&str>) -> Trade {
    Trade::try_from(TradeRecord {
        id: id.to_string(),
        date: date(day),
        amount,
        outcome: outcome.to_string(),
        risk_to_reward: None,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        session: session.map(str::to_string),
    })
    .unwrap()
}

fn journal() -> Vec<Trade> {
    vec![
        record("1", "2024-05-01", "win", dec!(100), &["breakout"], Some("London")),
        record("2", "2024-05-02", "breakeven", dec!(0), &[], Some("Asia")),
        record("3", "2024-05-03", "win", dec!(50), &["breakout", "news"], Some("NY AM")),
        record("4", "2024-05-04", "loss", dec!(-30), &["news"], Some("NY AM")),
    ]
}

#[test]
fn streaks_win_rate_and_cumulative_for_the_reference_journal() {
    let trades = journal();

    let stats = win_loss::aggregate(&trades);
    assert_eq!(stats.max_win_streak, 2);
    assert_eq!(stats.avg_win_streak, 2.0);
    assert_eq!(stats.max_loss_streak, 1);
    assert!((stats.win_rate - 66.666_666_666).abs() < 1e-6);

    let series = cumulative::build(&trades, date("2024-05-01"), date("2024-05-31"));
    assert_eq!(series.len(), 31);
    assert_eq!(series.last().unwrap().cumulative_pnl, dec!(120));
}

#[test]
fn tag_stats_for_overlapping_tags() {
    let trades = vec![
        record("1", "2024-05-01", "win", dec!(10), &["A"], None),
        record("2", "2024-05-02", "loss", dec!(-5), &["A", "B"], None),
    ];
    let stats = tags::compute_tag_stats(&trades);
    assert_eq!(stats[0].tag, "A");
    assert_eq!(stats[0].total_trades, 2);
    assert_eq!(stats[0].win_rate, 50.0);
    assert_eq!(stats[0].total_pnl, dec!(5));
    assert_eq!(stats[1].tag, "B");
    assert_eq!(stats[1].wins, 0);
    assert_eq!(stats[1].win_rate, 0.0);
    assert_eq!(stats[1].total_pnl, dec!(-5));

    assert!(tags::filter_tag_stats(&stats, &trades, &[], &[]).is_empty());
}

#[test]
fn win_rate_ignores_breakeven_count() {
    let base = journal();
    let mut padded = base.clone();
    for i in 0..10 {
        padded.push(record(&format!("be-{i}"), "2024-05-10", "breakeven", dec!(0.5), &[], None));
    }
    assert_eq!(win_loss::aggregate(&base).win_rate, win_loss::aggregate(&padded).win_rate);
}

#[test]
fn cumulative_series_matches_in_range_sum_for_every_range() {
    let trades = journal();
    let start = date("2024-04-28");
    for span in 0..12i64 {
        let end = start + chrono::Duration::days(span);
        let series = cumulative::build(&trades, start, end);
        assert_eq!(series.len() as i64, span + 1);
        let expected: Decimal = trades
            .iter()
            .filter(|t| t.date >= start && t.date <= end)
            .map(|t| t.amount)
            .sum();
        assert_eq!(series.last().unwrap().cumulative_pnl, expected);
    }
}

#[test]
fn aggregators_are_idempotent_and_leave_input_untouched() {
    let trades = journal();
    let snapshot = trades.clone();

    assert_eq!(win_loss::aggregate(&trades), win_loss::aggregate(&trades));
    assert_eq!(streaks::analyze(&trades), streaks::analyze(&trades));
    assert_eq!(risk_reward::aggregate(&trades), risk_reward::aggregate(&trades));
    assert_eq!(tags::compute_tag_stats(&trades), tags::compute_tag_stats(&trades));
    assert_eq!(sessions::compute(&trades, dec!(5000)), sessions::compute(&trades, dec!(5000)));
    assert_eq!(daily::summarize(&trades), daily::summarize(&trades));
    assert_eq!(
        window::filter(&trades, date("2024-05-15"), TimePeriod::Month),
        window::filter(&trades, date("2024-05-15"), TimePeriod::Month)
    );
    assert_eq!(trades, snapshot);
}

#[test]
fn outcome_label_decides_classification() {
    let trades = vec![record("1", "2024-05-01", "breakeven", dec!(-1.2), &[], None)];
    let stats = win_loss::aggregate(&trades);
    assert_eq!(stats.breakevens.count, 1);
    assert_eq!(stats.losses.count, 0);
    assert_eq!(stats.total_pnl, dec!(-1.2));
    assert_eq!(Outcome::Breakeven, trades[0].outcome);
}
