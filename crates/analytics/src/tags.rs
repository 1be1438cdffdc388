// In crates/analytics/src/tags.rs

use crate::types::TagStat;
use crate::win_rate;
use core_types::{Outcome, Trade};
use rust_decimal::Decimal;
use std::collections::HashMap;

/// Per-tag win/loss/breakeven counts and P&L.
///
/// A trade counts towards every tag it carries. The result is sorted by trade
/// count, most used first; equal counts keep the order the tags were first
/// seen in.
pub fn compute_tag_stats(trades: &[Trade]) -> Vec<TagStat> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut stats: Vec<TagStat> = Vec::new();

    for trade in trades {
        for tag in &trade.tags {
            let slot = *index.entry(tag.as_str()).or_insert_with(|| {
                stats.push(TagStat {
                    tag: tag.clone(),
                    wins: 0,
                    losses: 0,
                    breakevens: 0,
                    total_trades: 0,
                    win_rate: 0.0,
                    total_pnl: Decimal::ZERO,
                });
                stats.len() - 1
            });
            let stat = &mut stats[slot];
            stat.total_trades += 1;
            stat.total_pnl += trade.amount;
            match trade.outcome {
                Outcome::Win => stat.wins += 1,
                Outcome::Loss => stat.losses += 1,
                Outcome::Breakeven => stat.breakevens += 1,
            }
        }
    }

    for stat in &mut stats {
        stat.win_rate = win_rate(stat.wins, stat.losses);
    }

    // `sort_by` is stable, which keeps discovery order for ties.
    stats.sort_by(|a, b| b.total_trades.cmp(&a.total_trades));
    stats
}

/// Narrows tag stats for the comparison view.
///
/// * Nothing selected at all gives an empty list.
/// * A non-empty `primary` keeps only those tags.
/// * A non-empty `secondary` then keeps a tag only if at least one of its
///   trades also carries every secondary tag.
pub fn filter_tag_stats(
    tag_stats: &[TagStat],
    all_trades: &[Trade],
    primary: &[String],
    secondary: &[String],
) -> Vec<TagStat> {
    if primary.is_empty() && secondary.is_empty() {
        return Vec::new();
    }

    tag_stats
        .iter()
        .filter(|stat| primary.is_empty() || primary.contains(&stat.tag))
        .filter(|stat| {
            secondary.is_empty()
                || all_trades
                    .iter()
                    .any(|t| t.has_tag(&stat.tag) && t.has_all_tags(secondary))
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{day, tagged};
    use rust_decimal_macros::dec;

    fn names(stats: &[TagStat]) -> Vec<&str> {
        stats.iter().map(|s| s.tag.as_str()).collect()
    }

    fn strings(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_trade_counts_towards_every_tag() {
        let trades = vec![
            tagged("1", day(1), Outcome::Win, dec!(10), &["A"]),
            tagged("2", day(2), Outcome::Loss, dec!(-5), &["A", "B"]),
        ];
        let stats = compute_tag_stats(&trades);
        assert_eq!(names(&stats), vec!["A", "B"]);

        let a = &stats[0];
        assert_eq!((a.total_trades, a.wins, a.losses), (2, 1, 1));
        assert_eq!(a.win_rate, 50.0);
        assert_eq!(a.total_pnl, dec!(5));

        let b = &stats[1];
        assert_eq!((b.total_trades, b.wins, b.losses), (1, 0, 1));
        assert_eq!(b.win_rate, 0.0);
        assert_eq!(b.total_pnl, dec!(-5));
    }

    #[test]
    fn test_ties_keep_discovery_order() {
        let trades = vec![
            tagged("1", day(1), Outcome::Win, dec!(1), &["Z", "Y"]),
            tagged("2", day(2), Outcome::Breakeven, dec!(0), &["X"]),
            tagged("3", day(3), Outcome::Loss, dec!(-1), &["X", "W"]),
        ];
        let stats = compute_tag_stats(&trades);
        assert_eq!(names(&stats), vec!["X", "Z", "Y", "W"]);
        // The breakeven is not part of the win-rate denominator.
        assert_eq!(stats[0].win_rate, 0.0);
        assert_eq!(stats[0].breakevens, 1);
    }

    #[test]
    fn test_nothing_selected_shows_nothing() {
        let trades = vec![tagged("1", day(1), Outcome::Win, dec!(1), &["A"])];
        let stats = compute_tag_stats(&trades);
        assert!(filter_tag_stats(&stats, &trades, &[], &[]).is_empty());
    }

    #[test]
    fn test_primary_and_secondary_filtering() {
        let trades = vec![
            tagged("1", day(1), Outcome::Win, dec!(1), &["A", "B", "C"]),
            tagged("2", day(2), Outcome::Win, dec!(1), &["D", "B"]),
            tagged("3", day(3), Outcome::Loss, dec!(-1), &["E", "C"]),
        ];
        let stats = compute_tag_stats(&trades);

        let primary_only = filter_tag_stats(&stats, &trades, &strings(&["A", "D"]), &[]);
        assert_eq!(names(&primary_only), vec!["A", "D"]);

        // Only A has a trade carrying both B and C.
        let both = filter_tag_stats(&stats, &trades, &strings(&["A", "D", "E"]), &strings(&["B", "C"]));
        assert_eq!(names(&both), vec!["A"]);

        // An empty primary lets every tag into the secondary pass.
        let secondary_only = filter_tag_stats(&stats, &trades, &[], &strings(&["B"]));
        assert_eq!(names(&secondary_only), vec!["B", "C", "A", "D"]);
    }
}
