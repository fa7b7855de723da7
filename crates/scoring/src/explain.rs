//! Explanation generator: turns a factor breakdown into the short
//! human-readable reasoning attached to every recommendation.

use store::CatalogItem;

use crate::types::{Factor, FactorBreakdown, PeerSignal, Reasoning};

/// Factors below this value say nothing worth repeating
const MENTION_FLOOR: f32 = 55.0;

/// Build reasoning from the strongest factors. The top factor becomes the
/// primary sentence; the next two above the mention floor become
/// secondary bullets. Peer support, when present, earns its own bullet.
pub fn build_reasoning(
    factors: &FactorBreakdown,
    item: &CatalogItem,
    peer: Option<PeerSignal>,
) -> Reasoning {
    let ranked = factors.ranked();

    let primary = sentence(ranked[0].0, ranked[0].1, item);
    let mut secondary: Vec<String> = ranked[1..]
        .iter()
        .filter(|(_, value)| *value >= MENTION_FLOOR)
        .take(Reasoning::MAX_REASONS - 1)
        .map(|&(factor, value)| sentence(factor, value, item))
        .collect();

    if let Some(signal) = peer {
        let line = format!(
            "Loved by {} viewers with taste similar to yours ({:.1}/5)",
            signal.voters, signal.support
        );
        secondary.truncate(Reasoning::MAX_REASONS - 2);
        secondary.push(line);
    }

    Reasoning { primary, secondary }
}

fn sentence(factor: Factor, value: f32, item: &CatalogItem) -> String {
    let pct = value.round() as u32;
    match factor {
        Factor::Genre => format!("{pct}% match with your favorite genres"),
        Factor::Quality => format!(
            "Rated {:.1}, right in your quality sweet spot ({pct}% fit)",
            item.rating
        ),
        Factor::Temporal => match item.decade() {
            Some(decade) => format!("From the {decade}, an era you keep coming back to"),
            None => format!("{pct}% match with the eras you gravitate toward"),
        },
        Factor::Creator => format!("Features creators you have rated highly ({pct}% fit)"),
        Factor::Behavioral => format!("Fits your viewing habits ({pct}% match)"),
        Factor::Social => format!("Aligned with the creators you follow ({pct}% match)"),
    }
}
