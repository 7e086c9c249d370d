use serde::Serialize;

use super::type_counts;
use crate::data::filter::FilteredView;

/// Wedges at or above this share get their label inside the wedge.
pub const INLINE_LABEL_MIN_PERCENT: f64 = 10.0;

/// Wedges start at 12 o'clock and run counter-clockwise.
const START_ANGLE_DEG: f64 = 90.0;
/// Inline labels sit at this fraction of the unit radius.
const INLINE_RADIUS: f64 = 0.8;
/// Horizontal distance of leader-line labels from the centre.
const LEADER_LABEL_X: f64 = 1.6;

// ---------------------------------------------------------------------------
// Type distribution
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeShare {
    pub property_type: String,
    pub count: usize,
    pub percent: f64,
}

/// Pie-chart input: share of each property type, most common first.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypeDistribution {
    pub total: usize,
    pub shares: Vec<TypeShare>,
}

pub fn type_distribution(view: &FilteredView<'_>) -> TypeDistribution {
    let counts = type_counts(view);
    let total: usize = counts.iter().map(|c| c.count).sum();
    let shares = counts
        .into_iter()
        .map(|c| TypeShare {
            percent: c.count as f64 / total as f64 * 100.0,
            property_type: c.property_type,
            count: c.count,
        })
        .collect();
    TypeDistribution { total, shares }
}

// ---------------------------------------------------------------------------
// Pie label layout
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Align {
    Left,
    Right,
}

/// Where a wedge's label goes, in chart coordinates (unit circle).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LabelPlacement {
    /// Centred text inside the wedge.
    Inline { x: f64, y: f64 },
    /// Text beside the pie, joined to `anchor` by a line.
    LeaderLine {
        anchor: [f64; 2],
        label: [f64; 2],
        align: Align,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WedgeLabel {
    pub property_type: String,
    pub text: String,
    /// Degrees, counter-clockwise from 3 o'clock.
    pub start_angle: f64,
    pub end_angle: f64,
    pub placement: LabelPlacement,
}

impl TypeDistribution {
    pub fn is_empty(&self) -> bool {
        self.shares.is_empty()
    }

    /// Lay out one label per wedge, in share order.
    ///
    /// Small wedges are spread evenly from the top of the chart (`y = 1`) to
    /// the bottom (`y = -1`) in the order they appear, and pushed left or
    /// right depending on which half of the pie they sit in.
    pub fn pie_layout(&self) -> Vec<WedgeLabel> {
        let small = self
            .shares
            .iter()
            .filter(|s| s.percent < INLINE_LABEL_MIN_PERCENT)
            .count();

        let mut labels = Vec::with_capacity(self.shares.len());
        let mut cumulative = 0.0;
        let mut small_seen = 0;

        for share in &self.shares {
            let start_angle = START_ANGLE_DEG + cumulative * 3.6;
            cumulative += share.percent;
            let end_angle = START_ANGLE_DEG + cumulative * 3.6;

            let mid = ((start_angle + end_angle) / 2.0).to_radians();
            let (x, y) = (mid.cos(), mid.sin());

            let (text, placement) = if share.percent >= INLINE_LABEL_MIN_PERCENT {
                (
                    format!("{}\n{:.1}%", share.property_type, share.percent),
                    LabelPlacement::Inline {
                        x: x * INLINE_RADIUS,
                        y: y * INLINE_RADIUS,
                    },
                )
            } else {
                let label_y = spread(small_seen, small);
                small_seen += 1;
                let (label_x, align) = if x >= 0.0 {
                    (LEADER_LABEL_X, Align::Left)
                } else {
                    (-LEADER_LABEL_X, Align::Right)
                };
                (
                    format!("{} ({:.1}%)", share.property_type, share.percent),
                    LabelPlacement::LeaderLine {
                        anchor: [x, y],
                        label: [label_x, label_y],
                        align,
                    },
                )
            };

            labels.push(WedgeLabel {
                property_type: share.property_type.clone(),
                text,
                start_angle,
                end_angle,
                placement,
            });
        }
        labels
    }
}

/// `k`-th of `n` points evenly spaced from 1 down to -1 inclusive.
fn spread(k: usize, n: usize) -> f64 {
    if n <= 1 {
        return 1.0;
    }
    1.0 - 2.0 * k as f64 / (n - 1) as f64
}
