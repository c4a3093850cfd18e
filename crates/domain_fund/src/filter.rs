//! Range filter over an in-transit series

use core_kernel::DateWindow;
use crate::nav::NavPoint;

/// Keeps the points whose date lies inside `window`
///
/// Without a window the series is returned unchanged. With one, points
/// whose date does not parse are dropped rather than failing the filter.
pub fn filter_series(series: &[NavPoint], window: Option<&DateWindow>) -> Vec<NavPoint> {
    let Some(window) = window else {
        return series.to_vec();
    };

    series
        .iter()
        .filter(|point| {
            point
                .parse_date()
                .map(|date| window.contains(date))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
