//! Which template slides survive into the output deck.

use crate::{Metric, Selection};
use std::collections::BTreeSet;

/// Number of slides in the template: title, overview and one chart slide per metric.
pub const TEMPLATE_SLIDE_COUNT: usize = 2 + Metric::ALL.len();

/// Zero-based index of the title slide.
pub const TITLE_SLIDE: usize = 0;

/// Zero-based index of the company overview slide.
pub const OVERVIEW_SLIDE: usize = 1;

/// Slides to keep and drop for a given metric selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlidePlan {
    remove: BTreeSet<usize>,
}

impl SlidePlan {
    /// Mark the chart slide of every unselected metric for removal.
    pub fn for_selection(selection: &Selection) -> Self {
        let remove = Metric::ALL
            .into_iter()
            .filter(|m| !selection.contains(*m))
            .map(|m| m.slide_index())
            .collect();
        Self { remove }
    }

    /// Indices to drop, ascending.
    pub fn removed(&self) -> &BTreeSet<usize> {
        &self.remove
    }

    pub fn keeps(&self, index: usize) -> bool {
        index < TEMPLATE_SLIDE_COUNT && !self.remove.contains(&index)
    }

    /// Indices to keep, in template order.
    pub fn retained(&self) -> Vec<usize> {
        (0..TEMPLATE_SLIDE_COUNT).filter(|i| self.keeps(*i)).collect()
    }

    pub fn retained_count(&self) -> usize {
        TEMPLATE_SLIDE_COUNT - self.remove.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_selection_keeps_title_and_overview() {
        let plan = SlidePlan::for_selection(&Selection::new());
        assert_eq!(plan.retained(), vec![TITLE_SLIDE, OVERVIEW_SLIDE]);
        assert_eq!(plan.removed().iter().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
    }

    #[test]
    fn test_every_subset_keeps_two_plus_selected_in_order() {
        for mask in 0u8..16 {
            let selection: Selection = Metric::ALL
                .into_iter()
                .enumerate()
                .filter(|(bit, _)| mask & (1 << bit) != 0)
                .map(|(_, m)| m)
                .collect();
            let plan = SlidePlan::for_selection(&selection);

            assert_eq!(plan.retained_count(), 2 + selection.len());
            let retained = plan.retained();
            assert_eq!(retained.len(), plan.retained_count());
            assert!(retained.windows(2).all(|w| w[0] < w[1]));
        }
    }

    #[test]
    fn test_stock_and_revenue() {
        let selection: Selection = [Metric::Revenue, Metric::StockPrice].into_iter().collect();
        let plan = SlidePlan::for_selection(&selection);
        assert_eq!(plan.retained(), vec![0, 1, 2, 3]);
        assert!(!plan.keeps(Metric::Cashflow.slide_index()));
        assert!(!plan.keeps(Metric::Ebitda.slide_index()));
    }
}
