use std::collections::VecDeque;

use crate::domain::ProductCard;

/// Per-session FIFO of fetched candidate products, consumed one per swipe.
///
/// Filled wholesale by a single upstream fetch per category/filter selection;
/// popping is destructive and an item is never re-inserted.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BrowseQueue {
    items: VecDeque<ProductCard>,
}

impl BrowseQueue {
    pub fn filled(items: Vec<ProductCard>) -> Self {
        Self {
            items: items.into(),
        }
    }

    /// Replace the queue contents with a fresh fetch result.
    pub fn refill(&mut self, items: Vec<ProductCard>) {
        self.items = items.into();
    }

    pub fn pop(&mut self) -> Option<ProductCard> {
        self.items.pop_front()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ProductId;
    use chrono::Utc;

    fn card(id: i64) -> ProductCard {
        ProductCard {
            id: ProductId(id),
            name: format!("item {id}"),
            price_amount: 10.0,
            price_currency: "€".to_string(),
            location: None,
            description: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn pops_in_fetch_order_then_yields_none() {
        let mut queue = BrowseQueue::filled(vec![card(1), card(2), card(3)]);
        assert_eq!(queue.pop().map(|c| c.id), Some(ProductId(1)));
        assert_eq!(queue.pop().map(|c| c.id), Some(ProductId(2)));
        assert_eq!(queue.pop().map(|c| c.id), Some(ProductId(3)));
        assert_eq!(queue.pop(), None);
        // Popping an exhausted queue stays a normal outcome.
        assert_eq!(queue.pop(), None);
    }

    #[test]
    fn refill_replaces_wholesale() {
        let mut queue = BrowseQueue::filled(vec![card(1), card(2)]);
        queue.refill(vec![card(9)]);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().map(|c| c.id), Some(ProductId(9)));
    }
}
