/// Cursor over the cards of a deck in flip mode. Navigation is a closed
/// loop: stepping past either end wraps around, and any step lands on the
/// question side of the new card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlipNavigator {
    current_index: usize,
    is_flipped: bool,
    total_cards: usize,
}

impl FlipNavigator {
    /// Requires at least one card; an empty deck is rejected upstream
    /// before a navigator ever exists.
    pub fn new(total_cards: usize) -> Option<Self> {
        if total_cards == 0 {
            return None;
        }
        Some(Self {
            current_index: 0,
            is_flipped: false,
            total_cards,
        })
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn is_flipped(&self) -> bool {
        self.is_flipped
    }

    pub fn total_cards(&self) -> usize {
        self.total_cards
    }

    pub fn flip(&mut self) {
        self.is_flipped = !self.is_flipped;
    }

    pub fn next(&mut self) {
        self.current_index = (self.current_index + 1) % self.total_cards;
        self.is_flipped = false;
    }

    pub fn prev(&mut self) {
        self.current_index = (self.current_index + self.total_cards - 1) % self.total_cards;
        self.is_flipped = false;
    }
}
