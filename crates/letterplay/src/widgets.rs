/// A widget that can be checked and unchecked: card frames, switches, radio buttons.
pub trait Toggle {
    fn set_checked(&mut self, checked: bool);
    fn is_checked(&self) -> bool;
}

/// Plain checked flag, for widgets whose look is drawn elsewhere.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CheckState(bool);

impl Toggle for CheckState {
    fn set_checked(&mut self, checked: bool) {
        self.0 = checked;
    }

    fn is_checked(&self) -> bool {
        self.0
    }
}

/// Toggles where at most one is checked at a time.
pub struct ToggleGroup<T: Toggle> {
    items: Vec<T>,
}

impl<T: Toggle> ToggleGroup<T> {
    pub fn new(mut items: Vec<T>) -> Self {
        for item in &mut items {
            item.set_checked(false);
        }
        Self { items }
    }

    /// Check `index` and uncheck the rest. Out-of-range indices clear the group.
    pub fn select(&mut self, index: usize) {
        for (i, item) in self.items.iter_mut().enumerate() {
            item.set_checked(i == index);
        }
    }

    pub fn clear(&mut self) {
        for item in &mut self.items {
            item.set_checked(false);
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.items.iter().position(Toggle::is_checked)
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
