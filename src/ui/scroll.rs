/// Back-to-top toggle for a scrollable view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackToTop {
    threshold: u32,
    offset: u32,
}

impl BackToTop {
    pub fn new(threshold: u32) -> Self {
        Self {
            threshold,
            offset: 0,
        }
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn scroll_to(&mut self, offset: u32) {
        self.offset = offset;
    }

    /// Shown strictly above the threshold.
    pub fn is_visible(&self) -> bool {
        self.offset > self.threshold
    }

    /// Jump back to the top. Returns whether the button was visible.
    pub fn activate(&mut self) -> bool {
        let was_visible = self.is_visible();
        self.offset = 0;
        was_visible
    }
}
