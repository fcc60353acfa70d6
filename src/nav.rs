//! Screen state machine: categories, sub-categories, content.

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContentKind {
    Procedure,
    Library,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Screen {
    Categories,
    SubCategories,
    Content(ContentKind),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Navigator {
    screen: Screen,
    current_category: Option<String>,
    current_sub_category: Option<String>,
}

impl Navigator {
    pub fn new() -> Self {
        Self {
            screen: Screen::Categories,
            current_category: None,
            current_sub_category: None,
        }
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn current_category(&self) -> Option<&str> {
        self.current_category.as_deref()
    }

    pub fn current_sub_category(&self) -> Option<&str> {
        self.current_sub_category.as_deref()
    }

    /// Library categories open their listing directly, skipping the
    /// sub-category screen.
    pub fn select_category(&mut self, category: &str, library: bool) {
        self.current_category = Some(category.to_string());
        self.current_sub_category = None;
        self.screen = if library {
            Screen::Content(ContentKind::Library)
        } else {
            Screen::SubCategories
        };
    }

    /// Returns false (and changes nothing) unless a regular category is open.
    pub fn select_sub_category(&mut self, sub_category: &str) -> bool {
        if self.screen != Screen::SubCategories || self.current_category.is_none() {
            return false;
        }
        self.current_sub_category = Some(sub_category.to_string());
        self.screen = Screen::Content(ContentKind::Procedure);
        true
    }

    /// Step back one screen. Returns true when the screen changed.
    pub fn back(&mut self) -> bool {
        let from = self.screen;
        self.screen = match from {
            Screen::Content(_) if self.current_sub_category.is_some() => Screen::SubCategories,
            Screen::Content(_) | Screen::SubCategories | Screen::Categories => Screen::Categories,
        };
        self.current_sub_category = None;
        if self.screen == Screen::Categories {
            self.current_category = None;
        }
        from != self.screen
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for Navigator {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_regular_category_round_trip() {
        let mut nav = Navigator::new();
        nav.select_category("RCP", false);
        assert_eq!(nav.screen(), Screen::SubCategories);
        assert!(nav.select_sub_category("Adulto"));
        assert_eq!(nav.screen(), Screen::Content(ContentKind::Procedure));
        assert_eq!(nav.current_sub_category(), Some("Adulto"));

        assert!(nav.back());
        assert_eq!(nav.screen(), Screen::SubCategories);
        assert_eq!(nav.current_category(), Some("RCP"));
        assert_eq!(nav.current_sub_category(), None);

        assert!(nav.back());
        assert_eq!(nav, Navigator::new());
    }

    #[test]
    fn test_library_skips_sub_categories() {
        let mut nav = Navigator::new();
        nav.select_category("AULA_RCP", true);
        assert_eq!(nav.screen(), Screen::Content(ContentKind::Library));
        assert!(nav.back());
        assert_eq!(nav.screen(), Screen::Categories);
        assert_eq!(nav.current_category(), None);
    }

    #[test]
    fn test_sub_category_requires_sub_category_screen() {
        let mut nav = Navigator::new();
        assert!(!nav.select_sub_category("Adulto"));
        assert_eq!(nav.screen(), Screen::Categories);

        nav.select_category("AULA_X", true);
        assert!(!nav.select_sub_category("Adulto"));
        assert_eq!(nav.screen(), Screen::Content(ContentKind::Library));
    }

    #[test]
    fn test_back_on_categories_is_noop() {
        let mut nav = Navigator::new();
        assert!(!nav.back());
        assert_eq!(nav.screen(), Screen::Categories);
    }
}
