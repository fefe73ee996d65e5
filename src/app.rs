use ratatui::widgets::ListState;

use crate::source::{Article, LoadResult};

/// "1 article", "3 articles".
pub fn article_count(n: usize) -> String {
    if n == 1 {
        "1 article".into()
    } else {
        format!("{n} articles")
    }
}

pub struct App {
    /// Articles from the last successful load, in API order.
    pub articles: Vec<Article>,
    /// List selection state for scrolling.
    pub list_state: ListState,
    /// Whether the user has requested to quit.
    pub quit: bool,
    /// Whether a load is in flight.
    pub loading: bool,
    /// Last status message.
    pub status: String,
}

impl App {
    pub fn new() -> Self {
        Self {
            articles: Vec::new(),
            list_state: ListState::default(),
            quit: false,
            loading: false,
            status: "Starting…".into(),
        }
    }

    pub fn checking_network(&mut self) {
        self.status = "Checking network…".into();
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
        self.status = "Loading articles…".into();
    }

    pub fn load_cancelled(&mut self) {
        self.loading = false;
        self.status = "Load cancelled".into();
    }

    /// Show a delivered result.
    ///
    /// A success replaces the list; a failure keeps whatever is on screen and
    /// only explains what went wrong.
    pub fn apply_result(&mut self, result: LoadResult) {
        self.loading = false;
        match result {
            Ok(articles) if articles.is_empty() => {
                self.articles.clear();
                self.list_state.select(None);
                self.status = "No articles found".into();
            }
            Ok(articles) => {
                self.status = format!("Loaded {}", article_count(articles.len()));
                self.articles = articles;
                self.list_state.select(Some(0));
            }
            Err(e) if e.is_offline() => {
                self.status = "No network connection".into();
            }
            Err(e) => {
                self.status = format!("Error: {e}");
            }
        }
    }

    pub fn selected(&self) -> Option<&Article> {
        self.list_state.selected().and_then(|i| self.articles.get(i))
    }

    /// Hand the selected article's link to the user.
    pub fn open_selected(&mut self) {
        if let Some(link) = self.selected().map(|a| a.link.clone()) {
            self.status = format!("Open: {link}");
        }
    }

    // -- navigation ----------------------------------------------------------

    pub fn select_next(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => (i + 1).min(self.articles.len() - 1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_previous(&mut self) {
        if self.articles.is_empty() {
            return;
        }
        let i = match self.list_state.selected() {
            Some(i) => i.saturating_sub(1),
            None => 0,
        };
        self.list_state.select(Some(i));
    }

    pub fn select_first(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(0));
        }
    }

    pub fn select_last(&mut self) {
        if !self.articles.is_empty() {
            self.list_state.select(Some(self.articles.len() - 1));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::{NetworkFailure, ParseFailure};

    fn make_article(title: &str) -> Article {
        Article {
            title: title.to_string(),
            category: "tech".to_string(),
            published_at: "2018-05-01T10:00:00Z".to_string(),
            attribution: String::new(),
            link: format!("https://example.com/{title}"),
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new();
        app.apply_result(Ok(vec![make_article("a"), make_article("b"), make_article("c")]));
        app
    }

    // -- construction --------------------------------------------------------

    #[test]
    fn new_app_starts_empty() {
        let app = App::new();
        assert!(app.articles.is_empty());
        assert!(!app.quit);
        assert!(!app.loading);
        assert!(app.list_state.selected().is_none());
    }

    // -- apply_result --------------------------------------------------------

    #[test]
    fn success_replaces_list_and_selects_first() {
        let mut app = loaded_app();
        app.apply_result(Ok(vec![make_article("z")]));

        assert_eq!(app.articles.len(), 1);
        assert_eq!(app.articles[0].title, "z");
        assert_eq!(app.list_state.selected(), Some(0));
        assert_eq!(app.status, "Loaded 1 article");
    }

    #[test]
    fn success_status_counts_in_plural() {
        let app = loaded_app();
        assert_eq!(app.status, "Loaded 3 articles");
    }

    #[test]
    fn article_count_pluralizes() {
        assert_eq!(article_count(0), "0 articles");
        assert_eq!(article_count(1), "1 article");
        assert_eq!(article_count(2), "2 articles");
    }

    #[test]
    fn empty_success_says_nothing_found() {
        let mut app = loaded_app();
        app.apply_result(Ok(vec![]));

        assert!(app.articles.is_empty());
        assert!(app.list_state.selected().is_none());
        assert_eq!(app.status, "No articles found");
    }

    #[test]
    fn failure_keeps_previous_articles() {
        let mut app = loaded_app();
        app.begin_loading();
        app.apply_result(Err(ParseFailure::MissingField("webTitle".into()).into()));

        assert_eq!(app.articles.len(), 3);
        assert!(!app.loading);
        assert!(app.status.contains("webTitle"));
    }

    #[test]
    fn offline_failure_is_called_out() {
        let mut app = App::new();
        app.apply_result(Err(NetworkFailure::Offline.into()));
        assert_eq!(app.status, "No network connection");
    }

    #[test]
    fn open_selected_shows_link() {
        let mut app = loaded_app();
        app.select_last();
        app.open_selected();
        assert_eq!(app.status, "Open: https://example.com/c");
    }

    #[test]
    fn open_selected_without_selection_is_noop() {
        let mut app = App::new();
        app.open_selected();
        assert_eq!(app.status, "Starting…");
    }

    // -- navigation ----------------------------------------------------------

    #[test]
    fn navigation_on_empty_is_noop() {
        let mut app = App::new();
        app.select_next();
        app.select_previous();
        app.select_first();
        app.select_last();
        assert!(app.list_state.selected().is_none());
    }

    #[test]
    fn select_next_advances_and_clamps() {
        let mut app = loaded_app();

        app.select_next();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_next();
        app.select_next();
        assert_eq!(app.list_state.selected(), Some(2));
    }

    #[test]
    fn select_previous_moves_up_and_clamps() {
        let mut app = loaded_app();

        app.select_last();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(1));
        app.select_first();
        app.select_previous();
        assert_eq!(app.list_state.selected(), Some(0));
    }
}
