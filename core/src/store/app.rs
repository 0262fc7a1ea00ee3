use tokio::sync::watch;

/// App-wide UI flags. The two cells are independent of each other and of
/// any user data.
#[derive(Debug)]
pub struct AppStore {
    loading: watch::Sender<bool>,
    sidebar_collapsed: watch::Sender<bool>,
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}

impl AppStore {
    pub fn new() -> Self {
        Self {
            loading: watch::Sender::new(false),
            sidebar_collapsed: watch::Sender::new(false),
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    pub fn set_loading(&self, value: bool) {
        set_if_changed(&self.loading, value);
    }

    pub fn is_sidebar_collapsed(&self) -> bool {
        *self.sidebar_collapsed.borrow()
    }

    pub fn set_sidebar_collapsed(&self, value: bool) {
        set_if_changed(&self.sidebar_collapsed, value);
    }

    pub fn toggle_sidebar(&self) {
        self.sidebar_collapsed.send_modify(|c| *c = !*c);
    }

    pub fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    pub fn subscribe_sidebar(&self) -> watch::Receiver<bool> {
        self.sidebar_collapsed.subscribe()
    }
}

fn set_if_changed(cell: &watch::Sender<bool>, value: bool) {
    cell.send_if_modified(|current| {
        let changed = *current != value;
        *current = value;
        changed
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_start_cleared() {
        let store = AppStore::new();
        assert!(!store.is_loading());
        assert!(!store.is_sidebar_collapsed());
    }

    #[test]
    fn toggle_sidebar_flips_only_the_sidebar() {
        let store = AppStore::new();
        store.toggle_sidebar();
        assert!(store.is_sidebar_collapsed());
        assert!(!store.is_loading());
        store.toggle_sidebar();
        assert!(!store.is_sidebar_collapsed());
    }

    #[test]
    fn set_loading_notifies_only_on_change() {
        let store = AppStore::new();
        let mut rx = store.subscribe_loading();

        store.set_loading(false);
        assert!(!rx.has_changed().unwrap());

        store.set_loading(true);
        assert!(rx.has_changed().unwrap());
        assert!(*rx.borrow_and_update());
        assert!(store.is_loading());
    }

    #[test]
    fn sidebar_subscribers_see_toggles() {
        let store = AppStore::new();
        let mut rx = store.subscribe_sidebar();
        store.set_sidebar_collapsed(true);
        assert!(*rx.borrow_and_update());
        store.toggle_sidebar();
        assert!(!*rx.borrow_and_update());
    }
}
