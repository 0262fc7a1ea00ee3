use std::sync::Arc;

use tokio::sync::watch;

use super::BusyCounter;
use crate::api::UsersApi;
use crate::error::ApiError;
use crate::notify::{Notice, Notifier};
use crate::types::{ListParams, User, UserCreate, UserUpdate};

pub const FETCH_FAILED: &str = "failed to load users";
pub const USER_CREATED: &str = "user created";
pub const USER_UPDATED: &str = "user updated";
pub const USER_DELETED: &str = "user deleted";

/// Local cache of the user collection plus the actions that change it.
///
/// The cache only changes when one of the actions below completes; there is
/// no background refresh. Actions are not serialized against each other: when
/// two run concurrently, whichever response arrives last wins.
pub struct UserStore {
    api: UsersApi,
    notifier: Arc<dyn Notifier>,
    users: watch::Sender<Vec<User>>,
    // Reserved. No action reads or writes it.
    current_user: watch::Sender<Option<User>>,
    busy: BusyCounter,
}

impl UserStore {
    pub fn new(api: UsersApi, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            users: watch::Sender::new(Vec::new()),
            current_user: watch::Sender::new(None),
            busy: BusyCounter::new(),
        }
    }

    /// Snapshot of the collection, in server order.
    pub fn users(&self) -> Vec<User> {
        self.users.borrow().clone()
    }

    pub fn find_user(&self, id: i64) -> Option<User> {
        self.users.borrow().iter().find(|u| u.id == id).cloned()
    }

    pub fn current_user(&self) -> Option<User> {
        self.current_user.borrow().clone()
    }

    pub fn is_loading(&self) -> bool {
        self.busy.is_busy()
    }

    pub fn subscribe_users(&self) -> watch::Receiver<Vec<User>> {
        self.users.subscribe()
    }

    /// In-flight action count; loading while it is above zero.
    pub fn subscribe_loading(&self) -> watch::Receiver<usize> {
        self.busy.subscribe()
    }

    /// Replace the whole collection with the server's list.
    ///
    /// Failures stop here: they are logged and reported as a notice, and the
    /// collection keeps its previous contents.
    pub async fn fetch_users(&self, params: Option<ListParams>) {
        let _busy = self.busy.enter();
        match self.api.list(params).await {
            Ok(users) => {
                tracing::debug!(count = users.len(), "users fetched");
                self.users.send_replace(users);
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to fetch users");
                self.notifier.notify(Notice::error(FETCH_FAILED));
            }
        }
    }

    /// Create a user and append it to the collection.
    pub async fn add_user(&self, input: &UserCreate) -> Result<User, ApiError> {
        let _busy = self.busy.enter();
        let user = self
            .api
            .create(input)
            .await
            .inspect_err(|e| tracing::error!(error = %e, "failed to create user"))?;

        self.users.send_modify(|users| users.push(user.clone()));
        self.notifier.notify(Notice::success(USER_CREATED));
        Ok(user)
    }

    /// Update a user and replace the cached entry with the server's copy.
    /// A user that is not cached locally is not inserted.
    pub async fn modify_user(&self, id: i64, input: &UserUpdate) -> Result<User, ApiError> {
        let _busy = self.busy.enter();
        let updated = self
            .api
            .update(id, input)
            .await
            .inspect_err(|e| tracing::error!(user_id = id, error = %e, "failed to update user"))?;

        self.users.send_if_modified(|users| {
            match users.iter_mut().find(|u| u.id == id) {
                Some(slot) => {
                    *slot = updated.clone();
                    true
                }
                None => false,
            }
        });
        self.notifier.notify(Notice::success(USER_UPDATED));
        Ok(updated)
    }

    /// Delete a user and drop it from the collection.
    pub async fn remove_user(&self, id: i64) -> Result<(), ApiError> {
        let _busy = self.busy.enter();
        self.api
            .delete(id)
            .await
            .inspect_err(|e| tracing::error!(user_id = id, error = %e, "failed to delete user"))?;

        self.users.send_if_modified(|users| {
            let before = users.len();
            users.retain(|u| u.id != id);
            users.len() != before
        });
        self.notifier.notify(Notice::success(USER_DELETED));
        Ok(())
    }
}
