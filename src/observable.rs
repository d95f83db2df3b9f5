//! # Observable state
//!
//! Every piece of mini-app state that a view can watch lives in a [`StateStore`].
//! The store is owned by exactly one service object; views get receivers or
//! [`Subscription`]s from it and never write to it directly.
//!
//! The store is a thin layer over `tokio::sync::watch`:
//!
//! - **Replay latest**: a new subscriber sees the current value immediately.
//! - **Fan-out**: any number of receivers, each independent.
//! - **Scoped observation**: [`StateStore::observe`] spawns a task and returns a
//!   [`Subscription`]; dropping the subscription aborts the task, so no callback
//!   runs after its owner is gone.

use tokio::{sync::watch, task::JoinHandle};
use tokio_stream::{wrappers::WatchStream, StreamExt};
use tracing::trace;

pub struct StateStore<T> {
    sender: watch::Sender<T>,
}

impl<T> StateStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// Snapshot of the current value.
    pub fn get(&self) -> T {
        self.sender.borrow().clone()
    }

    /// Replaces the value and notifies every receiver, even if it is equal.
    pub fn set(&self, value: T) {
        self.sender.send_replace(value);
    }

    pub fn update<F>(&self, modify: F)
    where
        F: FnOnce(&mut T),
    {
        self.sender.send_modify(modify);
    }

    pub fn subscribe(&self) -> watch::Receiver<T> {
        self.sender.subscribe()
    }

    pub fn observe<F>(&self, on_value: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        observe_receiver(self.subscribe(), on_value)
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T> Default for StateStore<T>
where
    T: Clone + Default + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new(T::default())
    }
}

/// Runs `on_value` for the current value of `receiver` and for every change
/// after it, until the returned [`Subscription`] is dropped.
pub fn observe_receiver<T, F>(receiver: watch::Receiver<T>, mut on_value: F) -> Subscription
where
    T: Clone + Send + Sync + 'static,
    F: FnMut(T) + Send + 'static,
{
    let mut stream = WatchStream::new(receiver);
    let handle = tokio::spawn(async move {
        while let Some(value) = stream.next().await {
            on_value(value);
        }
        trace!("observed store closed");
    });
    Subscription::new(handle)
}

/// Method form of [`observe_receiver`] for any watch receiver.
pub trait ObserveExt<T> {
    fn observe<F>(self, on_value: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static;
}

impl<T> ObserveExt<T> for watch::Receiver<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn observe<F>(self, on_value: F) -> Subscription
    where
        F: FnMut(T) + Send + 'static,
    {
        observe_receiver(self, on_value)
    }
}

/// Cancellable handle for an observation task. Aborts the task on drop.
#[derive(Debug)]
pub struct Subscription {
    handle: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn new(handle: JoinHandle<()>) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    pub fn cancel(mut self) {
        self.abort();
    }

    pub fn is_active(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn abort(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::{sleep, timeout, Duration};

    #[tokio::test]
    async fn test_replay_latest_for_new_subscriber() {
        let store = StateStore::new(1);
        store.set(2);
        store.set(3);

        let rx = store.subscribe();
        assert_eq!(*rx.borrow(), 3);
    }

    #[tokio::test]
    async fn test_fan_out_to_multiple_subscribers() {
        let store = StateStore::new(0);
        let mut rx1 = store.subscribe();
        let mut rx2 = store.subscribe();

        store.set(7);

        timeout(Duration::from_millis(100), rx1.changed())
            .await
            .unwrap()
            .unwrap();
        timeout(Duration::from_millis(100), rx2.changed())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(*rx1.borrow(), 7);
        assert_eq!(*rx2.borrow(), 7);
    }

    #[tokio::test]
    async fn test_observe_delivers_current_then_changes() {
        let store = StateStore::new("a".to_string());
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let _subscription = store.observe(move |value| {
            seen_clone.lock().unwrap().push(value);
        });

        sleep(Duration::from_millis(20)).await;
        store.set("b".to_string());
        sleep(Duration::from_millis(20)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["a".to_string(), "b".to_string()]);
    }

    #[tokio::test]
    async fn test_dropped_subscription_stops_callbacks() {
        let store = StateStore::new(0);
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_clone = seen.clone();
        let subscription = store.observe(move |value| {
            seen_clone.lock().unwrap().push(value);
        });
        sleep(Duration::from_millis(20)).await;

        drop(subscription);
        sleep(Duration::from_millis(10)).await;
        store.set(1);
        sleep(Duration::from_millis(20)).await;

        assert_eq!(*seen.lock().unwrap(), vec![0]);
        assert_eq!(store.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn test_update_modifies_in_place() {
        let store = StateStore::new(vec![1]);
        store.update(|values| values.push(2));
        assert_eq!(store.get(), vec![1, 2]);
    }
}
