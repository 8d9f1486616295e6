//! Listener registration and dispatch
//!
//! `ListenerRegistry<T>` is a small, reusable notifying capability: any
//! store can hold one and call `notify` after it has durably written an
//! item. Dispatch is sequential and in registration order. Each listener
//! call is isolated, so an error or panic in one listener is captured
//! and the remaining listeners still run.

use crate::error::{ListenerFailure, Result};
use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Trait for components notified of every new item in a store
#[async_trait]
pub trait Listener<T: Send + Sync>: Send + Sync {
    /// Called once per stored item, before the storing call returns
    async fn on_add(&self, item: &T) -> Result<()>;

    /// Name used when reporting failures
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Adapter turning a plain closure into a `Listener`
pub struct FnListener<F> {
    name: String,
    f: F,
}

impl<F> FnListener<F> {
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<T, F> Listener<T> for FnListener<F>
where
    T: Send + Sync,
    F: Fn(&T) -> Result<()> + Send + Sync,
{
    async fn on_add(&self, item: &T) -> Result<()> {
        (self.f)(item)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Ordered collection of listeners for items of type `T`
pub struct ListenerRegistry<T: Send + Sync + 'static> {
    listeners: RwLock<Vec<Arc<dyn Listener<T>>>>,
}

impl<T: Send + Sync + 'static> ListenerRegistry<T> {
    pub fn new() -> Self {
        Self {
            listeners: RwLock::new(Vec::new()),
        }
    }

    /// Append a listener. Registering the same listener twice delivers twice.
    pub async fn register(&self, listener: Arc<dyn Listener<T>>) {
        let mut listeners = self.listeners.write().await;
        tracing::debug!(
            listener = %listener.name(),
            position = listeners.len(),
            "Listener registered"
        );
        listeners.push(listener);
    }

    /// Number of registered listeners
    pub async fn len(&self) -> usize {
        self.listeners.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.listeners.read().await.is_empty()
    }

    /// Listener names in registration order
    pub async fn names(&self) -> Vec<String> {
        let listeners = self.listeners.read().await;
        listeners.iter().map(|l| l.name().to_string()).collect()
    }

    /// Deliver `item` to every listener in registration order
    ///
    /// Works on a snapshot of the list, so a listener may register
    /// further listeners; those receive the next item, not this one.
    pub async fn notify(&self, item: &T) -> std::result::Result<(), Vec<ListenerFailure>> {
        let listeners = self.listeners.read().await.clone();
        let mut failures = Vec::new();

        for (position, listener) in listeners.iter().enumerate() {
            let outcome = AssertUnwindSafe(listener.on_add(item))
                .catch_unwind()
                .await;

            let reason = match outcome {
                Ok(Ok(())) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(payload) => format!("panicked: {}", panic_message(payload.as_ref())),
            };

            tracing::warn!(
                listener = %listener.name(),
                position,
                reason = %reason,
                "Listener failed"
            );

            failures.push(ListenerFailure {
                listener: listener.name().to_string(),
                position,
                reason,
            });
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(failures)
        }
    }
}

impl<T: Send + Sync + 'static> Default for ListenerRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AttackStoreError;
    use std::sync::Mutex;

    struct Recording {
        name: String,
        log: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl Listener<u32> for Recording {
        async fn on_add(&self, item: &u32) -> Result<()> {
            self.log.lock().unwrap().push(format!("{}:{}", self.name, item));
            Ok(())
        }

        fn name(&self) -> &str {
            &self.name
        }
    }

    fn recording(name: &str, log: &Arc<Mutex<Vec<String>>>) -> Arc<dyn Listener<u32>> {
        Arc::new(Recording {
            name: name.to_string(),
            log: log.clone(),
        })
    }

    #[tokio::test]
    async fn test_notify_in_registration_order() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register(recording("first", &log)).await;
        registry.register(recording("second", &log)).await;
        registry.register(recording("third", &log)).await;

        registry.notify(&7).await.unwrap();
        assert_eq!(
            *log.lock().unwrap(),
            vec!["first:7", "second:7", "third:7"]
        );
        assert_eq!(registry.names().await, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_notify_empty_registry() {
        let registry: ListenerRegistry<u32> = ListenerRegistry::default();
        assert!(registry.is_empty().await);
        assert!(registry.notify(&1).await.is_ok());
    }

    #[tokio::test]
    async fn test_duplicate_registration_delivers_twice() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));
        let listener = recording("dup", &log);

        registry.register(listener.clone()).await;
        registry.register(listener).await;
        registry.notify(&1).await.unwrap();

        assert_eq!(registry.len().await, 2);
        assert_eq!(log.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_failing_listener_does_not_stop_others() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry.register(recording("before", &log)).await;
        registry
            .register(Arc::new(FnListener::new("broken", |_: &u32| -> Result<()> {
                Err(AttackStoreError::Listener("mailbox full".to_string()))
            })))
            .await;
        registry.register(recording("after", &log)).await;

        let failures = registry.notify(&3).await.unwrap_err();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].listener, "broken");
        assert_eq!(failures[0].position, 1);
        assert!(failures[0].reason.contains("mailbox full"));
        assert_eq!(*log.lock().unwrap(), vec!["before:3", "after:3"]);
    }

    #[tokio::test]
    async fn test_panicking_listener_is_isolated() {
        let registry = ListenerRegistry::new();
        let log = Arc::new(Mutex::new(Vec::new()));

        registry
            .register(Arc::new(FnListener::new("boom", |_: &u32| -> Result<()> {
                panic!("listener exploded")
            })))
            .await;
        registry.register(recording("survivor", &log)).await;

        let failures = registry.notify(&9).await.unwrap_err();
        assert_eq!(failures.len(), 1);
        assert!(failures[0].reason.contains("listener exploded"));
        assert_eq!(*log.lock().unwrap(), vec!["survivor:9"]);
    }

    #[test]
    fn test_default_listener_name_is_type_name() {
        struct Quiet;

        #[async_trait]
        impl Listener<u32> for Quiet {
            async fn on_add(&self, _item: &u32) -> Result<()> {
                Ok(())
            }
        }

        assert!(Quiet.name().ends_with("Quiet"));
    }

    #[test]
    fn test_fn_listener_runs_closure() {
        let hits = Arc::new(Mutex::new(0u32));
        let counter = hits.clone();
        let listener = FnListener::new("counter", move |n: &u32| {
            *counter.lock().unwrap() += n;
            Ok(())
        });

        tokio_test::block_on(Listener::<u32>::on_add(&listener, &5)).unwrap();
        tokio_test::block_on(Listener::<u32>::on_add(&listener, &2)).unwrap();
        assert_eq!(*hits.lock().unwrap(), 7);
    }
}
