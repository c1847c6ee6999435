//! # Live Session
//!
//! Keeps a [`LedgerSnapshot`] in sync with the store and republishes the
//! dashboard every time any feed delivers.
//!
//! Each of the nine feeds (six collections, three settings documents) runs in
//! its own task. A delivery replaces that part of the snapshot and the report
//! is recomputed synchronously before the new [`LiveView`] is published, so a
//! reader always sees a summary that matches its snapshot. A feed refused by
//! the store's rules produces a banner and the other feeds keep running.
//!
//! [`LiveSession::shutdown`] cancels every task and waits for them; nothing is
//! applied after it returns.

use log::{debug, info, warn};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::backend::domain::ledger::compute_dashboard;
use crate::backend::domain::snapshot::LedgerSnapshot;
use crate::backend::io::banner::Banner;
use crate::backend::storage::{Collection, DocumentStore, SettingsDoc, StoreError};
use shared::DashboardSummary;

/// What the dashboard renders: a snapshot and the summary computed from it
#[derive(Debug, Clone)]
pub struct LiveView {
    pub snapshot: LedgerSnapshot,
    pub summary: DashboardSummary,
    /// Number of deliveries applied so far
    pub revision: u64,
}

struct SessionState {
    snapshot: LedgerSnapshot,
    revision: u64,
}

struct Shared {
    state: Mutex<SessionState>,
    view_tx: watch::Sender<Arc<LiveView>>,
    loaded_tx: watch::Sender<bool>,
    banners: Mutex<Vec<Banner>>,
}

impl Shared {
    /// Apply one delivery and publish; `false` once the session is cancelled
    fn publish(&self, token: &CancellationToken, update: impl FnOnce(&mut LedgerSnapshot)) -> bool {
        let mut state = self.state.lock().unwrap_or_else(|p| p.into_inner());
        if token.is_cancelled() {
            return false;
        }
        update(&mut state.snapshot);
        state.revision += 1;

        let view = LiveView {
            summary: compute_dashboard(&state.snapshot),
            snapshot: state.snapshot.clone(),
            revision: state.revision,
        };
        self.view_tx.send_replace(Arc::new(view));
        true
    }

    fn push_banner(&self, banner: Banner) {
        warn!("{}", banner.message);
        self.banners.lock().unwrap_or_else(|p| p.into_inner()).push(banner);
    }

    fn mark_loaded(&self) {
        self.loaded_tx.send_if_modified(|loaded| !std::mem::replace(loaded, true));
    }
}

pub struct LiveSession {
    shared: Arc<Shared>,
    view_rx: watch::Receiver<Arc<LiveView>>,
    loaded_rx: watch::Receiver<bool>,
    token: CancellationToken,
    tasks: Vec<JoinHandle<()>>,
}

impl LiveSession {
    /// Subscribe to every feed and start applying deliveries
    pub async fn start(store: Arc<dyn DocumentStore>, default_pin: &str) -> Self {
        let snapshot = LedgerSnapshot::empty(default_pin);
        let initial = LiveView {
            summary: compute_dashboard(&snapshot),
            snapshot: snapshot.clone(),
            revision: 0,
        };
        let (view_tx, view_rx) = watch::channel(Arc::new(initial));
        let (loaded_tx, loaded_rx) = watch::channel(false);
        let shared = Arc::new(Shared {
            state: Mutex::new(SessionState { snapshot, revision: 0 }),
            view_tx,
            loaded_tx,
            banners: Mutex::new(Vec::new()),
        });
        let token = CancellationToken::new();
        let mut tasks = Vec::new();

        for collection in Collection::ALL {
            match store.subscribe_collection(collection).await {
                Ok(feed) => tasks.push(spawn_feed(
                    shared.clone(),
                    token.clone(),
                    feed,
                    collection.as_str(),
                    collection == Collection::Members,
                    move |snapshot, documents: Vec<_>| snapshot.apply_collection(collection, &documents),
                )),
                Err(e) => {
                    report_subscribe_failure(&shared, collection.as_str(), &e);
                    // The dashboard should not wait forever for a refused member list
                    if collection == Collection::Members {
                        shared.mark_loaded();
                    }
                }
            }
        }

        for doc in SettingsDoc::ALL {
            match store.subscribe_document(doc).await {
                Ok(feed) => {
                    let pin = default_pin.to_string();
                    tasks.push(spawn_feed(
                        shared.clone(),
                        token.clone(),
                        feed,
                        doc.as_str(),
                        false,
                        move |snapshot, document: Option<_>| {
                            snapshot.apply_settings(doc, document.as_ref(), &pin)
                        },
                    ));
                }
                Err(e) => report_subscribe_failure(&shared, doc.as_str(), &e),
            }
        }

        info!("Live session started with {} feeds", tasks.len());
        Self {
            shared,
            view_rx,
            loaded_rx,
            token,
            tasks,
        }
    }

    /// The latest view
    pub fn view(&self) -> Arc<LiveView> {
        self.view_rx.borrow().clone()
    }

    /// Receiver notified on every published view
    pub fn subscribe(&self) -> watch::Receiver<Arc<LiveView>> {
        self.view_rx.clone()
    }

    /// Wait for the first member list (or its refusal); `false` on timeout
    pub async fn wait_until_loaded(&self, timeout: Duration) -> bool {
        let mut loaded = self.loaded_rx.clone();
        let outcome = tokio::time::timeout(timeout, loaded.wait_for(|loaded| *loaded))
            .await
            .map(|waited| waited.map(|_| ()));
        match outcome {
            Ok(Ok(())) => true,
            _ => {
                warn!("Initial data did not arrive within {:?}; showing what is available", timeout);
                false
            }
        }
    }

    pub fn banners(&self) -> Vec<Banner> {
        self.shared.banners.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn dismiss_banner(&self, index: usize) -> Option<Banner> {
        let mut banners = self.shared.banners.lock().unwrap_or_else(|p| p.into_inner());
        (index < banners.len()).then(|| banners.remove(index))
    }

    /// Cancel every feed task and wait for them to finish
    pub async fn shutdown(self) {
        self.token.cancel();
        for task in self.tasks {
            if let Err(e) = task.await {
                warn!("Feed task ended abnormally: {}", e);
            }
        }
        info!("Live session stopped");
    }
}

fn report_subscribe_failure(shared: &Shared, feed: &str, error: &anyhow::Error) {
    match error.downcast_ref::<StoreError>() {
        Some(store_error) if store_error.is_permission_denied() => {
            shared.push_banner(Banner::permission(feed));
        }
        _ => shared.push_banner(Banner::from_error(error)),
    }
}

fn spawn_feed<T, F>(
    shared: Arc<Shared>,
    token: CancellationToken,
    mut feed: watch::Receiver<T>,
    name: &'static str,
    marks_loaded: bool,
    apply: F,
) -> JoinHandle<()>
where
    T: Clone + Send + Sync + 'static,
    F: Fn(&mut LedgerSnapshot, T) + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            let value = feed.borrow_and_update().clone();
            if !shared.publish(&token, |snapshot| apply(snapshot, value)) {
                break;
            }
            if marks_loaded {
                shared.mark_loaded();
            }

            tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!("{} feed stopped", name);
                    break;
                }
                changed = feed.changed() => {
                    if changed.is_err() {
                        debug!("{} feed closed", name);
                        break;
                    }
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::io::banner::BannerKind;
    use crate::backend::storage::{DocPath, Fields, MemoryStore};
    use serde_json::json;

    const WAIT: Duration = Duration::from_secs(2);

    fn fields(value: serde_json::Value) -> Fields {
        value.as_object().cloned().unwrap()
    }

    async fn wait_for_view(
        session: &LiveSession,
        predicate: impl FnMut(&Arc<LiveView>) -> bool,
    ) -> Arc<LiveView> {
        let mut rx = session.subscribe();
        let view = tokio::time::timeout(WAIT, rx.wait_for(predicate))
            .await
            .expect("view did not update in time")
            .unwrap()
            .clone();
        view
    }

    #[tokio::test]
    async fn test_updates_flow_into_summary() {
        let store = MemoryStore::new();
        let session = LiveSession::start(Arc::new(store.clone()), "1234").await;
        assert!(session.wait_until_loaded(WAIT).await);

        let member_id = store
            .create(Collection::Members, fields(json!({"name": "Rahim"})))
            .await
            .unwrap();
        store
            .upsert(
                &DocPath::settings(SettingsDoc::FixedBills),
                fields(json!({"wifi": 300, "current": 0, "rent": 0})),
                false,
            )
            .await
            .unwrap();

        let view = wait_for_view(&session, |v| v.summary.member_count == 1 && v.summary.bill_per_head == 300.0).await;
        assert_eq!(view.summary.members[0].member_id, member_id);
        assert_eq!(view.snapshot.fixed_bills.wifi, 300.0);

        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_denied_feed_shows_banner_and_others_continue() {
        let store = MemoryStore::new();
        store.deny("deposits");
        let session = LiveSession::start(Arc::new(store.clone()), "1234").await;

        let banners = session.banners();
        assert_eq!(banners.len(), 1);
        assert_eq!(banners[0].kind, BannerKind::Permission);
        assert_eq!(banners[0].message, "Permission Error: deposits");

        store.create(Collection::Fines, fields(json!({"member_id": "m1"}))).await.unwrap();
        let view = wait_for_view(&session, |v| v.summary.fine_meals == 2.0).await;
        assert_eq!(view.snapshot.fines.len(), 1);

        assert!(session.dismiss_banner(0).is_some());
        assert!(session.banners().is_empty());
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_denied_members_still_finishes_loading() {
        let store = MemoryStore::new();
        store.deny("members");
        let session = LiveSession::start(Arc::new(store), "1234").await;
        assert!(session.wait_until_loaded(Duration::from_millis(200)).await);
        session.shutdown().await;
    }

    #[tokio::test]
    async fn test_no_updates_after_shutdown() {
        let store = MemoryStore::new();
        let session = LiveSession::start(Arc::new(store.clone()), "1234").await;
        session.wait_until_loaded(WAIT).await;

        let rx = session.subscribe();
        session.shutdown().await;
        let revision = rx.borrow().revision;

        store.create(Collection::Members, fields(json!({"name": "Late"}))).await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(rx.borrow().revision, revision);
        assert_eq!(rx.borrow().summary.member_count, 0);
    }
}
