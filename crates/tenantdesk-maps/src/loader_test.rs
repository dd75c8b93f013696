use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, FutureExt};
use tokio::sync::Semaphore;

use super::*;
use crate::headless::HeadlessRuntime;

const KEY_A: &str = "AIzaSyAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";
const KEY_B: &str = "AIzaSyBBBBBBBBBBBBBBBBBBBBBBBBBBBBB";

/// Platform whose loads block until the test releases them.
struct FakePlatform {
    loads: AtomicUsize,
    gate: Option<Arc<Semaphore>>,
    failures: Mutex<VecDeque<LoadError>>,
}

impl FakePlatform {
    fn immediate() -> Arc<Self> {
        Arc::new(Self {
            loads: AtomicUsize::new(0),
            gate: None,
            failures: Mutex::new(VecDeque::new()),
        })
    }

    fn gated() -> (Arc<Self>, Arc<Semaphore>) {
        let gate = Arc::new(Semaphore::new(0));
        let platform = Arc::new(Self {
            loads: AtomicUsize::new(0),
            gate: Some(Arc::clone(&gate)),
            failures: Mutex::new(VecDeque::new()),
        });
        (platform, gate)
    }

    fn fail_next(&self, err: LoadError) {
        self.failures.lock().unwrap().push_back(err);
    }

    fn loads(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl MapPlatform for FakePlatform {
    fn load(&self, request: LoadRequest) -> BoxFuture<'static, Result<MapHandle, LoadError>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        let failure = self.failures.lock().unwrap().pop_front();
        let gate = self.gate.clone();
        async move {
            if let Some(gate) = gate {
                gate.acquire_owned().await.unwrap().forget();
            }
            match failure {
                Some(err) => Err(err),
                None => Ok(MapHandle::new(
                    request.credential,
                    Arc::new(HeadlessRuntime::new()),
                )),
            }
        }
        .boxed()
    }
}

fn credential(raw: &str) -> Credential {
    Credential::parse(raw).unwrap()
}

#[tokio::test]
async fn malformed_credential_never_starts_a_load() {
    let platform = FakePlatform::immediate();
    let loader = MapLoader::new(platform.clone());

    let err = loader.acquire("not-a-key").await.unwrap_err();

    assert!(matches!(err, MapError::InvalidCredentialFormat));
    assert_eq!(platform.loads(), 0);
    assert_eq!(loader.loads_started(), 0);
    assert_eq!(loader.state(), LoaderState::Uninitialized);
}

#[tokio::test]
async fn concurrent_acquires_share_one_load() {
    let (platform, gate) = FakePlatform::gated();
    let loader = MapLoader::new(platform.clone());

    let (first, second, ()) = tokio::join!(loader.acquire(KEY_A), loader.acquire(KEY_A), async {
        tokio::task::yield_now().await;
        gate.add_permits(1);
    });

    let first = first.unwrap();
    let second = second.unwrap();
    assert!(first.same_load(&second));
    assert_eq!(platform.loads(), 1);
    assert_eq!(loader.state(), LoaderState::Ready(credential(KEY_A)));
}

#[tokio::test]
async fn ready_loader_reuses_handle() {
    let platform = FakePlatform::immediate();
    let loader = MapLoader::new(platform.clone());

    let first = loader.acquire(KEY_A).await.unwrap();
    let again = loader.acquire(&format!("  {KEY_A} ")).await.unwrap();

    assert!(first.same_load(&again));
    assert_eq!(platform.loads(), 1);
}

#[tokio::test]
async fn credential_switch_discards_in_flight_load() {
    let (platform, gate) = FakePlatform::gated();
    let loader = MapLoader::new(platform.clone());

    let mut load_a = std::pin::pin!(loader.acquire(KEY_A));
    assert!(futures::poll!(&mut load_a).is_pending());
    assert_eq!(loader.state(), LoaderState::Loading(credential(KEY_A)));

    let mut load_b = std::pin::pin!(loader.acquire(KEY_B));
    assert!(futures::poll!(&mut load_b).is_pending());
    assert_eq!(loader.state(), LoaderState::Loading(credential(KEY_B)));
    assert_eq!(platform.loads(), 2);

    gate.add_permits(2);
    let handle_a = load_a.await.unwrap();
    // The superseded load finishing must not overwrite the newer one.
    assert_eq!(loader.state(), LoaderState::Loading(credential(KEY_B)));

    let handle_b = load_b.await.unwrap();
    assert_eq!(handle_a.credential(), &credential(KEY_A));
    assert_eq!(handle_b.credential(), &credential(KEY_B));
    assert!(!handle_a.same_load(&handle_b));
    assert_eq!(loader.state(), LoaderState::Ready(credential(KEY_B)));
}

#[tokio::test]
async fn switching_a_ready_loader_reloads() {
    let platform = FakePlatform::immediate();
    let loader = MapLoader::new(platform.clone());

    let a = loader.acquire(KEY_A).await.unwrap();
    let b = loader.acquire(KEY_B).await.unwrap();

    assert!(!a.same_load(&b));
    assert_eq!(platform.loads(), 2);
    assert_eq!(loader.state(), LoaderState::Ready(credential(KEY_B)));
}

#[tokio::test]
async fn failed_load_resets_and_next_acquire_retries() {
    let platform = FakePlatform::immediate();
    platform.fail_next(LoadError::classify("RefererNotAllowedMapError"));
    let loader = MapLoader::new(platform.clone());

    let err = loader.acquire(KEY_A).await.unwrap_err();
    assert!(matches!(
        err,
        MapError::Load(LoadError::OriginRestricted(_))
    ));
    assert_eq!(loader.state(), LoaderState::Uninitialized);

    let handle = loader.acquire(KEY_A).await.unwrap();
    assert_eq!(handle.credential(), &credential(KEY_A));
    assert_eq!(platform.loads(), 2);
}

#[tokio::test]
async fn joined_waiters_all_see_the_failure() {
    let (platform, gate) = FakePlatform::gated();
    platform.fail_next(LoadError::QuotaExceeded("daily limit".to_owned()));
    let loader = MapLoader::new(platform.clone());

    let (first, second, ()) = tokio::join!(loader.acquire(KEY_A), loader.acquire(KEY_A), async {
        tokio::task::yield_now().await;
        gate.add_permits(1);
    });

    for result in [first, second] {
        assert!(matches!(
            result,
            Err(MapError::Load(LoadError::QuotaExceeded(_)))
        ));
    }
    assert_eq!(platform.loads(), 1);
    assert_eq!(loader.state(), LoaderState::Uninitialized);
}

#[tokio::test]
async fn reset_during_load_keeps_loader_uninitialized() {
    let (platform, gate) = FakePlatform::gated();
    let loader = MapLoader::new(platform.clone());

    let mut load = std::pin::pin!(loader.acquire(KEY_A));
    assert!(futures::poll!(&mut load).is_pending());
    loader.reset();
    gate.add_permits(1);

    assert!(load.await.is_ok());
    assert_eq!(loader.state(), LoaderState::Uninitialized);
}

#[tokio::test]
async fn global_loader_is_installed_once() {
    let first = MapLoader::install_global(FakePlatform::immediate());
    let second = MapLoader::install_global(FakePlatform::immediate());

    assert!(std::ptr::eq(first, second));
    assert!(MapLoader::global().is_some_and(|g| std::ptr::eq(g, first)));
}
