// bistro-client/tests/client_integration.rs
// Store behavior across simulated restarts

mod common;

use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

use bistro_client::logger::init_logger_with_file;
use bistro_client::storage::keys;
use bistro_client::{
    AuthStatus, BistroClient, CartItem, ClientConfig, ClientError, Coordinates, FileKvStore,
    KvStore, MemoryKvStore, OrderAddress, Payment, PaymentMethod,
};
use common::{FakeIdentity, FakeLocation};
use tempfile::TempDir;

fn item(id: &str, price: f64) -> CartItem {
    CartItem {
        id: id.to_string(),
        title: format!("Dish {}", id),
        price,
        quantity: 1,
        thumbnail_url: String::new(),
    }
}

fn client_over(
    kv: Arc<dyn KvStore>,
    identity: Arc<FakeIdentity>,
    location: Arc<FakeLocation>,
) -> BistroClient {
    init_logger_with_file(Some("debug"), None);
    BistroClient::new(ClientConfig::default(), kv, identity, location).unwrap()
}

#[tokio::test]
async fn test_cart_quantities_match_persisted_snapshot() {
    let temp_dir = TempDir::new().unwrap();
    let kv: Arc<dyn KvStore> = Arc::new(FileKvStore::new(temp_dir.path()));
    let client = client_over(
        kv.clone(),
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeLocation::granted(Coordinates::new(0.0, 0.0))),
    );
    let cart = client.cart();

    let steps: &[(&str, i32)] = &[
        ("a", 2),
        ("b", 1),
        ("a", -1),
        ("c", 4),
        ("b", -3),
        ("a", 3),
        ("missing", -1),
        ("c", -4),
        ("d", 1),
    ];
    for (id, delta) in steps {
        if *delta > 0 {
            cart.add_item(item(id, 1.25), *delta as u32).await.unwrap();
        } else {
            cart.remove_item(id, delta.unsigned_abs()).await.unwrap();
        }

        let snapshot = cart.snapshot();
        assert!(snapshot.items().iter().all(|i| i.quantity > 0));

        let restarted = client_over(
            kv.clone(),
            Arc::new(FakeIdentity::new()),
            Arc::new(FakeLocation::granted(Coordinates::new(0.0, 0.0))),
        );
        restarted.hydrate().await;
        assert_eq!(restarted.cart().snapshot(), snapshot);
        assert_eq!(restarted.cart().snapshot().item_count(), snapshot.item_count());
    }

    let final_cart = cart.snapshot();
    assert_eq!(final_cart.get("a").unwrap().quantity, 4);
    assert!(final_cart.get("b").is_none());
    assert!(final_cart.get("c").is_none());
    assert_eq!(final_cart.item_count(), 5);
    assert_eq!(cart.total(), 6.25);
}

#[tokio::test]
async fn test_checkout_survives_restart_until_delivery_confirmed() {
    let temp_dir = TempDir::new().unwrap();
    let kv: Arc<dyn KvStore> = Arc::new(FileKvStore::new(temp_dir.path()));
    let location = Arc::new(FakeLocation::granted(Coordinates::new(41.7, 44.8)));
    let client = client_over(kv.clone(), Arc::new(FakeIdentity::new()), location.clone());

    client.cart().add_item(item("1", 30.0), 2).await.unwrap();
    let snapshot = client.location().request_once().await.unwrap();
    let order = client
        .checkout()
        .place_order(
            &Payment::new(PaymentMethod::Visa).with_card("2"),
            Some(OrderAddress::from(&snapshot)),
        )
        .await
        .unwrap();
    assert_eq!(order.total, 64.8);
    assert!(client.cart().snapshot().is_empty());

    let restarted = client_over(kv.clone(), Arc::new(FakeIdentity::new()), location.clone());
    restarted.hydrate().await;
    assert_eq!(restarted.orders().current(), Some(order));
    assert!(restarted.cart().snapshot().is_empty());
    assert_eq!(restarted.location().snapshot(), Some(snapshot));

    restarted.checkout().confirm_delivery().await.unwrap();
    let again = client_over(kv, Arc::new(FakeIdentity::new()), location);
    again.hydrate().await;
    assert!(again.orders().current().is_none());
}

#[tokio::test]
async fn test_card_payment_without_card_places_nothing() {
    let kv = Arc::new(MemoryKvStore::new());
    let client = client_over(
        kv.clone(),
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeLocation::granted(Coordinates::new(0.0, 0.0))),
    );
    client.cart().add_item(item("1", 3.0), 1).await.unwrap();

    let err = client
        .checkout()
        .place_order(&Payment::new(PaymentMethod::Mastercard), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::CardRequired(_)));
    assert!(!kv.contains(keys::CURRENT_ORDER));
    assert_eq!(client.cart().snapshot().len(), 1);
}

#[tokio::test]
async fn test_denied_permission_persists_nothing() {
    let kv = Arc::new(MemoryKvStore::new());
    let client = client_over(
        kv.clone(),
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeLocation::denying(Coordinates::new(1.0, 1.0))),
    );

    let err = client.location().request_once().await.unwrap_err();
    assert!(matches!(err, ClientError::PermissionDenied));
    assert!(client.location().snapshot().is_none());
    assert!(!kv.contains(keys::LOCATION));

    let err = client.location().start_watch().await.unwrap_err();
    assert!(matches!(err, ClientError::PermissionDenied));
    assert!(!client.location().is_watching().await);
}

#[tokio::test]
async fn test_identical_fixes_write_once() {
    let kv = Arc::new(MemoryKvStore::new());
    let location = Arc::new(FakeLocation::granted(Coordinates::new(2.0, 3.0)));
    let client = client_over(kv.clone(), Arc::new(FakeIdentity::new()), location.clone());

    client.location().request_once().await.unwrap();
    client.location().request_once().await.unwrap();
    assert_eq!(kv.write_count(), 1);

    location.move_to(Coordinates::new(2.0, 3.5));
    client.location().request_once().await.unwrap();
    assert_eq!(kv.write_count(), 2);
}

#[tokio::test]
async fn test_watch_is_single_subscription() {
    let kv = Arc::new(MemoryKvStore::new());
    let location = Arc::new(FakeLocation::granted(Coordinates::new(0.0, 0.0)));
    let client = client_over(kv.clone(), Arc::new(FakeIdentity::new()), location.clone());
    let mut rx = client.location().subscribe();

    client.location().start_watch().await.unwrap();
    client.location().start_watch().await.unwrap();
    assert_eq!(location.watch_calls.load(Ordering::SeqCst), 1);

    assert!(location.push(Coordinates::new(5.0, 5.0)).await);
    tokio::time::timeout(Duration::from_secs(1), rx.changed())
        .await
        .unwrap()
        .unwrap();
    // Same coordinates again: no second write
    assert!(location.push(Coordinates::new(5.0, 5.0)).await);
    client.location().stop_watch().await;
    assert_eq!(kv.write_count(), 1);

    // The watch task is gone, so its receiver is dropped
    assert!(!location.push(Coordinates::new(6.0, 6.0)).await);
}

#[tokio::test]
async fn test_session_lifecycle_and_restore() {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let identity = Arc::new(FakeIdentity::new());
    let location = Arc::new(FakeLocation::granted(Coordinates::new(0.0, 0.0)));
    let client = client_over(kv.clone(), identity.clone(), location.clone());

    let session = client
        .auth()
        .register("nino", "nino@example.com", "secret1")
        .await
        .unwrap();
    let uid = session.uid.clone().unwrap();
    assert_eq!(identity.profile(&uid).unwrap().username, "nino");
    drop(client);

    // Restart: optimistic restore, then confirm with the backend
    let restarted = client_over(kv.clone(), identity.clone(), location.clone());
    restarted.hydrate().await;
    assert_eq!(restarted.auth().status(), AuthStatus::Authenticated);
    assert_eq!(
        restarted.auth().reconcile().await.unwrap(),
        AuthStatus::Authenticated
    );

    // Profile pushes reach the session
    let mut rx = restarted.auth().subscribe();
    let mut profile = identity.profile(&uid).unwrap();
    profile.username = "nino_k".to_string();
    assert!(identity.update_profile(profile.clone()).await);
    tokio::time::timeout(Duration::from_secs(1), async {
        while rx.borrow_and_update().user.as_ref().map(|u| u.username.as_str()) != Some("nino_k") {
            rx.changed().await.unwrap();
        }
    })
    .await
    .unwrap();

    // After logout later pushes change nothing
    restarted.auth().logout().await.unwrap();
    assert_eq!(restarted.auth().status(), AuthStatus::Unauthenticated);
    profile.username = "ghost".to_string();
    identity.update_profile(profile).await;
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(restarted.auth().user().is_none());

    // The revoked session is rejected on the next restart
    let third = client_over(kv.clone(), identity.clone(), location);
    third.hydrate().await;
    assert_eq!(third.auth().status(), AuthStatus::Unauthenticated);
    assert!(kv.get(keys::SESSION_TOKEN).await.unwrap().is_none());
}

#[tokio::test]
async fn test_revoked_cached_session_is_cleared() {
    let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
    let identity = Arc::new(FakeIdentity::new());
    let location = Arc::new(FakeLocation::granted(Coordinates::new(0.0, 0.0)));
    let client = client_over(kv.clone(), identity.clone(), location.clone());

    client
        .auth()
        .register("levan", "levan@example.com", "secret1")
        .await
        .unwrap();
    let token = client.auth().session().token.unwrap();
    drop(client);
    identity.revoke(&token);

    let restarted = client_over(kv.clone(), identity, location);
    restarted.hydrate().await;
    assert_eq!(restarted.auth().status(), AuthStatus::Authenticated);
    assert_eq!(
        restarted.auth().reconcile().await.unwrap(),
        AuthStatus::Unauthenticated
    );
    assert!(kv.get(keys::SESSION_UID).await.unwrap().is_none());
}

#[tokio::test]
async fn test_corrupt_snapshots_fall_back_to_empty() {
    let temp_dir = TempDir::new().unwrap();
    let kv = Arc::new(FileKvStore::new(temp_dir.path()));
    kv.set(keys::CART, "{{{").await.unwrap();
    kv.set(keys::CURRENT_ORDER, "\"nope\"").await.unwrap();

    let client = client_over(
        kv,
        Arc::new(FakeIdentity::new()),
        Arc::new(FakeLocation::granted(Coordinates::new(0.0, 0.0))),
    );
    client.hydrate().await;

    assert!(client.cart().snapshot().is_empty());
    assert!(client.cart().last_error().is_some());
    assert!(client.orders().current().is_none());
    assert!(client.orders().last_error().is_some());
}
