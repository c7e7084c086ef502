//! Cart scenarios over the in-memory catalog and durable file storage.
//!
//! Each test reopens the store from the same storage file where it matters,
//! so persistence is checked through a fresh hydration rather than by peeking
//! at the store's memory.

use std::sync::Arc;

use rocketshoes_cart::{
    CART_STORAGE_KEY, CartError, CartStore, FileStorage, KeyValueStorage, MemoryCatalog,
    MutationOutcome, RecordingNotifier,
};
use rocketshoes_core::{Cart, CartItem, CurrencyCode, ProductId};
use rocketshoes_integration_tests::product;

type Store = CartStore<Arc<MemoryCatalog>, FileStorage, Arc<RecordingNotifier>>;

async fn open(
    catalog: &Arc<MemoryCatalog>,
    storage_path: &std::path::Path,
    notifier: &Arc<RecordingNotifier>,
) -> Store {
    CartStore::initialize(
        catalog.clone(),
        FileStorage::new(storage_path),
        notifier.clone(),
    )
    .await
}

fn lines(cart: &Cart) -> Vec<(i32, i32)> {
    cart.items()
        .iter()
        .map(|item| (item.id().as_i32(), item.amount))
        .collect()
}

fn persisted(storage_path: &std::path::Path) -> Option<Cart> {
    FileStorage::new(storage_path)
        .get(CART_STORAGE_KEY)
        .expect("storage readable")
        .map(|json| Cart::from_json(&json).expect("persisted cart is valid"))
}

// =============================================================================
// Stock limit on repeated adds
// =============================================================================

#[tokio::test]
async fn test_repeated_add_stops_at_stock() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let catalog = Arc::new(
        MemoryCatalog::new().with_product(product(1, "Tênis de Caminhada", 17_990), 2),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    let mut store = open(&catalog, &path, &notifier).await;
    assert!(store.add_product(ProductId::new(1)).await.is_applied());
    assert!(store.add_product(ProductId::new(1)).await.is_applied());
    assert_eq!(lines(store.cart()), vec![(1, 2)]);

    let outcome = store.add_product(ProductId::new(1)).await;
    assert!(matches!(
        outcome,
        MutationOutcome::Rejected(CartError::StockExceeded { .. })
    ));
    assert_eq!(lines(store.cart()), vec![(1, 2)]);
    assert_eq!(notifier.messages(), vec!["requested quantity exceeds stock"]);

    // A fresh store over the same file sees the same cart.
    let reopened = open(&catalog, &path, &notifier).await;
    assert_eq!(lines(reopened.cart()), vec![(1, 2)]);
}

// =============================================================================
// Explicit quantity update
// =============================================================================

#[tokio::test]
async fn test_update_amount_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let seeded = Cart::from_items(vec![CartItem {
        product: product(5, "Tênis VR Caminhada", 13_990),
        amount: 3,
    }])
    .unwrap();
    FileStorage::new(&path)
        .set(CART_STORAGE_KEY, &seeded.to_json().unwrap())
        .unwrap();

    let catalog = Arc::new(
        MemoryCatalog::new().with_product(product(5, "Tênis VR Caminhada", 13_990), 10),
    );
    let notifier = Arc::new(RecordingNotifier::new());
    let mut store = open(&catalog, &path, &notifier).await;

    assert!(store.update_product_amount(ProductId::new(5), 7).is_applied());
    assert_eq!(lines(store.cart()), vec![(5, 7)]);
    assert_eq!(lines(&persisted(&path).unwrap()), vec![(5, 7)]);
    assert_eq!(
        store.cart().subtotal(CurrencyCode::BRL).display(),
        "R$979.30"
    );

    // Boundary: exactly the stock is fine, one more is not.
    assert!(store.update_product_amount(ProductId::new(5), 10).is_applied());
    assert!(store.update_product_amount(ProductId::new(5), 11).is_rejected());
    assert_eq!(lines(&persisted(&path).unwrap()), vec![(5, 10)]);
    assert_eq!(notifier.messages(), vec!["requested quantity exceeds stock"]);
}

// =============================================================================
// Removing what is not there
// =============================================================================

#[tokio::test]
async fn test_remove_from_empty_cart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let catalog = Arc::new(MemoryCatalog::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let mut store = open(&catalog, &path, &notifier).await;

    let outcome = store.remove_product(ProductId::new(99));
    assert!(matches!(
        outcome,
        MutationOutcome::Rejected(CartError::ItemNotInCart { .. })
    ));
    assert!(store.cart().is_empty());
    assert!(persisted(&path).is_none());
    assert_eq!(notifier.messages(), vec!["failed to remove product"]);
}

// =============================================================================
// Full shopping session
// =============================================================================

#[tokio::test]
async fn test_shopping_session_survives_restarts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("storage.json");
    let catalog = Arc::new(
        MemoryCatalog::new()
            .with_product(product(1, "Tênis de Caminhada Leve", 17_990), 3)
            .with_product(product(2, "Tênis VR Caminhada Confortável", 13_990), 5)
            .with_product(product(3, "Tênis Adidas Duramo Lite", 21_990), 2),
    );
    let notifier = Arc::new(RecordingNotifier::new());

    {
        let mut store = open(&catalog, &path, &notifier).await;
        assert!(store.add_product(ProductId::new(2)).await.is_applied());
        assert!(store.add_product(ProductId::new(1)).await.is_applied());
        assert!(store.add_product(ProductId::new(3)).await.is_applied());
        assert!(store.add_product(ProductId::new(2)).await.is_applied());
    }

    {
        let mut store = open(&catalog, &path, &notifier).await;
        assert_eq!(lines(store.cart()), vec![(2, 2), (1, 1), (3, 1)]);

        assert!(store.remove_product(ProductId::new(1)).is_applied());
        assert!(store.update_product_amount(ProductId::new(3), 2).is_applied());
        assert!(matches!(
            store.update_product_amount(ProductId::new(3), 0),
            MutationOutcome::Ignored
        ));
    }

    let store = open(&catalog, &path, &notifier).await;
    assert_eq!(lines(store.cart()), vec![(2, 2), (3, 2)]);
    assert_eq!(store.cart().total_quantity(), 4);
    assert!(notifier.messages().is_empty());
}

// =============================================================================
// Corrupt storage
// =============================================================================

#[tokio::test]
async fn test_corrupt_cart_entry_starts_empty_and_is_overwritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    FileStorage::new(&path)
        .set(CART_STORAGE_KEY, r#"[{"id": "one", "amount": "lots"}]"#)
        .unwrap();

    let catalog =
        Arc::new(MemoryCatalog::new().with_product(product(1, "Tênis", 10_000), 1));
    let notifier = Arc::new(RecordingNotifier::new());
    let mut store = open(&catalog, &path, &notifier).await;

    assert!(store.cart().is_empty());
    assert!(store.add_product(ProductId::new(1)).await.is_applied());
    assert_eq!(lines(&persisted(&path).unwrap()), vec![(1, 1)]);
}

// =============================================================================
// Storage format
// =============================================================================

#[tokio::test]
async fn test_storage_file_layout() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("storage.json");
    let catalog =
        Arc::new(MemoryCatalog::new().with_product(product(3, "Tênis Adidas", 21_990), 4));
    let notifier = Arc::new(RecordingNotifier::new());
    let mut store = open(&catalog, &path, &notifier).await;
    assert!(store.add_product(ProductId::new(3)).await.is_applied());

    // One JSON object keyed by storage key; the cart itself is a JSON string.
    let file: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let stored = file[CART_STORAGE_KEY].as_str().unwrap();
    let items: serde_json::Value = serde_json::from_str(stored).unwrap();

    assert_eq!(items[0]["id"], 3);
    assert_eq!(items[0]["title"], "Tênis Adidas");
    assert_eq!(items[0]["amount"], 1);
    assert_eq!(items[0]["price"], "219.90");
}
