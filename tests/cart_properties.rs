use chrono::Utc;
use petalworks_api::cart::{CartStore, FileCartStorage};
use petalworks_api::entities::Category;
use petalworks_api::services::catalog::ProductRecord;
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn product(id: &str, price: Decimal) -> ProductRecord {
    ProductRecord {
        id: id.to_string(),
        name: format!("Product {}", id),
        description: "A bouquet".to_string(),
        price,
        category: Category::Mixed,
        image_url: format!("/images/{}.png", id),
        in_stock: true,
        featured: false,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

proptest! {
    /// Any sequence of adds ends with one line per product id whose
    /// quantity is the sum of the added quantities, and the totals follow.
    #[test]
    fn add_sequences_aggregate_by_product_identity(
        ops in prop::collection::vec((0usize..3, 1u32..5), 1..40)
    ) {
        let products = [
            product("1", dec!(10)),
            product("2", dec!(5.50)),
            product("3", dec!(3.25)),
        ];

        let dir = tempfile::tempdir().unwrap();
        let mut cart = CartStore::open(Box::new(FileCartStorage::new(dir.path())));

        let mut expected = [0u32; 3];
        for (index, quantity) in &ops {
            cart.add(&products[*index], *quantity).unwrap();
            expected[*index] += quantity;
        }

        let distinct = expected.iter().filter(|q| **q > 0).count();
        prop_assert_eq!(cart.items().len(), distinct);

        for (index, product) in products.iter().enumerate() {
            let line = cart.items().iter().find(|i| i.product_id == product.id);
            match line {
                Some(line) => prop_assert_eq!(line.quantity, expected[index]),
                None => prop_assert_eq!(expected[index], 0),
            }
        }

        let expected_total: Decimal = products
            .iter()
            .zip(expected.iter())
            .map(|(p, q)| p.price * Decimal::from(*q))
            .sum();
        prop_assert_eq!(cart.total(), expected_total);
        prop_assert_eq!(cart.count(), expected.iter().sum::<u32>());

        // Restoring from the persisted snapshot reproduces the same cart.
        let restored = CartStore::open(Box::new(FileCartStorage::new(dir.path())));
        prop_assert_eq!(restored.items(), cart.items());
    }
}
