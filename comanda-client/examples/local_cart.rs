// comanda-client/examples/local_cart.rs
// Offline cart pricing walkthrough, no backend required

use comanda_client::CartController;
use shared::models::{DiscountKind, Promotion};
use shared::order::DeliveryMode;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cart = CartController::new();
    cart.add_line(7, "Paella", 1000.0, 2);
    cart.add_line(9, "Flan", 300.0, 1);

    let promotion = Promotion {
        id: 31,
        name: "Paella Tuesdays".to_string(),
        description: Some("15% off when you order two".to_string()),
        discount_kind: DiscountKind::Percentage,
        discount_value: 15.0,
        minimum_quantity: 2,
        valid_from: None,
        valid_until: None,
        active_from: None,
        active_until: None,
        is_currently_valid: true,
        applicable_article_ids: vec![7],
    };
    cart.select_promotion(7, Some(promotion))?;

    let delivery = cart.pricing();
    println!("-- delivery --");
    println!("subtotal:   {:>8.2}", delivery.original_subtotal);
    println!("discount:   {:>8.2}", delivery.total_discount);
    println!("fee:        {:>8.2}", delivery.delivery_fee);
    println!("total:      {:>8.2}", delivery.final_total);

    cart.set_delivery_mode(DeliveryMode::Pickup);
    let pickup = cart.pricing();
    println!("-- pickup --");
    println!("subtotal:   {:>8.2}", pickup.original_subtotal);
    println!("take-away:  {:>8.2}", pickup.take_away_discount);
    println!("discount:   {:>8.2}", pickup.total_discount);
    println!("total:      {:>8.2}", pickup.final_total);

    Ok(())
}
