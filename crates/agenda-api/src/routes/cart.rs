//! Cart API Routes
//!
//! Provides endpoints for shopping cart management including:
//! - Guest cart creation
//! - Customer cart retrieval
//! - Cart item management
//! - Cart merging
//! - Coupon application

use axum::{
    Json, Router,
    routing::{get, post, put},
    extract::Path,
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

/// Create a new guest cart
pub async fn create_guest_cart() -> Result<Json<serde_json::Value>, StatusCode> {
    let cart_id = Uuid::new_v4();
    let session_token = format!("sess_{}", Uuid::new_v4().to_string().replace("-", ""));
    
    Ok(Json(serde_json::json!({
        "id": cart_id,
        "session_token": session_token,
        "currency": "USD",
        "subtotal": "0.00",
        "discount_total": "0.00",
        "tax_total": "0.00",
        "shipping_total": "0.00",
        "total": "0.00",
        "item_count": 0,
        "items": [],
        "expires_at": "2026-02-27T10:00:00Z"
    })))
}

/// Get or create customer cart
pub async fn get_customer_cart() -> Result<Json<serde_json::Value>, StatusCode> {
    let cart_id = Uuid::new_v4();
    let customer_id = Uuid::new_v4();
    
    Ok(Json(serde_json::json!({
        "id": cart_id,
        "customer_id": customer_id,
        "currency": "USD",
        "subtotal": "150.00",
        "discount_total": "15.00",
        "tax_total": "13.50",
        "shipping_total": "10.00",
        "total": "158.50",
        "coupon_code": "SUMMER10",
        "item_count": 3,
        "items": [
            {
                "id": Uuid::new_v4(),
                "product_id": Uuid::new_v4(),
                "variant_id": Uuid::new_v4(),
                "quantity": 2,
                "unit_price": "50.00",
                "original_price": "50.00",
                "subtotal": "100.00",
                "discount_amount": "10.00",
                "total": "90.00",
                "sku": "PROD-001-L",
                "title": "Premium T-Shirt",
                "variant_title": "Large / Blue",
                "image_url": "https://cdn.example.com/products/001.jpg",
                "requires_shipping": true,
                "is_gift_card": false
            }
        ],
        "expires_at": "2026-02-27T10:00:00Z"
    })))
}

/// Get cart by ID
pub async fn get_cart(Path(cart_id): Path<Uuid>) -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "id": cart_id,
        "currency": "USD",
        "subtotal": "150.00",
        "discount_total": "15.00",
        "tax_total": "13.50",
        "shipping_total": "10.00",
        "total": "158.50",
        "item_count": 3,
        "items": [],
        "expires_at": "2026-02-27T10:00:00Z"
    })))
}

/// Request body for adding item to cart
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub product_id: Uuid,
    pub variant_id: Option<Uuid>,
    pub quantity: i32,
}

/// Add item to cart
pub async fn add_item_to_cart(
    Path(cart_id): Path<Uuid>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let item_id = Uuid::new_v4();
    let unit_price = rust_decimal::Decimal::from(50);
    let quantity = request.quantity;
    let subtotal = unit_price * rust_decimal::Decimal::from(quantity);
    
    Ok(Json(serde_json::json!({
        "id": item_id,
        "cart_id": cart_id,
        "product_id": request.product_id,
        "variant_id": request.variant_id,
        "quantity": quantity,
        "unit_price": unit_price.to_string(),
        "original_price": unit_price.to_string(),
        "subtotal": subtotal.to_string(),
        "discount_amount": "0.00",
        "total": subtotal.to_string(),
        "sku": "PROD-001-L",
        "title": "Premium T-Shirt",
        "variant_title": "Large / Blue",
        "image_url": "https://cdn.example.com/products/001.jpg",
        "requires_shipping": true,
        "is_gift_card": false
    })))
}

/// Request body for updating cart item
#[derive(Debug, Deserialize)]
pub struct UpdateItemRequest {
    pub quantity: i32,
}

/// Update cart item
pub async fn update_cart_item(
    Path((cart_id, item_id)): Path<(Uuid, Uuid)>,
    Json(request): Json<UpdateItemRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let unit_price = rust_decimal::Decimal::from(50);
    let quantity = request.quantity;
    let subtotal = unit_price * rust_decimal::Decimal::from(quantity);
    
    Ok(Json(serde_json::json!({
        "id": item_id,
        "cart_id": cart_id,
        "product_id": Uuid::new_v4(),
        "quantity": quantity,
        "unit_price": unit_price.to_string(),
        "subtotal": subtotal.to_string(),
        "total": subtotal.to_string(),
    })))
}

/// Remove item from cart
pub async fn remove_cart_item(
    Path((_cart_id, _item_id)): Path<(Uuid, Uuid)>,
) -> StatusCode {
    // In real implementation, remove item from database
    StatusCode::NO_CONTENT
}

/// Clear all items from cart
pub async fn clear_cart(Path(_cart_id): Path<Uuid>) -> StatusCode {
    // In real implementation, remove all items from cart
    StatusCode::NO_CONTENT
}

/// Request body for merging carts
#[derive(Debug, Deserialize)]
pub struct MergeCartRequest {
    pub session_token: String,
}

/// Merge guest cart into customer cart
pub async fn merge_carts(
    Json(_request): Json<MergeCartRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let customer_cart_id = Uuid::new_v4();
    let guest_cart_id = Uuid::new_v4();
    
    Ok(Json(serde_json::json!({
        "message": "Carts merged successfully",
        "guest_cart_id": guest_cart_id,
        "customer_cart_id": customer_cart_id,
        "total_items": 5,
        "merged_items": [
            {
                "id": Uuid::new_v4(),
                "title": "Product from guest cart",
                "quantity": 2
            },
            {
                "id": Uuid::new_v4(),
                "title": "Product from customer cart",
                "quantity": 1
            }
        ]
    })))
}

/// Request body for applying coupon
#[derive(Debug, Deserialize)]
pub struct ApplyCouponRequest {
    pub coupon_code: String,
}

/// Apply coupon to cart
pub async fn apply_coupon(
    Path(cart_id): Path<Uuid>,
    Json(request): Json<ApplyCouponRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "id": cart_id,
        "coupon_code": request.coupon_code,
        "subtotal": "150.00",
        "discount_total": "30.00",
        "tax_total": "12.00",
        "shipping_total": "10.00",
        "total": "142.00",
        "discount_calculation": {
            "original_amount": "150.00",
            "discount_amount": "30.00",
            "final_amount": "120.00"
        }
    })))
}

/// Remove coupon from cart
pub async fn remove_coupon(Path(cart_id): Path<Uuid>) -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "id": cart_id,
        "coupon_code": null,
        "subtotal": "150.00",
        "discount_total": "0.00",
        "tax_total": "15.00",
        "shipping_total": "10.00",
        "total": "175.00"
    })))
}

/// Delete cart
pub async fn delete_cart(Path(_cart_id): Path<Uuid>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Router for cart routes
pub fn router() -> Router {
    Router::new()
        // Guest cart
        .route("/carts/guest", post(create_guest_cart))
        // Customer cart
        .route("/carts/me", get(get_customer_cart))
        // Cart by ID
        .route("/carts/:cart_id", get(get_cart).delete(delete_cart))
        // Cart items
        .route("/carts/:cart_id/items", post(add_item_to_cart).delete(clear_cart))
        .route("/carts/:cart_id/items/:item_id", put(update_cart_item).delete(remove_cart_item))
        // Cart merge
        .route("/carts/merge", post(merge_carts))
        // Coupons
        .route("/carts/:cart_id/coupon", post(apply_coupon).delete(remove_coupon))
}
