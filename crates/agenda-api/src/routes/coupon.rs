//! Coupon API Routes
//!
//! Provides endpoints for coupon management:
//! - Create, update, delete coupons (admin)
//! - List coupons
//! - Validate coupons
//! - Apply coupons to carts

use axum::{
    Json, Router,
    routing::{get, post},
    extract::Path,
    http::StatusCode,
};
use serde::Deserialize;
use uuid::Uuid;

/// Request body for creating a coupon
#[derive(Debug, Deserialize)]
pub struct CreateCouponRequest {
    pub code: String,
    pub description: Option<String>,
    pub discount_type: String,
    pub discount_value: String,
    pub minimum_purchase: Option<String>,
    pub maximum_discount: Option<String>,
    pub starts_at: Option<String>,
    pub expires_at: Option<String>,
    pub usage_limit: Option<i32>,
    pub usage_limit_per_customer: Option<i32>,
}

/// Create a new coupon (admin only)
pub async fn create_coupon(
    Json(request): Json<CreateCouponRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let coupon_id = Uuid::new_v4();
    
    Ok(Json(serde_json::json!({
        "id": coupon_id,
        "code": request.code,
        "description": request.description,
        "discount_type": request.discount_type,
        "discount_value": request.discount_value,
        "minimum_purchase": request.minimum_purchase,
        "maximum_discount": request.maximum_discount,
        "is_active": true,
        "starts_at": request.starts_at,
        "expires_at": request.expires_at,
        "usage_limit": request.usage_limit,
        "usage_limit_per_customer": request.usage_limit_per_customer,
        "usage_count": 0,
        "created_at": "2026-01-28T10:00:00Z",
        "updated_at": "2026-01-28T10:00:00Z"
    })))
}

/// List all coupons (admin only)
pub async fn list_coupons() -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "coupons": [
            {
                "id": Uuid::new_v4(),
                "code": "SUMMER2026",
                "discount_type": "percentage",
                "discount_value": "20.00",
                "is_active": true,
                "usage_count": 150,
                "usage_limit": 1000
            },
            {
                "id": Uuid::new_v4(),
                "code": "WELCOME10",
                "discount_type": "fixed_amount",
                "discount_value": "10.00",
                "is_active": true,
                "usage_count": 45,
                "usage_limit": null
            }
        ],
        "pagination": {
            "page": 1,
            "per_page": 20,
            "total": 2,
            "total_pages": 1
        }
    })))
}

/// Get coupon by ID (admin only)
pub async fn get_coupon(Path(coupon_id): Path<Uuid>) -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "id": coupon_id,
        "code": "SUMMER2026",
        "description": "Summer Sale - 20% off everything",
        "discount_type": "percentage",
        "discount_value": "20.00",
        "minimum_purchase": "50.00",
        "maximum_discount": "100.00",
        "is_active": true,
        "starts_at": "2026-06-01T00:00:00Z",
        "expires_at": "2026-08-31T23:59:59Z",
        "usage_limit": 1000,
        "usage_limit_per_customer": 1,
        "usage_count": 150,
        "created_at": "2026-01-28T10:00:00Z",
        "updated_at": "2026-01-28T10:00:00Z"
    })))
}

/// Request body for updating a coupon
#[derive(Debug, Deserialize)]
pub struct UpdateCouponRequest {
    pub description: Option<String>,
    pub is_active: Option<bool>,
    pub discount_value: Option<String>,
    pub expires_at: Option<String>,
}

/// Update a coupon (admin only)
pub async fn update_coupon(
    Path(coupon_id): Path<Uuid>,
    Json(request): Json<UpdateCouponRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "id": coupon_id,
        "code": "SUMMER2026",
        "description": request.description.unwrap_or_else(|| "Summer Sale".to_string()),
        "discount_type": "percentage",
        "discount_value": request.discount_value.unwrap_or_else(|| "20.00".to_string()),
        "is_active": request.is_active.unwrap_or(true),
        "expires_at": request.expires_at,
        "updated_at": "2026-01-28T10:00:00Z"
    })))
}

/// Delete a coupon (admin only)
pub async fn delete_coupon(Path(_coupon_id): Path<Uuid>) -> StatusCode {
    StatusCode::NO_CONTENT
}

/// Request body for validating a coupon
#[derive(Debug, Deserialize)]
pub struct ValidateCouponRequest {
    pub code: String,
    pub cart_id: Uuid,
}

/// Validate a coupon without applying it
pub async fn validate_coupon(
    Json(request): Json<ValidateCouponRequest>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    // Simulate validation
    let is_valid = request.code != "INVALID";
    
    if is_valid {
        Ok(Json(serde_json::json!({
            "valid": true,
            "coupon": {
                "code": request.code,
                "discount_type": "percentage",
                "discount_value": "20.00"
            },
            "discount_calculation": {
                "original_amount": "150.00",
                "discount_amount": "30.00",
                "final_amount": "120.00"
            }
        })))
    } else {
        Ok(Json(serde_json::json!({
            "valid": false,
            "error_code": "COUPON_NOT_FOUND",
            "error_message": "Coupon code not found"
        })))
    }
}

/// Get coupon statistics (admin only)
pub async fn get_coupon_stats(Path(coupon_id): Path<Uuid>) -> Result<Json<serde_json::Value>, StatusCode> {
    Ok(Json(serde_json::json!({
        "coupon_id": coupon_id,
        "code": "SUMMER2026",
        "total_usage": 150,
        "total_discount_amount": "3250.00",
        "remaining_uses": 850,
        "usage_by_day": [
            {
                "date": "2026-06-01",
                "usage_count": 25,
                "discount_amount": "500.00"
            },
            {
                "date": "2026-06-02",
                "usage_count": 30,
                "discount_amount": "600.00"
            }
        ]
    })))
}

/// Router for coupon routes
pub fn router() -> Router {
    Router::new()
        // Coupon CRUD
        .route("/coupons", get(list_coupons).post(create_coupon))
        .route("/coupons/:coupon_id", get(get_coupon).put(update_coupon).delete(delete_coupon))
        // Coupon validation
        .route("/coupons/validate", post(validate_coupon))
        // Coupon stats
        .route("/coupons/:coupon_id/stats", get(get_coupon_stats))
}
