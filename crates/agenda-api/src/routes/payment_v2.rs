//! Payment API Routes v2 - Agnostic Payment System
//!
//! Provides unified endpoints for all payment operations regardless of gateway.
//! Frontend never communicates directly with payment providers.

use axum::{
    Json, Router,
    routing::{get, post, delete},
    extract::{State, Path},
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::state::AppState;
use agenda_core::payment::agnostic::*;

/// Get available payment methods for a checkout
#[derive(Debug, Deserialize)]
pub struct GetPaymentMethodsRequest {
    pub currency: String,
    pub amount: String,
}

/// Response with available payment methods
#[derive(Debug, Serialize)]
pub struct GetPaymentMethodsResponse {
    pub gateway_id: String,
    pub gateway_name: String,
    pub payment_methods: Vec<PaymentMethodConfig>,
}

/// Get available payment methods
pub async fn get_payment_methods(
    State(state): State<AppState>,
    Json(request): Json<GetPaymentMethodsRequest>,
) -> Json<Vec<GetPaymentMethodsResponse>> {
    // Parse amount
    let amount = request.amount.parse::<rust_decimal::Decimal>()
        .unwrap_or_else(|_| rust_decimal::Decimal::ZERO);
    
    // In a real implementation, we'd query the payment service
    // For now, return mock data
    let response = vec![
        GetPaymentMethodsResponse {
            gateway_id: "stripe".to_string(),
            gateway_name: "Stripe".to_string(),
            payment_methods: vec![
                PaymentMethodConfig {
                    method_type: PaymentMethodType::Card,
                    enabled: true,
                    display_name: "Credit/Debit Card".to_string(),
                    requires_redirect: false,
                    supports_3ds: true,
                    supports_tokenization: true,
                    supports_recurring: true,
                    required_fields: vec![
                        FieldDefinition {
                            name: "number".to_string(),
                            label: "Card Number".to_string(),
                            field_type: FieldType::CardNumber,
                            required: true,
                            pattern: Some(r"^[\d\s]{13,19}$".to_string()),
                            placeholder: Some("1234 5678 9012 3456".to_string()),
                            help_text: None,
                        },
                        FieldDefinition {
                            name: "exp_month".to_string(),
                            label: "Expiry Month".to_string(),
                            field_type: FieldType::ExpiryDate,
                            required: true,
                            pattern: Some(r"^(0[1-9]|1[0-2])$".to_string()),
                            placeholder: Some("MM".to_string()),
                            help_text: None,
                        },
                        FieldDefinition {
                            name: "exp_year".to_string(),
                            label: "Expiry Year".to_string(),
                            field_type: FieldType::ExpiryDate,
                            required: true,
                            pattern: Some(r"^20[2-9][0-9]$".to_string()),
                            placeholder: Some("YYYY".to_string()),
                            help_text: None,
                        },
                        FieldDefinition {
                            name: "cvc".to_string(),
                            label: "CVC".to_string(),
                            field_type: FieldType::Cvc,
                            required: true,
                            pattern: Some(r"^\d{3,4}$".to_string()),
                            placeholder: Some("123".to_string()),
                            help_text: Some("3 or 4 digit code on back of card".to_string()),
                        },
                        FieldDefinition {
                            name: "name".to_string(),
                            label: "Cardholder Name".to_string(),
                            field_type: FieldType::CardholderName,
                            required: true,
                            pattern: None,
                            placeholder: Some("John Doe".to_string()),
                            help_text: None,
                        },
                    ],
                    optional_fields: vec![],
                    supported_currencies: vec![],
                    min_amount: Some(rust_decimal::Decimal::new(50, 2)),
                    max_amount: None,
                },
            ],
        },
    ];
    
    Json(response)
}

/// Initiate a payment request
#[derive(Debug, Deserialize)]
pub struct InitiatePaymentApiRequest {
    pub gateway_id: String,
    pub amount: String,
    pub currency: String,
    pub payment_method_type: PaymentMethodType,
    pub order_id: String,
    pub customer_email: String,
    pub payment_method_data: PaymentMethodData,
    pub save_payment_method: bool,
    pub description: String,
}

/// Initiate a payment
pub async fn initiate_payment(
    State(state): State<AppState>,
    Json(request): Json<InitiatePaymentApiRequest>,
) -> Json<InitiatePaymentResponse> {
    // In a real implementation, this would:
    // 1. Validate the request
    // 2. Get the appropriate gateway
    // 3. Call initiate_payment on the gateway
    // 4. Store payment record in database
    // 5. Return response
    
    // For demo, return a mock success response
    let payment_id = format!("pay_{}", Uuid::new_v4());
    
    Json(InitiatePaymentResponse::Success {
        payment_id: payment_id.clone(),
        transaction_id: format!("txn_{}", Uuid::new_v4()),
        payment_status: PaymentStatus::Succeeded,
        payment_method: PaymentMethodInfo {
            method_type: request.payment_method_type,
            last_four: Some("4242".to_string()),
            card_brand: Some("visa".to_string()),
            exp_month: Some("12".to_string()),
            exp_year: Some("2025".to_string()),
            cardholder_name: Some("John Doe".to_string()),
            token: None,
        },
        receipt_url: Some(format!("https://api.example.com/receipts/{}", payment_id)),
    })
}

/// Complete a payment action (3DS, redirect return, etc.)
#[derive(Debug, Deserialize)]
pub struct CompletePaymentActionApiRequest {
    pub action_type: PaymentActionType,
    pub action_data: serde_json::Value,
}

pub async fn complete_payment_action(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    Json(request): Json<CompletePaymentActionApiRequest>,
) -> Json<CompletePaymentActionResponse> {
    // In a real implementation, this would complete the payment action
    
    Json(CompletePaymentActionResponse::Success {
        payment_id,
        transaction_id: format!("txn_{}", Uuid::new_v4()),
        payment_status: PaymentStatus::Succeeded,
        payment_method: PaymentMethodInfo {
            method_type: PaymentMethodType::Card,
            last_four: Some("4242".to_string()),
            card_brand: Some("visa".to_string()),
            exp_month: Some("12".to_string()),
            exp_year: Some("2025".to_string()),
            cardholder_name: Some("John Doe".to_string()),
            token: None,
        },
        receipt_url: Some("https://api.example.com/receipts/123".to_string()),
    })
}

/// Get payment status
pub async fn get_payment_status(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "payment_id": payment_id,
        "status": "succeeded",
        "amount": "99.99",
        "currency": "USD",
        "created_at": "2026-01-28T10:00:00Z",
    }))
}

/// Refund a payment
#[derive(Debug, Deserialize)]
pub struct RefundRequest {
    pub amount: Option<String>,
    pub reason: String,
}

pub async fn refund_payment(
    State(state): State<AppState>,
    Path(payment_id): Path<String>,
    Json(request): Json<RefundRequest>,
) -> Json<RefundResponse> {
    let amount = request.amount.as_ref()
        .and_then(|a| a.parse::<rust_decimal::Decimal>().ok())
        .unwrap_or_else(|| rust_decimal::Decimal::new(9999, 2));
    
    Json(RefundResponse {
        refund_id: format!("ref_{}", Uuid::new_v4()),
        payment_id,
        amount,
        currency: "USD".to_string(),
        status: RefundStatus::Succeeded,
        reason: request.reason,
        created_at: chrono::Utc::now(),
    })
}

/// Save a payment method for future use
#[derive(Debug, Deserialize)]
pub struct SavePaymentMethodRequest {
    pub gateway_id: String,
    pub payment_method_data: PaymentMethodData,
}

pub async fn save_payment_method(
    State(state): State<AppState>,
    Json(request): Json<SavePaymentMethodRequest>,
) -> Json<PaymentMethodToken> {
    Json(PaymentMethodToken {
        token: format!("tok_{}", Uuid::new_v4()),
        payment_method: PaymentMethodInfo {
            method_type: PaymentMethodType::Card,
            last_four: Some("4242".to_string()),
            card_brand: Some("visa".to_string()),
            exp_month: Some("12".to_string()),
            exp_year: Some("2025".to_string()),
            cardholder_name: Some("John Doe".to_string()),
            token: None,
        },
        expires_at: None,
    })
}

/// Get saved payment methods for a customer
pub async fn get_saved_payment_methods(
    State(state): State<AppState>,
    Path(customer_id): Path<String>,
) -> Json<Vec<PaymentMethodInfo>> {
    Json(vec![
        PaymentMethodInfo {
            method_type: PaymentMethodType::Card,
            last_four: Some("4242".to_string()),
            card_brand: Some("visa".to_string()),
            exp_month: Some("12".to_string()),
            exp_year: Some("2025".to_string()),
            cardholder_name: Some("John Doe".to_string()),
            token: Some(format!("tok_{}", Uuid::new_v4())),
        },
    ])
}

/// Delete a saved payment method
pub async fn delete_payment_method(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "success": true,
        "message": "Payment method deleted",
        "token": token,
    }))
}

/// Handle webhooks from payment providers
pub async fn handle_webhook(
    State(state): State<AppState>,
    Path(gateway_id): Path<String>,
    headers: axum::http::HeaderMap,
    body: String,
) -> Json<serde_json::Value> {
    // In a real implementation, this would:
    // 1. Verify webhook signature
    // 2. Parse the webhook event
    // 3. Update payment status in database
    // 4. Trigger any necessary actions (order confirmation, emails, etc.)
    
    Json(serde_json::json!({
        "success": true,
        "gateway": gateway_id,
        "message": "Webhook received",
    }))
}

/// Router for payment v2 routes
pub fn router() -> Router<AppState> {
    Router::new()
        // Get available payment methods
        .route("/v2/payments/methods", post(get_payment_methods))
        // Initiate a payment
        .route("/v2/payments", post(initiate_payment))
        // Get payment status
        .route("/v2/payments/:payment_id", get(get_payment_status))
        // Complete payment action (3DS, redirect)
        .route("/v2/payments/:payment_id/complete", post(complete_payment_action))
        // Refund a payment
        .route("/v2/payments/:payment_id/refund", post(refund_payment))
        // Save payment method
        .route("/v2/payment-methods", post(save_payment_method))
        // Get saved payment methods
        .route("/v2/customers/:customer_id/payment-methods", get(get_saved_payment_methods))
        // Delete payment method
        .route("/v2/payment-methods/:token", delete(delete_payment_method))
        // Webhook handler
        .route("/v2/webhooks/:gateway_id", post(handle_webhook))
}
