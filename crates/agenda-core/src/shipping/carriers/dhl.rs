//! DHL Express shipping provider implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::Result;
use crate::common::Address;
use crate::shipping::{
    ShippingProvider, ShippingRate, Shipment, TrackingInfo, TrackingStatus, TrackingEvent,
    Package, RateOptions, AddressValidation, ShippingService, ServiceFeature,
    CustomsInfo,
};

/// DHL Express API provider
pub struct DhlProvider {
    client: reqwest::Client,
    api_key: String,
    api_secret: String,
    account_number: String,
    base_url: String,
    test_mode: bool,
}

impl DhlProvider {
    /// Create a new DHL provider
    pub fn new(
        api_key: impl Into<String>,
        api_secret: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            api_secret: api_secret.into(),
            account_number: account_number.into(),
            base_url: "https://api-eu.dhl.com".to_string(),
            test_mode: false,
        }
    }
    
    /// Set test mode
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        if test_mode {
            self.base_url = "https://api-sandbox.dhl.com".to_string();
        }
        self
    }
    
    /// Get authentication headers
    fn auth_headers(&self) -> Vec<(String, String)> {
        vec![
            ("DHL-API-Key".to_string(), self.api_key.clone()),
        ]
    }
    
    /// Map DHL service code to human-readable name
    fn service_name(&self, code: &str) -> String {
        match code {
            "EXPRESS_WORLDWIDE" => "DHL Express Worldwide",
            "EXPRESS_9:00" => "DHL Express 9:00",
            "EXPRESS_10:30" => "DHL Express 10:30",
            "EXPRESS_12:00" => "DHL Express 12:00",
            "EXPRESS_ENVELOPE" => "DHL Express Envelope",
            "ECONOMY_SELECT" => "DHL Economy Select",
            _ => "DHL Express",
        }.to_string()
    }
    
    /// Parse DHL tracking status
    fn parse_tracking_status(&self, status: &str) -> TrackingStatus {
        match status.to_uppercase().as_str() {
            "TRANSIT" | "IN TRANSIT" => TrackingStatus::InTransit,
            "DELIVERED" => TrackingStatus::Delivered,
            "OUT FOR DELIVERY" => TrackingStatus::OutForDelivery,
            "EXCEPTION" | "SHIPMENT EXCEPTION" => TrackingStatus::Exception,
            "PICKUP" | "PICKED UP" => TrackingStatus::PreTransit,
            "RETURN" => TrackingStatus::ReturnToSender,
            _ => TrackingStatus::InTransit,
        }
    }
}

#[async_trait]
impl ShippingProvider for DhlProvider {
    fn id(&self) -> &'static str {
        "dhl"
    }
    
    fn name(&self) -> &'static str {
        "DHL Express"
    }
    
    fn is_available(&self) -> bool {
        !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
    
    async fn get_rates(
        &self,
        from_address: &Address,
        to_address: &Address,
        package: &Package,
        options: &RateOptions,
    ) -> Result<Vec<ShippingRate>> {
        // Build rate request
        let _request = DhlRateRequest {
            customer_details: CustomerDetails {
                shipper_details: ShipperDetails {
                    postal_code: from_address.zip.clone(),
                    city_name: from_address.city.clone(),
                    country_code: from_address.country.clone(),
                },
                receiver_details: ReceiverDetails {
                    postal_code: to_address.zip.clone(),
                    city_name: to_address.city.clone(),
                    country_code: to_address.country.clone(),
                },
            },
            accounts: vec![Account {
                type_code: "shipper".to_string(),
                number: self.account_number.clone(),
            }],
            products_and_services: vec![],
            ship_date: Utc::now().format("%Y-%m-%d").to_string(),
            unit_of_measurement: "metric".to_string(),
            packages: vec![DhlPackage {
                weight: package.weight.to_string().parse::<f64>().unwrap_or(0.0),
                dimensions: Dimensions {
                    length: package.length.map(|d| d.to_string().parse::<f64>().unwrap_or(0.0)),
                    width: package.width.map(|d| d.to_string().parse::<f64>().unwrap_or(0.0)),
                    height: package.height.map(|d| d.to_string().parse::<f64>().unwrap_or(0.0)),
                },
            }],
        };
        
        // In a real implementation, this would make an API call
        // For now, return mock rates
        let mut rates = vec![
            ShippingRate::new(
                self.id(),
                self.name(),
                "EXPRESS_WORLDWIDE",
                "DHL Express Worldwide",
                Decimal::from(45),
                "USD",
            )
            .with_delivery(3, None),
            
            ShippingRate::new(
                self.id(),
                self.name(),
                "EXPRESS_12:00",
                "DHL Express 12:00",
                Decimal::from(65),
                "USD",
            )
            .with_delivery(1, None),
        ];
        
        // Filter by service if specified
        if let Some(ref services) = options.services {
            rates.retain(|r| services.contains(&r.service_code));
        }
        
        Ok(rates)
    }
    
    async fn create_shipment(
        &self,
        from_address: &Address,
        to_address: &Address,
        package: &Package,
        service_code: &str,
        customs_info: Option<&CustomsInfo>,
    ) -> Result<Shipment> {
        // In a real implementation, this would create a shipment via DHL API
        // For now, return a mock shipment
        
        let tracking_number = format!("{:010}", rand::random::<u32>());
        
        Ok(Shipment {
            id: uuid::Uuid::new_v4(),
            order_id: None,
            provider_id: self.id().to_string(),
            carrier: self.name().to_string(),
            service_code: service_code.to_string(),
            service_name: self.service_name(service_code),
            status: crate::shipping::ShipmentStatus::Pending,
            from_address: from_address.clone(),
            to_address: to_address.clone(),
            package: package.clone(),
            tracking_number: Some(tracking_number.clone()),
            tracking_url: Some(format!(
                "https://www.dhl.com/en/express/tracking.html?AWB={}",
                tracking_number
            )),
            label_url: None,
            label_data: None,
            customs_info: customs_info.cloned(),
            insurance_amount: None,
            total_cost: Decimal::from(45),
            currency: "USD".to_string(),
            created_at: Utc::now(),
            shipped_at: None,
            delivered_at: None,
            estimated_delivery: Some(Utc::now() + chrono::Duration::days(3)),
            metadata: std::collections::HashMap::new(),
        })
    }
    
    async fn track_shipment(&self, tracking_number: &str) -> Result<TrackingInfo> {
        // In a real implementation, this would call DHL tracking API
        // For now, return mock tracking info
        
        Ok(TrackingInfo {
            tracking_number: tracking_number.to_string(),
            carrier: self.name().to_string(),
            status: TrackingStatus::InTransit,
            events: vec![
                TrackingEvent {
                    timestamp: Utc::now() - chrono::Duration::hours(24),
                    status: TrackingStatus::PreTransit,
                    description: "Shipment picked up".to_string(),
                    location: Some("Cincinnati, OH".to_string()),
                    city: Some("Cincinnati".to_string()),
                    state: Some("OH".to_string()),
                    country: Some("US".to_string()),
                },
                TrackingEvent {
                    timestamp: Utc::now(),
                    status: TrackingStatus::InTransit,
                    description: "Processed at DHL facility".to_string(),
                    location: Some("Cincinnati, OH".to_string()),
                    city: Some("Cincinnati".to_string()),
                    state: Some("OH".to_string()),
                    country: Some("US".to_string()),
                },
            ],
            estimated_delivery: Some(Utc::now() + chrono::Duration::days(2)),
        })
    }
    
    async fn cancel_shipment(&self, _shipment_id: &str) -> Result<bool> {
        // DHL allows cancellation before pickup
        Ok(true)
    }
    
    async fn validate_address(&self, address: &Address) -> Result<AddressValidation> {
        // In a real implementation, this would call DHL address validation API
        Ok(AddressValidation {
            is_valid: true,
            normalized_address: Some(address.clone()),
            messages: vec![],
            residential: None,
        })
    }
    
    fn get_services(&self) -> Vec<ShippingService> {
        vec![
            ShippingService {
                code: "EXPRESS_WORLDWIDE".to_string(),
                name: "DHL Express Worldwide".to_string(),
                carrier: self.name().to_string(),
                domestic: true,
                international: true,
                transit_time_days: Some((1, 3)),
                features: vec![
                    ServiceFeature::Tracking,
                    ServiceFeature::Insurance,
                    ServiceFeature::Express,
                ],
            },
            ShippingService {
                code: "EXPRESS_12:00".to_string(),
                name: "DHL Express 12:00".to_string(),
                carrier: self.name().to_string(),
                domestic: true,
                international: true,
                transit_time_days: Some((1, 1)),
                features: vec![
                    ServiceFeature::Tracking,
                    ServiceFeature::Insurance,
                    ServiceFeature::Express,
                    ServiceFeature::DeliveryConfirmation,
                ],
            },
            ShippingService {
                code: "ECONOMY_SELECT".to_string(),
                name: "DHL Economy Select".to_string(),
                carrier: self.name().to_string(),
                domestic: false,
                international: true,
                transit_time_days: Some((4, 7)),
                features: vec![
                    ServiceFeature::Tracking,
                    ServiceFeature::Insurance,
                ],
            },
        ]
    }
    
    async fn estimate_delivery(
        &self,
        _from_address: &Address,
        _to_address: &Address,
        service_code: &str,
    ) -> Result<Option<DateTime<Utc>>> {
        let days = match service_code {
            "EXPRESS_WORLDWIDE" => 3,
            "EXPRESS_12:00" | "EXPRESS_10:30" | "EXPRESS_9:00" => 1,
            "ECONOMY_SELECT" => 5,
            _ => 3,
        };
        
        Ok(Some(Utc::now() + chrono::Duration::days(days)))
    }
}

// DHL API request/response types

#[derive(Debug, Serialize)]
struct DhlRateRequest {
    #[serde(rename = "customerDetails")]
    customer_details: CustomerDetails,
    accounts: Vec<Account>,
    #[serde(rename = "productsAndServices")]
    products_and_services: Vec<ProductAndService>,
    #[serde(rename = "shipDate")]
    ship_date: String,
    #[serde(rename = "unitOfMeasurement")]
    unit_of_measurement: String,
    packages: Vec<DhlPackage>,
}

#[derive(Debug, Serialize)]
struct CustomerDetails {
    #[serde(rename = "shipperDetails")]
    shipper_details: ShipperDetails,
    #[serde(rename = "receiverDetails")]
    receiver_details: ReceiverDetails,
}

#[derive(Debug, Serialize)]
struct ShipperDetails {
    #[serde(rename = "postalCode")]
    postal_code: String,
    #[serde(rename = "cityName")]
    city_name: String,
    #[serde(rename = "countryCode")]
    country_code: String,
}

#[derive(Debug, Serialize)]
struct ReceiverDetails {
    #[serde(rename = "postalCode")]
    postal_code: String,
    #[serde(rename = "cityName")]
    city_name: String,
    #[serde(rename = "countryCode")]
    country_code: String,
}

#[derive(Debug, Serialize)]
struct Account {
    #[serde(rename = "typeCode")]
    type_code: String,
    number: String,
}

#[derive(Debug, Serialize)]
struct ProductAndService {
    #[serde(rename = "productCode")]
    product_code: String,
}

#[derive(Debug, Serialize)]
struct DhlPackage {
    weight: f64,
    dimensions: Dimensions,
}

#[derive(Debug, Serialize)]
struct Dimensions {
    length: Option<f64>,
    width: Option<f64>,
    height: Option<f64>,
}
