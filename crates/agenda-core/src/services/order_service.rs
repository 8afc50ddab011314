// Re-export the OrderService and related types from the order module
pub use crate::order::service::{OrderService, OrderDetail};
pub use crate::order::{CreateOrderRequest, CreateOrderItem, OrderFilter};
