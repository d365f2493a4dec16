mod gateway;

pub use gateway::{Gateway, GatewayError};

use app_core::backend::BackendState;

/// State owned by the backend thread: the connection to the PCA service.
pub struct BackendAppState {
    gateway: Gateway,
}

impl BackendState for BackendAppState {}

impl BackendAppState {
    pub fn new(gateway: Gateway) -> Self {
        log::info!("using PCA service at {}", gateway.base_url());
        Self { gateway }
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    pub fn set_gateway(&mut self, gateway: Gateway) {
        log::info!("switching PCA service to {}", gateway.base_url());
        self.gateway = gateway;
    }
}
