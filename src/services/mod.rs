//! Сервисы поверх кодеков и конфигурации

pub mod auth;
pub mod electricity;

use std::sync::Arc;

use crate::config::Config;

#[derive(Clone)]
pub struct Services {
    pub auth: Arc<auth::AuthService>,
    pub electricity: Arc<electricity::ElectricityService>,
}

impl Services {
    pub fn new(config: &Config) -> Self {
        Self {
            auth: Arc::new(auth::AuthService::new(&config.jwt)),
            electricity: Arc::new(electricity::ElectricityService::new(&config.electricity)),
        }
    }
}
