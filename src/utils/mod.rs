//! Кодеки токенов и вспомогательные генераторы

pub mod crypto;
pub mod electricity;
pub mod generator;
pub mod jwt;
pub mod verification;
