pub mod checkout;
pub mod dashboard;
pub mod locks;
pub mod purchases;
pub mod settings;
pub mod webhooks;
