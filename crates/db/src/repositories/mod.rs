pub mod checkout_repo;
pub mod dashboard_repo;
pub mod lead_repo;
pub mod lock_repo;
pub mod purchase_repo;
pub mod settings_repo;

pub use checkout_repo::CheckoutRepo;
pub use dashboard_repo::DashboardRepo;
pub use lead_repo::LeadRepo;
pub use lock_repo::{AcquireOutcome, LockRepo};
pub use purchase_repo::PurchaseRepo;
pub use settings_repo::SettingsRepo;
