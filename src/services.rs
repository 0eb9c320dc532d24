pub mod customer_service;
pub use customer_service::CustomerService;
pub mod reconcile_service;
pub use reconcile_service::ReconcileService;
pub mod lookup;
