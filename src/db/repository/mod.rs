pub mod audit;
pub mod case;
pub mod demand;
pub mod dispensation;
pub mod followup;
pub mod inventory;
pub mod notification;
pub mod pharmacy;
pub mod prescription;
