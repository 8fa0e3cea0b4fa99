pub mod audit;
pub mod case;
pub mod dispensation;
pub mod enums;
pub mod followup;
pub mod inventory;
pub mod notification;
pub mod pharmacy;
pub mod prescription;

pub use audit::*;
pub use case::*;
pub use dispensation::*;
pub use followup::*;
pub use inventory::*;
pub use notification::*;
pub use pharmacy::*;
pub use prescription::*;
