//! Data models for the equipment registry

pub mod equipment;
pub mod equipment_type;

pub use equipment::{BulkCreateReport, Equipment, NewEquipment};
pub use equipment_type::{EquipmentType, SerialMask};
