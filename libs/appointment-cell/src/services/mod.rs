pub mod booking;
pub mod slot_generation;

pub use booking::AppointmentService;
pub use slot_generation::SlotGenerationService;
