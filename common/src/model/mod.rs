pub mod appointment;
pub mod document;
pub mod inventory;
pub mod invoice;
pub mod owner;
pub mod pet;
pub mod reminder;
pub mod service;
pub mod staff;
