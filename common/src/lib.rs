pub mod dispatch;
pub mod model;
pub mod requests;
