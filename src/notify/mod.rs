//! Notification layer: push gateway boundary and asynchronous fan-out.

pub mod dispatcher;
pub mod gateway;

pub use dispatcher::NotificationDispatcher;
pub use gateway::{MockPushGateway, PushGateway};
