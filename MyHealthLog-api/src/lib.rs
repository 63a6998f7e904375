// MyHealthLog-api lib.rs
//
// HTTP layer of the MyHealthLog backend: handlers, request entities,
// routing and the OpenAPI document.

// Public modules
pub mod api;
pub mod entities;
pub mod openapi;

pub use api::create_app;
