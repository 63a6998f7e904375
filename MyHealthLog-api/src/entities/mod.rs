// Request and response bodies of the MyHealthLog API
// Rows returned by the services are serialized as they are; the types here
// cover what clients send and the small envelopes the API wraps around results.

// Shared envelopes and lenient field deserializers
pub mod common;

pub mod admin;
pub mod auth;
pub mod daily;
pub mod exercise;
pub mod finance;
pub mod lookup;
pub mod medication;
pub mod memo;
pub mod period;
pub mod sex;
pub mod stool;
pub mod weight;
