//! Payment-document domain: the parsed document, validation context, rules,
//! outcome events and the ports the engine depends on.

pub mod context;
pub mod document;
pub mod events;
pub mod graph;
pub mod ports;
pub mod rules;
