// Adapters layer: concrete implementations of the domain ports and the
// response encoding used by the transport.

pub mod collaborators;
pub mod document;
pub mod memory;
pub mod response;
