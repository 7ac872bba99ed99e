//! Infrastructure adapters: transports, address registries and reporters.

pub mod registry;
pub mod reporters;
pub mod transport;

pub use registry::AddressBuffer;
pub use reporters::ReporterContext;
pub use transport::{
    Delivery, HttpTransport, InMemoryTransport, InventoryRequest, InventoryTransport, Method,
};
