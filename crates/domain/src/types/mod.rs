//! Domain types and models

pub mod local;
pub mod mapping;
pub mod order;
pub mod remote;

pub use local::{LocalCustomer, LocalItem, LocalOrder, LocalOrderLine, LocalTaxLine};
pub use mapping::{CustomerMapping, ProductMapping, SyncDirection, SyncStatus};
pub use order::OrderSyncLog;
pub use remote::{
    BuyerInfo, RemoteCustomer, RemoteLineItem, RemoteOrder, RemoteProduct, RemoteVariant,
};
