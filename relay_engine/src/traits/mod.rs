mod status_management;

pub use status_management::{StatusManagement, StoreError};
