//! Chart of accounts: account types, the sign convention, hierarchy
//! traversal, and the registry.

mod hierarchy;
pub mod registry;
pub mod types;

#[cfg(test)]
mod types_props;

pub use registry::AccountRegistry;
pub use types::{
    Account, AccountNode, AccountType, AccountUpdate, NewAccount, NormalBalance, ParentChange,
};
