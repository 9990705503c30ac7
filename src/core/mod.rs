// Core modules implementing address resolution and error modeling.
pub mod address;
pub mod error;
