//! Application layer: use-case orchestration over domain and infrastructure.

pub mod services;
