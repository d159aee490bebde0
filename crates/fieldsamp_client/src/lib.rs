//! FieldSamp client - REST access and the optimistic timer controller.
//!
//! The controller advances local timer state before the backend confirms a
//! change; the view layer reconciles against server truth on every refetch.
//! See `fieldsamp_core` for the underlying state machine.

pub mod api;
pub mod controller;
pub mod notify;
pub mod view;
