//! Client core for the relay management console: durable credential store,
//! session state and operations, the authorized request pipeline, and the
//! navigation guard. The `cli` module is a thin console front end over the
//! core.

pub mod api;
pub mod cli;
pub mod router;
pub mod session;
