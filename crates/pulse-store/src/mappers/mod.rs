//! Model -> entity mappers

mod message;
mod principal;
