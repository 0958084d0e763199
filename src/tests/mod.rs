#[cfg(test)]
pub mod common;

mod cached_token;
mod short_circuit;
