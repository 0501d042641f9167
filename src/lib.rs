// Copyright 2025 Cornell University
// released under MIT License

pub mod backends;
pub mod compiler;
pub mod diagnostic;
pub mod encoding;
pub mod errors;
pub mod guard;
pub mod ir;
pub mod parser;
pub mod serialize;
pub mod stimulus;
pub mod weakness;
