// Copyright 2025 Cornell University
// released under MIT License

pub mod c;
