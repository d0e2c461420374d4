//! Conversion between domain results and the wire types of `gambit_shared::protocol`.

pub mod conversion;
