pub mod test_member;

pub use test_member::*;
