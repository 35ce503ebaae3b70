pub mod mock;
pub mod tfhe;

pub use mock::MockBackend;
pub use tfhe::TfheBackend;
