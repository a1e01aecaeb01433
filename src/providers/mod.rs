pub mod traits;

pub use traits::{CandidateProvider, LibraryProvider};
