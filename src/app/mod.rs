// Application layer - Use case interactors

pub mod container;
pub mod convert_interactor;
pub mod executor;
pub mod file_state;

// Re-export interactors
pub use convert_interactor::ConvertInteractor;
pub use executor::TranscodeExecutor;
pub use file_state::FileStateManager;
