// Application layer - Use case interactors

pub mod analyze_interactor;
pub mod container;
pub mod edit_interactor;
pub mod plan_executor;
pub mod plan_generator;
pub mod server_interactor;

// Re-export interactors
pub use analyze_interactor::{AnalyzeInteractor, AnalyzeResponse};
pub use container::{AppContainer, DefaultAppContainer};
pub use edit_interactor::{BatchRequest, BatchResponse, EditInteractor, EditRequest, EditResponse};
pub use plan_executor::PlanExecutor;
pub use plan_generator::PlanGenerator;
pub use server_interactor::{DependencyStatus, ServerHealth, ServerInteractor, ServerStatus};
