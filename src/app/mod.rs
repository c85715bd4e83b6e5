// Application layer - Use case interactors

pub mod batch_interactor;
pub mod container;
pub mod cut_interactor;
pub mod inspect_interactor;
pub mod offset_interactor;
pub mod scene_interactor;
pub mod subtitle_interactor;
pub mod verify_interactor;

// Re-export interactors
pub use batch_interactor::BatchInteractor;
pub use container::{AppContainer, DefaultAppContainer};
pub use cut_interactor::{CutInteractor, CutReport, CutRequest};
pub use inspect_interactor::{InspectInteractor, InspectReport};
pub use offset_interactor::{CrossCheckReport, OffsetInteractor, RemuxOffsetResolver};
pub use scene_interactor::{SceneCut, SceneInteractor, SceneReport, SceneRequest};
pub use subtitle_interactor::SubtitleInteractor;
pub use verify_interactor::{VerifyInteractor, VerifyReport, VerifyRequest};
