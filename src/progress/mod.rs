pub mod events;
pub mod stats;
pub mod store;

pub use events::{
    ChannelListener,
    ProgressEvent,
    ProgressListener,
    SubscriptionId,
};
pub use stats::{
    LearningStats,
    ProgressBadge,
    SceneProgress,
    SceneStats,
};
pub use store::{
    ProgressRecord,
    ProgressStore,
    WordState,
    STORAGE_KEY,
};
