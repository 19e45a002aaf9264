pub mod media;
pub mod queue;
pub mod state;
pub mod store;

pub use media::{MediaBuffer, MediaItem, MEDIA_LIMIT};
pub use queue::BrowseQueue;
pub use state::{
    BrowseSource, BrowseState, ProductForm, ProductIntent, ProductStep, ProfileForm,
    ProfileIntent, ProfileStep, Session, SessionMode,
};
pub use store::SessionStore;
