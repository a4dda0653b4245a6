pub mod classify;
pub mod communes;
pub mod graph;
pub mod pipeline;
pub mod reconcile;
pub mod traversal;
pub mod view;

pub use classify::{classify, classify_record, CLASSIFICATION_TABLE};
pub use communes::*;
pub use graph::*;
pub use pipeline::*;
pub use reconcile::reconcile;
pub use traversal::extract;
pub use view::*;
