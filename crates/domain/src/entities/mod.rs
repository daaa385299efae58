//! Domain entities - Objects with identity and lifecycle

mod text_fragment;

pub use text_fragment::TextFragment;
