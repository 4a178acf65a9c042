pub mod stream_item;

pub use stream_item::{AuthorDetail, StreamItem};
