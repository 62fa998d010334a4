pub mod raw_post;

pub use raw_post::RawPost;
