pub mod completions;
pub mod decode;
pub mod encode;
pub mod inspect;
pub mod version;
