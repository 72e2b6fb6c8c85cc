mod codec;
mod compound;
mod file;
mod kind;
mod list;
mod pretty;
mod ser;
mod tag;

pub use codec::{decode, encode, MAX_DEPTH};
pub use compound::Compound;
pub use file::NbtFile;
pub use kind::TagKind;
pub use list::List;
pub use tag::Tag;
