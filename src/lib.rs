pub mod feed;
pub mod merge;
pub mod name_key;
pub mod patch;
pub mod resolve;
pub mod roster;
pub mod sync;
pub mod teams;
