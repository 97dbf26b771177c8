pub(crate) mod assignments;
pub(crate) mod listings;
pub(crate) mod meta;
pub(crate) mod results;
pub(crate) mod shared;
pub(crate) mod submissions;
