mod component;
mod entry;
mod group;
mod value;

pub use self::component::Component;
pub use self::entry::Entry;
pub use self::group::{Group, NO_GROUP};
pub use self::value::{ArgType, ConfigValue, EntryFlags, Level};
