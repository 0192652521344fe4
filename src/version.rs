//! Desk version.

/// The short version information for desk.
pub const DESK_SHORT_VERSION: &str = env!("DESK_SHORT_VERSION");

/// The long version information for desk.
pub const DESK_LONG_VERSION: &str = concat!(
    env!("DESK_LONG_VERSION_0"),
    "\n",
    env!("DESK_LONG_VERSION_1"),
    "\n",
    env!("DESK_LONG_VERSION_2"),
    "\n",
    env!("DESK_LONG_VERSION_3"),
    "\n",
    env!("DESK_LONG_VERSION_4")
);
