/// Storage keys shared by every extension context

pub const FAVOURITED_CHATS: &str = "favouritedChats";
pub const FILTER_OPTIONS: &str = "filterOptions";
pub const SIDEBAR_OPEN: &str = "sidebarOpen";
