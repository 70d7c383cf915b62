/// File name searched for in every candidate directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Directory under the user's config home that holds the config file.
pub const CONFIG_DIR_NAME: &str = "revChatGPT";

pub const XDG_CONFIG_HOME_ENV: &str = "XDG_CONFIG_HOME";
pub const HOME_ENV: &str = "HOME";
