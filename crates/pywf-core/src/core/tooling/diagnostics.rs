pub mod codes {
    pub const MISSING_INPUT: &str = "PW101";
    pub const MANIFEST: &str = "PW110";
    pub const VERSION: &str = "PW120";
    pub const SECRET: &str = "PW130";
    pub const CAPABILITY: &str = "PW140";
    pub const COMMAND_FAILED: &str = "PW201";
    pub const REMOTE: &str = "PW301";
    pub const IO: &str = "PW401";
}
